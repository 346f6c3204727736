//! Submission scoring.
//!
//! Multiple-choice items are auto-graded by exact string match; short
//! answers only count toward their subject's total. Subjects are taken
//! from the submission as-is: grading never rejects a label it has not
//! seen before, even though generation constrains the set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{SubjectScore, SubmittedAnswer};

/// Subject used when a submitted item carries none.
pub const DEFAULT_SUBJECT: &str = "General";

/// The aggregate score and per-subject breakdown for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    /// `"{correct}/{totalMcq}"`, or None when nothing was auto-gradable.
    pub score: Option<String>,
    pub subject_scores: BTreeMap<String, SubjectScore>,
}

/// Grade a submitted answer set.
pub fn score_submission(answers: &[SubmittedAnswer]) -> ScoreOutcome {
    let mut correct_count: u32 = 0;
    let mut total_mcq: u32 = 0;
    let mut subject_scores: BTreeMap<String, SubjectScore> = BTreeMap::new();

    for answer in answers {
        let subject = answer
            .subject
            .clone()
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        let entry = subject_scores.entry(subject).or_default();

        if answer.is_multiple_choice() {
            total_mcq += 1;
            entry.total += 1;
            let matched = answer
                .student_answer
                .as_deref()
                .is_some_and(|given| !given.is_empty() && given == answer.answer);
            if matched {
                correct_count += 1;
                entry.correct += 1;
            }
        } else {
            // Short answers are never auto-graded.
            entry.total += 1;
        }
    }

    let score = (total_mcq > 0).then(|| format!("{correct_count}/{total_mcq}"));

    ScoreOutcome {
        score,
        subject_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(subject: Option<&str>, student_answer: Option<&str>, answer: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            subject: subject.map(String::from),
            kind: "mcq".into(),
            question: None,
            student_answer: student_answer.map(String::from),
            answer: answer.into(),
        }
    }

    fn short(subject: Option<&str>) -> SubmittedAnswer {
        SubmittedAnswer {
            subject: subject.map(String::from),
            kind: "short".into(),
            question: None,
            student_answer: Some("free text".into()),
            answer: String::new(),
        }
    }

    #[test]
    fn scores_one_of_two_math_questions() {
        let outcome = score_submission(&[
            mcq(Some("Math"), Some("8"), "8"),
            mcq(Some("Math"), Some("6"), "8"),
        ]);
        assert_eq!(outcome.score.as_deref(), Some("1/2"));
        assert_eq!(
            outcome.subject_scores["Math"],
            SubjectScore {
                correct: 1,
                total: 2
            }
        );
    }

    #[test]
    fn no_mcq_items_means_no_aggregate_score() {
        let outcome = score_submission(&[short(Some("English")), short(Some("Science"))]);
        assert_eq!(outcome.score, None);
        assert_eq!(outcome.subject_scores["English"].total, 1);
        assert_eq!(outcome.subject_scores["English"].correct, 0);
    }

    #[test]
    fn empty_student_answer_is_never_correct() {
        // An empty studentAnswer never matches, even an empty answer key.
        let outcome = score_submission(&[
            mcq(Some("Math"), Some(""), ""),
            mcq(Some("Math"), None, "8"),
        ]);
        assert_eq!(outcome.score.as_deref(), Some("0/2"));
    }

    #[test]
    fn missing_subject_defaults_to_general() {
        let outcome = score_submission(&[mcq(None, Some("4"), "4")]);
        assert_eq!(
            outcome.subject_scores[DEFAULT_SUBJECT],
            SubjectScore {
                correct: 1,
                total: 1
            }
        );
    }

    #[test]
    fn unknown_subject_becomes_freeform_key() {
        let outcome = score_submission(&[mcq(Some("Astronomy"), Some("Mars"), "Mars")]);
        assert!(outcome.subject_scores.contains_key("Astronomy"));
    }

    #[test]
    fn unknown_kind_grades_as_short_answer() {
        let answer = SubmittedAnswer {
            subject: Some("Math".into()),
            kind: "essay".into(),
            question: None,
            student_answer: Some("8".into()),
            answer: "8".into(),
        };
        let outcome = score_submission(&[answer]);
        assert_eq!(outcome.score, None);
        assert_eq!(outcome.subject_scores["Math"].total, 1);
        assert_eq!(outcome.subject_scores["Math"].correct, 0);
    }

    #[test]
    fn correct_never_exceeds_total() {
        let answers: Vec<_> = (0..20)
            .map(|i| {
                mcq(
                    Some(if i % 2 == 0 { "Math" } else { "Science" }),
                    Some(if i % 3 == 0 { "right" } else { "wrong" }),
                    "right",
                )
            })
            .chain((0..5).map(|_| short(Some("Math"))))
            .collect();
        let outcome = score_submission(&answers);
        for (subject, tally) in &outcome.subject_scores {
            assert!(tally.correct <= tally.total, "{subject}: {tally:?}");
        }
    }

    #[test]
    fn empty_submission_scores_empty() {
        let outcome = score_submission(&[]);
        assert_eq!(outcome.score, None);
        assert!(outcome.subject_scores.is_empty());
    }

    #[test]
    fn outcome_serializes_with_camel_case_keys() {
        let outcome = score_submission(&[mcq(Some("Math"), Some("8"), "8")]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["score"], "1/1");
        assert_eq!(json["subjectScores"]["Math"]["correct"], 1);
    }
}
