//! Core data model types for tutorkit.
//!
//! These are the fundamental types the entire tutorkit system uses to
//! represent conversation turns, practice tests, and scores.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Tutor => write!(f, "tutor"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "tutor" => Ok(Role::Tutor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One message in a student's conversation log. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// UTC, generated at record time. Serialized with an explicit UTC
    /// offset so the stored form sorts lexicographically.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Build a turn stamped with the current time.
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Assessment item kinds, with their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice,
    #[serde(rename = "short")]
    ShortAnswer,
}

/// The closed subject set tests are generated against. Grading accepts
/// freeform subject labels; only generation is constrained to this list.
pub const SUBJECTS: [&str; 5] = ["Math", "Science", "English", "History", "General Knowledge"];

/// A single assessment item.
///
/// `kind`, `subject`, and `question` are required on deserialization: a
/// generated item missing any of them fails to parse, which invalidates
/// the whole generated test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub subject: String,
    pub question: String,
    /// Exactly 4 entries for multiple choice; empty for short answers.
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct option for multiple choice; empty for short answers
    /// (filled by the student later).
    #[serde(default)]
    pub answer: String,
}

impl Question {
    pub fn mcq(
        subject: impl Into<String>,
        question: impl Into<String>,
        options: [&str; 4],
        answer: impl Into<String>,
    ) -> Self {
        Self {
            kind: QuestionKind::MultipleChoice,
            subject: subject.into(),
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.into(),
        }
    }

    pub fn short(subject: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::ShortAnswer,
            subject: subject.into(),
            question: question.into(),
            options: Vec::new(),
            answer: String::new(),
        }
    }
}

/// A not-yet-persisted test: what `TestStore::create` receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTest {
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

/// A persisted test, in either lifecycle state.
///
/// Created with `completed = false` and no score; updated exactly once on
/// submission with the student's answers, the aggregate score, and the
/// per-subject breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub test_id: String,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
    pub completed: bool,
    /// `"{correct}/{totalMcq}"`, or None when the submission had no
    /// multiple-choice items (or no submission happened yet).
    pub score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_answers: Option<Vec<SubmittedAnswer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_scores: Option<BTreeMap<String, SubjectScore>>,
}

/// What `TestComposer::compose` hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedTest {
    pub test_id: String,
    pub questions: Vec<Question>,
}

/// One answered item as submitted by the student. Untrusted wire input:
/// `kind` stays a raw string here, and anything other than `"mcq"` is
/// graded as a short answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(
        rename = "studentAnswer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub student_answer: Option<String>,
    #[serde(default)]
    pub answer: String,
}

impl SubmittedAnswer {
    /// Only `"mcq"` items are auto-graded.
    pub fn is_multiple_choice(&self) -> bool {
        self.kind == "mcq"
    }
}

/// Per-subject tally. `correct <= total` always.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub correct: u32,
    pub total: u32,
}

/// A graded submission as handed to `TestStore::record_submission`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub answers: Vec<SubmittedAnswer>,
    pub score: Option<String>,
    pub subject_scores: BTreeMap<String, SubjectScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_and_parse() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Tutor.to_string(), "tutor");
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("Tutor".parse::<Role>().unwrap(), Role::Tutor);
        assert!("teacher".parse::<Role>().is_err());
    }

    #[test]
    fn question_wire_format() {
        let q = Question::mcq("Math", "What is 5 + 3?", ["5", "6", "7", "8"], "8");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "mcq");
        assert_eq!(json["subject"], "Math");
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
        assert_eq!(json["answer"], "8");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn question_requires_subject_and_kind() {
        let missing_subject = r#"{"type": "mcq", "question": "q?"}"#;
        assert!(serde_json::from_str::<Question>(missing_subject).is_err());

        let missing_kind = r#"{"subject": "Math", "question": "q?"}"#;
        assert!(serde_json::from_str::<Question>(missing_kind).is_err());

        let unknown_kind = r#"{"type": "essay", "subject": "Math", "question": "q?"}"#;
        assert!(serde_json::from_str::<Question>(unknown_kind).is_err());
    }

    #[test]
    fn short_question_defaults() {
        let q: Question =
            serde_json::from_str(r#"{"type": "short", "subject": "Science", "question": "Why?"}"#)
                .unwrap();
        assert_eq!(q.kind, QuestionKind::ShortAnswer);
        assert!(q.options.is_empty());
        assert!(q.answer.is_empty());
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let record = TestRecord {
            test_id: "t-1".into(),
            created_at: Utc::now(),
            questions: vec![],
            completed: false,
            score: None,
            student_answers: None,
            subject_scores: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("testId").is_some());
        assert!(json.get("createdAt").is_some());
        // Unsubmitted tests do not carry answer fields at all.
        assert!(json.get("studentAnswers").is_none());
        assert!(json.get("subjectScores").is_none());
    }

    #[test]
    fn submitted_answer_accepts_partial_input() {
        let a: SubmittedAnswer =
            serde_json::from_str(r#"{"type": "mcq", "answer": "8", "studentAnswer": "8"}"#).unwrap();
        assert!(a.is_multiple_choice());
        assert!(a.subject.is_none());
        assert_eq!(a.student_answer.as_deref(), Some("8"));

        // A novel kind string deserializes fine and is simply not mcq.
        let b: SubmittedAnswer = serde_json::from_str(r#"{"type": "essay"}"#).unwrap();
        assert!(!b.is_multiple_choice());
        assert!(b.answer.is_empty());
    }
}
