//! Test composition: synthesize a practice test from conversation history,
//! validate the model's output, and fall back to a fixed template whenever
//! synthesis is impossible or the output is malformed.
//!
//! Model output is untrusted input. The parse step is a full boundary
//! validation producing a tagged result (`Valid` / `Malformed`), never a
//! structural cast. Any rejection routes to the template, so a test is
//! always producible and always well-formed.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::conversation::HistoryFetcher;
use crate::error::TutorError;
use crate::gateway::GenerationGateway;
use crate::model::{ComposedTest, NewTest, Question, QuestionKind};
use crate::prompt;
use crate::traits::TestStore;

/// Multiple-choice items a test must contain.
pub const MCQ_COUNT: usize = 10;

/// Short-answer items a test must contain.
pub const SHORT_COUNT: usize = 4;

/// Options every multiple-choice item must carry.
pub const MCQ_OPTION_COUNT: usize = 4;

/// Outcome of parsing a generated reply as a test.
#[derive(Debug)]
pub enum ParsedReply {
    /// The reply was a well-formed test of the required shape.
    Valid(Vec<Question>),
    /// The reply was rejected; the reason is for logs, not users.
    Malformed(String),
}

#[derive(Deserialize)]
struct GeneratedTest {
    questions: Vec<Question>,
}

/// Parse and validate a model reply.
///
/// Accepts only a JSON object with a `questions` array whose items each
/// carry `type`, `subject`, and `question`, with exactly 10 multiple-choice
/// and 4 short-answer items, every multiple-choice item holding 4 options
/// and an answer that is one of them.
pub fn parse_generated_test(reply: &str) -> ParsedReply {
    let parsed: GeneratedTest = match serde_json::from_str(reply) {
        Ok(parsed) => parsed,
        Err(e) => return ParsedReply::Malformed(format!("not a valid test object: {e}")),
    };

    let mcq = parsed
        .questions
        .iter()
        .filter(|q| q.kind == QuestionKind::MultipleChoice)
        .count();
    let short = parsed.questions.len() - mcq;
    if mcq != MCQ_COUNT || short != SHORT_COUNT {
        return ParsedReply::Malformed(format!(
            "expected {MCQ_COUNT} multiple-choice + {SHORT_COUNT} short-answer questions, \
             got {mcq} + {short}"
        ));
    }

    for (index, question) in parsed.questions.iter().enumerate() {
        if question.kind != QuestionKind::MultipleChoice {
            continue;
        }
        if question.options.len() != MCQ_OPTION_COUNT {
            return ParsedReply::Malformed(format!(
                "question {index} has {} options, expected {MCQ_OPTION_COUNT}",
                question.options.len()
            ));
        }
        if !question.options.contains(&question.answer) {
            return ParsedReply::Malformed(format!(
                "question {index} answer '{}' is not one of its options",
                question.answer
            ));
        }
    }

    ParsedReply::Valid(parsed.questions)
}

/// The fixed template used whenever synthesis is not attempted or its
/// output is rejected. 10 multiple-choice + 4 short-answer.
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question::mcq("Math", "What is 5 + 3?", ["5", "6", "7", "8"], "8"),
        Question::mcq("Math", "Which number is even?", ["3", "7", "10", "9"], "10"),
        Question::mcq(
            "Science",
            "Which planet is known as the Red Planet?",
            ["Earth", "Mars", "Venus", "Jupiter"],
            "Mars",
        ),
        Question::mcq(
            "English",
            "Choose the correct plural of 'child'.",
            ["childs", "children", "childes", "childer"],
            "children",
        ),
        Question::mcq("Math", "What is 12 ÷ 4?", ["2", "3", "4", "6"], "3"),
        Question::mcq(
            "Science",
            "Water boils at ___ °C.",
            ["50", "100", "200", "0"],
            "100",
        ),
        Question::mcq(
            "General Knowledge",
            "What is the capital of India?",
            ["Delhi", "Mumbai", "Chennai", "Kolkata"],
            "Delhi",
        ),
        Question::mcq(
            "Math",
            "What is the square of 9?",
            ["18", "81", "27", "72"],
            "81",
        ),
        Question::mcq(
            "English",
            "Fill in the blank: The sun ___ in the east.",
            ["rise", "rises", "rising", "rose"],
            "rises",
        ),
        Question::mcq(
            "Science",
            "Which gas do we breathe in to stay alive?",
            ["Oxygen", "Carbon Dioxide", "Nitrogen", "Helium"],
            "Oxygen",
        ),
        Question::short("English", "Write a sentence using the word 'school'."),
        Question::short("Math", "Explain how you would solve 25 ÷ 5."),
        Question::short("Science", "Why is the sun important for life on Earth?"),
        Question::short(
            "General Knowledge",
            "Name your favorite subject and explain why.",
        ),
    ]
}

/// Composes practice tests for students.
#[derive(Clone)]
pub struct TestComposer {
    history: HistoryFetcher,
    gateway: GenerationGateway,
    tests: Arc<dyn TestStore>,
    /// Turns of history handed to the generation prompt.
    context_turns: u32,
    /// Below this many stored turns, synthesis is not attempted.
    min_history_for_synthesis: usize,
}

impl TestComposer {
    pub fn new(
        history: HistoryFetcher,
        gateway: GenerationGateway,
        tests: Arc<dyn TestStore>,
        context_turns: u32,
        min_history_for_synthesis: usize,
    ) -> Self {
        Self {
            history,
            gateway,
            tests,
            context_turns,
            min_history_for_synthesis,
        }
    }

    /// Produce, persist, and return a new test for this student.
    ///
    /// Generation faults never surface here: a model outage or a
    /// free-text reply both land on the fixed template. Only storage
    /// faults propagate.
    pub async fn compose(&self, student_id: &str) -> Result<ComposedTest, TutorError> {
        let window = self.history.fetch(student_id, self.context_turns).await?;

        let questions = if window.len() < self.min_history_for_synthesis {
            tracing::info!(
                student_id,
                turns = window.len(),
                "not enough history to synthesize, using template"
            );
            fallback_questions()
        } else {
            let reply = self.gateway.generate(&prompt::build_test_prompt(&window)).await;
            match parse_generated_test(&reply) {
                ParsedReply::Valid(questions) => {
                    tracing::info!(student_id, "synthesized test accepted");
                    questions
                }
                ParsedReply::Malformed(reason) => {
                    tracing::warn!(student_id, %reason, "generated test rejected, using template");
                    fallback_questions()
                }
            }
        };

        let test = NewTest {
            created_at: Utc::now(),
            questions,
        };
        let test_id = self.tests.create(student_id, &test).await?;
        tracing::info!(student_id, %test_id, "test created");

        Ok(ComposedTest {
            test_id,
            questions: test.questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_reply() -> String {
        serde_json::to_string(&serde_json::json!({
            "questions": fallback_questions()
        }))
        .unwrap()
    }

    #[test]
    fn parse_accepts_well_formed_reply() {
        match parse_generated_test(&valid_reply()) {
            ParsedReply::Valid(questions) => assert_eq!(questions.len(), 14),
            ParsedReply::Malformed(reason) => panic!("rejected valid reply: {reason}"),
        }
    }

    #[test]
    fn parse_rejects_free_text() {
        let reply = "Sure! Here are some questions for you:\n1. What is 2+2?";
        assert!(matches!(
            parse_generated_test(reply),
            ParsedReply::Malformed(_)
        ));
    }

    #[test]
    fn parse_rejects_missing_questions_key() {
        assert!(matches!(
            parse_generated_test(r#"{"items": []}"#),
            ParsedReply::Malformed(_)
        ));
    }

    #[test]
    fn parse_rejects_item_without_subject() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_reply()).unwrap();
        value["questions"][0]
            .as_object_mut()
            .unwrap()
            .remove("subject");
        let reply = value.to_string();
        assert!(matches!(
            parse_generated_test(&reply),
            ParsedReply::Malformed(_)
        ));
    }

    #[test]
    fn parse_rejects_wrong_counts() {
        let mut questions = fallback_questions();
        questions.pop();
        let reply = serde_json::to_string(&serde_json::json!({ "questions": questions })).unwrap();
        match parse_generated_test(&reply) {
            ParsedReply::Malformed(reason) => assert!(reason.contains("expected 10")),
            ParsedReply::Valid(_) => panic!("accepted a 13-question test"),
        }
    }

    #[test]
    fn parse_rejects_mcq_with_wrong_option_count() {
        let mut questions = fallback_questions();
        questions[0].options.pop();
        let reply = serde_json::to_string(&serde_json::json!({ "questions": questions })).unwrap();
        match parse_generated_test(&reply) {
            ParsedReply::Malformed(reason) => assert!(reason.contains("options")),
            ParsedReply::Valid(_) => panic!("accepted a 3-option mcq"),
        }
    }

    #[test]
    fn parse_rejects_answer_outside_options() {
        let mut questions = fallback_questions();
        questions[0].answer = "42".into();
        let reply = serde_json::to_string(&serde_json::json!({ "questions": questions })).unwrap();
        match parse_generated_test(&reply) {
            ParsedReply::Malformed(reason) => assert!(reason.contains("not one of its options")),
            ParsedReply::Valid(_) => panic!("accepted an answer outside the options"),
        }
    }

    #[test]
    fn template_has_required_shape() {
        let questions = fallback_questions();
        assert_eq!(questions.len(), MCQ_COUNT + SHORT_COUNT);

        let mcq: Vec<_> = questions
            .iter()
            .filter(|q| q.kind == QuestionKind::MultipleChoice)
            .collect();
        assert_eq!(mcq.len(), MCQ_COUNT);
        for q in &mcq {
            assert_eq!(q.options.len(), MCQ_OPTION_COUNT);
            assert!(q.options.contains(&q.answer), "bad template item: {q:?}");
        }

        for q in questions.iter().filter(|q| q.kind == QuestionKind::ShortAnswer) {
            assert!(q.options.is_empty());
            assert!(q.answer.is_empty());
        }

        for q in &questions {
            assert!(
                crate::model::SUBJECTS.contains(&q.subject.as_str()),
                "template subject outside the closed set: {}",
                q.subject
            );
        }
    }

    #[test]
    fn template_is_stable() {
        assert_eq!(fallback_questions(), fallback_questions());
    }
}
