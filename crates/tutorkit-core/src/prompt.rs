//! Prompt assembly.
//!
//! Pure string building: deterministic for identical inputs, no side
//! effects, and turn timestamps never influence the rendered text.

use crate::model::{Turn, SUBJECTS};

/// System-style preface keeping the model within tutoring scope.
pub const TUTOR_PREAMBLE: &str = "You are a friendly, encouraging AI tutor for students in grades 2-12. \
Your job: teach, explain clearly, ask follow-up questions, encourage, and help with school subjects. \
Stay strictly within educational content; do not discuss unrelated or unsafe topics. \
Use simple steps, examples, and short paragraphs. When helpful, ask the student a question to check understanding.\n";

/// Rendered in place of the transcript when there is no history yet.
///
/// Keeping the section present (rather than blank) keeps the prompt
/// structure identical regardless of history length.
pub const NO_HISTORY_MARKER: &str = "(no previous messages)";

/// Render a conversation window as `ROLE: text` lines, oldest first.
pub fn render_transcript(window: &[Turn]) -> String {
    if window.is_empty() {
        return NO_HISTORY_MARKER.to_string();
    }
    window
        .iter()
        .map(|turn| format!("{}: {}", turn.role.to_string().to_uppercase(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the chat prompt: preamble, transcript, the new message quoted,
/// and the instruction to answer as the tutor.
pub fn build_chat_prompt(window: &[Turn], latest_message: &str) -> String {
    format!(
        "{TUTOR_PREAMBLE}\
         Here is the recent conversation between YOU (the tutor) and the STUDENT:\n\
         {}\n\
         \nThe STUDENT just said:\n\
         \"{latest_message}\"\n\
         \nRespond now as the tutor.",
        render_transcript(window)
    )
}

/// The answer shape shown to the model verbatim.
const TEST_JSON_EXAMPLE: &str = r#"{
  "questions": [
    {
      "type": "mcq",
      "subject": "Math",
      "question": "What is 2+2?",
      "options": ["2", "3", "4", "5"],
      "answer": "4"
    },
    {
      "type": "short",
      "subject": "Science",
      "question": "Explain the process of photosynthesis.",
      "answer": ""
    }
  ]
}"#;

/// Build the test-generation prompt: the student's recent learning plus
/// strict instructions to answer with a single JSON object.
pub fn build_test_prompt(window: &[Turn]) -> String {
    format!(
        "You are an AI tutor. Based on this student's recent learning:\n\
         {}\n\
         \nCreate a test with:\n\
         - 10 multiple choice questions (4 options each, mark the correct answer)\n\
         - 4 short answer questions (leave 'answer' empty for the student to fill).\n\
         - Each question MUST include a \"subject\" field. Choose from: {}.\n\
         \nRespond ONLY in valid JSON:\n{TEST_JSON_EXAMPLE}",
        render_transcript(window),
        SUBJECTS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use chrono::{TimeZone, Utc};

    fn turn(role: Role, text: &str) -> Turn {
        Turn::now(role, text)
    }

    #[test]
    fn empty_window_renders_marker() {
        assert_eq!(render_transcript(&[]), NO_HISTORY_MARKER);
        let prompt = build_chat_prompt(&[], "hi");
        assert!(prompt.contains(NO_HISTORY_MARKER));
    }

    #[test]
    fn transcript_uppercases_roles_oldest_first() {
        let window = vec![
            turn(Role::Student, "What is gravity?"),
            turn(Role::Tutor, "A force that pulls things together."),
        ];
        let transcript = render_transcript(&window);
        assert_eq!(
            transcript,
            "STUDENT: What is gravity?\nTUTOR: A force that pulls things together."
        );
    }

    #[test]
    fn chat_prompt_quotes_latest_message() {
        let prompt = build_chat_prompt(&[], "What is photosynthesis?");
        assert!(prompt.starts_with(TUTOR_PREAMBLE));
        assert!(prompt.contains("\"What is photosynthesis?\""));
        assert!(prompt.ends_with("Respond now as the tutor."));
    }

    #[test]
    fn prompts_are_deterministic() {
        let window = vec![turn(Role::Student, "help with fractions")];
        assert_eq!(
            build_chat_prompt(&window, "next"),
            build_chat_prompt(&window, "next")
        );
        assert_eq!(build_test_prompt(&window), build_test_prompt(&window));
    }

    #[test]
    fn timestamps_do_not_affect_rendering() {
        let mut a = turn(Role::Student, "same text");
        let mut b = a.clone();
        a.timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        b.timestamp = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(
            render_transcript(std::slice::from_ref(&a)),
            render_transcript(std::slice::from_ref(&b))
        );
    }

    #[test]
    fn test_prompt_names_the_subject_set() {
        let prompt = build_test_prompt(&[]);
        for subject in SUBJECTS {
            assert!(prompt.contains(subject), "missing subject {subject}");
        }
        assert!(prompt.contains("10 multiple choice"));
        assert!(prompt.contains("4 short answer"));
        assert!(prompt.contains("Respond ONLY in valid JSON"));
    }
}
