//! Central tutoring engine.
//!
//! Owns the injected collaborator handles and exposes the four
//! request-scoped operations: chat, test composition, submission scoring,
//! and test listing. Each operation is an independent unit of work with
//! no shared in-process state; its suspension points are the storage and
//! model calls, executed strictly in sequence.
//!
//! Concurrent operations for the same student are not mutually excluded:
//! two overlapping chat calls may interleave their record/fetch/record
//! sequences, so log order can deviate from causal order. This is a
//! documented property, not a defect this layer hides.

use std::sync::Arc;

use crate::composer::TestComposer;
use crate::conversation::{ConversationRecorder, HistoryFetcher};
use crate::error::TutorError;
use crate::gateway::GenerationGateway;
use crate::model::{ComposedTest, Role, Submission, SubmittedAnswer, TestRecord};
use crate::prompt;
use crate::scoring::{score_submission, ScoreOutcome};
use crate::traits::{ConversationStore, TestStore, TextGenerator};

/// Tunable bounds for the engine. The defaults match the production
/// behavior; callers may tune the window sizes.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model identifier passed to the generator.
    pub model: String,
    /// Turns of history included in a chat prompt (~7 exchanges).
    pub chat_context_turns: u32,
    /// Turns of history included in a test-generation prompt.
    pub test_context_turns: u32,
    /// Minimum stored turns before test synthesis is attempted.
    pub min_history_for_synthesis: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "command-r-plus".to_string(),
            chat_context_turns: 14,
            test_context_turns: 20,
            min_history_for_synthesis: 5,
        }
    }
}

/// The tutoring engine: conversation, test composition, and grading.
pub struct TutorEngine {
    history: HistoryFetcher,
    recorder: ConversationRecorder,
    gateway: GenerationGateway,
    composer: TestComposer,
    tests: Arc<dyn TestStore>,
    config: EngineConfig,
}

impl TutorEngine {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        tests: Arc<dyn TestStore>,
        generator: Arc<dyn TextGenerator>,
        config: EngineConfig,
    ) -> Self {
        let history = HistoryFetcher::new(Arc::clone(&conversations));
        let recorder = ConversationRecorder::new(conversations);
        let gateway = GenerationGateway::new(generator, config.model.clone());
        let composer = TestComposer::new(
            history.clone(),
            gateway.clone(),
            Arc::clone(&tests),
            config.test_context_turns,
            config.min_history_for_synthesis,
        );
        Self {
            history,
            recorder,
            gateway,
            composer,
            tests,
            config,
        }
    }

    /// One chat exchange: record the student's message, build a prompt
    /// from the recent window (which now includes that message), generate
    /// a reply, record it, and return it.
    ///
    /// The reply is always present: model faults surface as an apology
    /// string, never as an error. Storage faults do propagate.
    pub async fn chat(&self, student_id: &str, message: &str) -> Result<String, TutorError> {
        let student_id = require("student id", student_id)?;
        let message = require("message", message)?;

        self.recorder
            .record(student_id, Role::Student, message)
            .await?;

        let window = self
            .history
            .fetch(student_id, self.config.chat_context_turns)
            .await?;
        let reply = self
            .gateway
            .generate(&prompt::build_chat_prompt(&window, message))
            .await;

        self.recorder.record(student_id, Role::Tutor, &reply).await?;
        tracing::info!(student_id, "chat exchange recorded");

        Ok(reply)
    }

    /// Compose and persist a new practice test for this student.
    pub async fn compose_test(&self, student_id: &str) -> Result<ComposedTest, TutorError> {
        let student_id = require("student id", student_id)?;
        self.composer.compose(student_id).await
    }

    /// Grade a submission against an existing test and persist the
    /// outcome. Unknown (student, test) pairs are rejected before any
    /// scoring happens. Resubmitting overwrites the previous result.
    pub async fn submit_test(
        &self,
        student_id: &str,
        test_id: &str,
        answers: Vec<SubmittedAnswer>,
    ) -> Result<ScoreOutcome, TutorError> {
        let student_id = require("student id", student_id)?;
        let test_id = require("test id", test_id)?;

        if self.tests.get(student_id, test_id).await?.is_none() {
            return Err(TutorError::TestNotFound {
                student_id: student_id.to_string(),
                test_id: test_id.to_string(),
            });
        }

        let outcome = score_submission(&answers);
        let submission = Submission {
            answers,
            score: outcome.score.clone(),
            subject_scores: outcome.subject_scores.clone(),
        };
        self.tests
            .record_submission(student_id, test_id, &submission)
            .await?;
        tracing::info!(student_id, %test_id, score = ?outcome.score, "submission graded");

        Ok(outcome)
    }

    /// All of the student's tests, oldest first.
    pub async fn list_tests(&self, student_id: &str) -> Result<Vec<TestRecord>, TutorError> {
        let student_id = require("student id", student_id)?;
        Ok(self.tests.list_all(student_id).await?)
    }
}

/// Reject blank required fields before anything reaches a collaborator.
fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, TutorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TutorError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed)
}
