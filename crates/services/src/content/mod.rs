//! AI-generated study material.
//!
//! [`ContentGenerator`] is the seam between study workflows and whichever
//! model backs them; [`GeminiContentService`] is the production client.

mod config;
mod gemini;
mod prompts;

use async_trait::async_trait;
use study_core::model::{Formula, PracticeQuestion, StudyContent};

use crate::error::ContentError;

pub use config::{
    ContentConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, ENV_API_KEY,
    ENV_BASE_URL, ENV_MODEL,
};
pub use gemini::GeminiContentService;

/// Number of extra practice questions requested when the caller does not say.
pub const DEFAULT_PRACTICE_COUNT: usize = 10;

/// Produces study material for a single item.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Full study guide for one item.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the generator is disabled, the request fails,
    /// or the payload does not match [`StudyContent`].
    async fn generate_study_content(
        &self,
        title: &str,
        category: &str,
    ) -> Result<StudyContent, ContentError>;

    /// Looks up a single formula by name.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on request or decoding failures.
    async fn lookup_formula(&self, name: &str) -> Result<Formula, ContentError>;

    /// `count` additional practice questions for one item.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on request or decoding failures.
    async fn generate_practice_questions(
        &self,
        title: &str,
        category: &str,
        count: usize,
    ) -> Result<Vec<PracticeQuestion>, ContentError>;
}
