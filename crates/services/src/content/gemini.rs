use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use study_core::model::{AppSettings, Formula, PracticeQuestion, StudyContent};

use super::config::ContentConfig;
use super::{ContentGenerator, prompts};
use crate::error::ContentError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client returning structured JSON.
#[derive(Clone)]
pub struct GeminiContentService {
    client: Client,
    config: Option<ContentConfig>,
}

impl GeminiContentService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ContentConfig::from_env())
    }

    /// Client configured from persisted settings, falling back to the environment.
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(ContentConfig::resolve(settings))
    }

    #[must_use]
    pub fn new(config: Option<ContentConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn config(&self) -> Option<&ContentConfig> {
        self.config.as_ref()
    }

    async fn request<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema: Value,
    ) -> Result<T, ContentError> {
        let config = self.config.as_ref().ok_or(ContentError::Disabled)?;
        let payload = GenerateRequest::new(&config.system_prompt, prompt, schema);

        debug!("event=content_request model={}", config.model);
        let response = self
            .client
            .post(config.endpoint())
            .header(API_KEY_HEADER, &config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "event=content_request status=http_error code={}",
                response.status()
            );
            return Err(ContentError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.first_text().ok_or(ContentError::EmptyResponse)?;
        parse_payload(&text)
    }
}

#[async_trait]
impl ContentGenerator for GeminiContentService {
    async fn generate_study_content(
        &self,
        title: &str,
        category: &str,
    ) -> Result<StudyContent, ContentError> {
        self.request(
            prompts::study_content_prompt(title, category),
            prompts::study_content_schema(),
        )
        .await
    }

    async fn lookup_formula(&self, name: &str) -> Result<Formula, ContentError> {
        self.request(prompts::formula_prompt(name), prompts::formula_schema())
            .await
    }

    async fn generate_practice_questions(
        &self,
        title: &str,
        category: &str,
        count: usize,
    ) -> Result<Vec<PracticeQuestion>, ContentError> {
        self.request(
            prompts::practice_prompt(title, category, count),
            prompts::practice_questions_schema(),
        )
        .await
    }
}

/// Decodes the model's JSON text, tolerating surrounding whitespace and a
/// Markdown code fence.
fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, ContentError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    if unfenced.trim().is_empty() {
        return Err(ContentError::EmptyResponse);
    }
    Ok(serde_json::from_str(unfenced.trim())?)
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Instruction<'a>,
    contents: Vec<Turn>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(system_prompt: &'a str, prompt: String, schema: Value) -> Self {
        Self {
            system_instruction: Instruction {
                parts: [TextPartRef {
                    text: system_prompt,
                }],
            },
            contents: vec![Turn {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Instruction<'a> {
    parts: [TextPartRef<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPartRef<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Turn {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}
