//! Gemini `generateContent` client with the Google Search tool enabled.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use contactscout_shared::{ApiKey, ContactScoutError, GeminiConfig, Result};

use crate::answer::{ParsedAnswer, build_prompt, parse_answer};
use crate::error::{LookupError, classify_status};
use crate::{EmailLookup, LookupOutcome, LookupResult};

/// User-Agent string for lookup requests.
const USER_AGENT: &str = concat!("ContactScout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    function_call: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything the client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// `None` makes every lookup fail fast with [`LookupError::MissingCredential`].
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn from_config(config: &GeminiConfig, api_key: Option<ApiKey>) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Looks up company emails through Gemini with search grounding.
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                ContactScoutError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        let model = normalize_model(&settings.model);
        let endpoint = format!(
            "{}/models/{model}:generateContent",
            settings.base_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            settings,
            endpoint,
        })
    }

    fn request_body(&self, company: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: build_prompt(company),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_p: self.settings.top_p,
                top_k: self.settings.top_k,
                max_output_tokens: self.settings.max_output_tokens,
            },
        }
    }
}

impl EmailLookup for GeminiClient {
    #[instrument(skip_all, fields(company = %company, model = %self.settings.model))]
    async fn lookup(&self, company: &str) -> LookupResult {
        let company = company.trim();
        if company.is_empty() {
            return Ok(LookupOutcome::NotFound);
        }

        let api_key = self
            .settings
            .api_key
            .as_ref()
            .ok_or(LookupError::MissingCredential)?;

        debug!(endpoint = %self.endpoint, "querying Gemini");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key.expose())
            .json(&self.request_body(company))
            .send()
            .await
            .map_err(LookupError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let reply: GenerateContentResponse =
            response.json().await.map_err(LookupError::from_reqwest)?;
        let text = extract_text(&reply)?;

        match parse_answer(&text) {
            ParsedAnswer::Found(email) => {
                debug!(%email, "email found");
                Ok(LookupOutcome::Found(email))
            }
            ParsedAnswer::NotFound => {
                debug!("model reported no email");
                Ok(LookupOutcome::NotFound)
            }
            ParsedAnswer::Malformed(raw) => Err(LookupError::Malformed { raw }),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accept both `gemini-x` and `models/gemini-x`.
fn normalize_model(model: &str) -> &str {
    let trimmed = model.trim();
    trimmed.strip_prefix("models/").unwrap_or(trimmed)
}

/// Join the text parts of the first candidate.
fn extract_text(reply: &GenerateContentResponse) -> std::result::Result<String, LookupError> {
    let candidate = reply.candidates.first();
    let parts = candidate
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or_default();

    let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if !text.trim().is_empty() {
        return Ok(text);
    }

    if let Some(call) = parts.iter().find_map(|p| p.function_call.as_ref()) {
        return Err(LookupError::FunctionCall(call.to_string()));
    }

    let reason = reply
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
        .or_else(|| candidate.and_then(|c| c.finish_reason.clone()))
        .unwrap_or_else(|| "no candidates".into());

    Err(LookupError::EmptyResponse { reason })
}
