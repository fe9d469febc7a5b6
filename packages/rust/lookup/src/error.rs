//! Lookup failure taxonomy.
//!
//! Variants are coarse on purpose: they only decide how loudly the pipeline
//! logs a failure. Every one of them ends up as an empty email.

/// Why a single lookup produced no email.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No API key was resolved at startup.
    #[error("Gemini API key not configured; set the variable named by [gemini] api_key_env")]
    MissingCredential,

    /// The service rejected the API key.
    #[error("Gemini API key is invalid: {0}")]
    InvalidCredential(String),

    /// The key lacks access to the model, or the region is unsupported.
    #[error("permission denied or model not available in this location: {0}")]
    PermissionDenied(String),

    /// The request or the service-side deadline expired.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other non-success HTTP status.
    #[error("Gemini API error ({status}): {body}")]
    Service { status: u16, body: String },

    /// Connection-level failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The model answered with a tool invocation instead of text.
    #[error("model replied with a function call instead of text: {0}")]
    FunctionCall(String),

    /// The reply carried no text at all.
    #[error("model returned no text ({reason})")]
    EmptyResponse { reason: String },

    /// Text was returned but matched neither answer shape.
    #[error("no <final_answer> email or Not Found marker in response: '{raw}'")]
    Malformed { raw: String },
}

impl LookupError {
    /// Failures that will repeat for every row until the operator fixes setup.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::InvalidCredential(_) | Self::PermissionDenied(_)
        )
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Classify a non-success HTTP response from the Gemini API.
pub fn classify_status(status: u16, body: &str) -> LookupError {
    let lower = body.to_lowercase();
    let body = body.to_string();

    if status == 401 || body.contains("API_KEY_INVALID") || body.contains("API key not valid") {
        LookupError::InvalidCredential(body)
    } else if status == 403
        || (lower.contains("permission")
            && (lower.contains("denied") || lower.contains("location")))
        || lower.contains("location is not supported")
    {
        LookupError::PermissionDenied(body)
    } else if status == 504 || body.contains("DEADLINE_EXCEEDED") || lower.contains("timeout") {
        LookupError::Timeout(body)
    } else {
        LookupError::Service { status, body }
    }
}
