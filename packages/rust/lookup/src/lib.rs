//! Company email lookup backed by Gemini with Google Search grounding.
//!
//! One call per company: build the prompt, ask the model, and turn its free
//! text reply into a [`LookupOutcome`]. Every failure mode is a [`LookupError`]
//! value; nothing here panics or aborts the caller's batch.

mod answer;
mod error;
mod gemini;

use std::future::Future;

pub use answer::{ParsedAnswer, build_prompt, parse_answer};
pub use error::{LookupError, classify_status};
pub use gemini::{GeminiClient, GeminiSettings};

/// Successful result of a single company lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The model produced a well-formed email address.
    Found(String),
    /// The model explicitly answered `Not Found`, or there was nothing to look up.
    NotFound,
}

impl LookupOutcome {
    /// The value written to the `EMAIL` column.
    pub fn into_email(self) -> String {
        match self {
            Self::Found(email) => email,
            Self::NotFound => String::new(),
        }
    }
}

/// Result of [`EmailLookup::lookup`].
pub type LookupResult = std::result::Result<LookupOutcome, LookupError>;

/// Something that can find a contact email for a company name.
pub trait EmailLookup {
    fn lookup(&self, company: &str) -> impl Future<Output = LookupResult> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_into_email() {
        assert_eq!(
            LookupOutcome::Found("info@acme.com".into()).into_email(),
            "info@acme.com"
        );
        assert_eq!(LookupOutcome::NotFound.into_email(), "");
    }
}
