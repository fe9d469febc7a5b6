//! Prompt construction and `<final_answer>` reply parsing.
//!
//! The model is told to wrap its answer in `<final_answer>…</final_answer>`
//! and to write `Not Found` there when it has no definitive address. Parsing
//! accepts exactly those two shapes; anything else is malformed.

use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Interpretation of a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnswer {
    /// A syntactically plausible email inside the answer tag.
    Found(String),
    /// The explicit `Not Found` marker.
    NotFound,
    /// Neither shape matched; carries the raw reply.
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Answer tag wrapping an email: local part, `@`, domain with a 2+ letter TLD.
static EMAIL_ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<final_answer>\s*([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})\s*</final_answer>",
    )
    .expect("email answer regex")
});

/// Answer tag wrapping the `Not Found` marker, any case and spacing.
static NOT_FOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<final_answer>\s*not\s+found\s*</final_answer>").expect("not found regex")
});

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Build the single instruction sent for `company`.
pub fn build_prompt(company: &str) -> String {
    format!(
        r#"Search for the email address of the company named "{company}" using Google Search.
Provide the email address.
If you find an email, output it within a <final_answer> tag. For example: <final_answer>contact@example.com</final_answer>
If you cannot find a definitive email, output <final_answer>Not Found</final_answer>.
Output ONLY the content for the <final_answer> tag.
"#
    )
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a model reply. An email answer wins over a `Not Found` marker.
pub fn parse_answer(text: &str) -> ParsedAnswer {
    if let Some(caps) = EMAIL_ANSWER_RE.captures(text) {
        return ParsedAnswer::Found(caps[1].trim().to_string());
    }

    if NOT_FOUND_RE.is_match(text) {
        return ParsedAnswer::NotFound;
    }

    ParsedAnswer::Malformed(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_email_answer() {
        assert_eq!(
            parse_answer("<final_answer>a@b.co</final_answer>"),
            ParsedAnswer::Found("a@b.co".into())
        );
    }

    #[test]
    fn trims_whitespace_inside_tag() {
        let text = "Here you go:\n<final_answer>\n  sales@acme-corp.com \n</final_answer>\n";
        assert_eq!(
            parse_answer(text),
            ParsedAnswer::Found("sales@acme-corp.com".into())
        );
    }

    #[test]
    fn first_email_answer_wins() {
        let text = "<final_answer>first@one.com</final_answer> <final_answer>second@two.com</final_answer>";
        assert_eq!(parse_answer(text), ParsedAnswer::Found("first@one.com".into()));
    }

    #[test]
    fn not_found_marker() {
        assert_eq!(
            parse_answer("<final_answer>Not Found</final_answer>"),
            ParsedAnswer::NotFound
        );
    }

    #[test]
    fn not_found_is_case_and_space_tolerant() {
        assert_eq!(
            parse_answer("<final_answer>  not   FOUND\n</final_answer>"),
            ParsedAnswer::NotFound
        );
    }

    #[test]
    fn email_beats_not_found() {
        let text = "<final_answer>Not Found</final_answer><final_answer>x@y.org</final_answer>";
        assert_eq!(parse_answer(text), ParsedAnswer::Found("x@y.org".into()));
    }

    #[test]
    fn untagged_email_is_malformed() {
        let text = "The contact email is info@acme.com";
        assert_eq!(parse_answer(text), ParsedAnswer::Malformed(text.into()));
    }

    #[test]
    fn short_tld_is_malformed() {
        let text = "<final_answer>info@acme.c</final_answer>";
        assert!(matches!(parse_answer(text), ParsedAnswer::Malformed(_)));
    }

    #[test]
    fn free_text_in_tag_is_malformed() {
        let text = "<final_answer>Try their contact form</final_answer>";
        assert!(matches!(parse_answer(text), ParsedAnswer::Malformed(_)));
    }

    #[test]
    fn prompt_mentions_company_and_protocol() {
        let prompt = build_prompt("TestCorp");
        assert!(prompt.contains(r#""TestCorp""#));
        assert!(prompt.contains("Google Search"));
        assert!(prompt.contains("<final_answer>Not Found</final_answer>"));
    }
}
