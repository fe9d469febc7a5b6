//! Encoding-tolerant input reading.
//!
//! Spreadsheet exports arrive in whatever encoding the exporting machine
//! used. Each candidate encoding is tried in order against the whole file and
//! the first one that decodes it without error is adopted.

use std::path::Path;
use std::str::FromStr;

use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::{debug, info};

use contactscout_shared::{ContactScoutError, Result};

/// A text encoding the reader knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// The default order: strict UTF-8 first, then the single-byte fallbacks.
    pub const DEFAULT_ORDER: [TextEncoding; 3] = [Self::Utf8, Self::Latin1, Self::Windows1252];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin1",
            Self::Windows1252 => "cp1252",
        }
    }

    /// Decode all of `bytes`, or `None` if any byte sequence is invalid.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| {
                    text.strip_prefix('\u{feff}')
                        .map(str::to_string)
                        .unwrap_or_else(|| text.into_owned())
                }),
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes).into_owned()),
            Self::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }

    /// Parse a list of labels, failing on the first unknown one.
    pub fn parse_list<S: AsRef<str>>(labels: &[S]) -> Result<Vec<Self>> {
        labels.iter().map(|l| l.as_ref().parse()).collect()
    }
}

impl FromStr for TextEncoding {
    type Err = ContactScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
            "cp1252" | "windows-1252" | "windows1252" => Ok(Self::Windows1252),
            other => Err(ContactScoutError::validation(format!(
                "unsupported encoding '{other}': expected utf-8, latin1, or cp1252"
            ))),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File contents decoded to text.
#[derive(Debug, Clone)]
pub struct DecodedInput {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Try each encoding in turn; the first full decode wins.
pub fn decode_bytes(bytes: &[u8], encodings: &[TextEncoding]) -> Option<(String, TextEncoding)> {
    encodings.iter().find_map(|encoding| match encoding.decode(bytes) {
        Some(text) => Some((text, *encoding)),
        None => {
            debug!(%encoding, "encoding failed");
            None
        }
    })
}

/// Read and decode `path`.
///
/// Fails with [`ContactScoutError::InputNotFound`] for a missing file and
/// [`ContactScoutError::Decode`] when no encoding fits.
pub fn read_input(path: &Path, encodings: &[TextEncoding]) -> Result<DecodedInput> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ContactScoutError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => ContactScoutError::io(path, e),
    })?;

    let (text, encoding) =
        decode_bytes(&bytes, encodings).ok_or_else(|| ContactScoutError::Decode {
            path: path.to_path_buf(),
            tried: encodings.iter().map(|e| e.as_str().to_string()).collect(),
        })?;

    info!(path = %path.display(), %encoding, bytes = bytes.len(), "input decoded");

    Ok(DecodedInput { text, encoding })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_tried_first() {
        let (text, encoding) =
            decode_bytes("Zoë,Ltd".as_bytes(), &TextEncoding::DEFAULT_ORDER).unwrap();
        assert_eq!(text, "Zoë,Ltd");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        let (text, encoding) =
            decode_bytes(b"Caf\xe9", &TextEncoding::DEFAULT_ORDER).unwrap();
        assert_eq!(text, "Café");
        assert_eq!(encoding, TextEncoding::Latin1);
    }

    #[test]
    fn cp1252_used_when_listed_before_latin1() {
        let order = [TextEncoding::Utf8, TextEncoding::Windows1252];
        let (text, encoding) = decode_bytes(b"\x93Acme\x94", &order).unwrap();
        assert_eq!(text, "\u{201c}Acme\u{201d}");
        assert_eq!(encoding, TextEncoding::Windows1252);
    }

    #[test]
    fn utf8_only_rejects_latin1_bytes() {
        assert!(decode_bytes(b"Caf\xe9", &[TextEncoding::Utf8]).is_none());
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let (text, _) =
            decode_bytes(b"\xef\xbb\xbfCompany\nAcme\n", &[TextEncoding::Utf8]).unwrap();
        assert!(text.starts_with("Company"));
    }

    #[test]
    fn parse_labels() {
        let parsed = TextEncoding::parse_list(&["UTF-8", "latin-1", "windows-1252"]).unwrap();
        assert_eq!(parsed, TextEncoding::DEFAULT_ORDER.to_vec());
        assert!("shift_jis".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let err = read_input(
            Path::new("/definitely/not/here.csv"),
            &TextEncoding::DEFAULT_ORDER,
        )
        .unwrap_err();
        assert!(matches!(err, ContactScoutError::InputNotFound { .. }));
    }

    #[test]
    fn latin1_fixture_decodes() {
        let decoded = read_input(
            Path::new("../../../fixtures/csv/latin1.csv"),
            &TextEncoding::DEFAULT_ORDER,
        )
        .unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Latin1);
        assert!(decoded.text.contains("Café Müller GmbH"));
    }
}
