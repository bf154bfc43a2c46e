//! Run configuration

use serde::{Deserialize, Serialize};

use crate::{Encoding, ErrorMode, reader::DEFAULT_CHUNK_SIZE};

/// Everything needed to set up one conversion run.
///
/// Deserializes from the same names the command line accepts:
///
/// ```rust
/// use utf_transcode::{Encoding, ErrorMode, Options};
///
/// let options: Options = serde_json::from_str(
///     r#"{ "source_encoding": "utf-16le", "target_encoding": "utf-8" }"#,
/// )
/// .unwrap();
/// assert_eq!(options.source_encoding, Encoding::UTF16LE);
/// assert_eq!(options.error_mode, ErrorMode::Latin1);
/// assert_eq!(options.chunk_size, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Encoding of the input stream
    pub source_encoding: Encoding,
    /// Encoding of the output stream
    pub target_encoding: Encoding,
    /// Policy for malformed input
    #[serde(default)]
    pub error_mode: ErrorMode,
    /// Bytes requested from the input per refill
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Options {
    /// Options with the default error mode and chunk size
    pub fn new(source_encoding: Encoding, target_encoding: Encoding) -> Self {
        Self {
            source_encoding,
            target_encoding,
            error_mode: ErrorMode::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_options_from_json() {
        let options: Options = serde_json::from_str(
            r#"{
                "source_encoding": "utf-32be",
                "target_encoding": "utf-16be",
                "error_mode": "replace",
                "chunk_size": 17
            }"#,
        )
        .unwrap();

        assert_eq!(options.source_encoding, Encoding::UTF32BE);
        assert_eq!(options.target_encoding, Encoding::UTF16BE);
        assert_eq!(options.error_mode, ErrorMode::Replace);
        assert_eq!(options.chunk_size, 17);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let parsed: Result<Options, _> = serde_json::from_str(
            r#"{ "source_encoding": "utf-8", "target_encoding": "utf-8", "error_mode": "loud" }"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_defaults_match_new() {
        let parsed: Options =
            serde_json::from_str(r#"{ "source_encoding": "utf-8", "target_encoding": "utf-32le" }"#)
                .unwrap();
        assert_eq!(parsed, Options::new(Encoding::UTF8, Encoding::UTF32LE));
    }
}
