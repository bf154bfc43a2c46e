//! # utf-transcode - Streaming Unicode Transfer-Encoding Converter
//!
//! Converts byte streams between UTF-8, UTF-16LE/BE and UTF-32LE/BE in a
//! single sequential pass with bounded memory.
//!
//! ## Features
//!
//! - **Streaming**: input is pulled in fixed-size chunks, output is flushed
//!   whenever the input buffer runs dry
//! - **Chunk-boundary safe**: multi-byte sequences may straddle refills
//! - **Configurable recovery** for malformed input (`latin1`, `ignore`,
//!   `raise`, `replace`)
//!
//! ## Quick Start
//!
//! ```rust
//! use utf_transcode::{Converter, Encoding, ErrorMode};
//!
//! let input: &[u8] = "héllo 🌍".as_bytes();
//! let mut output = Vec::new();
//!
//! let stats = Converter::new(Encoding::UTF8, Encoding::UTF16LE)
//!     .with_mode(ErrorMode::Replace)
//!     .convert(input, &mut output)
//!     .unwrap();
//!
//! assert_eq!(stats.code_points, 7);
//! assert_eq!(&output[..4], &[b'h', 0x00, 0xE9, 0x00]);
//! ```

#![deny(missing_docs)]

use std::{fmt, io, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod decode;
pub mod encode;
pub mod mode;
pub mod options;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use decode::Decoder;
pub use encode::Encoder;
pub use mode::ErrorMode;
pub use options::Options;
pub use pipeline::{ConversionStats, Converter, transcode};
pub use reader::{BufferExhausted, Reader, Refill};
pub use writer::Writer;

/// A Unicode scalar value (or, for lenient decoders, any 32-bit unit) passed
/// from a decoder to an encoder.
pub type CodePoint = u32;

/// The replacement character emitted by [`ErrorMode::Replace`].
pub const REPLACEMENT_CHARACTER: CodePoint = 0xFFFD;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion
#[derive(Debug)]
pub enum Error {
    /// Malformed input under [`ErrorMode::Raise`]
    Decode {
        /// Source encoding being decoded
        encoding: Encoding,
        /// First byte of the malformed sequence
        byte: u8,
        /// Offset of that byte from the start of the input stream
        position: u64,
    },
    /// Failure in the underlying input or output stream
    Io(io::Error),
    /// Encoding name not recognised
    UnknownEncoding(String),
    /// Error mode name not recognised
    UnknownErrorMode(String),
    /// Reader chunk size must lie between one byte and 16 MiB
    InvalidChunkSize(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode {
                encoding,
                byte,
                position,
            } => {
                write!(
                    f,
                    "Malformed {} input: byte 0x{:02X} at position {}",
                    encoding.name(),
                    byte,
                    position
                )
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::UnknownEncoding(name) => write!(f, "Unknown encoding: {}", name),
            Error::UnknownErrorMode(name) => write!(f, "Unknown error mode: {}", name),
            Error::InvalidChunkSize(size) => {
                write!(
                    f,
                    "Invalid chunk size {}: must be between 1 and {}",
                    size,
                    reader::MAX_CHUNK_SIZE
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Byte order of a multi-byte code unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Least-significant byte first
    Little,
    /// Most-significant byte first
    Big,
}

/// Supported transfer encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// UTF-8 (variable length, 1-4 bytes)
    #[serde(rename = "utf-8")]
    UTF8,
    /// UTF-16 little endian
    #[serde(rename = "utf-16le")]
    UTF16LE,
    /// UTF-16 big endian
    #[serde(rename = "utf-16be")]
    UTF16BE,
    /// UTF-32 little endian
    #[serde(rename = "utf-32le")]
    UTF32LE,
    /// UTF-32 big endian
    #[serde(rename = "utf-32be")]
    UTF32BE,
}

impl Encoding {
    /// Every supported encoding, in display order
    pub const ALL: [Encoding; 5] = [
        Encoding::UTF8,
        Encoding::UTF16LE,
        Encoding::UTF16BE,
        Encoding::UTF32LE,
        Encoding::UTF32BE,
    ];

    /// Get the canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::UTF8 => "UTF-8",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::UTF16BE => "UTF-16BE",
            Encoding::UTF32LE => "UTF-32LE",
            Encoding::UTF32BE => "UTF-32BE",
        }
    }

    /// Size in bytes of one code unit
    pub fn unit_width(self) -> usize {
        match self {
            Encoding::UTF8 => 1,
            Encoding::UTF16LE | Encoding::UTF16BE => 2,
            Encoding::UTF32LE | Encoding::UTF32BE => 4,
        }
    }

    /// Byte order of the code units, `None` for byte-oriented UTF-8
    pub fn endianness(self) -> Option<Endianness> {
        match self {
            Encoding::UTF8 => None,
            Encoding::UTF16LE | Encoding::UTF32LE => Some(Endianness::Little),
            Encoding::UTF16BE | Encoding::UTF32BE => Some(Endianness::Big),
        }
    }

    /// Short human-readable description
    pub fn description(self) -> &'static str {
        match self {
            Encoding::UTF8 => "Unicode Transformation Format 8-bit, variable-length encoding",
            Encoding::UTF16LE => "Unicode Transformation Format 16-bit, little-endian",
            Encoding::UTF16BE => "Unicode Transformation Format 16-bit, big-endian",
            Encoding::UTF32LE => "Unicode Transformation Format 32-bit, little-endian",
            Encoding::UTF32BE => "Unicode Transformation Format 32-bit, big-endian",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let encoding = match s.to_uppercase().replace('_', "-").as_str() {
            "UTF8" | "UTF-8" => Encoding::UTF8,
            "UTF16LE" | "UTF-16LE" => Encoding::UTF16LE,
            "UTF16BE" | "UTF-16BE" => Encoding::UTF16BE,
            "UTF32LE" | "UTF-32LE" => Encoding::UTF32LE,
            "UTF32BE" | "UTF-32BE" => Encoding::UTF32BE,
            _ => return Err(Error::UnknownEncoding(s.to_string())),
        };
        Ok(encoding)
    }
}

#[cfg(test)]
mod tests;
