//! Recovery policy for malformed input

use std::{fmt, io, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CodePoint, Encoding, Error, REPLACEMENT_CHARACTER, Reader, Result};

/// How a decoder reacts to a malformed byte sequence.
///
/// Every mode consumes exactly one byte at the start of the offending
/// sequence; they differ only in what, if anything, is emitted for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Emit the byte's value as a code point (U+0000..U+00FF)
    #[default]
    Latin1,
    /// Emit nothing and continue with the next byte
    Ignore,
    /// Stop the conversion with [`Error::Decode`]
    Raise,
    /// Emit U+FFFD
    Replace,
}

impl ErrorMode {
    /// Every mode, in display order
    pub const ALL: [ErrorMode; 4] = [
        ErrorMode::Latin1,
        ErrorMode::Ignore,
        ErrorMode::Raise,
        ErrorMode::Replace,
    ];

    /// Lower-case name as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            ErrorMode::Latin1 => "latin1",
            ErrorMode::Ignore => "ignore",
            ErrorMode::Raise => "raise",
            ErrorMode::Replace => "replace",
        }
    }

    /// Apply the policy to the byte under the reader's cursor.
    ///
    /// Consumes one byte. `Ok(None)` means the byte was dropped and the
    /// caller should try decoding again at the new position. With nothing
    /// buffered under the cursor there is no byte to judge: the reader is
    /// left as is and `Ok(None)` is returned, whatever the mode.
    pub fn recover<R: io::Read>(
        self,
        reader: &mut Reader<R>,
        encoding: Encoding,
    ) -> Result<Option<CodePoint>> {
        let position = reader.position();
        let Ok(byte) = reader.peek_byte(0) else {
            return Ok(None);
        };
        reader.advance_bytes(1);

        trace!(
            encoding = encoding.name(),
            byte,
            position,
            mode = self.name(),
            "malformed input"
        );

        match self {
            ErrorMode::Latin1 => Ok(Some(CodePoint::from(byte))),
            ErrorMode::Ignore => Ok(None),
            ErrorMode::Raise => Err(Error::Decode {
                encoding,
                byte,
                position,
            }),
            ErrorMode::Replace => Ok(Some(REPLACEMENT_CHARACTER)),
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "latin1" | "latin-1" => Ok(ErrorMode::Latin1),
            "ignore" => Ok(ErrorMode::Ignore),
            "raise" | "strict" => Ok(ErrorMode::Raise),
            "replace" => Ok(ErrorMode::Replace),
            _ => Err(Error::UnknownErrorMode(s.to_string())),
        }
    }
}
