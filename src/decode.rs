//! Per-encoding decoders turning buffered bytes into code points
//!
//! A [`Decoder`] never consumes a partial sequence: it peeks every byte it
//! needs first and only advances the reader once the sequence is complete,
//! so running out of buffered input leaves the reader where it was.

use std::io;

use crate::{
    BufferExhausted, CodePoint, Encoding, Endianness, Error, ErrorMode, Reader, Result,
};

/// Why a single decoding attempt stopped without a code point
enum Halt {
    Exhausted,
    Failed(Error),
}

impl From<BufferExhausted> for Halt {
    fn from(_: BufferExhausted) -> Self {
        Halt::Exhausted
    }
}

impl From<Error> for Halt {
    fn from(e: Error) -> Self {
        Halt::Failed(e)
    }
}

/// Result of one decoding attempt: a code point, or `None` when the error
/// policy dropped a byte and decoding must resume at the next position.
type Attempt = std::result::Result<Option<CodePoint>, Halt>;

/// Stateless decoder for one source encoding under one error mode.
#[derive(Debug, Clone)]
pub struct Decoder {
    encoding: Encoding,
    mode: ErrorMode,
    recovered: u64,
}

impl Decoder {
    /// Create a decoder for `encoding` that applies `mode` to malformed input
    pub fn new(encoding: Encoding, mode: ErrorMode) -> Self {
        Self {
            encoding,
            mode,
            recovered: 0,
        }
    }

    /// Source encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Error mode
    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Number of malformed bytes handed to the error policy so far
    pub fn recovered(&self) -> u64 {
        self.recovered
    }

    /// Decode exactly one code point at the reader's cursor.
    ///
    /// Returns `Ok(None)` when the buffered input ends before a whole
    /// sequence is available; the reader must be refilled before calling
    /// again. Bytes dropped under [`ErrorMode::Ignore`] are skipped
    /// internally and never surface as `None`.
    pub fn decode_one<R: io::Read>(
        &mut self,
        reader: &mut Reader<R>,
    ) -> Result<Option<CodePoint>> {
        loop {
            let attempt = match self.encoding {
                Encoding::UTF8 => self.try_utf8(reader),
                Encoding::UTF16LE => self.try_utf16(reader, Endianness::Little),
                Encoding::UTF16BE => self.try_utf16(reader, Endianness::Big),
                Encoding::UTF32LE => Self::try_utf32(reader, Endianness::Little),
                Encoding::UTF32BE => Self::try_utf32(reader, Endianness::Big),
            };
            match attempt {
                Ok(Some(code_point)) => return Ok(Some(code_point)),
                Ok(None) => continue,
                Err(Halt::Exhausted) => return Ok(None),
                Err(Halt::Failed(e)) => return Err(e),
            }
        }
    }

    fn on_error<R: io::Read>(&mut self, reader: &mut Reader<R>) -> Attempt {
        self.recovered += 1;
        Ok(self.mode.recover(reader, self.encoding)?)
    }

    fn try_utf8<R: io::Read>(&mut self, reader: &mut Reader<R>) -> Attempt {
        let lead = reader.peek_byte(0)?;

        let (len, bits) = if lead & 0x80 == 0 {
            // 0xxxxxxx
            reader.advance_bytes(1);
            return Ok(Some(CodePoint::from(lead)));
        } else if lead & 0xE0 == 0xC0 {
            // 110xxxxx 10yyyyyy
            (2, lead & 0x1F)
        } else if lead & 0xF0 == 0xE0 {
            // 1110xxxx 10yyyyyy 10zzzzzz
            (3, lead & 0x0F)
        } else if lead & 0xF8 == 0xF0 {
            // 11110xxx 10yyyyyy 10zzzzzz 10wwwwww
            (4, lead & 0x07)
        } else {
            // 10xxxxxx or 11111xxx
            return self.on_error(reader);
        };

        let mut code_point = CodePoint::from(bits);
        for offset in 1..len {
            let byte = reader.peek_byte(offset)?;
            if byte & 0xC0 != 0x80 {
                return self.on_error(reader);
            }
            code_point = code_point << 6 | CodePoint::from(byte & 0x3F);
        }

        reader.advance_bytes(len);
        Ok(Some(code_point))
    }

    fn try_utf16<R: io::Read>(
        &mut self,
        reader: &mut Reader<R>,
        endianness: Endianness,
    ) -> Attempt {
        let first = reader.peek_word(0, endianness)?;

        if first >> 10 != 0x36 {
            // BMP unit or lone low surrogate
            reader.advance_words(1);
            return Ok(Some(CodePoint::from(first)));
        }

        let second = reader.peek_word(1, endianness)?;
        if second >> 10 != 0x37 {
            return self.on_error(reader);
        }

        reader.advance_words(2);
        let high = CodePoint::from(first & 0x3FF);
        let low = CodePoint::from(second & 0x3FF);
        Ok(Some(0x10000 + (high << 10) + low))
    }

    fn try_utf32<R: io::Read>(reader: &mut Reader<R>, endianness: Endianness) -> Attempt {
        let unit = reader.peek_dword(0, endianness)?;
        reader.advance_dwords(1);
        Ok(Some(unit))
    }
}
