//! Per-encoding encoders appending code points to a [`Writer`]
//!
//! Encoders perform no validation: surrogates and out-of-range values are
//! laid out with the same bit patterns as any other code point.

use std::io;

use crate::{CodePoint, Encoding, Endianness, Writer};

/// Encoder for one target encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    encoding: Encoding,
}

impl Encoder {
    /// Create an encoder for `encoding`
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Target encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Append the byte sequence for `code_point` to the writer's buffer
    pub fn encode_one<W: io::Write>(&self, code_point: CodePoint, writer: &mut Writer<W>) {
        match self.encoding {
            Encoding::UTF8 => encode_utf8(code_point, writer),
            Encoding::UTF16LE => encode_utf16(code_point, writer, Endianness::Little),
            Encoding::UTF16BE => encode_utf16(code_point, writer, Endianness::Big),
            Encoding::UTF32LE => writer.write_dword(code_point, Endianness::Little),
            Encoding::UTF32BE => writer.write_dword(code_point, Endianness::Big),
        }
    }
}

fn encode_utf8<W: io::Write>(c: CodePoint, writer: &mut Writer<W>) {
    if c <= 0x7F {
        // 0xxxxxxx
        writer.write_byte(c as u8);
    } else if c <= 0x7FF {
        // 110yyyyy 10xxxxxx
        writer.write_byte((c >> 6) as u8 | 0xC0);
        writer.write_byte((c & 0x3F) as u8 | 0x80);
    } else if c <= 0xFFFF {
        // 1110zzzz 10yyyyyy 10xxxxxx
        writer.write_byte((c >> 12) as u8 | 0xE0);
        writer.write_byte((c >> 6 & 0x3F) as u8 | 0x80);
        writer.write_byte((c & 0x3F) as u8 | 0x80);
    } else {
        // 11110jjj 10zzzzzz 10yyyyyy 10xxxxxx
        writer.write_byte((c >> 18) as u8 | 0xF0);
        writer.write_byte((c >> 12 & 0x3F) as u8 | 0x80);
        writer.write_byte((c >> 6 & 0x3F) as u8 | 0x80);
        writer.write_byte((c & 0x3F) as u8 | 0x80);
    }
}

fn encode_utf16<W: io::Write>(c: CodePoint, writer: &mut Writer<W>, endianness: Endianness) {
    if c <= 0xFFFF {
        writer.write_word(c as u16, endianness);
    } else {
        let delta = c - 0x10000;
        writer.write_word((delta >> 10) as u16 | 0xD800, endianness);
        writer.write_word((delta & 0x3FF) as u16 | 0xDC00, endianness);
    }
}
