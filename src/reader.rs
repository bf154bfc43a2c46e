//! Chunked input buffer with non-consuming lookahead
//!
//! Decoders probe multi-byte sequences through [`Reader::peek_byte`] and
//! friends, and only advance the cursor once a whole sequence has been
//! validated. When a probe runs past the buffered data the reader answers
//! [`BufferExhausted`] and the caller is expected to [`fill`](Reader::fill)
//! and retry. Bytes at or after the cursor survive the refill, so a sequence
//! split across two chunks is decoded exactly as if it had arrived at once.

use std::{fmt, io};

use tracing::debug;

use crate::{Endianness, Error, Result};

/// Default number of bytes requested from the input per refill
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Largest accepted refill size (16 MiB)
pub const MAX_CHUNK_SIZE: usize = 1 << 24;

/// Check that `chunk_size` lies within `1..=MAX_CHUNK_SIZE`.
pub(crate) fn check_chunk_size(chunk_size: usize) -> Result<usize> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(Error::InvalidChunkSize(chunk_size));
    }
    Ok(chunk_size)
}

/// Lookahead ran past the buffered input; a refill is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferExhausted;

impl fmt::Display for BufferExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input buffer exhausted")
    }
}

/// Outcome of [`Reader::fill`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refill {
    /// This many new bytes were appended to the buffer
    Filled(usize),
    /// The input yielded no further bytes
    EndOfStream,
}

/// Buffered byte source with cursor-relative lookahead
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    buffer: Vec<u8>,
    cursor: usize,
    chunk_size: usize,
    /// Bytes dropped from the front of `buffer` by previous refills
    discarded: u64,
    bytes_read: u64,
}

impl<R: io::Read> Reader<R> {
    /// Create a reader pulling [`DEFAULT_CHUNK_SIZE`] bytes per refill
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            cursor: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            discarded: 0,
            bytes_read: 0,
        }
    }

    /// Create a reader with a custom refill size
    pub fn with_chunk_size(inner: R, chunk_size: usize) -> Result<Self> {
        Ok(Self {
            chunk_size: check_chunk_size(chunk_size)?,
            ..Self::new(inner)
        })
    }

    /// Byte at `cursor + offset`, without consuming it
    #[inline]
    pub fn peek_byte(&self, offset: usize) -> std::result::Result<u8, BufferExhausted> {
        self.cursor
            .checked_add(offset)
            .and_then(|idx| self.buffer.get(idx))
            .copied()
            .ok_or(BufferExhausted)
    }

    /// 16-bit unit made of bytes `offset * 2` and `offset * 2 + 1`
    #[inline]
    pub fn peek_word(
        &self,
        offset: usize,
        endianness: Endianness,
    ) -> std::result::Result<u16, BufferExhausted> {
        let bytes = [self.peek_byte(offset * 2)?, self.peek_byte(offset * 2 + 1)?];
        Ok(match endianness {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }

    /// 32-bit unit made of bytes `offset * 4 .. offset * 4 + 4`
    #[inline]
    pub fn peek_dword(
        &self,
        offset: usize,
        endianness: Endianness,
    ) -> std::result::Result<u32, BufferExhausted> {
        let base = offset * 4;
        let bytes = [
            self.peek_byte(base)?,
            self.peek_byte(base + 1)?,
            self.peek_byte(base + 2)?,
            self.peek_byte(base + 3)?,
        ];
        Ok(match endianness {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Move the cursor forward; bounds are checked by the next peek.
    #[inline]
    pub fn advance_bytes(&mut self, n: usize) {
        self.cursor += n;
    }

    /// Move the cursor forward by `n` 16-bit units
    #[inline]
    pub fn advance_words(&mut self, n: usize) {
        self.advance_bytes(n * 2);
    }

    /// Move the cursor forward by `n` 32-bit units
    #[inline]
    pub fn advance_dwords(&mut self, n: usize) {
        self.advance_bytes(n * 4);
    }

    /// Pull up to one chunk from the input, keeping the unconsumed suffix.
    ///
    /// The cursor is reset to the start of the retained bytes. Returns
    /// [`Refill::EndOfStream`] once the input reports EOF, in which case no
    /// unconsumed byte is lost.
    pub fn fill(&mut self) -> Result<Refill> {
        let consumed = self.cursor.min(self.buffer.len());
        self.buffer.drain(..consumed);
        self.discarded += consumed as u64;
        self.cursor = 0;

        // read straight into the tail of the buffer; its capacity is reused
        let kept = self.buffer.len();
        self.buffer.resize(kept + self.chunk_size, 0);

        let n = loop {
            match self.inner.read(&mut self.buffer[kept..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buffer.truncate(kept);
                    return Err(Error::Io(e));
                }
            }
        };
        self.buffer.truncate(kept + n);

        if n == 0 {
            debug!(pending = kept, "input stream ended");
            return Ok(Refill::EndOfStream);
        }

        self.bytes_read += n as u64;

        debug!(read = n, retained = kept, "refilled input buffer");
        Ok(Refill::Filled(n))
    }

    /// Offset of the cursor from the start of the input stream
    pub fn position(&self) -> u64 {
        self.discarded + self.cursor as u64
    }

    /// Total bytes pulled from the input so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of buffered bytes not yet consumed
    pub fn pending(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    /// Refill size in bytes
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the underlying reader, dropping any buffered bytes.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reader_is_exhausted() {
        let mut reader = Reader::new(io::empty());
        assert_eq!(reader.peek_byte(0), Err(BufferExhausted));
        assert_eq!(reader.fill().unwrap(), Refill::EndOfStream);
        assert_eq!(reader.peek_byte(0), Err(BufferExhausted));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = Reader::new(&[0x41u8, 0x42, 0x43][..]);
        assert_eq!(reader.fill().unwrap(), Refill::Filled(3));

        assert_eq!(reader.peek_byte(0), Ok(0x41));
        assert_eq!(reader.peek_byte(0), Ok(0x41));
        assert_eq!(reader.peek_byte(2), Ok(0x43));
        assert_eq!(reader.peek_byte(3), Err(BufferExhausted));

        reader.advance_bytes(1);
        assert_eq!(reader.peek_byte(0), Ok(0x42));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_peek_word_endianness() {
        let mut reader = Reader::new(&[0x12u8, 0x34, 0x56, 0x78][..]);
        reader.fill().unwrap();

        assert_eq!(reader.peek_word(0, Endianness::Little), Ok(0x3412));
        assert_eq!(reader.peek_word(0, Endianness::Big), Ok(0x1234));
        assert_eq!(reader.peek_word(1, Endianness::Little), Ok(0x7856));
        assert_eq!(reader.peek_word(2, Endianness::Big), Err(BufferExhausted));

        assert_eq!(reader.peek_dword(0, Endianness::Little), Ok(0x7856_3412));
        assert_eq!(reader.peek_dword(0, Endianness::Big), Ok(0x1234_5678));

        reader.advance_words(1);
        assert_eq!(reader.peek_word(0, Endianness::Big), Ok(0x5678));
    }

    #[test]
    fn test_partial_word_is_exhausted() {
        let mut reader = Reader::new(&[0x12u8, 0x34, 0x56][..]);
        reader.fill().unwrap();
        reader.advance_words(1);

        // one byte of the next unit is buffered, the other is not
        assert_eq!(reader.peek_byte(0), Ok(0x56));
        assert_eq!(reader.peek_word(0, Endianness::Little), Err(BufferExhausted));
        assert_eq!(reader.peek_dword(0, Endianness::Little), Err(BufferExhausted));
    }

    #[test]
    fn test_fill_keeps_unconsumed_suffix() {
        let mut reader = Reader::with_chunk_size(&[1u8, 2, 3, 4, 5][..], 2).unwrap();

        assert_eq!(reader.fill().unwrap(), Refill::Filled(2));
        reader.advance_bytes(1);
        assert_eq!(reader.peek_byte(1), Err(BufferExhausted));

        assert_eq!(reader.fill().unwrap(), Refill::Filled(2));
        assert_eq!(reader.pending(), 3);
        assert_eq!(reader.peek_byte(0), Ok(2));
        assert_eq!(reader.peek_byte(1), Ok(3));
        assert_eq!(reader.peek_byte(2), Ok(4));
        assert_eq!(reader.position(), 1);

        reader.advance_bytes(3);
        assert_eq!(reader.fill().unwrap(), Refill::Filled(1));
        assert_eq!(reader.peek_byte(0), Ok(5));
        assert_eq!(reader.position(), 4);

        reader.advance_bytes(1);
        assert_eq!(reader.fill().unwrap(), Refill::EndOfStream);
        assert_eq!(reader.bytes_read(), 5);
    }

    #[test]
    fn test_word_straddles_refill() {
        let mut reader = Reader::with_chunk_size(&[0x00u8, 0xD8, 0x00, 0xDC][..], 3).unwrap();
        reader.fill().unwrap();
        assert_eq!(reader.peek_word(0, Endianness::Little), Ok(0xD800));
        assert_eq!(reader.peek_word(1, Endianness::Little), Err(BufferExhausted));

        reader.fill().unwrap();
        assert_eq!(reader.peek_word(1, Endianness::Little), Ok(0xDC00));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        match Reader::with_chunk_size(io::empty(), 0) {
            Err(Error::InvalidChunkSize(0)) => {}
            other => panic!("unexpected result: {:?}", other.map(|r| r.chunk_size())),
        }
    }

    #[test]
    fn test_oversized_chunk_size_rejected() {
        assert!(Reader::with_chunk_size(io::empty(), MAX_CHUNK_SIZE).is_ok());
        for size in [MAX_CHUNK_SIZE + 1, usize::MAX] {
            match Reader::with_chunk_size(io::empty(), size) {
                Err(Error::InvalidChunkSize(s)) => assert_eq!(s, size),
                other => panic!("unexpected result: {:?}", other.map(|r| r.chunk_size())),
            }
        }
    }

    #[test]
    fn test_fill_reuses_buffer_allocation() {
        let data = [0x61u8; 64];
        let mut reader = Reader::with_chunk_size(&data[..], 8).unwrap();
        reader.fill().unwrap();
        reader.advance_bytes(8);
        let capacity = reader.buffer.capacity();

        while let Refill::Filled(_) = reader.fill().unwrap() {
            assert_eq!(reader.buffer.len(), 8);
            assert_eq!(reader.buffer.capacity(), capacity);
            reader.advance_bytes(8);
        }
        assert_eq!(reader.bytes_read(), 64);
        assert_eq!(reader.position(), 64);
    }

    #[test]
    fn test_failed_read_keeps_pending_bytes() {
        struct FailSecond(bool);

        impl io::Read for FailSecond {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 {
                    return Err(io::Error::other("gone"));
                }
                self.0 = true;
                buf[..2].copy_from_slice(b"hi");
                Ok(2)
            }
        }

        let mut reader = Reader::new(FailSecond(false));
        reader.fill().unwrap();
        reader.advance_bytes(1);
        assert!(matches!(reader.fill(), Err(Error::Io(_))));
        assert_eq!(reader.pending(), 1);
        assert_eq!(reader.peek_byte(0), Ok(b'i'));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        struct Flaky {
            interrupted: bool,
            data: &'static [u8],
        }

        impl io::Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::ErrorKind::Interrupted.into());
                }
                self.data.read(buf)
            }
        }

        let mut reader = Reader::new(Flaky {
            interrupted: false,
            data: b"ok",
        });
        assert_eq!(reader.fill().unwrap(), Refill::Filled(2));
        assert_eq!(reader.peek_byte(1), Ok(b'k'));
    }

    #[test]
    fn test_read_error_propagates() {
        struct Broken;

        impl io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let mut reader = Reader::new(Broken);
        assert!(matches!(reader.fill(), Err(Error::Io(_))));
    }
}
