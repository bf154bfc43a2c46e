//! Pending output buffer flushed on demand

use std::io;

use tracing::debug;

use crate::Endianness;

/// Output buffer that only touches the underlying stream on [`flush`].
///
/// Unlike [`io::BufWriter`], dropping a `Writer` does not flush: bytes still
/// pending when a conversion is aborted are discarded.
///
/// [`flush`]: Writer::flush
#[derive(Debug)]
pub struct Writer<W> {
    buffer: Vec<u8>,
    inner: W,
    bytes_written: u64,
}

impl<W: io::Write> Writer<W> {
    /// Create a writer with an empty pending buffer
    pub fn new(inner: W) -> Self {
        Self {
            buffer: Vec::new(),
            inner,
            bytes_written: 0,
        }
    }

    /// Append one byte
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Append a 16-bit unit in the given byte order
    #[inline]
    pub fn write_word(&mut self, word: u16, endianness: Endianness) {
        match endianness {
            Endianness::Little => self.buffer.extend_from_slice(&word.to_le_bytes()),
            Endianness::Big => self.buffer.extend_from_slice(&word.to_be_bytes()),
        }
    }

    /// Append a 32-bit unit in the given byte order
    #[inline]
    pub fn write_dword(&mut self, dword: u32, endianness: Endianness) {
        match endianness {
            Endianness::Little => self.buffer.extend_from_slice(&dword.to_le_bytes()),
            Endianness::Big => self.buffer.extend_from_slice(&dword.to_be_bytes()),
        }
    }

    /// Write the whole pending buffer to the underlying stream and clear it.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.inner.write_all(&self.buffer)?;
        self.inner.flush()?;
        self.bytes_written += self.buffer.len() as u64;
        debug!(bytes = self.buffer.len(), "flushed output buffer");
        self.buffer.clear();
        Ok(())
    }

    /// Returns a reference to the unwritten buffered data.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Total bytes handed to the underlying stream
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the underlying writer, discarding unflushed bytes.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_stay_in_memory_until_flush() {
        let mut writer = Writer::new(Vec::new());
        writer.write_byte(0x41);
        writer.write_word(0x1234, Endianness::Little);
        writer.write_word(0x1234, Endianness::Big);
        writer.write_dword(0x0001_F600, Endianness::Little);
        writer.write_dword(0x0001_F600, Endianness::Big);

        assert!(writer.get_ref().is_empty());
        assert_eq!(
            writer.pending(),
            &[0x41, 0x34, 0x12, 0x12, 0x34, 0x00, 0xF6, 0x01, 0x00, 0x00, 0x01, 0xF6, 0x00]
        );

        writer.flush().unwrap();
        assert!(writer.pending().is_empty());
        assert_eq!(writer.get_ref().len(), 13);
        assert_eq!(writer.bytes_written(), 13);
    }

    #[test]
    fn test_flush_issues_a_single_write() {
        #[derive(Default)]
        struct Recorder {
            writes: Vec<Vec<u8>>,
        }

        impl io::Write for Recorder {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.writes.push(buf.to_vec());
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = Writer::new(Recorder::default());
        for b in b"hello" {
            writer.write_byte(*b);
        }
        writer.flush().unwrap();
        // empty flushes do not reach the stream
        writer.flush().unwrap();

        assert_eq!(writer.get_ref().writes, vec![b"hello".to_vec()]);
    }

    #[test]
    fn test_drop_discards_pending_bytes() {
        let mut sink = Vec::new();
        {
            let mut writer = Writer::new(&mut sink);
            writer.write_byte(b'x');
            writer.flush().unwrap();
            writer.write_byte(b'y');
        }
        assert_eq!(sink, b"x");
    }

    #[test]
    fn test_write_error_propagates() {
        let mut buf = [0u8; 1];
        let mut writer = Writer::new(&mut buf[..]);
        writer.write_word(0xFFFF, Endianness::Big);
        assert_eq!(
            writer.flush().unwrap_err().kind(),
            io::ErrorKind::WriteZero
        );
    }
}
