//! Decode → encode driver
//!
//! The loop decodes one code point and immediately encodes it. When the
//! decoder runs out of buffered input, pending output is flushed and the
//! reader refilled; the run ends after the input reports end of stream and
//! a final flush.

use std::io;

use serde::Serialize;
use tracing::debug;

use crate::{
    Decoder, Encoder, Encoding, ErrorMode, Options, Reader, Refill, Result, Writer,
    reader::{DEFAULT_CHUNK_SIZE, check_chunk_size},
};

/// Counters collected over one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Bytes pulled from the input stream
    pub bytes_read: u64,
    /// Bytes written to the output stream
    pub bytes_written: u64,
    /// Code points passed from decoder to encoder
    pub code_points: u64,
    /// Malformed bytes handled by the error policy
    pub recovered_errors: u64,
    /// Successful reader refills
    pub refills: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Done,
}

/// Run the pipeline until the input ends or a fatal error occurs.
///
/// A [`crate::Error::Decode`] under [`ErrorMode::Raise`] returns immediately;
/// output encoded since the last flush stays in `writer` unflushed.
pub fn transcode<R: io::Read, W: io::Write>(
    reader: &mut Reader<R>,
    decoder: &mut Decoder,
    encoder: &Encoder,
    writer: &mut Writer<W>,
) -> Result<ConversionStats> {
    let mut stats = ConversionStats::default();
    let mut state = State::Running;

    while state == State::Running {
        if let Some(code_point) = decoder.decode_one(reader)? {
            encoder.encode_one(code_point, writer);
            stats.code_points += 1;
            continue;
        }

        writer.flush()?;
        match reader.fill()? {
            Refill::Filled(_) => stats.refills += 1,
            Refill::EndOfStream => {
                writer.flush()?;
                state = State::Done;
            }
        }
    }

    stats.bytes_read = reader.bytes_read();
    stats.bytes_written = writer.bytes_written();
    stats.recovered_errors = decoder.recovered();

    let abandoned = reader.pending();
    if abandoned > 0 {
        debug!(bytes = abandoned, "dropped truncated sequence at end of input");
    }
    debug!(
        from = decoder.encoding().name(),
        to = encoder.encoding().name(),
        code_points = stats.code_points,
        bytes_read = stats.bytes_read,
        bytes_written = stats.bytes_written,
        "conversion finished"
    );

    Ok(stats)
}

/// Converter between two encodings with a fixed error mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    from: Encoding,
    to: Encoding,
    mode: ErrorMode,
    chunk_size: usize,
}

impl Converter {
    /// Create a converter using [`ErrorMode::Latin1`] and 4 KiB refills
    pub fn new(from: Encoding, to: Encoding) -> Self {
        Self {
            from,
            to,
            mode: ErrorMode::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a converter from run options
    pub fn from_options(options: &Options) -> Result<Self> {
        Self::new(options.source_encoding, options.target_encoding)
            .with_mode(options.error_mode)
            .with_chunk_size(options.chunk_size)
    }

    /// Set the policy for malformed input
    pub fn with_mode(mut self, mode: ErrorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of bytes requested per refill.
    ///
    /// Sizes outside `1..=MAX_CHUNK_SIZE` are rejected.
    ///
    /// [`MAX_CHUNK_SIZE`]: crate::reader::MAX_CHUNK_SIZE
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        self.chunk_size = check_chunk_size(chunk_size)?;
        Ok(self)
    }

    /// Get source encoding
    pub fn from_encoding(&self) -> Encoding {
        self.from
    }

    /// Get target encoding
    pub fn to_encoding(&self) -> Encoding {
        self.to
    }

    /// Get error mode
    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Convert `input` into `output`.
    ///
    /// Both streams are owned for the duration of the run and dropped on
    /// return, whether the run succeeded or not. Pass `&mut` references to
    /// keep using them afterwards.
    pub fn convert<R: io::Read, W: io::Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<ConversionStats> {
        debug!(
            from = self.from.name(),
            to = self.to.name(),
            mode = self.mode.name(),
            chunk_size = self.chunk_size,
            "starting conversion"
        );

        let mut reader = Reader::with_chunk_size(input, self.chunk_size)?;
        let mut writer = Writer::new(output);
        let mut decoder = Decoder::new(self.from, self.mode);
        let encoder = Encoder::new(self.to);

        transcode(&mut reader, &mut decoder, &encoder, &mut writer)
    }
}
