
use crate::{CodePoint, Converter, Encoder, Encoding, ErrorMode, Writer};

/// Encode `code_points` with `encoding` into a byte vector.
pub(crate) fn encode_all(encoding: Encoding, code_points: &[CodePoint]) -> Vec<u8> {
    let encoder = Encoder::new(encoding);
    let mut writer = Writer::new(Vec::new());
    for &c in code_points {
        encoder.encode_one(c, &mut writer);
    }
    writer.flush().unwrap();
    writer.into_inner()
}

/// Run a full conversion over an in-memory input.
pub(crate) fn convert(
    from: Encoding,
    to: Encoding,
    mode: ErrorMode,
    chunk_size: usize,
    input: &[u8],
) -> crate::Result<Vec<u8>> {
    let mut output = Vec::new();
    Converter::new(from, to)
        .with_mode(mode)
        .with_chunk_size(chunk_size)?
        .convert(input, &mut output)?;
    Ok(output)
}

/// Fold an arbitrary integer onto a Unicode scalar value.
pub(crate) fn scalar(raw: u32) -> CodePoint {
    let c = raw % 0x11_0000;
    if (0xD800..=0xDFFF).contains(&c) {
        c - 0x800
    } else {
        c
    }
}
