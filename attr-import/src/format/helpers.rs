//! Helper functions for reading binary data

use std::io::{self, Read};

use glam::Vec4;

use crate::error::FormatError;

/// Map EOF to [`FormatError::Truncated`], keep other IO errors
fn eof_as_truncated(err: io::Error) -> FormatError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => FormatError::Truncated,
        _ => FormatError::Io(err),
    }
}

/// Read exactly `len` bytes without trusting `len` for the allocation
fn read_bytes<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(FormatError::Truncated);
    }
    Ok(buf)
}

/// Read a 32-bit little-endian signed integer
pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32, FormatError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(eof_as_truncated)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a 32-bit count that must not be negative
pub(crate) fn read_count<R: Read>(reader: &mut R, field: &'static str) -> Result<u32, FormatError> {
    let value = read_i32(reader)?;
    u32::try_from(value).map_err(|_| FormatError::NegativeLength { field, value })
}

/// Zero bytes that follow a string of `len` bytes
pub(crate) fn string_padding(len: u64) -> u64 {
    (4 - len % 4) % 4
}

/// Read a length-prefixed, 4-byte aligned UTF-8 string
///
/// Invalid UTF-8 is replaced rather than rejected; names are only used for
/// lookups and log output.
pub(crate) fn read_string<R: Read>(reader: &mut R) -> Result<String, FormatError> {
    let len = u64::from(read_count(reader, "string length")?);
    let bytes = read_bytes(reader, len)?;
    let padding = string_padding(len);
    if padding > 0 {
        read_bytes(reader, padding)?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read `vertex_count` vectors of `dimensions` f32 each
///
/// Components past `dimensions` are left at zero.
pub(crate) fn read_vectors<R: Read>(
    reader: &mut R,
    vertex_count: u32,
    dimensions: u8,
) -> Result<Vec<Vec4>, FormatError> {
    let stride = usize::from(dimensions) * 4;
    let len = u64::from(vertex_count) * stride as u64;
    let bytes = read_bytes(reader, len)?;

    let vectors = bytes
        .chunks_exact(stride)
        .map(|vertex| {
            let mut value = Vec4::ZERO;
            for (component, raw) in vertex.chunks_exact(4).enumerate() {
                value[component] = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            value
        })
        .collect();

    Ok(vectors)
}
