//! Versioned stream header:
//! * magic:`u32` ([`CODEC_MAGIC`])
//! * codec name length:`vint`
//! * codec name:`utf-8`
//! * version:`i32`

use docvalues_common::{Result, error::Error};
use docvalues_io::{DataInput, DataOutput};

use crate::defs::CODEC_MAGIC;

/// Reads and validates a stream header, returning the stream version.
///
/// The magic and the codec name must match exactly, and the version must lie within
/// `[min_version, max_version]`. Any other content is corruption.
pub fn check_header(
    input: &mut DataInput,
    codec: &str,
    min_version: i32,
    max_version: i32,
) -> Result<i32> {
    let magic = input.read_u32()?;
    if magic != CODEC_MAGIC {
        return Err(Error::corruption(
            input.name(),
            format!("codec header mismatch: actual magic {magic:#x}, expected {CODEC_MAGIC:#x}"),
        ));
    }
    let actual_codec = input.read_string()?;
    if actual_codec != codec {
        return Err(Error::corruption(
            input.name(),
            format!("codec mismatch: actual '{actual_codec}', expected '{codec}'"),
        ));
    }
    let version = input.read_i32()?;
    if version < min_version || version > max_version {
        return Err(Error::corruption(
            input.name(),
            format!("unsupported version {version}, expected [{min_version}, {max_version}]"),
        ));
    }
    Ok(version)
}

/// Encoded length of a header for the given codec name.
pub fn header_len(codec: &str) -> usize {
    4 + vint_len(codec.len() as u32) + codec.len() + 4
}

/// Writes a stream header.
pub fn write_header<W: DataOutput>(out: &mut W, codec: &str, version: i32) {
    out.write_u32(CODEC_MAGIC);
    out.write_string(codec);
    out.write_i32(version);
}

fn vint_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}
