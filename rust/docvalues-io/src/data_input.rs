//! A buffered sequential cursor over a `ReadAt`.

use std::sync::Arc;

use bytes::Bytes;
use docvalues_common::{Result, error::Error};

use crate::ReadAt;

/// Default read-ahead window for small primitive reads.
const DEFAULT_READ_AHEAD: usize = 8 * 1024;

/// A buffered sequential reader over a shared positional source.
///
/// `DataInput` owns its position, so any number of cursors may be opened over the
/// same `ReadAt` and used from different threads without coordination. Cloning
/// a cursor is cheap: the clone shares the source and the current read-ahead buffer
/// but advances independently.
///
/// Integers are little-endian. Variable-length integers use 7 data bits per byte
/// with the high bit as a continuation flag, least significant group first.
///
/// Reading past the end of the source is reported as corruption: segment streams
/// are immutable, so a short stream means a truncated or damaged one.
#[derive(Clone)]
pub struct DataInput {
    source: Arc<dyn ReadAt>,
    name: Arc<str>,
    size: u64,
    pos: u64,
    buf: Bytes,
    buf_start: u64,
    read_ahead: usize,
}

impl DataInput {
    /// Opens a cursor at position zero.
    pub fn new(source: Arc<dyn ReadAt>, name: impl Into<Arc<str>>) -> Result<DataInput> {
        let name = name.into();
        let size = source
            .size()
            .map_err(|e| Error::io(format!("size of {name}"), e))?;
        let read_ahead = source.storage_profile().clamp_io_size(DEFAULT_READ_AHEAD);
        Ok(DataInput {
            source,
            name,
            size,
            pos: 0,
            buf: Bytes::new(),
            buf_start: 0,
            read_ahead,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total length of the underlying source.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the current read position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Number of bytes between the current position and the end of the source.
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.pos)
    }

    pub fn source(&self) -> &Arc<dyn ReadAt> {
        &self.source
    }

    /// Moves the cursor to an absolute position. Seeking to the very end is allowed,
    /// seeking beyond it is corruption.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.size {
            return Err(Error::corruption(
                self.name.as_ref(),
                format!("seek to {pos} past end of stream ({})", self.size),
            ));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, len: u64) -> Result<()> {
        let target = self.pos.checked_add(len).ok_or_else(|| {
            Error::corruption(self.name.as_ref(), format!("skip of {len} overflows"))
        })?;
        self.seek(target)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let buf = self.fill(1)?;
        let b = buf[0];
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a variable-length 32-bit integer of at most 5 bytes.
    ///
    /// The value is decoded as the `u32` bit pattern, so `-1` occupies the full
    /// five bytes.
    pub fn read_vint(&mut self) -> Result<i32> {
        let mut result = 0u32;
        for i in 0..5 {
            let b = self.read_u8()?;
            result |= ((b & 0x7f) as u32) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result as i32);
            }
        }
        Err(Error::corruption(
            self.name.as_ref(),
            "invalid vint: more than 5 bytes",
        ))
    }

    /// Reads a variable-length non-negative 64-bit integer of at most 9 bytes.
    pub fn read_vlong(&mut self) -> Result<i64> {
        let mut result = 0u64;
        for i in 0..9 {
            let b = self.read_u8()?;
            result |= ((b & 0x7f) as u64) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result as i64);
            }
        }
        Err(Error::corruption(
            self.name.as_ref(),
            "invalid vlong: more than 9 bytes",
        ))
    }

    /// Reads a zig-zag encoded variable-length 64-bit integer (up to 10 bytes).
    pub fn read_zlong(&mut self) -> Result<i64> {
        let mut result = 0u64;
        for i in 0..10 {
            let b = self.read_u8()?;
            result |= ((b & 0x7f) as u64) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(zigzag_decode(result));
            }
        }
        Err(Error::corruption(
            self.name.as_ref(),
            "invalid zlong: more than 10 bytes",
        ))
    }

    /// Reads a vint-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_vint()?;
        if len < 0 {
            return Err(Error::corruption(
                self.name.as_ref(),
                format!("negative string length {len}"),
            ));
        }
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::corruption(self.name.as_ref(), "string is not valid UTF-8"))
    }

    /// Reads exactly `len` bytes.
    ///
    /// Small reads are served from the read-ahead buffer; large ones go straight
    /// to the source.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if len == 0 {
            return Ok(Bytes::new());
        }
        if len <= self.read_ahead {
            let bytes = self.fill(len)?.slice(..len);
            self.pos += len as u64;
            return Ok(bytes);
        }
        let end = self.end_of(len)?;
        let bytes = self
            .source
            .read_at(self.pos..end)
            .map_err(|e| Error::io(self.name.to_string(), e))?;
        if bytes.len() != len {
            return Err(self.eof(len));
        }
        self.pos = end;
        Ok(bytes)
    }

    /// Fills `dest` completely.
    pub fn read_into(&mut self, dest: &mut [u8]) -> Result<()> {
        let bytes = self.read_bytes(dest.len())?;
        dest.copy_from_slice(&bytes);
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let buf = self.fill(N)?;
        let mut res = [0u8; N];
        res.copy_from_slice(&buf[..N]);
        self.pos += N as u64;
        Ok(res)
    }

    /// Ensures at least `needed` bytes starting at the current position are buffered,
    /// and returns the buffered bytes from the current position onwards.
    fn fill(&mut self, needed: usize) -> Result<Bytes> {
        let buf_end = self.buf_start + self.buf.len() as u64;
        if self.pos >= self.buf_start && self.pos + needed as u64 <= buf_end {
            let offset = (self.pos - self.buf_start) as usize;
            return Ok(self.buf.slice(offset..));
        }
        self.end_of(needed)?;
        let window = needed.max(self.read_ahead) as u64;
        let end = std::cmp::min(self.size, self.pos + window);
        let bytes = self
            .source
            .read_at(self.pos..end)
            .map_err(|e| Error::io(self.name.to_string(), e))?;
        if bytes.len() < needed {
            return Err(self.eof(needed));
        }
        self.buf_start = self.pos;
        self.buf = bytes;
        Ok(self.buf.clone())
    }

    fn end_of(&self, len: usize) -> Result<u64> {
        match self.pos.checked_add(len as u64) {
            Some(end) if end <= self.size => Ok(end),
            _ => Err(self.eof(len)),
        }
    }

    #[cold]
    fn eof(&self, len: usize) -> Error {
        Error::corruption(
            self.name.as_ref(),
            format!(
                "read past EOF: {len} bytes at {} (stream length {})",
                self.pos, self.size
            ),
        )
    }
}

impl std::fmt::Debug for DataInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataInput")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

/// Decodes a zig-zag encoded value.
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Zig-zag encodes a signed value so that small magnitudes map to small unsigned values.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}
