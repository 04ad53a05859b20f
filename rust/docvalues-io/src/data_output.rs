//! Primitive encoders mirroring [`DataInput`](crate::DataInput).
//!
//! Segment streams are only ever produced by test fixtures and tooling, so the
//! encoders target an in-memory `Vec<u8>`.

use crate::data_input::zigzag_encode;

pub trait DataOutput {
    fn write_u8(&mut self, value: u8);

    fn write_slice(&mut self, bytes: &[u8]);

    fn write_u32(&mut self, value: u32) {
        self.write_slice(&value.to_le_bytes());
    }

    fn write_i32(&mut self, value: i32) {
        self.write_slice(&value.to_le_bytes());
    }

    fn write_u64(&mut self, value: u64) {
        self.write_slice(&value.to_le_bytes());
    }

    fn write_i64(&mut self, value: i64) {
        self.write_slice(&value.to_le_bytes());
    }

    fn write_f32(&mut self, value: f32) {
        self.write_slice(&value.to_le_bytes());
    }

    /// Writes the `u32` bit pattern of `value` as a variable-length integer.
    fn write_vint(&mut self, value: i32) {
        let mut v = value as u32;
        while v >= 0x80 {
            self.write_u8((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        self.write_u8(v as u8);
    }

    /// Writes a non-negative variable-length long.
    fn write_vlong(&mut self, value: i64) {
        debug_assert!(value >= 0, "vlong must be non-negative: {value}");
        self.write_var_u64(value as u64);
    }

    fn write_zlong(&mut self, value: i64) {
        self.write_var_u64(zigzag_encode(value));
    }

    fn write_var_u64(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.write_u8((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        self.write_u8(v as u8);
    }

    fn write_string(&mut self, value: &str) {
        self.write_vint(value.len() as i32);
        self.write_slice(value.as_bytes());
    }
}

impl DataOutput for Vec<u8> {
    fn write_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn write_slice(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::DataInput;

    use super::DataOutput;

    #[test]
    fn test_primitives_read_back() {
        let mut out: Vec<u8> = Vec::new();
        out.write_vint(-1);
        out.write_vint(300);
        out.write_vlong(1 << 40);
        out.write_zlong(-12345);
        out.write_i64(-7);
        out.write_f32(0.25);
        out.write_string("DocValuesData");
        assert_eq!(&out[..5], &[0xff, 0xff, 0xff, 0xff, 0x0f]);

        let mut input = DataInput::new(Arc::new(out), "out").unwrap();
        assert_eq!(input.read_vint().unwrap(), -1);
        assert_eq!(input.read_vint().unwrap(), 300);
        assert_eq!(input.read_vlong().unwrap(), 1 << 40);
        assert_eq!(input.read_zlong().unwrap(), -12345);
        assert_eq!(input.read_i64().unwrap(), -7);
        assert_eq!(input.read_f32().unwrap(), 0.25);
        assert_eq!(input.read_string().unwrap(), "DocValuesData");
        assert_eq!(input.remaining(), 0);
    }
}
