//! MessagePack writer
//!
//! Every integer takes the smallest encoding that holds it; unsigned values
//! never use a signed marker. Multi-byte fields are big-endian.

use super::marker;
use super::COMPONENT;
use crate::error::{encoding, reserve_bytes, CodecResult};

pub struct MsgPackWriter {
    buf: Vec<u8>,
}

impl MsgPackWriter {
    pub fn with_capacity(capacity: usize) -> CodecResult<Self> {
        let mut buf = Vec::new();
        reserve_bytes(&mut buf, capacity, COMPONENT)?;
        Ok(Self { buf })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn put(&mut self, bytes: &[u8]) -> CodecResult<()> {
        reserve_bytes(&mut self.buf, bytes.len(), COMPONENT)?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn put_marked(&mut self, marker: u8, payload: &[u8]) -> CodecResult<()> {
        reserve_bytes(&mut self.buf, 1 + payload.len(), COMPONENT)?;
        self.buf.push(marker);
        self.buf.extend_from_slice(payload);
        Ok(())
    }

    pub fn write_nil(&mut self) -> CodecResult<()> {
        self.put(&[marker::NIL])
    }

    pub fn write_bool(&mut self, value: bool) -> CodecResult<()> {
        self.put(&[if value { marker::TRUE } else { marker::FALSE }])
    }

    pub fn write_uint(&mut self, value: u64) -> CodecResult<()> {
        if value <= marker::POSITIVE_FIXINT_MAX as u64 {
            self.put(&[value as u8])
        } else if let Ok(v) = u8::try_from(value) {
            self.put_marked(marker::UINT8, &[v])
        } else if let Ok(v) = u16::try_from(value) {
            self.put_marked(marker::UINT16, &v.to_be_bytes())
        } else if let Ok(v) = u32::try_from(value) {
            self.put_marked(marker::UINT32, &v.to_be_bytes())
        } else {
            self.put_marked(marker::UINT64, &value.to_be_bytes())
        }
    }

    pub fn write_int(&mut self, value: i64) -> CodecResult<()> {
        if value >= 0 {
            return self.write_uint(value as u64);
        }
        if value >= -32 {
            self.put(&[value as i8 as u8])
        } else if let Ok(v) = i8::try_from(value) {
            self.put_marked(marker::INT8, &v.to_be_bytes())
        } else if let Ok(v) = i16::try_from(value) {
            self.put_marked(marker::INT16, &v.to_be_bytes())
        } else if let Ok(v) = i32::try_from(value) {
            self.put_marked(marker::INT32, &v.to_be_bytes())
        } else {
            self.put_marked(marker::INT64, &value.to_be_bytes())
        }
    }

    pub fn write_f32(&mut self, value: f32) -> CodecResult<()> {
        self.put_marked(marker::FLOAT32, &value.to_be_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> CodecResult<()> {
        self.put_marked(marker::FLOAT64, &value.to_be_bytes())
    }

    pub fn write_str(&mut self, value: &str) -> CodecResult<()> {
        let len = value.len();
        if len <= marker::FIXSTR_MAX_LEN {
            self.put(&[marker::FIXSTR | len as u8])?;
        } else if let Ok(n) = u8::try_from(len) {
            self.put_marked(marker::STR8, &[n])?;
        } else if let Ok(n) = u16::try_from(len) {
            self.put_marked(marker::STR16, &n.to_be_bytes())?;
        } else {
            self.put_marked(marker::STR32, &length_u32(len, "string")?.to_be_bytes())?;
        }
        self.put(value.as_bytes())
    }

    pub fn write_bin(&mut self, value: &[u8]) -> CodecResult<()> {
        let len = value.len();
        if let Ok(n) = u8::try_from(len) {
            self.put_marked(marker::BIN8, &[n])?;
        } else if let Ok(n) = u16::try_from(len) {
            self.put_marked(marker::BIN16, &n.to_be_bytes())?;
        } else {
            self.put_marked(marker::BIN32, &length_u32(len, "binary")?.to_be_bytes())?;
        }
        self.put(value)
    }

    pub fn write_array_len(&mut self, len: usize) -> CodecResult<()> {
        if len <= marker::FIXCOLLECTION_MAX_LEN {
            self.put(&[marker::FIXARRAY | len as u8])
        } else if let Ok(n) = u16::try_from(len) {
            self.put_marked(marker::ARRAY16, &n.to_be_bytes())
        } else {
            self.put_marked(marker::ARRAY32, &length_u32(len, "array")?.to_be_bytes())
        }
    }

    pub fn write_map_len(&mut self, len: usize) -> CodecResult<()> {
        if len <= marker::FIXCOLLECTION_MAX_LEN {
            self.put(&[marker::FIXMAP | len as u8])
        } else if let Ok(n) = u16::try_from(len) {
            self.put_marked(marker::MAP16, &n.to_be_bytes())
        } else {
            self.put_marked(marker::MAP32, &length_u32(len, "map")?.to_be_bytes())
        }
    }
}

fn length_u32(len: usize, what: &str) -> CodecResult<u32> {
    u32::try_from(len)
        .map_err(|_| encoding(COMPONENT, format!("{what} of {len} entries exceeds 32-bit length")))
}
