//! MessagePack reader
//!
//! Bounds are checked before every read: a declared length larger than the
//! remaining input is a truncation error, never an out-of-bounds access.
//! Collection capacities are capped by the bytes actually left.

use super::{marker, COMPONENT};
use crate::error::{depth_exceeded, encoding, invalid_format, truncated, CodecResult};
use vessel_types::{Container, NamedValue, Value};

pub struct MsgPackReader<'a> {
    data: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> MsgPackReader<'a> {
    pub fn new(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            pos: 0,
            max_depth,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize, context: &str) -> CodecResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(truncated(COMPONENT, n, self.remaining(), context));
        }
        let data: &'a [u8] = self.data;
        let slice = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, context: &str) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    fn read_u8(&mut self, context: &str) -> CodecResult<u8> {
        Ok(self.take_array::<1>(context)?[0])
    }

    fn read_u16(&mut self, context: &str) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.take_array(context)?))
    }

    fn read_u32(&mut self, context: &str) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.take_array(context)?))
    }

    fn read_u64(&mut self, context: &str) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.take_array(context)?))
    }

    pub fn read_map_len(&mut self) -> CodecResult<usize> {
        let m = self.read_u8("map header")?;
        match m {
            marker::FIXMAP..=marker::FIXMAP_END => Ok((m & 0x0f) as usize),
            marker::MAP16 => Ok(self.read_u16("map16 length")? as usize),
            marker::MAP32 => Ok(self.read_u32("map32 length")? as usize),
            other => Err(invalid_format(COMPONENT, format!("expected map, found marker {other:#04x}"))),
        }
    }

    pub fn read_str(&mut self) -> CodecResult<String> {
        let m = self.read_u8("string header")?;
        let len = match m {
            marker::FIXSTR..=marker::FIXSTR_END => (m & 0x1f) as usize,
            marker::STR8 => self.read_u8("str8 length")? as usize,
            marker::STR16 => self.read_u16("str16 length")? as usize,
            marker::STR32 => self.read_u32("str32 length")? as usize,
            other => {
                return Err(invalid_format(
                    COMPONENT,
                    format!("expected string, found marker {other:#04x}"),
                ))
            }
        };
        self.read_utf8(len)
    }

    fn read_utf8(&mut self, len: usize) -> CodecResult<String> {
        let raw = self.take(len, "string payload")?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| encoding(COMPONENT, format!("string is not UTF-8: {e}")))
    }

    /// Read any value; `depth` is the nesting level of the value being read
    pub fn read_value(&mut self, depth: usize) -> CodecResult<Value> {
        let m = self.read_u8("value marker")?;
        let value = match m {
            marker::POSITIVE_FIXINT..=marker::POSITIVE_FIXINT_MAX => Value::Int(m as i32),
            marker::NEGATIVE_FIXINT..=u8::MAX => Value::Int(m as i8 as i32),
            marker::NIL => Value::Null,
            marker::FALSE => Value::Bool(false),
            marker::TRUE => Value::Bool(true),

            marker::UINT8 => unsigned_value(self.read_u8("uint8")? as u64),
            marker::UINT16 => unsigned_value(self.read_u16("uint16")? as u64),
            marker::UINT32 => unsigned_value(self.read_u32("uint32")? as u64),
            marker::UINT64 => unsigned_value(self.read_u64("uint64")?),
            marker::INT8 => signed_value(self.read_u8("int8")? as i8 as i64),
            marker::INT16 => signed_value(self.read_u16("int16")? as i16 as i64),
            marker::INT32 => signed_value(self.read_u32("int32")? as i32 as i64),
            marker::INT64 => signed_value(self.read_u64("int64")? as i64),

            marker::FLOAT32 => Value::Float(f32::from_bits(self.read_u32("float32")?)),
            marker::FLOAT64 => Value::Double(f64::from_bits(self.read_u64("float64")?)),

            marker::FIXSTR..=marker::FIXSTR_END => Value::String(self.read_utf8((m & 0x1f) as usize)?),
            marker::STR8 => {
                let len = self.read_u8("str8 length")? as usize;
                Value::String(self.read_utf8(len)?)
            }
            marker::STR16 => {
                let len = self.read_u16("str16 length")? as usize;
                Value::String(self.read_utf8(len)?)
            }
            marker::STR32 => {
                let len = self.read_u32("str32 length")? as usize;
                Value::String(self.read_utf8(len)?)
            }

            marker::BIN8 => {
                let len = self.read_u8("bin8 length")? as usize;
                Value::Bytes(self.take(len, "bin8 payload")?.to_vec())
            }
            marker::BIN16 => {
                let len = self.read_u16("bin16 length")? as usize;
                Value::Bytes(self.take(len, "bin16 payload")?.to_vec())
            }
            marker::BIN32 => {
                let len = self.read_u32("bin32 length")? as usize;
                Value::Bytes(self.take(len, "bin32 payload")?.to_vec())
            }

            marker::FIXARRAY..=marker::FIXARRAY_END => self.read_array((m & 0x0f) as usize, depth)?,
            marker::ARRAY16 => {
                let len = self.read_u16("array16 length")? as usize;
                self.read_array(len, depth)?
            }
            marker::ARRAY32 => {
                let len = self.read_u32("array32 length")? as usize;
                self.read_array(len, depth)?
            }

            marker::FIXMAP..=marker::FIXMAP_END => self.read_map_value((m & 0x0f) as usize, depth)?,
            marker::MAP16 => {
                let len = self.read_u16("map16 length")? as usize;
                self.read_map_value(len, depth)?
            }
            marker::MAP32 => {
                let len = self.read_u32("map32 length")? as usize;
                self.read_map_value(len, depth)?
            }

            other => {
                return Err(invalid_format(
                    COMPONENT,
                    format!("unsupported marker {other:#04x} at offset {}", self.pos - 1),
                ))
            }
        };
        Ok(value)
    }

    fn enter(&self, depth: usize) -> CodecResult<usize> {
        let child = depth + 1;
        if child > self.max_depth {
            return Err(depth_exceeded(COMPONENT, child, self.max_depth));
        }
        Ok(child)
    }

    fn read_array(&mut self, len: usize, depth: usize) -> CodecResult<Value> {
        let child_depth = self.enter(depth)?;
        // Every element takes at least one byte
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(self.read_value(child_depth)?);
        }
        Ok(Value::Array(items))
    }

    /// An inline map becomes a nested container holding its entries
    fn read_map_value(&mut self, len: usize, depth: usize) -> CodecResult<Value> {
        let child_depth = self.enter(depth)?;
        let mut entries = Vec::with_capacity(len.min(self.remaining() / 2));
        for _ in 0..len {
            let name = self.read_str()?;
            let value = self.read_value(child_depth)?;
            entries.push(NamedValue { name, value });
        }
        let child: Container = Container::new();
        child.set_all_result(entries)?;
        Ok(Value::Container(child.into_shared()))
    }

    /// Read and discard one value
    pub fn skip_value(&mut self, depth: usize) -> CodecResult<()> {
        self.read_value(depth).map(drop)
    }
}

fn unsigned_value(v: u64) -> Value {
    if let Ok(small) = i32::try_from(v) {
        Value::Int(small)
    } else if let Ok(wide) = i64::try_from(v) {
        Value::LLong(wide)
    } else {
        Value::ULLong(v)
    }
}

fn signed_value(v: i64) -> Value {
    match i32::try_from(v) {
        Ok(small) => Value::Int(small),
        Err(_) => Value::LLong(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vessel_types::ErrorCode;

    fn read(bytes: &[u8]) -> CodecResult<Value> {
        MsgPackReader::new(bytes, 32).read_value(0)
    }

    #[test]
    fn test_integer_mapping() {
        assert_eq!(read(&[0x05]).unwrap(), Value::Int(5));
        assert_eq!(read(&[0xff]).unwrap(), Value::Int(-1));
        assert_eq!(read(&[0xd0, 0x80]).unwrap(), Value::Int(-128));
        assert_eq!(read(&[0xce, 0xff, 0xff, 0xff, 0xff]).unwrap(), Value::LLong(u32::MAX as i64));
        assert_eq!(
            read(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            Value::ULLong(u64::MAX)
        );
        assert_eq!(
            read(&[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]).unwrap(),
            Value::LLong(i64::MIN)
        );
    }

    #[test]
    fn test_truncation_is_reported() {
        for bytes in [
            &[][..],
            &[0xcd, 0x01][..],
            &[0xcb, 0x3f, 0xf0][..],
            &[0xa5, b'a', b'b'][..],
            &[0xc5, 0xff, 0xff, 0x00][..],
            &[0xdb, 0xff, 0xff, 0xff, 0xff][..],
            &[0x92, 0x01][..],
        ] {
            let err = read(bytes).unwrap_err();
            assert_eq!(err.code, ErrorCode::DeserializationFailed, "{bytes:02x?}");
        }
    }

    #[test]
    fn test_reserved_markers_are_rejected() {
        for m in [0xc1u8, 0xc7, 0xd4, 0xd8] {
            assert_eq!(read(&[m, 0, 0]).unwrap_err().code, ErrorCode::InvalidFormat);
        }
    }

    #[test]
    fn test_inline_map_becomes_container() {
        let value = read(&[0x81, 0xa1, b'k', 0xc3]).unwrap();
        let child = value.as_container().unwrap();
        assert_eq!(child.get("k"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_huge_declared_array_does_not_preallocate() {
        let err = read(&[0xdd, 0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DeserializationFailed);
    }

    #[test]
    fn test_invalid_utf8_string() {
        assert_eq!(read(&[0xa2, 0xff, 0xfe]).unwrap_err().code, ErrorCode::EncodingError);
    }

    #[test]
    fn test_deep_arrays_hit_depth_limit() {
        let bytes = vec![0x91u8; 40];
        assert_eq!(
            MsgPackReader::new(&bytes, 32).read_value(0).unwrap_err().code,
            ErrorCode::MaxSizeExceeded
        );
    }
}
