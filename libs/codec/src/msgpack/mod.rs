//! MessagePack codec
//!
//! A container is a two-entry map:
//!
//! ```text
//! { "header": { "message_type": "...", "version": "...", [routing ids] },
//!   "values": { name: value, ... } }
//! ```
//!
//! Routing ids are written only when the message type is not
//! `data_container`. A nested container value is encoded to its own
//! MessagePack document and stored as a `bin` blob; decoding yields the blob as
//! `bytes`, which the caller decodes again to recover the child.
//!
//! Decoding maps integers to `int` when they fit in i32, to `llong` when they
//! fit in i64 and to `ullong` otherwise, so integer width is not preserved
//! across a round trip; the numeric value always is.

mod decoder;
mod encoder;

pub use decoder::MsgPackReader;
pub use encoder::MsgPackWriter;

use crate::codec::{Codec, FormatId};
use crate::error::{corrupted, depth_exceeded, invalid_format, too_large, CodecResult};
use tracing::debug;
use vessel_config::CodecSettings;
use vessel_types::{Container, Header, NamedValue, StoragePolicy, Value};

pub(crate) const COMPONENT: &str = "msgpack";

/// Marker bytes from the MessagePack specification
pub mod marker {
    pub const POSITIVE_FIXINT: u8 = 0x00;
    pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;
    pub const FIXMAP: u8 = 0x80;
    pub const FIXMAP_END: u8 = 0x8f;
    pub const FIXARRAY: u8 = 0x90;
    pub const FIXARRAY_END: u8 = 0x9f;
    pub const FIXSTR: u8 = 0xa0;
    pub const FIXSTR_END: u8 = 0xbf;
    pub const NIL: u8 = 0xc0;
    pub const FALSE: u8 = 0xc2;
    pub const TRUE: u8 = 0xc3;
    pub const BIN8: u8 = 0xc4;
    pub const BIN16: u8 = 0xc5;
    pub const BIN32: u8 = 0xc6;
    pub const FLOAT32: u8 = 0xca;
    pub const FLOAT64: u8 = 0xcb;
    pub const UINT8: u8 = 0xcc;
    pub const UINT16: u8 = 0xcd;
    pub const UINT32: u8 = 0xce;
    pub const UINT64: u8 = 0xcf;
    pub const INT8: u8 = 0xd0;
    pub const INT16: u8 = 0xd1;
    pub const INT32: u8 = 0xd2;
    pub const INT64: u8 = 0xd3;
    pub const STR8: u8 = 0xd9;
    pub const STR16: u8 = 0xda;
    pub const STR32: u8 = 0xdb;
    pub const ARRAY16: u8 = 0xdc;
    pub const ARRAY32: u8 = 0xdd;
    pub const MAP16: u8 = 0xde;
    pub const MAP32: u8 = 0xdf;
    pub const NEGATIVE_FIXINT: u8 = 0xe0;

    pub const FIXSTR_MAX_LEN: usize = 31;
    pub const FIXCOLLECTION_MAX_LEN: usize = 15;
}

const HEADER_KEY: &str = "header";
const VALUES_KEY: &str = "values";

/// Encoder and decoder for MessagePack documents
#[derive(Debug, Clone, Default)]
pub struct MessagePackCodec {
    settings: CodecSettings,
}

impl MessagePackCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    fn encode_document(
        &self,
        header: &Header,
        entries: &[NamedValue],
        depth: usize,
    ) -> CodecResult<Vec<u8>> {
        let mut w = MsgPackWriter::with_capacity(self.settings.reserve_hint)?;
        w.write_map_len(2)?;

        w.write_str(HEADER_KEY)?;
        let routed = !header.is_unrouted();
        w.write_map_len(if routed { 6 } else { 2 })?;
        if routed {
            for (key, value) in [
                ("target_id", &header.target_id),
                ("target_sub_id", &header.target_sub_id),
                ("source_id", &header.source_id),
                ("source_sub_id", &header.source_sub_id),
            ] {
                w.write_str(key)?;
                w.write_str(value)?;
            }
        }
        w.write_str("message_type")?;
        w.write_str(&header.message_type)?;
        w.write_str("version")?;
        w.write_str(&header.version)?;

        w.write_str(VALUES_KEY)?;
        w.write_map_len(entries.len())?;
        for entry in entries {
            w.write_str(&entry.name)?;
            self.write_value(&mut w, &entry.value, depth)?;
        }

        if w.as_bytes().len() > self.settings.max_message_size {
            return Err(too_large(COMPONENT, w.as_bytes().len(), self.settings.max_message_size));
        }
        Ok(w.into_bytes())
    }

    fn write_value(&self, w: &mut MsgPackWriter, value: &Value, depth: usize) -> CodecResult<()> {
        match value {
            Value::Null => w.write_nil(),
            Value::Bool(v) => w.write_bool(*v),
            Value::Short(v) => w.write_int(*v as i64),
            Value::Int(v) | Value::Long(v) => w.write_int(*v as i64),
            Value::LLong(v) => w.write_int(*v),
            Value::UShort(v) => w.write_uint(*v as u64),
            Value::UInt(v) | Value::ULong(v) => w.write_uint(*v as u64),
            Value::ULLong(v) => w.write_uint(*v),
            Value::Float(v) => w.write_f32(*v),
            Value::Double(v) => w.write_f64(*v),
            Value::String(v) => w.write_str(v),
            Value::Bytes(v) => w.write_bin(v),
            Value::Container(child) => {
                let child_depth = self.nested_depth(depth)?;
                let (header, entries) = child.snapshot();
                let blob = self.encode_document(&header, &entries, child_depth)?;
                w.write_bin(&blob)
            }
            Value::Array(items) => {
                let child_depth = self.nested_depth(depth)?;
                w.write_array_len(items.len())?;
                for item in items {
                    self.write_value(w, item, child_depth)?;
                }
                Ok(())
            }
        }
    }

    fn nested_depth(&self, depth: usize) -> CodecResult<usize> {
        let child_depth = depth + 1;
        if child_depth > self.settings.max_depth {
            return Err(depth_exceeded(COMPONENT, child_depth, self.settings.max_depth));
        }
        Ok(child_depth)
    }

    fn decode_document(&self, bytes: &[u8]) -> CodecResult<(Header, Vec<NamedValue>)> {
        let mut r = MsgPackReader::new(bytes, self.settings.max_depth);
        let mut header = Header::default();
        let mut entries = Vec::new();

        let outer = r.read_map_len()?;
        for _ in 0..outer {
            match r.read_str()?.as_str() {
                HEADER_KEY => {
                    let count = r.read_map_len()?;
                    for _ in 0..count {
                        let key = r.read_str()?;
                        let value = r.read_str()?;
                        match key.as_str() {
                            "target_id" => header.target_id = value,
                            "target_sub_id" => header.target_sub_id = value,
                            "source_id" => header.source_id = value,
                            "source_sub_id" => header.source_sub_id = value,
                            "message_type" => header.message_type = value,
                            "version" => header.version = value,
                            _ => {}
                        }
                    }
                }
                VALUES_KEY => {
                    let count = r.read_map_len()?;
                    entries.reserve(count.min(r.remaining() / 2));
                    for _ in 0..count {
                        let name = r.read_str()?;
                        let value = r.read_value(0)?;
                        entries.push(NamedValue { name, value });
                    }
                }
                _ => r.skip_value(0)?,
            }
        }

        if !r.is_empty() {
            return Err(corrupted(
                COMPONENT,
                format!(
                    "{} trailing bytes after document ending at offset {}",
                    r.remaining(),
                    r.position()
                ),
            ));
        }
        Ok((header, entries))
    }
}

impl Codec for MessagePackCodec {
    fn format_id(&self) -> FormatId {
        FormatId::MessagePack
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>> {
        let (header, entries) = container.snapshot();
        let bytes = self.encode_document(&header, &entries, 0)?;
        debug!(format = "msgpack", bytes = bytes.len(), "encoded container");
        Ok(bytes)
    }

    fn decode_as<S: StoragePolicy>(&self, bytes: &[u8]) -> CodecResult<Container<S>> {
        if bytes.len() > self.settings.max_message_size {
            return Err(too_large(COMPONENT, bytes.len(), self.settings.max_message_size));
        }
        if bytes.is_empty() {
            return Err(invalid_format(COMPONENT, "empty input"));
        }

        let (header, entries) = self.decode_document(bytes)?;
        let container = Container::<S>::with_header(header);
        container.set_all_result(entries)?;

        debug!(format = "msgpack", bytes = bytes.len(), fields = container.len(), "decoded container");
        Ok(container)
    }
}
