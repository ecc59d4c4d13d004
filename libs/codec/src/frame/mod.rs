//! Frame codec: the delimited text framing format
//!
//! ```text
//! @header={{[5,request];[6,1.0];[1,server];...}};@data={{[name,12,Alice];[age,4,30];}};
//! ```
//!
//! Header items are `[field_id,value]` with the ids of
//! [`header_field`](vessel_types::constants::header_field). Routing ids 1-4
//! are left out when the message type is `data_container`; message type and
//! version are always written.
//!
//! Data items are `[name,kind_code,value]`. Scalars use the text renderer with
//! backslash escaping. Nested containers and arrays are written as
//! `<byte length>:<raw text>` so embedding never re-escapes a child.

mod escape;
mod parser;

use crate::codec::{Codec, FormatId};
use crate::error::{depth_exceeded, encoding, reserve_text, too_large, CodecResult};
use escape::escape_into;
use parser::FrameParser;
use tracing::debug;
use vessel_config::CodecSettings;
use vessel_types::constants::header_field;
use vessel_types::{Container, Header, NamedValue, StoragePolicy, Value};

pub(crate) const COMPONENT: &str = "frame";

/// Encoder and decoder for the frame format
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    settings: CodecSettings,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    /// Encode straight to text
    pub fn encode_to_string<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<String> {
        let (header, entries) = container.snapshot();
        let mut out = String::new();
        reserve_text(&mut out, self.settings.reserve_hint, COMPONENT)?;
        self.write_frame(&mut out, &header, &entries, 0)?;

        if out.len() > self.settings.max_message_size {
            return Err(too_large(COMPONENT, out.len(), self.settings.max_message_size));
        }
        Ok(out)
    }

    fn write_frame(
        &self,
        out: &mut String,
        header: &Header,
        entries: &[NamedValue],
        depth: usize,
    ) -> CodecResult<()> {
        write_header(out, header);

        out.push_str("@data={{");
        for entry in entries {
            reserve_text(out, entry.name.len() + entry.value.size_hint() + 8, COMPONENT)?;
            out.push('[');
            escape_into(out, &entry.name);
            out.push(',');
            out.push_str(&entry.kind().code().to_string());
            out.push(',');
            self.write_value(out, &entry.value, depth)?;
            out.push_str("];");
        }
        out.push_str("}};");
        Ok(())
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) -> CodecResult<()> {
        match value {
            Value::Container(child) => {
                let child_depth = self.nested_depth(depth)?;
                // Snapshot releases the child's lock before recursing further
                let (header, entries) = child.snapshot();
                let mut inner = String::new();
                self.write_frame(&mut inner, &header, &entries, child_depth)?;
                write_sized(out, &inner);
            }
            Value::Array(items) => {
                let child_depth = self.nested_depth(depth)?;
                let mut inner = String::new();
                for (index, item) in items.iter().enumerate() {
                    inner.push('[');
                    inner.push_str(&index.to_string());
                    inner.push(',');
                    inner.push_str(&item.kind().code().to_string());
                    inner.push(',');
                    self.write_value(&mut inner, item, child_depth)?;
                    inner.push_str("];");
                }
                write_sized(out, &inner);
            }
            scalar => escape_into(out, &scalar.to_text()),
        }
        Ok(())
    }

    fn nested_depth(&self, depth: usize) -> CodecResult<usize> {
        let child_depth = depth + 1;
        if child_depth > self.settings.max_depth {
            return Err(depth_exceeded(COMPONENT, child_depth, self.settings.max_depth));
        }
        Ok(child_depth)
    }
}

fn write_header(out: &mut String, header: &Header) {
    out.push_str("@header={{");
    if !header.is_unrouted() {
        write_header_field(out, header_field::TARGET_ID, &header.target_id);
        write_header_field(out, header_field::TARGET_SUB_ID, &header.target_sub_id);
        write_header_field(out, header_field::SOURCE_ID, &header.source_id);
        write_header_field(out, header_field::SOURCE_SUB_ID, &header.source_sub_id);
    }
    write_header_field(out, header_field::MESSAGE_TYPE, &header.message_type);
    write_header_field(out, header_field::VERSION, &header.version);
    out.push_str("}};");
}

fn write_header_field(out: &mut String, id: u8, value: &str) {
    out.push('[');
    out.push_str(&id.to_string());
    out.push(',');
    escape_into(out, value);
    out.push_str("];");
}

fn write_sized(out: &mut String, raw: &str) {
    out.push_str(&raw.len().to_string());
    out.push(':');
    out.push_str(raw);
}

impl Codec for FrameCodec {
    fn format_id(&self) -> FormatId {
        FormatId::Frame
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>> {
        let text = self.encode_to_string(container)?;
        debug!(format = "frame", bytes = text.len(), "encoded container");
        Ok(text.into_bytes())
    }

    fn decode_as<S: StoragePolicy>(&self, bytes: &[u8]) -> CodecResult<Container<S>> {
        if bytes.len() > self.settings.max_message_size {
            return Err(too_large(COMPONENT, bytes.len(), self.settings.max_message_size));
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|e| encoding(COMPONENT, format!("frame is not UTF-8: {e}")))?;

        let (header, entries) = FrameParser::new(text, 0, self.settings.max_depth).parse_frame()?;
        let container = Container::<S>::with_header(header);
        container.set_all_result(entries)?;

        debug!(format = "frame", bytes = bytes.len(), fields = container.len(), "decoded container");
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vessel_types::{ErrorCode, Long, ULong};

    fn sample() -> Container {
        let container: Container = Container::new();
        container.set("name", "Alice");
        container.set("age", 30i32);
        container
    }

    #[test]
    fn test_unrouted_header_omits_routing_ids() {
        let text = FrameCodec::new().encode_to_string(&sample()).unwrap();
        assert_eq!(
            text,
            "@header={{[5,data_container];[6,1.0];}};@data={{[name,12,Alice];[age,4,30];}};"
        );
    }

    #[test]
    fn test_routed_header_includes_all_ids() {
        let container = sample();
        container.set_message_type("request");
        container.set_source("client", "c1");
        container.set_target("server", "s1");

        let text = FrameCodec::new().encode_to_string(&container).unwrap();
        assert!(text.starts_with(
            "@header={{[1,server];[2,s1];[3,client];[4,c1];[5,request];[6,1.0];}};"
        ));
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let container: Container = Container::new();
        container.set("path", "a;b[c]{d},e\\f\r\ng");
        container.set("we;ird,name", true);
        container.set("blob", vec![0u8, 0x7f, 0xff]);
        container.set("long", Long(-5));
        container.set("ulong", ULong(5));
        container.set("none", ());
        container.set_message_type("evt;1");

        let codec = FrameCodec::new();
        let decoded = codec.decode(&codec.encode(&container).unwrap()).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn test_nested_container_and_array_round_trip() {
        let child: Container = Container::new();
        child.set("inner", "x]y");
        child.set_message_type("child");
        let parent = sample();
        parent.set("child", child);
        parent.set(
            "list",
            vec![Value::Int(1), Value::from("two;"), Value::Array(vec![Value::Bool(false)])],
        );

        let codec = FrameCodec::new();
        let decoded = codec.decode(&codec.encode(&parent).unwrap()).unwrap();
        assert_eq!(decoded, parent);

        let nested = decoded.nested("child").unwrap();
        assert_eq!(nested.get_as::<String>("inner").unwrap(), "x]y");
        assert_eq!(nested.message_type(), "child");
    }

    #[test]
    fn test_non_utf8_input_is_encoding_error() {
        let err = FrameCodec::new().decode(&[0x40, 0xff, 0xfe]).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodingError);
    }

    #[test]
    fn test_size_limit() {
        let settings = CodecSettings {
            max_message_size: 16,
            ..CodecSettings::default()
        };
        let codec = FrameCodec::with_settings(settings);
        assert_eq!(codec.encode(&sample()).unwrap_err().code, ErrorCode::MaxSizeExceeded);
        assert_eq!(
            codec.decode(&[b' '; 17]).unwrap_err().code,
            ErrorCode::MaxSizeExceeded
        );
    }
}
