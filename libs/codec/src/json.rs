//! JSON rendering (write-only)
//!
//! ```text
//! {"header":{"message_type":"data_container","version":"1.0"},
//!  "values":{"name":"Alice","age":"30","child":{"header":{..},"values":{..}},"list":["1","2"]}}
//! ```
//!
//! Scalars go through the text renderer and are always JSON strings, so a
//! consumer sees `"30"` rather than `30`. Key order follows insertion order.

use crate::codec::{Codec, FormatId};
use crate::error::{depth_exceeded, invalid_format, too_large, CodecResult};
use serde_json::{Map, Value as Json};
use tracing::debug;
use vessel_config::CodecSettings;
use vessel_types::{Container, ContainerError, ErrorCode, Header, NamedValue, StoragePolicy, Value};

const COMPONENT: &str = "json";

#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    settings: CodecSettings,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CodecSettings) -> Self {
        Self { settings }
    }

    /// Build the JSON document tree without serializing it
    pub fn to_document<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Json> {
        let (header, entries) = container.snapshot();
        self.document(&header, &entries, 0)
    }

    fn document(&self, header: &Header, entries: &[NamedValue], depth: usize) -> CodecResult<Json> {
        let mut values = Map::with_capacity(entries.len());
        for entry in entries {
            values.insert(entry.name.clone(), self.render(&entry.value, depth)?);
        }

        let mut doc = Map::with_capacity(2);
        doc.insert("header".to_string(), Json::Object(header_object(header)));
        doc.insert("values".to_string(), Json::Object(values));
        Ok(Json::Object(doc))
    }

    fn render(&self, value: &Value, depth: usize) -> CodecResult<Json> {
        match value {
            Value::Container(child) => {
                let child_depth = self.nested_depth(depth)?;
                let (header, entries) = child.snapshot();
                self.document(&header, &entries, child_depth)
            }
            Value::Array(items) => {
                let child_depth = self.nested_depth(depth)?;
                items
                    .iter()
                    .map(|item| self.render(item, child_depth))
                    .collect::<CodecResult<Vec<_>>>()
                    .map(Json::Array)
            }
            scalar => Ok(Json::String(scalar.to_text())),
        }
    }

    fn nested_depth(&self, depth: usize) -> CodecResult<usize> {
        let child_depth = depth + 1;
        if child_depth > self.settings.max_depth {
            return Err(depth_exceeded(COMPONENT, child_depth, self.settings.max_depth));
        }
        Ok(child_depth)
    }
}

fn header_object(header: &Header) -> Map<String, Json> {
    let mut out = Map::with_capacity(6);
    if !header.is_unrouted() {
        out.insert("target_id".into(), Json::String(header.target_id.clone()));
        out.insert("target_sub_id".into(), Json::String(header.target_sub_id.clone()));
        out.insert("source_id".into(), Json::String(header.source_id.clone()));
        out.insert("source_sub_id".into(), Json::String(header.source_sub_id.clone()));
    }
    out.insert("message_type".into(), Json::String(header.message_type.clone()));
    out.insert("version".into(), Json::String(header.version.clone()));
    out
}

impl Codec for JsonCodec {
    fn format_id(&self) -> FormatId {
        FormatId::Json
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>> {
        let doc = self.to_document(container)?;
        let bytes = serde_json::to_vec(&doc).map_err(|e| {
            ContainerError::new(ErrorCode::SerializationFailed, COMPONENT).with_detail(e.to_string())
        })?;
        if bytes.len() > self.settings.max_message_size {
            return Err(too_large(COMPONENT, bytes.len(), self.settings.max_message_size));
        }
        debug!(format = "json", bytes = bytes.len(), "encoded container");
        Ok(bytes)
    }

    fn decode_as<S: StoragePolicy>(&self, _bytes: &[u8]) -> CodecResult<Container<S>> {
        Err(invalid_format(COMPONENT, "json is a write-only format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_str(container: &Container) -> String {
        String::from_utf8(JsonCodec::new().encode(container).unwrap()).unwrap()
    }

    #[test]
    fn test_unrouted_document() {
        let container: Container = Container::new();
        container.set("name", "Alice");
        container.set("age", 30i32);
        container.set("none", ());

        assert_eq!(
            encode_str(&container),
            r#"{"header":{"message_type":"data_container","version":"1.0"},"values":{"name":"Alice","age":"30","none":""}}"#
        );
    }

    #[test]
    fn test_routed_header_and_nesting() {
        let child: Container = Container::new();
        child.set("ok", true);
        let container: Container = Container::new();
        container.set_message_type("event");
        container.set_source("a", "1");
        container.set_target("b", "2");
        container.set("child", child);
        container.set("list", vec![Value::Int(1), Value::Bytes(vec![0xab])]);

        let doc = JsonCodec::new().to_document(&container).unwrap();
        assert_eq!(
            doc,
            json!({
                "header": {
                    "target_id": "b", "target_sub_id": "2",
                    "source_id": "a", "source_sub_id": "1",
                    "message_type": "event", "version": "1.0"
                },
                "values": {
                    "child": {
                        "header": {"message_type": "data_container", "version": "1.0"},
                        "values": {"ok": "true"}
                    },
                    "list": ["1", "ab"]
                }
            })
        );
    }

    #[test]
    fn test_string_escaping() {
        let container: Container = Container::new();
        container.set("s", "q\"b\\\u{8}\u{c}\n\r\t\u{1}");
        let text = encode_str(&container);
        assert!(text.contains(r#""s":"q\"b\\\b\f\n\r\t\u0001""#), "{text}");
    }

    #[test]
    fn test_decode_is_unsupported() {
        let err = JsonCodec::new().decode(b"{}").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(!JsonCodec::new().supports_decode());
    }
}
