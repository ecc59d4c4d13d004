//! XML rendering (write-only)
//!
//! ```text
//! <container>
//!   <header><message_type>data_container</message_type><version>1.0</version></header>
//!   <values><name>Alice</name><child><container>..</container></child><list><item>1</item></list></values>
//! </container>
//! ```
//!
//! Output has no whitespace between elements. Field names become tag names,
//! so a name that is not a valid XML name is rejected with `InvalidFormat`.

use crate::codec::{Codec, FormatId};
use crate::error::{depth_exceeded, invalid_format, reserve_text, too_large, CodecResult};
use tracing::debug;
use vessel_config::CodecSettings;
use vessel_types::{Container, Header, NamedValue, StoragePolicy, Value};

const COMPONENT: &str = "xml";

#[derive(Debug, Clone, Default)]
pub struct XmlCodec {
    settings: CodecSettings,
}

impl XmlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn encode_to_string<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<String> {
        let (header, entries) = container.snapshot();
        let mut out = String::new();
        reserve_text(&mut out, self.settings.reserve_hint, COMPONENT)?;
        self.write_container(&mut out, &header, &entries, 0)?;

        if out.len() > self.settings.max_message_size {
            return Err(too_large(COMPONENT, out.len(), self.settings.max_message_size));
        }
        Ok(out)
    }

    fn write_container(
        &self,
        out: &mut String,
        header: &Header,
        entries: &[NamedValue],
        depth: usize,
    ) -> CodecResult<()> {
        out.push_str("<container><header>");
        if !header.is_unrouted() {
            write_element(out, "target_id", &header.target_id);
            write_element(out, "target_sub_id", &header.target_sub_id);
            write_element(out, "source_id", &header.source_id);
            write_element(out, "source_sub_id", &header.source_sub_id);
        }
        write_element(out, "message_type", &header.message_type);
        write_element(out, "version", &header.version);
        out.push_str("</header><values>");

        for entry in entries {
            if !is_xml_name(&entry.name) {
                return Err(invalid_format(
                    COMPONENT,
                    format!("field name {:?} is not a valid XML tag", entry.name),
                ));
            }
            reserve_text(out, 2 * entry.name.len() + entry.value.size_hint() + 5, COMPONENT)?;
            open_tag(out, &entry.name);
            self.write_value(out, &entry.value, depth)?;
            close_tag(out, &entry.name);
        }

        out.push_str("</values></container>");
        Ok(())
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) -> CodecResult<()> {
        match value {
            Value::Container(child) => {
                let child_depth = self.nested_depth(depth)?;
                let (header, entries) = child.snapshot();
                self.write_container(out, &header, &entries, child_depth)
            }
            Value::Array(items) => {
                let child_depth = self.nested_depth(depth)?;
                for item in items {
                    out.push_str("<item>");
                    self.write_value(out, item, child_depth)?;
                    out.push_str("</item>");
                }
                Ok(())
            }
            scalar => {
                escape_into(out, &scalar.to_text());
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
}

fn open_tag(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_element(out: &mut String, name: &str, text: &str) {
    open_tag(out, name);
    escape_into(out, text);
    close_tag(out, name);
}

/// Entity escaping plus `&#xNN;` for control characters other than tab, LF, CR
pub fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => out.push_str(&format!("&#x{:02X};", c as u32)),
            c => out.push(c),
        }
    }
}

/// Letter or `_` first, then letters, digits, `-`, `.` or `_`
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

impl Codec for XmlCodec {
    fn format_id(&self) -> FormatId {
        FormatId::Xml
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>> {
        let text = self.encode_to_string(container)?;
        debug!(format = "xml", bytes = text.len(), "encoded container");
        Ok(text.into_bytes())
    }

    fn decode_as<S: StoragePolicy>(&self, _bytes: &[u8]) -> CodecResult<Container<S>> {
        Err(invalid_format(COMPONENT, "xml is a write-only format"))
    }
}
