//! Hand-written scanner for the frame format
//!
//! ```text
//! frame   := ws [ "@header" ws "=" ws "{{" item* "}}" ";" ] ws
//!               [ "@data"   ws "=" ws "{{" item* "}}" ";" ] ws
//! header  := "[" field_id "," text "]" ";"
//! data    := "[" name "," kind_code "," value "]" ";"
//! value   := text                       scalar kinds
//!          | length ":" raw             container (child frame) and array
//! element := "[" index "," kind_code "," value "]" ";"
//! ```

use super::escape::{unescape_char, ESCAPE};
use super::COMPONENT;
use crate::error::{corrupted, depth_exceeded, invalid_format, truncated, CodecResult};
use vessel_types::constants::header_field;
use vessel_types::{Container, Header, NamedValue, Value, ValueKind};

pub(super) struct FrameParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> FrameParser<'a> {
    pub(super) fn new(src: &'a str, depth: usize, max_depth: usize) -> Self {
        Self {
            src,
            pos: 0,
            depth,
            max_depth,
        }
    }

    /// Parse a complete frame into header and entries
    pub(super) fn parse_frame(mut self) -> CodecResult<(Header, Vec<NamedValue>)> {
        let mut header = Header::default();
        let mut entries = Vec::new();
        let mut sections = 0;

        self.skip_ws();
        if self.eat("@header") {
            self.open_section()?;
            while !self.at_section_end() {
                self.parse_header_item(&mut header)?;
            }
            self.close_section()?;
            sections += 1;
        }

        self.skip_ws();
        if self.eat("@data") {
            self.open_section()?;
            while !self.at_section_end() {
                entries.push(self.parse_data_item()?);
            }
            self.close_section()?;
            sections += 1;
        }

        self.skip_ws();
        if sections == 0 {
            return Err(invalid_format(COMPONENT, "expected @header or @data section"));
        }
        if self.pos != self.src.len() {
            return Err(invalid_format(
                COMPONENT,
                format!("unexpected trailing input at offset {}", self.pos),
            ));
        }
        Ok((header, entries))
    }

    /// Parse an array element list spanning the whole input
    fn parse_elements(mut self) -> CodecResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.pos == self.src.len() {
                return Ok(items);
            }
            self.expect("[")?;
            let index = self.read_field()?;
            if index.parse::<usize>().ok() != Some(items.len()) {
                return Err(corrupted(
                    COMPONENT,
                    format!("array element {index:?} out of sequence, expected {}", items.len()),
                ));
            }
            self.expect(",")?;
            let kind = self.read_kind()?;
            self.expect(",")?;
            items.push(self.read_value(kind)?);
            self.expect("]")?;
            self.expect(";")?;
        }
    }

    fn parse_header_item(&mut self, header: &mut Header) -> CodecResult<()> {
        self.expect("[")?;
        let id = self.read_field()?;
        self.expect(",")?;
        let value = self.read_field()?;
        self.expect("]")?;
        self.expect(";")?;

        let id: u8 = id
            .trim()
            .parse()
            .map_err(|_| invalid_format(COMPONENT, format!("bad header field id {id:?}")))?;
        match id {
            header_field::TARGET_ID => header.target_id = value,
            header_field::TARGET_SUB_ID => header.target_sub_id = value,
            header_field::SOURCE_ID => header.source_id = value,
            header_field::SOURCE_SUB_ID => header.source_sub_id = value,
            header_field::MESSAGE_TYPE => header.message_type = value,
            header_field::VERSION => header.version = value,
            // Unknown ids are skipped for forward compatibility
            _ => {}
        }
        Ok(())
    }

    fn parse_data_item(&mut self) -> CodecResult<NamedValue> {
        self.expect("[")?;
        let name = self.read_field()?;
        self.expect(",")?;
        let kind = self.read_kind()?;
        self.expect(",")?;
        let value = self.read_value(kind)?;
        self.expect("]")?;
        self.expect(";")?;
        Ok(NamedValue { name, value })
    }

    fn read_kind(&mut self) -> CodecResult<ValueKind> {
        let code = self.read_field()?;
        code.trim()
            .parse::<u8>()
            .ok()
            .and_then(ValueKind::from_code)
            .ok_or_else(|| invalid_format(COMPONENT, format!("unknown kind code {code:?}")))
    }

    fn read_value(&mut self, kind: ValueKind) -> CodecResult<Value> {
        match kind {
            ValueKind::Container => {
                let raw = self.read_sized()?;
                let child_depth = self.nested_depth()?;
                let (header, entries) =
                    FrameParser::new(raw, child_depth, self.max_depth).parse_frame()?;
                let child: Container = Container::with_header(header);
                child.set_all_result(entries)?;
                Ok(Value::Container(child.into_shared()))
            }
            ValueKind::Array => {
                let raw = self.read_sized()?;
                let child_depth = self.nested_depth()?;
                let items = FrameParser::new(raw, child_depth, self.max_depth).parse_elements()?;
                Ok(Value::Array(items))
            }
            scalar => {
                let text = self.read_field()?;
                Value::from_raw(scalar, &text).map_err(|mut err| {
                    err.component = COMPONENT;
                    err
                })
            }
        }
    }

    fn nested_depth(&self) -> CodecResult<usize> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(depth_exceeded(COMPONENT, depth, self.max_depth));
        }
        Ok(depth)
    }

    /// `<len>:` followed by exactly `len` bytes of raw text
    fn read_sized(&mut self) -> CodecResult<&'a str> {
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let len: usize = self.src[digits_start..self.pos]
            .parse()
            .map_err(|_| invalid_format(COMPONENT, "missing length prefix"))?;
        self.expect(":")?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.src.len())
            .ok_or_else(|| truncated(COMPONENT, len, self.src.len() - self.pos, "nested value"))?;
        let raw = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| corrupted(COMPONENT, "length prefix splits a character"))?;
        self.pos = end;
        Ok(raw)
    }

    /// Unescaped text up to the next unescaped `,` or `]`
    fn read_field(&mut self) -> CodecResult<String> {
        let mut out = String::new();
        let mut chars = self.src[self.pos..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                ',' | ']' => {
                    self.pos += offset;
                    return Ok(out);
                }
                ESCAPE => match chars.next() {
                    Some((_, escaped)) => out.push(unescape_char(escaped)),
                    None => break,
                },
                c => out.push(c),
            }
        }
        let remaining = self.src.len() - self.pos;
        Err(truncated(COMPONENT, remaining + 1, remaining, "field"))
    }

    fn open_section(&mut self) -> CodecResult<()> {
        self.skip_ws();
        self.expect("=")?;
        self.skip_ws();
        self.expect("{{")
    }

    fn at_section_end(&mut self) -> bool {
        self.skip_ws();
        self.src[self.pos..].starts_with("}}") || self.pos == self.src.len()
    }

    fn close_section(&mut self) -> CodecResult<()> {
        self.expect("}}")?;
        self.expect(";")
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += self.peek().map_or(0, char::len_utf8);
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> CodecResult<()> {
        if self.eat(token) {
            return Ok(());
        }
        if self.src.len() - self.pos < token.len() && token.starts_with(&self.src[self.pos..]) {
            return Err(truncated(COMPONENT, token.len(), self.src.len() - self.pos, "frame"));
        }
        Err(invalid_format(
            COMPONENT,
            format!("expected {token:?} at offset {}", self.pos),
        ))
    }
}
