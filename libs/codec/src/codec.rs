//! Codec contract, format detection and dispatch
//!
//! | format      | encode | decode | detected by                        |
//! |-------------|--------|--------|------------------------------------|
//! | frame       | yes    | yes    | `@header` / `@data` prefix         |
//! | MessagePack | yes    | yes    | map marker 0x80-0x8f, 0xde, 0xdf   |
//! | JSON        | yes    | no     | `{` or `[` after whitespace        |
//! | XML         | yes    | no     | `<` after whitespace               |
//!
//! JSON and XML are write-only: they render containers for humans and
//! downstream tooling, and their decode entry point reports `InvalidFormat`.
//!
//! [`save_to_file`] and [`load_from_file`] persist one encoded container per
//! file; I/O failures surface as the 40x file codes.

use crate::error::{invalid_format, CodecResult};
use crate::frame::FrameCodec;
use crate::json::JsonCodec;
use crate::msgpack::MessagePackCodec;
use crate::validation::Schema;
use crate::xml::XmlCodec;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use vessel_config::CodecSettings;
use vessel_types::{Container, ContainerError, ErrorCode, LinearStorage, StoragePolicy};

/// Wire format identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Frame,
    MessagePack,
    Json,
    Xml,
}

impl FormatId {
    pub const ALL: [FormatId; 4] = [
        FormatId::Frame,
        FormatId::MessagePack,
        FormatId::Json,
        FormatId::Xml,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatId::Frame => "frame",
            FormatId::MessagePack => "msgpack",
            FormatId::Json => "json",
            FormatId::Xml => "xml",
        }
    }

    pub fn supports_decode(self) -> bool {
        matches!(self, FormatId::Frame | FormatId::MessagePack)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode and decode containers for one wire format
///
/// Neither direction panics; every failure is a typed error and no partial
/// output is returned as success.
pub trait Codec {
    fn format_id(&self) -> FormatId;

    fn name(&self) -> &'static str {
        self.format_id().name()
    }

    fn supports_decode(&self) -> bool {
        self.format_id().supports_decode()
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>>;

    /// Decode into a container backed by `S`
    fn decode_as<S: StoragePolicy>(&self, bytes: &[u8]) -> CodecResult<Container<S>>;

    fn decode(&self, bytes: &[u8]) -> CodecResult<Container> {
        self.decode_as::<LinearStorage>(bytes)
    }
}

/// Statically dispatched codec selected at runtime by [`FormatId`]
#[derive(Debug, Clone)]
pub enum AnyCodec {
    Frame(FrameCodec),
    MessagePack(MessagePackCodec),
    Json(JsonCodec),
    Xml(XmlCodec),
}

impl AnyCodec {
    pub fn for_format(format: FormatId) -> Self {
        Self::with_settings(format, CodecSettings::default())
    }

    pub fn with_settings(format: FormatId, settings: CodecSettings) -> Self {
        match format {
            FormatId::Frame => AnyCodec::Frame(FrameCodec::with_settings(settings)),
            FormatId::MessagePack => {
                AnyCodec::MessagePack(MessagePackCodec::with_settings(settings))
            }
            FormatId::Json => AnyCodec::Json(JsonCodec::with_settings(settings)),
            FormatId::Xml => AnyCodec::Xml(XmlCodec::with_settings(settings)),
        }
    }
}

impl Codec for AnyCodec {
    fn format_id(&self) -> FormatId {
        match self {
            AnyCodec::Frame(c) => c.format_id(),
            AnyCodec::MessagePack(c) => c.format_id(),
            AnyCodec::Json(c) => c.format_id(),
            AnyCodec::Xml(c) => c.format_id(),
        }
    }

    fn encode<S: StoragePolicy>(&self, container: &Container<S>) -> CodecResult<Vec<u8>> {
        match self {
            AnyCodec::Frame(c) => c.encode(container),
            AnyCodec::MessagePack(c) => c.encode(container),
            AnyCodec::Json(c) => c.encode(container),
            AnyCodec::Xml(c) => c.encode(container),
        }
    }

    fn decode_as<S: StoragePolicy>(&self, bytes: &[u8]) -> CodecResult<Container<S>> {
        match self {
            AnyCodec::Frame(c) => c.decode_as(bytes),
            AnyCodec::MessagePack(c) => c.decode_as(bytes),
            AnyCodec::Json(c) => c.decode_as(bytes),
            AnyCodec::Xml(c) => c.decode_as(bytes),
        }
    }
}

/// Guess the wire format from the leading bytes
pub fn detect_format(bytes: &[u8]) -> Option<FormatId> {
    let first = *bytes.first()?;
    if (0x80..=0x8f).contains(&first) || first == 0xde || first == 0xdf {
        return Some(FormatId::MessagePack);
    }

    let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let rest = &bytes[start..];
    match rest[0] {
        b'{' | b'[' => Some(FormatId::Json),
        b'<' => Some(FormatId::Xml),
        _ if rest.starts_with(b"@header") || rest.starts_with(b"@data") => Some(FormatId::Frame),
        _ => None,
    }
}

/// Detect the format, then decode with default settings
pub fn decode_auto(bytes: &[u8]) -> CodecResult<Container> {
    let format =
        detect_format(bytes).ok_or_else(|| invalid_format("codec", "unrecognised format"))?;
    debug!(format = %format, bytes = bytes.len(), "format detected");
    AnyCodec::for_format(format).decode(bytes)
}

/// Decode `bytes` and install the result into `target`
///
/// `target` is left untouched when decoding fails.
pub fn decode_into<C: Codec, S: StoragePolicy>(
    codec: &C,
    bytes: &[u8],
    target: &Container<S>,
) -> CodecResult<()> {
    let decoded = codec.decode_as::<S>(bytes)?;
    target.replace_with(decoded);
    Ok(())
}

/// Decode `bytes`, keeping the result only if it satisfies `schema`
pub fn decode_validated<C: Codec>(codec: &C, bytes: &[u8], schema: &Schema) -> CodecResult<Container> {
    let decoded = codec.decode(bytes)?;
    match schema.validate(&decoded) {
        None => Ok(decoded),
        Some(violation) => Err(ContainerError::new(ErrorCode::SchemaValidationFailed, "schema")
            .with_detail(violation.to_string())),
    }
}

const FILE_COMPONENT: &str = "file";

fn file_error(code: ErrorCode, path: &Path, err: io::Error) -> ContainerError {
    warn!(path = %path.display(), error = %err, "container file I/O failed");
    ContainerError::new(code, FILE_COMPONENT).with_detail(format!("{}: {err}", path.display()))
}

/// Encode `container` with `codec` and write it to `path`, replacing any existing file
pub fn save_to_file<C: Codec, S: StoragePolicy>(
    codec: &C,
    container: &Container<S>,
    path: impl AsRef<Path>,
) -> CodecResult<()> {
    let path = path.as_ref();
    let bytes = codec.encode(container)?;
    fs::write(path, &bytes).map_err(|e| file_error(ErrorCode::FileWriteError, path, e))?;
    debug!(format = %codec.format_id(), bytes = bytes.len(), path = %path.display(), "container saved");
    Ok(())
}

/// Read `path` and decode its contents with `codec`
pub fn load_from_file<C: Codec>(codec: &C, path: impl AsRef<Path>) -> CodecResult<Container> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        let code = match e.kind() {
            io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            _ => ErrorCode::FileReadError,
        };
        file_error(code, path, e)
    })?;
    debug!(format = %codec.format_id(), bytes = bytes.len(), path = %path.display(), "container loaded");
    codec.decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vessel_types::{Value, ValueKind};

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&[0x82, 0xa6]), Some(FormatId::MessagePack));
        assert_eq!(detect_format(&[0xde, 0x00, 0x02]), Some(FormatId::MessagePack));
        assert_eq!(detect_format(b"  {\"header\":{}}"), Some(FormatId::Json));
        assert_eq!(detect_format(b"[1]"), Some(FormatId::Json));
        assert_eq!(detect_format(b"\n<container/>"), Some(FormatId::Xml));
        assert_eq!(detect_format(b"@header={{}};"), Some(FormatId::Frame));
        assert_eq!(detect_format(b"@data={{}};"), Some(FormatId::Frame));
        assert_eq!(detect_format(b"hello"), None);
        assert_eq!(detect_format(b"   "), None);
        assert_eq!(detect_format(b""), None);
    }

    #[test]
    fn test_any_codec_dispatch() {
        for format in FormatId::ALL {
            let codec = AnyCodec::for_format(format);
            assert_eq!(codec.format_id(), format);
            assert_eq!(codec.supports_decode(), format.supports_decode());
        }
    }

    #[test]
    fn test_decode_auto_for_both_binary_formats() {
        let container: Container = Container::new();
        container.set("id", 7i32);

        for format in [FormatId::Frame, FormatId::MessagePack] {
            let bytes = AnyCodec::for_format(format).encode(&container).unwrap();
            let decoded = decode_auto(&bytes).unwrap();
            assert_eq!(decoded.get("id"), Some(Value::Int(7)));
        }

        let json = AnyCodec::for_format(FormatId::Json).encode(&container).unwrap();
        assert_eq!(decode_auto(&json).unwrap_err().code, ErrorCode::InvalidFormat);
        assert_eq!(decode_auto(b"???").unwrap_err().code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_failed_decode_into_leaves_target_untouched() {
        let target: Container = Container::new();
        target.set("keep", true);

        let codec = FrameCodec::new();
        let err = decode_into(&codec, b"@data={{[broken", &target).unwrap_err();
        assert_eq!(err.component, "frame");
        assert_eq!(target.get("keep"), Some(Value::Bool(true)));

        let source: Container = Container::new();
        source.set("fresh", 1i32);
        let bytes = codec.encode(&source).unwrap();
        decode_into(&codec, &bytes, &target).unwrap();
        assert!(!target.contains("keep"));
        assert_eq!(target.get("fresh"), Some(Value::Int(1)));
    }

    #[test]
    fn test_decode_validated() {
        let schema = Schema::new().require("age", ValueKind::Int).range("age", 0, 150);
        let codec = MessagePackCodec::new();

        let ok: Container = Container::new();
        ok.set("age", 40i32);
        let decoded = decode_validated(&codec, &codec.encode(&ok).unwrap(), &schema).unwrap();
        assert_eq!(decoded.get("age"), Some(Value::Int(40)));

        let bad: Container = Container::new();
        bad.set("age", 200i32);
        let err = decode_validated(&codec, &codec.encode(&bad).unwrap(), &schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaValidationFailed);
        assert!(err.detail.unwrap().contains("age"));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempdir().unwrap();
        let container: Container = Container::new();
        container.set_message_type("snapshot");
        container.set("count", 3i32);

        for format in [FormatId::Frame, FormatId::MessagePack] {
            let codec = AnyCodec::for_format(format);
            let path = dir.path().join(format!("container.{format}"));
            save_to_file(&codec, &container, &path).unwrap();

            let loaded = load_from_file(&codec, &path).unwrap();
            assert_eq!(loaded.message_type(), "snapshot", "{format}");
            assert_eq!(loaded.get("count"), Some(Value::Int(3)), "{format}");
        }
    }

    #[test]
    fn test_file_errors_map_to_file_codes() {
        let dir = tempdir().unwrap();
        let codec = FrameCodec::new();

        let err = load_from_file(&codec, dir.path().join("absent.frame")).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert_eq!(err.component, "file");

        // A directory exists but cannot be read as a file
        let err = load_from_file(&codec, dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileReadError);

        let container: Container = Container::new();
        let err = save_to_file(&codec, &container, dir.path().join("missing").join("out.frame"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FileWriteError);

        // Decode failures keep their codec code
        let garbage = dir.path().join("garbage.frame");
        fs::write(&garbage, b"@data={{[broken").unwrap();
        assert_eq!(load_from_file(&codec, &garbage).unwrap_err().component, "frame");
    }
}
