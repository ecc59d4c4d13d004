//! # Vessel Codec - Wire Formats and Schema Validation
//!
//! ## Purpose
//!
//! Turns [`Container`](vessel_types::Container)s into bytes and back, and
//! checks decoded containers against declarative schemas:
//! - **Frame**: delimited text framing, `@header={{..}};@data={{..}};`
//! - **MessagePack**: hand-rolled, byte-exact MessagePack
//! - **JSON / XML**: write-only renderings for tooling and humans
//! - **Schema validation**: fail-fast and collect-all constraint checks
//!
//! ## Architecture Role
//!
//! ```text
//! vessel-types → [codec] → transport (not in this workspace)
//!      ↑            ↓
//!  Container    Codec::encode / decode
//!  Value        Schema::validate
//! ```
//!
//! ## Failure Policy
//!
//! Every entry point returns [`CodecResult`]; nothing panics on malformed
//! input. Truncated buffers are `DeserializationFailed`, unknown markers and
//! malformed frames are `InvalidFormat`, nesting beyond
//! [`CodecSettings::max_depth`](vessel_config::CodecSettings) and oversize
//! messages are `MaxSizeExceeded`, and allocation failure is
//! `MemoryAllocationFailed`. A failed decode never touches an existing
//! container.
//!
//! ## Example
//!
//! ```
//! use vessel_codec::{Codec, MessagePackCodec, Schema};
//! use vessel_types::{Container, ValueKind};
//!
//! let container: Container = Container::new();
//! container.set("name", "Alice");
//! container.set("active", true);
//!
//! let codec = MessagePackCodec::new();
//! let decoded = codec.decode(&codec.encode(&container).unwrap()).unwrap();
//! assert_eq!(decoded.get_as::<String>("name").unwrap(), "Alice");
//!
//! let schema = Schema::new().require("active", ValueKind::Bool);
//! assert!(schema.validate(&decoded).is_none());
//! ```

pub mod codec;
pub mod error;
pub mod frame;
pub mod instrument;
pub mod json;
pub mod msgpack;
pub mod validation;
pub mod xml;

pub use codec::{
    decode_auto, decode_into, decode_validated, detect_format, load_from_file, save_to_file, AnyCodec,
    Codec, FormatId,
};
pub use error::CodecResult;
pub use frame::FrameCodec;
pub use instrument::{Instrumented, NopHook, Operation, OperationHook, Outcome, TracingHook};
pub use json::JsonCodec;
pub use msgpack::{MessagePackCodec, MsgPackReader, MsgPackWriter};
pub use validation::{CustomValidator, Schema, ValidationError};
pub use xml::XmlCodec;
