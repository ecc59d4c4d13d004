//! Codec failure constructors
//!
//! Every codec reports failures as [`ContainerError`] tagged with its own
//! component name, so a caller can tell a truncated MessagePack buffer from a
//! malformed frame without matching on strings.

use std::collections::TryReserveError;
use tracing::warn;
use vessel_types::{ContainerError, ErrorCode};

/// Result type for encode, decode and validation entry points
pub type CodecResult<T> = std::result::Result<T, ContainerError>;

pub(crate) fn invalid_format(component: &'static str, detail: impl Into<String>) -> ContainerError {
    ContainerError::new(ErrorCode::InvalidFormat, component).with_detail(detail)
}

pub(crate) fn corrupted(component: &'static str, detail: impl Into<String>) -> ContainerError {
    ContainerError::new(ErrorCode::CorruptedData, component).with_detail(detail)
}

/// Input ended before a declared length was satisfied
pub(crate) fn truncated(
    component: &'static str,
    need: usize,
    got: usize,
    context: &str,
) -> ContainerError {
    ContainerError::new(ErrorCode::DeserializationFailed, component)
        .with_detail(format!("truncated {context}: need {need} bytes, got {got}"))
}

pub(crate) fn encoding(component: &'static str, detail: impl Into<String>) -> ContainerError {
    ContainerError::new(ErrorCode::EncodingError, component).with_detail(detail)
}

pub(crate) fn depth_exceeded(component: &'static str, depth: usize, limit: usize) -> ContainerError {
    warn!(component, depth, limit, "nesting depth limit reached");
    ContainerError::new(ErrorCode::MaxSizeExceeded, component)
        .with_detail(format!("nesting depth {depth} exceeds limit {limit}"))
}

pub(crate) fn too_large(component: &'static str, size: usize, limit: usize) -> ContainerError {
    warn!(component, size, limit, "message size limit reached");
    ContainerError::new(ErrorCode::MaxSizeExceeded, component)
        .with_detail(format!("message of {size} bytes exceeds limit {limit}"))
}

pub(crate) fn allocation(component: &'static str, err: TryReserveError) -> ContainerError {
    ContainerError::allocation(component, err)
}

/// Reserve output space, mapping failure to `MemoryAllocationFailed`
pub(crate) fn reserve_bytes(
    buf: &mut Vec<u8>,
    additional: usize,
    component: &'static str,
) -> CodecResult<()> {
    buf.try_reserve(additional)
        .map_err(|e| allocation(component, e))
}

pub(crate) fn reserve_text(
    buf: &mut String,
    additional: usize,
    component: &'static str,
) -> CodecResult<()> {
    buf.try_reserve(additional)
        .map_err(|e| allocation(component, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_carry_component_and_code() {
        let err = truncated("msgpack", 8, 3, "float64");
        assert_eq!(err.code, ErrorCode::DeserializationFailed);
        assert_eq!(err.component, "msgpack");
        assert_eq!(
            err.to_string(),
            "msgpack: Deserialization failed [201]: truncated float64: need 8 bytes, got 3"
        );

        assert_eq!(depth_exceeded("frame", 33, 32).code, ErrorCode::MaxSizeExceeded);
        assert_eq!(invalid_format("xml", "bad tag").code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_reserve_failure_is_allocation_error() {
        let mut buf = Vec::new();
        let err = reserve_bytes(&mut buf, usize::MAX, "json").unwrap_err();
        assert_eq!(err.code, ErrorCode::MemoryAllocationFailed);
    }
}
