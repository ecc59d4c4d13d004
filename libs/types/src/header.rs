//! Routing header
//!
//! Source/target identifiers and message metadata carried alongside a
//! container's values. The header is independent of the value set and is only
//! ever changed through its own setters.

use crate::constants::{DATA_CONTAINER_MESSAGE_TYPE, DEFAULT_VERSION};

/// Routing metadata for a container
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub source_id: String,
    pub source_sub_id: String,
    pub target_id: String,
    pub target_sub_id: String,
    pub message_type: String,
    pub version: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            source_id: String::new(),
            source_sub_id: String::new(),
            target_id: String::new(),
            target_sub_id: String::new(),
            message_type: DATA_CONTAINER_MESSAGE_TYPE.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_source(&mut self, id: impl Into<String>, sub_id: impl Into<String>) {
        self.source_id = id.into();
        self.source_sub_id = sub_id.into();
    }

    pub fn set_target(&mut self, id: impl Into<String>, sub_id: impl Into<String>) {
        self.target_id = id.into();
        self.target_sub_id = sub_id.into();
    }

    pub fn set_message_type(&mut self, message_type: impl Into<String>) {
        self.message_type = message_type.into();
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Exchange the source and target pairs
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.source_id, &mut self.target_id);
        std::mem::swap(&mut self.source_sub_id, &mut self.target_sub_id);
    }

    /// True when routing ids are left off the wire
    pub fn is_unrouted(&self) -> bool {
        self.message_type == DATA_CONTAINER_MESSAGE_TYPE
    }

    /// Approximate heap usage of the header strings
    pub fn heap_size(&self) -> usize {
        self.source_id.capacity()
            + self.source_sub_id.capacity()
            + self.target_id.capacity()
            + self.target_sub_id.capacity()
            + self.message_type.capacity()
            + self.version.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_is_unrouted() {
        let header = Header::default();
        assert_eq!(header.message_type, "data_container");
        assert_eq!(header.version, "1.0");
        assert!(header.is_unrouted());
        assert!(header.source_id.is_empty());
    }

    #[test]
    fn test_swap_exchanges_pairs() {
        let mut header = Header::new();
        header.set_source("client", "1");
        header.set_target("server", "main");
        header.swap();
        assert_eq!(header.source_id, "server");
        assert_eq!(header.source_sub_id, "main");
        assert_eq!(header.target_id, "client");
        assert_eq!(header.target_sub_id, "1");
    }
}
