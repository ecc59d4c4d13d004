//! Header and nesting constants shared by every codec

/// Message type marking an unrouted container; routing ids are omitted on the wire
pub const DATA_CONTAINER_MESSAGE_TYPE: &str = "data_container";

/// Version string a fresh header carries
pub const DEFAULT_VERSION: &str = "1.0";

/// Maximum nesting depth for container-in-container recursion
pub const MAX_NESTING_DEPTH: usize = 32;

/// Header field identifiers used by the frame codec
pub mod header_field {
    pub const TARGET_ID: u8 = 1;
    pub const TARGET_SUB_ID: u8 = 2;
    pub const SOURCE_ID: u8 = 3;
    pub const SOURCE_SUB_ID: u8 = 4;
    pub const MESSAGE_TYPE: u8 = 5;
    pub const VERSION: u8 = 6;
}
