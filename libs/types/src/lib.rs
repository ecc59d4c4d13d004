//! # Vessel Types
//!
//! Typed, self-describing value container.
//!
//! ## Design Philosophy
//!
//! - **Tag follows payload**: a [`Value`]'s kind is derived from its active arm,
//!   never stored separately, so kind and data cannot disagree
//! - **Static policy dispatch**: [`Container`] is generic over a
//!   [`StoragePolicy`]; linear, indexed and kind-restricted storage share one
//!   contract
//! - **One lock per container**: readers share, writers serialize, nested
//!   containers are independent lock domains
//! - **Two API tiers**: optional-returning legacy methods and `*_result`
//!   methods sit on one fallible core
//!
//! ## Quick Start
//!
//! ```rust
//! use vessel_types::{Container, Long, Value};
//!
//! let container: Container = Container::new();
//! container.set_source("client", "1");
//! container.set("name", "Alice");
//! container.set("visits", Long(12));
//!
//! assert_eq!(container.get_as::<String>("name").unwrap(), "Alice");
//! assert_eq!(container.get("visits"), Some(Value::Long(12)));
//! assert!(container.get_as::<i64>("visits").is_err());
//! ```
//!
//! ## Picking a policy
//!
//! ```rust
//! use vessel_types::{IndexedContainer, NumericKinds, RestrictedContainer};
//!
//! let wide = IndexedContainer::new();
//! for i in 0..500 {
//!     wide.set(format!("f{i}"), i as i32);
//! }
//!
//! let numbers = RestrictedContainer::<NumericKinds>::new();
//! numbers.set("ratio", 0.5f64);
//! numbers.set("label", "dropped");
//! assert_eq!(numbers.len(), 1);
//! ```

pub mod constants;
pub mod container;
pub mod error;
pub mod header;
pub mod kind;
pub mod storage;
pub mod value;
pub mod wire;

pub use constants::{
    DATA_CONTAINER_MESSAGE_TYPE, DEFAULT_VERSION, MAX_NESTING_DEPTH,
};
pub use container::Container;
pub use error::{ContainerError, ErrorCategory, ErrorCode, Result, CONTAINER_COMPONENT};
pub use header::Header;
pub use kind::ValueKind;
pub use storage::{
    IndexedStorage, IntegerKinds, KindSet, LinearStorage, NumericKinds,
    RestrictedStorage, ScalarKinds, StoragePolicy, TextKinds,
};
pub use value::{FromValue, Long, NamedValue, SharedContainer, ULong, Value};
pub use wire::WireAdapter;

/// Container backed by [`LinearStorage`]
pub type LinearContainer = Container<LinearStorage>;

/// Container backed by [`IndexedStorage`]
pub type IndexedContainer = Container<IndexedStorage>;

/// Container admitting only the kinds of `K`
pub type RestrictedContainer<K> = Container<RestrictedStorage<K>>;
