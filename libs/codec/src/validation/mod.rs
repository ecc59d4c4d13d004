//! # Schema Validation
//!
//! ## Purpose
//!
//! Declarative field constraints checked against a container before it is
//! accepted, typically right after decoding externally sourced bytes.
//!
//! ## Check Order
//!
//! ```text
//! presence → kind → range → length → pattern → allowed values → custom → nested schema
//!    ↓         ↓
//! missing   mismatch stops the remaining checks for that field
//! optional
//! = valid
//! ```
//!
//! - **Fail-fast** ([`Schema::validate`]): first violation in field-definition order
//! - **Collect-all** ([`Schema::validate_all`]): every violation; a failing
//!   nested schema adds one `nested_validation_failed` entry followed by the
//!   child errors renamed `parent.child`
//!
//! Violation codes are the 310-317 band of [`ErrorCode`](vessel_types::ErrorCode).

mod error;
mod schema;

pub use error::{ValidationError, SCHEMA_COMPONENT};
pub use schema::{CustomValidator, Schema};
