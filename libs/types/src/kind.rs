//! Value kind tags
//!
//! The closed set of kinds a [`Value`](crate::Value) can carry. The numeric
//! codes follow payload-arm order and are what the frame codec writes on the
//! wire, so they must never be renumbered.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Tag naming which payload arm of a [`Value`](crate::Value) is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ValueKind {
    Null = 0,
    Bool = 1,
    Short = 2,
    UShort = 3,
    Int = 4,
    UInt = 5,
    Long = 6,
    ULong = 7,
    LLong = 8,
    ULLong = 9,
    Float = 10,
    Double = 11,
    String = 12,
    Bytes = 13,
    Container = 14,
    Array = 15,
}

impl ValueKind {
    /// Every kind, in code order
    pub const ALL: [ValueKind; 16] = [
        ValueKind::Null,
        ValueKind::Bool,
        ValueKind::Short,
        ValueKind::UShort,
        ValueKind::Int,
        ValueKind::UInt,
        ValueKind::Long,
        ValueKind::ULong,
        ValueKind::LLong,
        ValueKind::ULLong,
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::String,
        ValueKind::Bytes,
        ValueKind::Container,
        ValueKind::Array,
    ];

    /// Numeric wire code (0-15)
    #[inline]
    pub fn code(self) -> u8 {
        self.into()
    }

    /// Look up a kind by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::try_from(code).ok()
    }

    /// Stable lower-case name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Short => "short",
            ValueKind::UShort => "ushort",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Long => "long",
            ValueKind::ULong => "ulong",
            ValueKind::LLong => "llong",
            ValueKind::ULLong => "ullong",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Container => "container",
            ValueKind::Array => "array",
        }
    }

    /// Inverse of [`ValueKind::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// True for the eight integer kinds
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::Short
                | ValueKind::UShort
                | ValueKind::Int
                | ValueKind::UInt
                | ValueKind::Long
                | ValueKind::ULong
                | ValueKind::LLong
                | ValueKind::ULLong
        )
    }

    /// True for `float` and `double`
    pub fn is_float(self) -> bool {
        matches!(self, ValueKind::Float | ValueKind::Double)
    }

    /// Payload is stored inline (no heap buffer or shared handle)
    pub fn is_inline(self) -> bool {
        !matches!(
            self,
            ValueKind::String | ValueKind::Bytes | ValueKind::Container | ValueKind::Array
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_payload_order() {
        for (index, kind) in ValueKind::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, index);
            assert_eq!(ValueKind::from_code(index as u8), Some(*kind));
        }
        assert_eq!(ValueKind::from_code(16), None);
    }

    #[test]
    fn test_name_lookup() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ValueKind::from_name("decimal"), None);
    }

    #[test]
    fn test_classification() {
        assert!(ValueKind::ULLong.is_integer());
        assert!(!ValueKind::Double.is_integer());
        assert!(ValueKind::Float.is_float());
        assert!(ValueKind::Bool.is_inline());
        assert!(!ValueKind::Bytes.is_inline());
    }
}
