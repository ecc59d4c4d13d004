//! Value payloads and named values
//!
//! [`Value`] is the tagged payload: exactly one arm is active and its
//! [`ValueKind`] is derived from the arm, so a tag can never disagree with the
//! data it describes. Scalars live inline, text and bytes own their buffers and
//! nested containers are shared through an [`Arc`].
//!
//! ## Text rendering
//!
//! [`Value::to_text`] is the renderer the text formats build on:
//!
//! | kind              | rendering                                         |
//! |-------------------|---------------------------------------------------|
//! | null              | empty string                                      |
//! | bool              | `true` / `false`                                  |
//! | integers          | decimal                                           |
//! | float / double    | shortest round-trip decimal, `inf`, `-inf`, `NaN` |
//! | string            | verbatim                                          |
//! | bytes             | lower-case hex                                    |
//! | container / array | empty string (structured callers special-case)    |

use crate::container::Container;
use crate::error::{ContainerError, ErrorCode, Result, CONTAINER_COMPONENT};
use crate::kind::ValueKind;
use std::sync::Arc;

/// Shared handle to a nested container
///
/// Always the default linear policy. An indexed or restricted container is
/// nested by copying its entries into a [`Container`] first.
pub type SharedContainer = Arc<Container>;

/// Marker for the 32-bit signed `long` kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Long(pub i32);

/// Marker for the 32-bit unsigned `ulong` kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ULong(pub u32);

/// Tagged value payload
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i32),
    ULong(u32),
    LLong(i64),
    ULLong(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Nested child, linear storage only
    Container(SharedContainer),
    Array(Vec<Value>),
}

impl Value {
    /// Kind tag of the active arm
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Short(_) => ValueKind::Short,
            Value::UShort(_) => ValueKind::UShort,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Long(_) => ValueKind::Long,
            Value::ULong(_) => ValueKind::ULong,
            Value::LLong(_) => ValueKind::LLong,
            Value::ULLong(_) => ValueKind::ULLong,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Container(_) => ValueKind::Container,
            Value::Array(_) => ValueKind::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Build a scalar payload of `kind` from its text rendering
    ///
    /// Inverse of [`Value::to_text`] for every kind except `container` and
    /// `array`, whose structure the text renderer does not carry.
    pub fn from_raw(kind: ValueKind, raw: &str) -> Result<Value> {
        let parse_err = || {
            ContainerError::new(ErrorCode::ValueParseFailed, CONTAINER_COMPONENT)
                .with_detail(format!("cannot read {kind} from {raw:?}"))
        };

        let value = match kind {
            ValueKind::Null => Value::Null,
            ValueKind::Bool => match raw {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => return Err(parse_err()),
            },
            ValueKind::Short => Value::Short(raw.parse().map_err(|_| parse_err())?),
            ValueKind::UShort => Value::UShort(raw.parse().map_err(|_| parse_err())?),
            ValueKind::Int => Value::Int(raw.parse().map_err(|_| parse_err())?),
            ValueKind::UInt => Value::UInt(raw.parse().map_err(|_| parse_err())?),
            ValueKind::Long => Value::Long(raw.parse().map_err(|_| parse_err())?),
            ValueKind::ULong => Value::ULong(raw.parse().map_err(|_| parse_err())?),
            ValueKind::LLong => Value::LLong(raw.parse().map_err(|_| parse_err())?),
            ValueKind::ULLong => Value::ULLong(raw.parse().map_err(|_| parse_err())?),
            ValueKind::Float => Value::Float(raw.parse().map_err(|_| parse_err())?),
            ValueKind::Double => Value::Double(raw.parse().map_err(|_| parse_err())?),
            ValueKind::String => Value::String(raw.to_string()),
            ValueKind::Bytes => Value::Bytes(hex::decode(raw).map_err(|_| parse_err())?),
            ValueKind::Container | ValueKind::Array => {
                return Err(ContainerError::new(ErrorCode::InvalidValue, CONTAINER_COMPONENT)
                    .with_detail(format!("{kind} has no scalar text form")))
            }
        };
        Ok(value)
    }

    /// Human-readable rendering, see the module table
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::UShort(v) => v.to_string(),
            Value::Int(v) | Value::Long(v) => v.to_string(),
            Value::UInt(v) | Value::ULong(v) => v.to_string(),
            Value::LLong(v) => v.to_string(),
            Value::ULLong(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Bytes(v) => hex::encode(v),
            Value::Container(_) | Value::Array(_) => String::new(),
        }
    }

    /// Byte-length estimate for capacity planning
    pub fn size_hint(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Short(_) | Value::UShort(_) => 2,
            Value::Int(_) | Value::UInt(_) | Value::Long(_) | Value::ULong(_) | Value::Float(_) => 4,
            Value::LLong(_) | Value::ULLong(_) | Value::Double(_) => 8,
            Value::String(s) => s.len(),
            Value::Bytes(b) => b.len(),
            Value::Container(_) => std::mem::size_of::<usize>(),
            Value::Array(items) => items.iter().map(Value::size_hint).sum(),
        }
    }

    /// Signed integer view; `None` for non-integers and u64 values above i64::MAX
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Short(v) => Some(v as i64),
            Value::UShort(v) => Some(v as i64),
            Value::Int(v) | Value::Long(v) => Some(v as i64),
            Value::UInt(v) | Value::ULong(v) => Some(v as i64),
            Value::LLong(v) => Some(v),
            Value::ULLong(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Unsigned integer view; `None` for non-integers and negative values
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::UShort(v) => Some(v as u64),
            Value::UInt(v) | Value::ULong(v) => Some(v as u64),
            Value::ULLong(v) => Some(v),
            Value::Short(_) | Value::Int(_) | Value::Long(_) | Value::LLong(_) => {
                self.as_i64().and_then(|v| u64::try_from(v).ok())
            }
            _ => None,
        }
    }

    /// Floating-point view of `float` and `double`
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&SharedContainer> {
        match self {
            Value::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::UShort(a), Value::UShort(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::ULong(a), Value::ULong(b)) => a == b,
            (Value::LLong(a), Value::LLong(b)) => a == b,
            (Value::ULLong(a), Value::ULLong(b)) => a == b,
            // Bitwise so NaN payloads compare equal to themselves
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Container(a), Value::Container(b)) => Arc::ptr_eq(a, b) || **a == **b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $arm:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$arm(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => LLong,
    u64 => ULLong,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    SharedContainer => Container,
    Vec<Value> => Array,
}

impl From<Long> for Value {
    fn from(v: Long) -> Self {
        Value::Long(v.0)
    }
}

impl From<ULong> for Value {
    fn from(v: ULong) -> Self {
        Value::ULong(v.0)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Container> for Value {
    fn from(v: Container) -> Self {
        Value::Container(Arc::new(v))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// Exact-kind extraction used by the typed accessors
///
/// No numeric widening: an `int` field read as `i64` is a type mismatch.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $arm:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const KIND: ValueKind = ValueKind::$arm;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$arm(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => LLong,
    u64 => ULLong,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    SharedContainer => Container,
    Vec<Value> => Array,
}

impl FromValue for Long {
    const KIND: ValueKind = ValueKind::Long;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Long(v) => Some(Long(*v)),
            _ => None,
        }
    }
}

impl FromValue for ULong {
    const KIND: ValueKind = ValueKind::ULong;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::ULong(v) => Some(ULong(*v)),
            _ => None,
        }
    }
}

/// A value stored under a name in a container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Kind of the held payload
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Estimated bytes held by this entry, name included
    pub fn footprint(&self) -> usize {
        std::mem::size_of::<NamedValue>()
            + self.name.capacity()
            + match &self.value {
                Value::String(s) => s.capacity(),
                Value::Bytes(b) => b.capacity(),
                Value::Array(items) => items.capacity() * std::mem::size_of::<Value>(),
                _ => 0,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_payload() {
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(7i16).kind(), ValueKind::Short);
        assert_eq!(Value::from(7u16).kind(), ValueKind::UShort);
        assert_eq!(Value::from(7i32).kind(), ValueKind::Int);
        assert_eq!(Value::from(Long(7)).kind(), ValueKind::Long);
        assert_eq!(Value::from(ULong(7)).kind(), ValueKind::ULong);
        assert_eq!(Value::from(7i64).kind(), ValueKind::LLong);
        assert_eq!(Value::from(7u64).kind(), ValueKind::ULLong);
        assert_eq!(Value::from(1.5f32).kind(), ValueKind::Float);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::from(vec![1u8, 2]).kind(), ValueKind::Bytes);
        assert_eq!(Value::from(Container::<crate::LinearStorage>::new()).kind(), ValueKind::Container);
        assert_eq!(Value::from(vec![Value::Null]).kind(), ValueKind::Array);
        assert_eq!(Value::from(()).kind(), ValueKind::Null);
    }

    #[test]
    fn test_text_rendering() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Bool(false).to_text(), "false");
        assert_eq!(Value::Short(-12).to_text(), "-12");
        assert_eq!(Value::ULLong(u64::MAX).to_text(), "18446744073709551615");
        assert_eq!(Value::Double(2.5).to_text(), "2.5");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_text(), "-inf");
        assert_eq!(Value::Float(f32::NAN).to_text(), "NaN");
        assert_eq!(Value::from("héllo").to_text(), "héllo");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_text(), "dead");
        assert_eq!(Value::from(Container::<crate::LinearStorage>::new()).to_text(), "");
        assert_eq!(Value::Array(vec![Value::Int(1)]).to_text(), "");
    }

    #[test]
    fn test_from_raw_inverts_text() {
        let samples = [
            Value::Null,
            Value::Bool(true),
            Value::Short(i16::MIN),
            Value::UShort(u16::MAX),
            Value::Int(i32::MIN),
            Value::UInt(u32::MAX),
            Value::Long(i32::MAX),
            Value::ULong(0),
            Value::LLong(i64::MIN),
            Value::ULLong(u64::MAX),
            Value::Float(f32::MIN_POSITIVE),
            Value::Double(f64::MAX),
            Value::Double(f64::INFINITY),
            Value::Double(f64::NAN),
            Value::from("plain"),
            Value::Bytes(vec![0, 1, 254, 255]),
        ];
        for value in samples {
            let parsed = Value::from_raw(value.kind(), &value.to_text()).unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_from_raw_rejects_garbage() {
        let err = Value::from_raw(ValueKind::Int, "forty").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueParseFailed);
        assert!(Value::from_raw(ValueKind::Short, "40000").is_err());
        assert!(Value::from_raw(ValueKind::Bool, "yes").is_err());
        assert_eq!(
            Value::from_raw(ValueKind::Container, "").unwrap_err().code,
            ErrorCode::InvalidValue
        );
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::UInt(5).as_i64(), Some(5));
        assert_eq!(Value::ULLong(u64::MAX).as_i64(), None);
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::LLong(9).as_u64(), Some(9));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::from("1").as_i64(), None);
    }

    #[test]
    fn test_size_hint() {
        assert_eq!(Value::Null.size_hint(), 0);
        assert_eq!(Value::UShort(1).size_hint(), 2);
        assert_eq!(Value::Double(1.0).size_hint(), 8);
        assert_eq!(Value::from("abcd").size_hint(), 4);
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Short(2)]).size_hint(),
            6
        );
    }

    #[test]
    fn test_from_value_is_exact() {
        assert_eq!(i32::from_value(&Value::Int(3)), Some(3));
        assert_eq!(i32::from_value(&Value::Long(3)), None);
        assert_eq!(Long::from_value(&Value::Long(3)), Some(Long(3)));
        assert_eq!(i64::from_value(&Value::Int(3)), None);
        assert_eq!(String::from_value(&Value::from("a")), Some("a".to_string()));
    }

    #[test]
    fn test_indexed_child_nests_as_linear_copy() {
        let indexed: Container<crate::IndexedStorage> = Container::new();
        indexed.set_message_type("child");
        indexed.set("a", 1i32);
        indexed.set("b", "two");

        let linear: Container = Container::with_header(indexed.header());
        linear.set_all(indexed.values());
        let nested = Value::from(linear);

        let child = nested.as_container().unwrap();
        assert_eq!(child.message_type(), "child");
        assert_eq!(child.values(), indexed.values());
    }
}
