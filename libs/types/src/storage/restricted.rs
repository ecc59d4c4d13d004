use super::{LinearStorage, StoragePolicy};
use crate::error::{ContainerError, Result};
use crate::kind::ValueKind;
use crate::value::NamedValue;
use std::fmt;
use std::marker::PhantomData;

/// Compile-time list of admitted value kinds
pub trait KindSet: 'static {
    const NAME: &'static str;
    const ALLOWED: &'static [ValueKind];

    fn allows(kind: ValueKind) -> bool {
        Self::ALLOWED.contains(&kind)
    }
}

/// Declare a zero-sized [`KindSet`]
///
/// ```
/// use vessel_types::{kind_set, KindSet, ValueKind};
///
/// kind_set!(pub Flags = "flags" => [Bool]);
/// assert!(Flags::allows(ValueKind::Bool));
/// assert!(!Flags::allows(ValueKind::Int));
/// ```
#[macro_export]
macro_rules! kind_set {
    ($(#[$meta:meta])* $vis:vis $name:ident = $label:literal => [$($kind:ident),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        $vis struct $name;

        impl $crate::KindSet for $name {
            const NAME: &'static str = $label;
            const ALLOWED: &'static [$crate::ValueKind] = &[$($crate::ValueKind::$kind),*];
        }
    };
}

kind_set!(
    /// The eight integer kinds
    pub IntegerKinds = "integer" => [Short, UShort, Int, UInt, Long, ULong, LLong, ULLong]
);
kind_set!(
    /// Integers and floating point
    pub NumericKinds = "numeric" => [Short, UShort, Int, UInt, Long, ULong, LLong, ULLong, Float, Double]
);
kind_set!(
    /// Strings and byte buffers
    pub TextKinds = "text" => [String, Bytes]
);
kind_set!(
    /// Everything without nested structure
    pub ScalarKinds = "scalar" => [
        Null, Bool, Short, UShort, Int, UInt, Long, ULong, LLong, ULLong, Float, Double, String, Bytes
    ]
);

/// Linear storage admitting only the kinds of `K`
///
/// [`StoragePolicy::insert`] reports a disallowed kind as `TypeMismatch`; the
/// legacy [`StoragePolicy::set`] drops it without changing the contents.
pub struct RestrictedStorage<K: KindSet> {
    inner: LinearStorage,
    _kinds: PhantomData<fn() -> K>,
}

impl<K: KindSet> RestrictedStorage<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: LinearStorage::with_capacity(capacity),
            _kinds: PhantomData,
        }
    }
}

impl<K: KindSet> Default for RestrictedStorage<K> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: KindSet> Clone for RestrictedStorage<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _kinds: PhantomData,
        }
    }
}

impl<K: KindSet> fmt::Debug for RestrictedStorage<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestrictedStorage")
            .field("kinds", &K::NAME)
            .field("entries", &self.inner.entries())
            .finish()
    }
}

impl<K: KindSet> StoragePolicy for RestrictedStorage<K> {
    const NAME: &'static str = "restricted";

    fn insert(&mut self, entry: NamedValue) -> Result<()> {
        let kind = entry.kind();
        if !K::allows(kind) {
            return Err(ContainerError::type_mismatch(&entry.name, K::NAME, kind));
        }
        self.inner.insert(entry)
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        K::allows(kind)
    }

    fn get(&self, name: &str) -> Option<&NamedValue> {
        self.inner.get(name)
    }

    fn remove(&mut self, name: &str) -> bool {
        self.inner.remove(name)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.inner.reserve(additional)
    }

    fn entries(&self) -> &[NamedValue] {
        self.inner.entries()
    }

    fn footprint(&self) -> usize {
        self.inner.footprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::storage::contract;
    use crate::value::Value;

    #[test]
    fn test_contract() {
        contract::exercise::<RestrictedStorage<IntegerKinds>>();
    }

    #[test]
    fn test_disallowed_kind_is_reported() {
        let mut storage = RestrictedStorage::<NumericKinds>::default();
        let err = storage.insert(NamedValue::new("name", "Alice")).unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_legacy_set_drops_disallowed_kind() {
        let mut storage = RestrictedStorage::<TextKinds>::default();
        storage.set(NamedValue::new("label", "ok"));
        storage.set(NamedValue::new("count", 3i32));
        storage.set(NamedValue::new("label", 4i32));

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("label").unwrap().value, Value::from("ok"));
        assert!(!storage.contains("count"));
    }

    #[test]
    fn test_predefined_sets() {
        assert!(ScalarKinds::allows(ValueKind::Null));
        assert!(!ScalarKinds::allows(ValueKind::Container));
        assert!(NumericKinds::allows(ValueKind::Double));
        assert!(!IntegerKinds::allows(ValueKind::Float));
    }
}
