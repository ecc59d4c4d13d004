//! Storage policies
//!
//! A storage policy is the backing strategy a [`Container`](crate::Container)
//! uses for name lookup. All policies keep their entries in one ordered
//! `Vec<NamedValue>` so iteration is always insertion order; they differ in how
//! a name is located:
//!
//! - [`LinearStorage`]: scan the vector. Default, lowest overhead below
//!   roughly a hundred fields.
//! - [`IndexedStorage`]: scan replaced by a name-to-position hash index that is
//!   maintained on every mutation.
//! - [`RestrictedStorage`]: linear storage that only admits the kinds listed by
//!   a [`KindSet`].
//!
//! The container is generic over the policy, so the choice is made at
//! construction and dispatched statically.
//!
//! ## Two entry points
//!
//! [`StoragePolicy::insert`] is the fallible core. [`StoragePolicy::set`] is the
//! legacy adapter that drops the error; a rejected value is logged at `trace`
//! and otherwise ignored.

mod indexed;
mod linear;
mod restricted;

pub use indexed::IndexedStorage;
pub use linear::LinearStorage;
pub use restricted::{IntegerKinds, KindSet, NumericKinds, RestrictedStorage, ScalarKinds, TextKinds};

use crate::error::Result;
use crate::kind::ValueKind;
use crate::value::NamedValue;
use std::fmt;
use tracing::trace;

/// Capability contract shared by every storage policy
pub trait StoragePolicy: Default + Clone + fmt::Debug + Send + Sync {
    /// Short policy name for diagnostics
    const NAME: &'static str;

    /// Insert or replace the entry with the same name
    fn insert(&mut self, entry: NamedValue) -> Result<()>;

    /// Legacy insert: a rejected entry is silently dropped
    fn set(&mut self, entry: NamedValue) {
        let name = entry.name.clone();
        if let Err(err) = self.insert(entry) {
            trace!(policy = Self::NAME, field = %name, error = %err, "set dropped");
        }
    }

    /// Whether values of `kind` are admitted at all
    fn accepts(&self, _kind: ValueKind) -> bool {
        true
    }

    fn get(&self, name: &str) -> Option<&NamedValue>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the named entry; true when something was removed
    fn remove(&mut self, name: &str) -> bool;

    fn clear(&mut self);

    /// Reserve room for `additional` more entries
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Entries in iteration order
    fn entries(&self) -> &[NamedValue];

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> std::slice::Iter<'_, NamedValue> {
        self.entries().iter()
    }

    /// Estimated heap bytes held by the policy
    fn footprint(&self) -> usize {
        self.entries().iter().map(NamedValue::footprint).sum()
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every policy must share, run against each implementation

    use super::*;
    use crate::value::Value;

    pub fn exercise<S: StoragePolicy>() {
        let mut storage = S::default();
        assert!(storage.is_empty());

        storage.insert(NamedValue::new("a", 1i32)).unwrap();
        storage.insert(NamedValue::new("b", 2i32)).unwrap();
        storage.insert(NamedValue::new("c", 3i32)).unwrap();
        assert_eq!(storage.len(), 3);

        // Replace keeps position and size
        storage.insert(NamedValue::new("b", 20i32)).unwrap();
        assert_eq!(storage.len(), 3);
        assert_eq!(storage.get("b").unwrap().value, Value::Int(20));
        let names: Vec<_> = storage.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        assert!(storage.contains("a"));
        assert!(!storage.contains("z"));
        assert!(storage.remove("a"));
        assert!(!storage.remove("a"));
        assert_eq!(storage.get("c").unwrap().value, Value::Int(3));
        let names: Vec<_> = storage.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);

        storage.reserve(64).unwrap();
        storage.clear();
        assert!(storage.is_empty());
        assert!(storage.get("b").is_none());
    }
}
