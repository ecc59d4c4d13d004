//! Thread-safe value container
//!
//! A [`Container`] owns one routing [`Header`] and one storage policy behind a
//! single reader/writer lock. Reads (`get`, `contains`, `len`, header getters)
//! share the lock; every mutation takes it exclusively.
//!
//! ## Locking rules
//!
//! - Nested containers are separate lock domains. A parent never holds its own
//!   lock while touching a child; equality, `Debug`, codecs and the validator
//!   snapshot the parent, release it, then lock the child.
//! - [`Container::assign_from`], the one operation that locks two containers
//!   at once, acquires in ascending [`Container::id`] order, so two threads
//!   copying in opposite directions cannot deadlock.
//! - Lock-free access is only offered through `&mut self`
//!   ([`Container::storage_mut`]), where the borrow checker proves exclusivity.
//!
//! ## Two API tiers
//!
//! Each operation has one fallible core. The legacy methods (`set`, `get`,
//! `remove`, ...) adapt it to options and silent drops; the `*_result`
//! methods surface the [`ContainerError`].

use crate::error::{ContainerError, Result};
use crate::header::Header;
use crate::storage::{LinearStorage, StoragePolicy};
use crate::value::{FromValue, NamedValue, SharedContainer, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default)]
struct Inner<S> {
    header: Header,
    storage: S,
}

/// Header plus named values, generic over the storage policy
pub struct Container<S: StoragePolicy = LinearStorage> {
    id: u64,
    inner: RwLock<Inner<S>>,
}

impl<S: StoragePolicy> Container<S> {
    pub fn new() -> Self {
        Self::from_parts(Header::default(), S::default())
    }

    /// Empty container with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        let container = Self::new();
        container.reserve(capacity);
        container
    }

    pub fn with_header(header: Header) -> Self {
        Self::from_parts(header, S::default())
    }

    pub fn from_parts(header: Header, storage: S) -> Self {
        Self {
            id: next_id(),
            inner: RwLock::new(Inner { header, storage }),
        }
    }

    /// Consume the container, returning header and storage
    pub fn into_parts(self) -> (Header, S) {
        let inner = self.inner.into_inner();
        (inner.header, inner.storage)
    }

    /// Process-unique identity; fixes the lock order between two containers
    pub fn id(&self) -> u64 {
        self.id
    }

    // ----- values: fallible core -------------------------------------------

    fn insert_locked(storage: &mut S, entry: NamedValue) -> Result<()> {
        if entry.name.is_empty() {
            return Err(ContainerError::empty_key());
        }
        storage.insert(entry)
    }

    /// Insert or replace `name`; fails on an empty key or a rejected kind
    pub fn set_result(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let entry = NamedValue::new(name, value);
        Self::insert_locked(&mut self.inner.write().storage, entry)
    }

    /// Insert every entry or none of them
    pub fn set_all_result(&self, entries: impl IntoIterator<Item = NamedValue>) -> Result<()> {
        let entries: Vec<NamedValue> = entries.into_iter().collect();
        let mut inner = self.inner.write();

        for entry in &entries {
            if entry.name.is_empty() {
                return Err(ContainerError::empty_key());
            }
            if !inner.storage.accepts(entry.kind()) {
                return Err(ContainerError::type_mismatch(&entry.name, S::NAME, entry.kind()));
            }
        }
        inner.storage.reserve(entries.len())?;
        for entry in entries {
            inner.storage.insert(entry)?;
        }
        Ok(())
    }

    pub fn get_result(&self, name: &str) -> Result<Value> {
        self.inner
            .read()
            .storage
            .get(name)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| ContainerError::key_not_found(name))
    }

    /// Typed read; the stored kind must match `T` exactly
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let inner = self.inner.read();
        let entry = inner
            .storage
            .get(name)
            .ok_or_else(|| ContainerError::key_not_found(name))?;
        T::from_value(&entry.value)
            .ok_or_else(|| ContainerError::type_mismatch(name, T::KIND, entry.kind()))
    }

    pub fn remove_result(&self, name: &str) -> Result<()> {
        if self.inner.write().storage.remove(name) {
            Ok(())
        } else {
            Err(ContainerError::key_not_found(name))
        }
    }

    pub fn reserve_result(&self, additional: usize) -> Result<()> {
        self.inner.write().storage.reserve(additional)
    }

    // ----- values: legacy adapters -----------------------------------------

    /// Insert or replace `name`; invalid input is dropped
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        let entry = NamedValue::new(name, value);
        let field = entry.name.clone();
        if let Err(err) = Self::insert_locked(&mut self.inner.write().storage, entry) {
            trace!(field = %field, error = %err, "set dropped");
        }
    }

    /// Insert each entry under one write lock; invalid entries are dropped
    pub fn set_all(&self, entries: impl IntoIterator<Item = NamedValue>) {
        let mut inner = self.inner.write();
        for entry in entries {
            let field = entry.name.clone();
            if let Err(err) = Self::insert_locked(&mut inner.storage, entry) {
                trace!(field = %field, error = %err, "set_all dropped entry");
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.get_result(name).ok()
    }

    /// Look up several names under one read lock
    pub fn get_batch<I>(&self, names: I) -> Vec<Option<Value>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let inner = self.inner.read();
        names
            .into_iter()
            .map(|name| inner.storage.get(name.as_ref()).map(|e| e.value.clone()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().storage.contains(name)
    }

    pub fn contains_batch<I>(&self, names: I) -> Vec<bool>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let inner = self.inner.read();
        names
            .into_iter()
            .map(|name| inner.storage.contains(name.as_ref()))
            .collect()
    }

    pub fn remove(&self, name: &str) -> bool {
        self.remove_result(name).is_ok()
    }

    /// Remove several names; returns how many were present
    pub fn remove_batch<I>(&self, names: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut inner = self.inner.write();
        names
            .into_iter()
            .filter(|name| inner.storage.remove(name.as_ref()))
            .count()
    }

    pub fn reserve(&self, additional: usize) {
        if let Err(err) = self.reserve_result(additional) {
            trace!(additional, error = %err, "reserve ignored");
        }
    }

    pub fn clear(&self) {
        self.inner.write().storage.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().storage.len()
    }

    /// Alias of [`Container::len`]
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().storage.is_empty()
    }

    /// Shared handle to a nested container field
    pub fn nested(&self, name: &str) -> Option<SharedContainer> {
        self.inner
            .read()
            .storage
            .get(name)
            .and_then(|e| e.value.as_container().cloned())
    }

    // ----- iteration -------------------------------------------------------

    /// Copy of every entry in iteration order
    pub fn values(&self) -> Vec<NamedValue> {
        self.inner.read().storage.entries().to_vec()
    }

    /// Header and entries read under one lock acquisition
    pub fn snapshot(&self) -> (Header, Vec<NamedValue>) {
        let inner = self.inner.read();
        (inner.header.clone(), inner.storage.entries().to_vec())
    }

    /// Visit every entry while holding the shared lock
    ///
    /// `f` must not call back into this container's mutators.
    pub fn for_each(&self, mut f: impl FnMut(&NamedValue)) {
        let inner = self.inner.read();
        inner.storage.iter().for_each(|entry| f(entry));
    }

    /// Direct storage access without locking
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.inner.get_mut().storage
    }

    // ----- header ----------------------------------------------------------

    pub fn header(&self) -> Header {
        self.inner.read().header.clone()
    }

    pub fn message_type(&self) -> String {
        self.inner.read().header.message_type.clone()
    }

    pub fn set_header(&self, header: Header) {
        self.inner.write().header = header;
    }

    pub fn set_source(&self, id: impl Into<String>, sub_id: impl Into<String>) {
        self.inner.write().header.set_source(id, sub_id);
    }

    pub fn set_target(&self, id: impl Into<String>, sub_id: impl Into<String>) {
        self.inner.write().header.set_target(id, sub_id);
    }

    pub fn set_message_type(&self, message_type: impl Into<String>) {
        self.inner.write().header.set_message_type(message_type);
    }

    pub fn set_version(&self, version: impl Into<String>) {
        self.inner.write().header.set_version(version);
    }

    /// Exchange source and target under the write lock
    pub fn swap_header(&self) {
        self.inner.write().header.swap();
    }

    /// Reset the header to defaults and drop every value
    pub fn initialize(&self) {
        let mut inner = self.inner.write();
        inner.header = Header::default();
        inner.storage.clear();
    }

    // ----- whole-container operations --------------------------------------

    /// Copy header and values from `other`, locking both in id order
    pub fn assign_from(&self, other: &Container<S>) {
        if self.id == other.id {
            return;
        }
        let copy = |dst: &mut Inner<S>, src: &Inner<S>| {
            dst.header = src.header.clone();
            dst.storage = src.storage.clone();
        };
        if self.id < other.id {
            let mut dst = self.inner.write();
            let src = other.inner.read();
            copy(&mut dst, &src);
        } else {
            let src = other.inner.read();
            let mut dst = self.inner.write();
            copy(&mut dst, &src);
        }
    }

    /// New container carrying this header and no values
    pub fn copy_header_only(&self) -> Self {
        Self::with_header(self.header())
    }

    /// Install the contents of `other` in one write
    pub fn replace_with(&self, other: Container<S>) {
        let replacement = other.inner.into_inner();
        *self.inner.write() = replacement;
    }

    /// Estimated bytes held by header and values
    pub fn memory_footprint(&self) -> usize {
        let inner = self.inner.read();
        std::mem::size_of::<Self>() + inner.header.heap_size() + inner.storage.footprint()
    }
}

impl Container<LinearStorage> {
    /// Wrap in a shared handle for use as a nested value
    pub fn into_shared(self) -> SharedContainer {
        SharedContainer::new(self)
    }
}

impl<S: StoragePolicy> Default for Container<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StoragePolicy> Clone for Container<S> {
    fn clone(&self) -> Self {
        let inner = Inner::clone(&self.inner.read());
        Self {
            id: next_id(),
            inner: RwLock::new(inner),
        }
    }
}

impl<S: StoragePolicy> PartialEq for Container<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.id == other.id {
            return true;
        }
        // One lock at a time: comparing entries locks any nested children
        self.snapshot() == other.snapshot()
    }
}

impl<S: StoragePolicy> fmt::Debug for Container<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (header, values) = self.snapshot();
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("policy", &S::NAME)
            .field("header", &header)
            .field("values", &values)
            .finish()
    }
}

impl<S: StoragePolicy> FromIterator<NamedValue> for Container<S> {
    fn from_iter<I: IntoIterator<Item = NamedValue>>(iter: I) -> Self {
        let container = Self::new();
        container.set_all(iter);
        container
    }
}
