use super::StoragePolicy;
use crate::error::{ContainerError, Result, CONTAINER_COMPONENT};
use crate::value::NamedValue;
use std::collections::HashMap;

/// Insertion-ordered vector plus a name-to-position index
///
/// Lookups are O(1) on average. Removal shifts the tail of the vector to keep
/// iteration order, so the positions of every later entry are rewritten.
#[derive(Debug, Clone, Default)]
pub struct IndexedStorage {
    entries: Vec<NamedValue>,
    index: HashMap<String, usize>,
}

impl IndexedStorage {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn reindex_from(&mut self, start: usize) {
        for (position, entry) in self.entries.iter().enumerate().skip(start) {
            if let Some(slot) = self.index.get_mut(&entry.name) {
                *slot = position;
            }
        }
    }
}

impl StoragePolicy for IndexedStorage {
    const NAME: &'static str = "indexed";

    fn insert(&mut self, entry: NamedValue) -> Result<()> {
        if let Some(&position) = self.index.get(&entry.name) {
            self.entries[position] = entry;
            return Ok(());
        }

        self.entries
            .try_reserve(1)
            .map_err(|e| ContainerError::allocation(CONTAINER_COMPONENT, e))?;
        self.index
            .try_reserve(1)
            .map_err(|e| ContainerError::allocation(CONTAINER_COMPONENT, e))?;

        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&NamedValue> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn remove(&mut self, name: &str) -> bool {
        match self.index.remove(name) {
            Some(position) => {
                self.entries.remove(position);
                self.reindex_from(position);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.entries
            .try_reserve(additional)
            .map_err(|e| ContainerError::allocation(CONTAINER_COMPONENT, e))?;
        self.index
            .try_reserve(additional)
            .map_err(|e| ContainerError::allocation(CONTAINER_COMPONENT, e))
    }

    fn entries(&self) -> &[NamedValue] {
        &self.entries
    }

    fn footprint(&self) -> usize {
        let index_bytes: usize = self
            .index
            .keys()
            .map(|k| k.capacity() + std::mem::size_of::<(String, usize)>())
            .sum();
        self.entries.iter().map(NamedValue::footprint).sum::<usize>() + index_bytes
    }
}
