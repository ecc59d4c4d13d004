use super::StoragePolicy;
use crate::error::{ContainerError, Result, CONTAINER_COMPONENT};
use crate::value::NamedValue;

/// Insertion-ordered vector with O(n) lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearStorage {
    entries: Vec<NamedValue>,
}

impl LinearStorage {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

impl StoragePolicy for LinearStorage {
    const NAME: &'static str = "linear";

    fn insert(&mut self, entry: NamedValue) -> Result<()> {
        match self.position(&entry.name) {
            Some(index) => self.entries[index] = entry,
            None => {
                self.entries
                    .try_reserve(1)
                    .map_err(|e| ContainerError::allocation(CONTAINER_COMPONENT, e))?;
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&NamedValue> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.entries
            .try_reserve(additional)
            .map_err(|e| ContainerError::allocation(CONTAINER_COMPONENT, e))
    }

    fn entries(&self) -> &[NamedValue] {
        &self.entries
    }

    fn footprint(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<NamedValue>()
            + self
                .entries
                .iter()
                .map(|e| e.footprint() - std::mem::size_of::<NamedValue>())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;

    #[test]
    fn test_contract() {
        contract::exercise::<LinearStorage>();
    }

    #[test]
    fn test_reserve_failure_maps_to_allocation_error() {
        let mut storage = LinearStorage::default();
        let err = storage.reserve(usize::MAX).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::MemoryAllocationFailed);
    }
}
