//! Buffer-id keyed storage for per-buffer state
//!
//! Entries are created the first time a buffer is seen and removed when the
//! host reports the buffer closed. Nothing else ever drops an entry.

use std::collections::HashMap;

use crate::host::BufferId;

#[derive(Debug)]
pub struct BufferRegistry<T> {
    entries: HashMap<BufferId, T>,
}

impl<T> Default for BufferRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> BufferRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `id`, created with `make` on first use
    pub fn get_or_insert<F>(&mut self, id: BufferId, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.entries.entry(id).or_insert_with(|| {
            tracing::debug!("Registering state for {}", id);
            make()
        })
    }

    pub fn get(&self, id: BufferId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Release the entry for a closed buffer
    pub fn remove(&mut self, id: BufferId) -> Option<T> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            tracing::debug!("Released state for {}", id);
        }
        removed
    }

    pub fn contains(&self, id: BufferId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered buffer ids in ascending order
    pub fn ids(&self) -> Vec<BufferId> {
        let mut ids: Vec<BufferId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
