//! Handle → window lookup for event routing
//!
//! The window manager only hands the pump thread a native handle. The
//! registry maps it back to the state it should update: an entry is inserted
//! once creation completes, removed when the destroy notification arrives and
//! looked up read-only for every event in between. It never owns the window;
//! it only shares the published state.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use super::state::WindowShared;

#[derive(Debug)]
pub(crate) struct Registry<H> {
    entries: RwLock<HashMap<H, Arc<WindowShared>>>,
}

impl<H: Copy + Eq + Hash> Registry<H> {
    pub(crate) fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub(crate) fn insert(&self, window: H, shared: Arc<WindowShared>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(window, shared);
    }

    pub(crate) fn remove(&self, window: H) -> Option<Arc<WindowShared>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&window)
    }

    pub(crate) fn get(&self, window: H) -> Option<Arc<WindowShared>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&window)
            .cloned()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let registry = Registry::new();
        let shared = Arc::new(WindowShared::new());
        registry.insert(1u64, Arc::clone(&shared));

        assert!(registry.get(2).is_none());
        assert!(Arc::ptr_eq(&registry.get(1).unwrap(), &shared));
        assert!(registry.remove(1).is_some());
        assert!(registry.get(1).is_none());
        assert!(registry.remove(1).is_none());
        assert_eq!(registry.len(), 0);
    }
}
