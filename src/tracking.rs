//! Per-category accounting of time spent in outbound operations.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

/// Receives the elapsed time of every logical HTTP call.
pub trait ActionTracker: Send + Sync {
    fn track(&self, category: &str, elapsed_nanos: u64);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl ActionTracker for NoopTracker {
    fn track(&self, _category: &str, _elapsed_nanos: u64) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    pub count: u64,
    pub total_nanos: u64,
}

/// Accumulates call count and total elapsed time per category.
#[derive(Debug, Default)]
pub struct ActionStats {
    categories: Mutex<BTreeMap<String, CategoryStats>>,
}

impl ActionStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, category: &str) -> Option<CategoryStats> {
        self.lock().get(category).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, CategoryStats> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, CategoryStats>> {
        // stats stay usable even if a tracking thread panicked
        self.categories.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ActionTracker for ActionStats {
    fn track(&self, category: &str, elapsed_nanos: u64) {
        let mut categories = self.lock();
        let stats = categories.entry(category.to_string()).or_default();
        stats.count += 1;
        stats.total_nanos = stats.total_nanos.saturating_add(elapsed_nanos);
    }
}
