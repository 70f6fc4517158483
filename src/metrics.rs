//! Named operation counters, reported by the admin metrics endpoint.

use dashmap::DashMap;
use std::collections::BTreeMap;

/// Concurrent counter registry. Keys follow the
/// `operation.invoked.<op>.on.<type>` convention.
#[derive(Default)]
pub struct OpCounters {
    counters: DashMap<String, u64>,
}

impl OpCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, op: &str, entity: &str) {
        let key = format!("operation.invoked.{}.on.{}", op, entity);
        self.counters.entry(key).and_modify(|c| *c += 1).or_insert(1);
    }

    pub fn get(&self, op: &str, entity: &str) -> u64 {
        let key = format!("operation.invoked.{}.on.{}", op, entity);
        self.counters.get(&key).map(|c| *c).unwrap_or(0)
    }

    /// Sorted snapshot of all counters.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}
