//! Request id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::jsonrpc::RequestId;

/// Hands out unique numeric request ids.
///
/// Safe to share between tasks; uniqueness holds for the lifetime of one
/// generator, which is all correlation needs.
#[derive(Debug)]
pub struct RequestIdGenerator {
    next: AtomicU64,
}

impl RequestIdGenerator {
    /// Create a generator whose first id is `1`
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a generator whose first id is `start`
    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Next unused id
    pub fn next_id(&self) -> RequestId {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        RequestId::Number(id as i64)
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential() {
        let ids = RequestIdGenerator::new();
        assert_eq!(ids.next_id(), RequestId::Number(1));
        assert_eq!(ids.next_id(), RequestId::Number(2));
    }

    #[test]
    fn test_unique_across_threads() {
        let ids = Arc::new(RequestIdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..500).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id");
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
