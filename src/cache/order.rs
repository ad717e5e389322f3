//! Insertion Order Module
//!
//! Tracks the order keys were first inserted, for FIFO eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Remembers first-insertion order of keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Re-inserting a key that is already tracked does not move it.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Appends a newly inserted key at the back.
    ///
    /// Callers only push keys that were not already present.
    pub fn push(&mut self, key: &str) {
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Forgets a key wherever it sits in the order.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Next key to be evicted, without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_oldest_is_first_pushed() {
        let mut order = InsertionOrder::new();

        order.push("key1");
        order.push("key2");
        order.push("key3");

        assert_eq!(order.len(), 3);
        assert_eq!(order.peek_oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_evict_oldest_in_fifo_order() {
        let mut order = InsertionOrder::new();

        order.push("a");
        order.push("b");
        order.push("c");

        assert_eq!(order.evict_oldest(), Some("a".to_string()));
        assert_eq!(order.evict_oldest(), Some("b".to_string()));
        assert_eq!(order.evict_oldest(), Some("c".to_string()));
        assert_eq!(order.evict_oldest(), None);
    }

    #[test]
    fn test_remove_middle_key() {
        let mut order = InsertionOrder::new();

        order.push("key1");
        order.push("key2");
        order.push("key3");

        order.remove("key2");
        order.remove("nonexistent");

        let remaining: Vec<&String> = order.iter().collect();
        assert_eq!(remaining, vec!["key1", "key3"]);
    }
}
