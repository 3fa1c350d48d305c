//! Weighted least-recently-used map
//!
//! A slab of entries threaded by a doubly linked list in recency order, plus
//! a key index into the slab. Touch, insert and pop are O(1). The map only
//! tracks weights; deciding when to evict belongs to the owner.

use std::collections::HashMap;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<V> {
    key: String,
    value: V,
    weight: usize,
    prev: usize,
    next: usize,
}

/// Recency-ordered map from string keys to weighted values.
#[derive(Debug)]
pub struct WeightedLru<V> {
    slots: Vec<Option<Slot<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    /// Least recently used.
    head: usize,
    /// Most recently used.
    tail: usize,
    total_weight: usize,
}

impl<V> WeightedLru<V> {
    pub fn new() -> Self {
        WeightedLru {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            total_weight: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Sum of the weights of all entries.
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Look up a value and mark it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.detach(idx);
        self.attach_tail(idx);
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    /// Look up a value without touching recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    /// Insert or overwrite at the most recently used end. Returns the
    /// replaced value, if any.
    pub fn insert(&mut self, key: String, value: V, weight: usize) -> Option<V> {
        let replaced = self.remove(&key);

        let slot = Slot {
            key: key.clone(),
            value,
            weight,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.attach_tail(idx);
        self.index.insert(key, idx);
        self.total_weight += weight;
        replaced
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.detach(idx);
        let slot = self.slots[idx].take()?;
        self.free.push(idx);
        self.total_weight -= slot.weight;
        Some(slot.value)
    }

    /// Remove the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(String, V, usize)> {
        if self.head == NIL {
            return None;
        }
        let idx = self.head;
        self.detach(idx);
        let slot = self.slots[idx].take()?;
        self.free.push(idx);
        self.index.remove(&slot.key);
        self.total_weight -= slot.weight;
        Some((slot.key, slot.value, slot.weight))
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            lru: self,
            cursor: self.head,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
        self.total_weight = 0;
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = match &self.slots[idx] {
            Some(slot) => (slot.prev, slot.next),
            None => return,
        };
        match prev {
            NIL => self.head = next,
            p => {
                if let Some(slot) = self.slots[p].as_mut() {
                    slot.next = next;
                }
            }
        }
        match next {
            NIL => self.tail = prev,
            n => {
                if let Some(slot) = self.slots[n].as_mut() {
                    slot.prev = prev;
                }
            }
        }
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = NIL;
            slot.next = NIL;
        }
    }

    fn attach_tail(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = old_tail;
            slot.next = NIL;
        }
        match old_tail {
            NIL => self.head = idx,
            t => {
                if let Some(slot) = self.slots[t].as_mut() {
                    slot.next = idx;
                }
            }
        }
        self.tail = idx;
    }
}

impl<V> Default for WeightedLru<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over keys in recency order, least recent first.
pub struct Keys<'a, V> {
    lru: &'a WeightedLru<V>,
    cursor: usize,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let slot = self.lru.slots[self.cursor].as_ref()?;
        self.cursor = slot.next;
        Some(slot.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(lru: &WeightedLru<u32>) -> Vec<&str> {
        lru.keys().collect()
    }

    #[test]
    fn test_insert_orders_by_recency() {
        let mut lru = WeightedLru::new();
        lru.insert("a".into(), 1, 10);
        lru.insert("b".into(), 2, 20);
        lru.insert("c".into(), 3, 30);

        assert_eq!(keys(&lru), vec!["a", "b", "c"]);
        assert_eq!(lru.total_weight(), 60);
        assert_eq!(lru.len(), 3);
    }

    #[test]
    fn test_get_touches_but_peek_does_not() {
        let mut lru = WeightedLru::new();
        lru.insert("a".into(), 1, 1);
        lru.insert("b".into(), 2, 1);

        assert_eq!(lru.peek("a"), Some(&1));
        assert_eq!(keys(&lru), vec!["a", "b"]);

        assert_eq!(lru.get("a"), Some(&1));
        assert_eq!(keys(&lru), vec!["b", "a"]);

        assert_eq!(lru.get("missing"), None);
        assert_eq!(keys(&lru), vec!["b", "a"]);
    }

    #[test]
    fn test_overwrite_replaces_weight() {
        let mut lru = WeightedLru::new();
        lru.insert("a".into(), 1, 10);
        lru.insert("b".into(), 2, 10);
        let old = lru.insert("a".into(), 3, 25);

        assert_eq!(old, Some(1));
        assert_eq!(lru.total_weight(), 35);
        assert_eq!(keys(&lru), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_lru_and_slot_reuse() {
        let mut lru = WeightedLru::new();
        lru.insert("a".into(), 1, 5);
        lru.insert("b".into(), 2, 7);

        assert_eq!(lru.pop_lru(), Some(("a".to_string(), 1, 5)));
        assert_eq!(lru.total_weight(), 7);

        lru.insert("c".into(), 3, 1);
        assert_eq!(keys(&lru), vec!["b", "c"]);
        assert_eq!(lru.pop_lru().map(|(k, _, _)| k), Some("b".to_string()));
        assert_eq!(lru.pop_lru().map(|(k, _, _)| k), Some("c".to_string()));
        assert_eq!(lru.pop_lru(), None);
        assert!(lru.is_empty());
        assert_eq!(lru.total_weight(), 0);
    }

    #[test]
    fn test_remove_middle_entry() {
        let mut lru = WeightedLru::new();
        lru.insert("a".into(), 1, 1);
        lru.insert("b".into(), 2, 1);
        lru.insert("c".into(), 3, 1);

        assert_eq!(lru.remove("b"), Some(2));
        assert_eq!(keys(&lru), vec!["a", "c"]);
        assert!(!lru.contains_key("b"));
        assert_eq!(lru.remove("b"), None);
    }
}
