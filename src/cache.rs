use std::cell::Cell;

use crate::utils::SlotHash;

/// Direct-mapped memo table for BDD operations.
///
/// Each slot keeps the latest result stored there; colliding inserts evict.
pub struct Cache<K, V> {
    slots: Vec<Option<(K, V)>>,
    mask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V> {
    /// A cache with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");
        let size = 1usize << bits;
        Cache {
            slots: std::iter::repeat_with(|| None).take(size).collect(),
            mask: (size - 1) as u64,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }
}

impl<K: SlotHash + Eq, V> Cache<K, V> {
    fn slot(&self, key: &K) -> usize {
        (key.slot_hash() & self.mask) as usize
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let found = match &self.slots[self.slot(key)] {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        };
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.set(counter.get() + 1);
        found
    }

    pub fn insert(&mut self, key: K, value: V) {
        let slot = self.slot(&key);
        self.slots[slot] = Some((key, value));
    }
}
