use std::ops::Index;

use crate::utils::SlotHash;

/// Hash-consing node table.
///
/// Every distinct value is stored once and keeps its index forever. Index 0
/// holds a placeholder, so `0` also terminates collision chains.
pub struct Table<T> {
    values: Vec<T>,
    /// Next index in the same collision chain, parallel to `values`.
    chain: Vec<usize>,
    heads: Vec<usize>,
    mask: u64,
}

impl<T: Default> Table<T> {
    /// A table with room for `2^bits` values before it has to grow.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");
        let capacity = 1usize << bits;
        let num_heads = 1usize << bits.min(16);

        let mut values = Vec::with_capacity(capacity);
        values.push(T::default());
        let mut chain = Vec::with_capacity(capacity);
        chain.push(0);

        Table {
            values,
            chain,
            heads: vec![0; num_heads],
            mask: (num_heads - 1) as u64,
        }
    }
}

impl<T> Table<T> {
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Number of stored values, the placeholder excluded.
    pub fn size(&self) -> usize {
        self.values.len() - 1
    }

    pub fn get(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index 0 is a placeholder");
        &self.values[index]
    }

    /// Appends a value without looking for an equal one.
    pub fn add(&mut self, value: T) -> usize {
        self.values.push(value);
        self.chain.push(0);
        self.values.len() - 1
    }
}

impl<T: SlotHash + Eq> Table<T> {
    /// Index of a value equal to `value`, inserting it first if there is none.
    pub fn put(&mut self, value: T) -> usize {
        let head = (value.slot_hash() & self.mask) as usize;

        let mut last = 0;
        let mut index = self.heads[head];
        while index != 0 {
            if self.values[index] == value {
                return index;
            }
            last = index;
            index = self.chain[index];
        }

        let new = self.add(value);
        if last == 0 {
            self.heads[head] = new;
        } else {
            self.chain[last] = new;
        }
        new
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}
