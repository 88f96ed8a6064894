//! Hashing helpers for the node table and the operation cache.

/// [Szudzik pairing][szudzik-pairing] of two numbers.
///
/// Arithmetic wraps, so large inputs may collide. The result only selects a
/// slot, and every lookup compares full keys afterwards.
///
/// [szudzik-pairing]: https://en.wikipedia.org/wiki/Pairing_function
pub fn pair(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

pub fn triple(a: u64, b: u64, c: u64) -> u64 {
    pair(pair(a, b), c)
}

/// Hash used to pick a slot in a [`Table`][crate::table::Table] or a [`Cache`][crate::cache::Cache].
pub trait SlotHash {
    fn slot_hash(&self) -> u64;
}

impl SlotHash for (u64, u64) {
    fn slot_hash(&self) -> u64 {
        pair(self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_pair_small_values() {
        assert_eq!(pair(0, 0), 0);
        assert_eq!(pair(0, 1), 1);
        assert_eq!(pair(1, 0), 2);
        assert_eq!(pair(1, 1), 3);
        assert_eq!(pair(2, 1), 7);
        assert_eq!(pair(4, 4), 24);
    }

    #[test]
    fn test_pair_is_a_bijection_on_a_square() {
        let n = 32;
        let codes: HashSet<u64> = (0..n).flat_map(|a| (0..n).map(move |b| pair(a, b))).collect();
        assert_eq!(codes.len(), (n * n) as usize);
        assert!(codes.iter().all(|&c| c < n * n));
    }

    #[test]
    fn test_large_inputs_wrap() {
        // MAX^2 wraps to 1, and adding MAX again wraps to 0.
        assert_eq!(pair(u64::MAX, 0), 0);
        assert_eq!(pair(u64::MAX, 0), pair(0, 0));
        assert_eq!(pair(0, u64::MAX), pair(0, 1));
        assert_eq!(triple(u64::MAX, 0, 7), triple(0, 0, 7));
    }
}
