use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// A path to the one terminal, as DIMACS-style literals.
    ///
    /// Else-edges are preferred, so variables default to false along the
    /// path. Variables off the path are unconstrained. `None` for zero.
    pub fn one_sat(&self, f: Ref) -> Option<Vec<i32>> {
        if self.is_zero(f) {
            return None;
        }

        let mut literals = Vec::new();
        let mut node = f;
        while !self.is_one(node) {
            let v = self.variable(node.index()) as i32;
            let low = self.low_node(node);
            if self.is_zero(low) {
                literals.push(v);
                node = self.high_node(node);
            } else {
                literals.push(-v);
                node = low;
            }
        }
        Some(literals)
    }

    /// Number of assignments to variables `1..=num_vars` satisfying `f`.
    pub fn sat_count(&self, f: Ref, num_vars: usize) -> BigUint {
        let total = BigUint::from(1u32) << num_vars;
        let mut memo = HashMap::new();
        self.sat_count_rec(f, &total, &mut memo)
    }

    // Counts are over all `num_vars` variables at every node, so a child's
    // count is halved when it moves up one level.
    fn sat_count_rec(&self, f: Ref, total: &BigUint, memo: &mut HashMap<usize, BigUint>) -> BigUint {
        if self.is_zero(f) {
            return BigUint::ZERO;
        }
        if self.is_one(f) {
            return total.clone();
        }

        let regular = match memo.get(&f.index()) {
            Some(count) => count.clone(),
            None => {
                let i = f.index();
                let low = self.sat_count_rec(self.low(i), total, memo);
                let high = self.sat_count_rec(self.high(i), total, memo);
                let count = (low + high) >> 1u32;
                memo.insert(i, count.clone());
                count
            }
        };

        if f.is_negated() {
            total - regular
        } else {
            regular
        }
    }
}
