use std::fmt;
use std::ops::Neg;

/// A handle to a BDD node, possibly complemented.
///
/// The sign is the complement bit and the magnitude is the node's index in
/// the manager's table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Ref(i32);

impl Ref {
    /// Child slot of the terminal node, which has no children.
    pub const INVALID: Ref = Ref(0);

    pub const fn positive(index: u32) -> Self {
        Ref(index as i32)
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn index(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    /// `2 * index + complement`, a dense non-negative key.
    pub const fn unsigned(self) -> u32 {
        (self.0.unsigned_abs() << 1) | self.is_negated() as u32
    }
}

impl Neg for Ref {
    type Output = Ref;

    fn neg(self) -> Ref {
        Ref(-self.0)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            write!(f, "~")?;
        }
        write!(f, "@{}", self.index())
    }
}
