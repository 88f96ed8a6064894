use std::fmt;

use crate::checker::trace::Trace;

/// The proof strategies of [`BoundedChecker`][crate::checker::BoundedChecker],
/// in the order they run within an iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Strategy {
    Bmc,
    KInduction,
    Imc,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Bmc => write!(f, "BMC"),
            Strategy::KInduction => write!(f, "k-induction"),
            Strategy::Imc => write!(f, "IMC"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict<S, A> {
    Safe {
        strategy: Strategy,
        iteration: usize,
    },
    Unsafe {
        strategy: Strategy,
        iteration: usize,
        trace: Trace<S, A>,
    },
    /// The run gave up, or a solver could not decide a check it relied on.
    Unknown { iteration: usize },
}

impl<S, A> Verdict<S, A> {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe { .. })
    }

    pub fn is_unsafe(&self) -> bool {
        matches!(self, Verdict::Unsafe { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Verdict::Unknown { .. })
    }

    pub fn trace(&self) -> Option<&Trace<S, A>> {
        match self {
            Verdict::Unsafe { trace, .. } => Some(trace),
            _ => None,
        }
    }

    pub fn iteration(&self) -> usize {
        match self {
            Verdict::Safe { iteration, .. }
            | Verdict::Unsafe { iteration, .. }
            | Verdict::Unknown { iteration } => *iteration,
        }
    }

    /// The strategy that decided the run, if any.
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Verdict::Safe { strategy, .. } | Verdict::Unsafe { strategy, .. } => Some(*strategy),
            Verdict::Unknown { .. } => None,
        }
    }
}

impl<S, A> fmt::Display for Verdict<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe { strategy, iteration } => {
                write!(f, "SAFE (proven by {} in iteration {})", strategy, iteration)
            }
            Verdict::Unsafe {
                strategy,
                iteration,
                trace,
            } => write!(
                f,
                "UNSAFE (counterexample of length {} found by {} in iteration {})",
                trace.length(),
                strategy,
                iteration
            ),
            Verdict::Unknown { iteration } => write!(f, "UNKNOWN (gave up after iteration {})", iteration),
        }
    }
}
