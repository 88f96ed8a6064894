use std::fmt;

/// A predicate over the iteration number (starting from 1).
pub type IterationPredicate = Box<dyn Fn(usize) -> bool>;

/// Schedule of a [`BoundedChecker`][crate::checker::BoundedChecker] run.
///
/// The default never gives up, enables every strategy in every iteration and
/// restricts the search to loop-free paths.
///
/// ```
/// use bounded_rs::checker::CheckerConfig;
///
/// let config = CheckerConfig::bmc_only()
///     .max_iterations(10)
///     .lf_path_only(|| false);
/// assert!(config.is_bmc_enabled(3));
/// assert!(!config.is_kind_enabled(3));
/// assert!(config.should_give_up(10));
/// ```
pub struct CheckerConfig {
    give_up: IterationPredicate,
    bmc_enabled: IterationPredicate,
    kind_enabled: IterationPredicate,
    imc_enabled: IterationPredicate,
    lf_path_only: Box<dyn Fn() -> bool>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            give_up: Box::new(|_| false),
            bmc_enabled: Box::new(|_| true),
            kind_enabled: Box::new(|_| true),
            imc_enabled: Box::new(|_| true),
            lf_path_only: Box::new(|| true),
        }
    }
}

impl CheckerConfig {
    /// BMC alone.
    pub fn bmc_only() -> Self {
        Self::default().kind_enabled(|_| false).imc_enabled(|_| false)
    }

    /// BMC followed by k-induction.
    pub fn kind() -> Self {
        Self::default().imc_enabled(|_| false)
    }

    /// IMC alone.
    pub fn imc_only() -> Self {
        Self::default()
            .bmc_enabled(|_| false)
            .kind_enabled(|_| false)
            .imc_enabled(|_| true)
    }

    /// Nothing is checked; every run ends with an unknown verdict once it gives up.
    pub fn disabled() -> Self {
        Self::default()
            .bmc_enabled(|_| false)
            .kind_enabled(|_| false)
            .imc_enabled(|_| false)
    }

    pub fn give_up(mut self, f: impl Fn(usize) -> bool + 'static) -> Self {
        self.give_up = Box::new(f);
        self
    }

    /// Gives up once `n` iterations have run.
    pub fn max_iterations(self, n: usize) -> Self {
        self.give_up(move |iteration| iteration >= n)
    }

    pub fn bmc_enabled(mut self, f: impl Fn(usize) -> bool + 'static) -> Self {
        self.bmc_enabled = Box::new(f);
        self
    }

    pub fn kind_enabled(mut self, f: impl Fn(usize) -> bool + 'static) -> Self {
        self.kind_enabled = Box::new(f);
        self
    }

    pub fn imc_enabled(mut self, f: impl Fn(usize) -> bool + 'static) -> Self {
        self.imc_enabled = Box::new(f);
        self
    }

    pub fn lf_path_only(mut self, f: impl Fn() -> bool + 'static) -> Self {
        self.lf_path_only = Box::new(f);
        self
    }

    pub fn should_give_up(&self, iteration: usize) -> bool {
        (self.give_up)(iteration)
    }
    pub fn is_bmc_enabled(&self, iteration: usize) -> bool {
        (self.bmc_enabled)(iteration)
    }
    pub fn is_kind_enabled(&self, iteration: usize) -> bool {
        (self.kind_enabled)(iteration)
    }
    pub fn is_imc_enabled(&self, iteration: usize) -> bool {
        (self.imc_enabled)(iteration)
    }
    pub fn is_lf_path_only(&self) -> bool {
        (self.lf_path_only)()
    }
}

impl fmt::Debug for CheckerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckerConfig")
            .field("lf_path_only", &self.is_lf_path_only())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use test_log::test;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::default();
        assert!(!config.should_give_up(1_000_000));
        assert!(config.is_bmc_enabled(1));
        assert!(config.is_kind_enabled(1));
        assert!(config.is_imc_enabled(1));
        assert!(config.is_lf_path_only());
    }

    #[test]
    fn test_presets() {
        let config = CheckerConfig::imc_only();
        assert!(!config.is_bmc_enabled(1));
        assert!(!config.is_kind_enabled(1));
        assert!(config.is_imc_enabled(1));

        let config = CheckerConfig::kind().max_iterations(3);
        assert!(config.is_bmc_enabled(2) && config.is_kind_enabled(2));
        assert!(!config.is_imc_enabled(2));
        assert!(!config.should_give_up(2));
        assert!(config.should_give_up(3));
    }

    #[test]
    fn test_lf_is_reevaluated() {
        let flag = Rc::new(Cell::new(true));
        let config = CheckerConfig::default().lf_path_only({
            let flag = Rc::clone(&flag);
            move || flag.get()
        });
        assert!(config.is_lf_path_only());
        flag.set(false);
        assert!(!config.is_lf_path_only());
    }
}
