//! # bounded-rs: Bounded verification of transition systems
//!
//! **`bounded-rs`** decides whether every reachable state of a symbolic transition system satisfies a safety property.
//! It combines three complementary proof strategies over a single indexed unrolling of the system:
//! bounded model checking (BMC), k-induction and interpolation-based model checking (IMC).
//!
//! ## How it works
//!
//! A transition system is given by three formulas over typed state variables:
//! the initial states `init`, the transition relation `trans` (primed variables denote the next state)
//! and the property `prop`.
//! The engine renames the variables of every unrolling step to fresh, generation-tagged copies
//! (`x` at step 3 becomes `x@3`), so that `k` applications of `trans` form one static formula.
//! Each iteration adds one step and lets the enabled strategies look at the result.
//!
//! ## Key Features
//!
//! - **Pluggable solvers**: The engine only talks to the [`Solver`][crate::solver::Solver] and [`ItpSolver`][crate::solver::ItpSolver] traits.
//! - **Batteries included**: [`BddSolver`][crate::solver::BddSolver] is a complete decision procedure for bounded integers and booleans, with interpolation.
//! - **Counterexamples**: Unsafe verdicts carry a [`Trace`][crate::checker::Trace] of caller-defined states and actions.
//! - **Schedules**: Which strategy runs in which iteration, and when to give up, is plain configuration ([`CheckerConfig`][crate::checker::CheckerConfig]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use bounded_rs::checker::{BoundedChecker, CheckerConfig, Verdict};
//! use bounded_rs::expr::Expr;
//! use bounded_rs::solver::BddSolver;
//! use bounded_rs::system::MonolithicSystem;
//! use bounded_rs::types::Var;
//!
//! // 1. Describe the system: x starts at 0 and never changes
//! let x = Var::int("x", 8);
//! let system = MonolithicSystem::new(
//!     Expr::eq(Expr::var(&x), Expr::int(0)),
//!     Expr::eq(Expr::prime(Expr::var(&x)), Expr::var(&x)),
//!     Expr::ge(Expr::var(&x), Expr::int(0)),
//! );
//!
//! // 2. Give every strategy its own solver
//! let checker = BoundedChecker::explicit(system)
//!     .config(CheckerConfig::default())
//!     .bmc_solver(BddSolver::new())
//!     .kind_solver(BddSolver::new())
//!     .imc_solver(BddSolver::new())
//!     .build()?;
//!
//! // 3. Run
//! let verdict = checker.run()?;
//! assert!(verdict.is_safe());
//! # Ok::<(), bounded_rs::checker::CheckerError>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`checker`]**: The unrolling loop and the three strategies.
//! - **[`solver`]**: Solver capabilities, the BDD-backed solver and shared handles.
//! - **[`expr`]**, **[`path`]**, **[`indexing`]**: Formulas and their time-indexed instances.
//! - **[`bdd`]**: The BDD manager underneath [`BddSolver`][crate::solver::BddSolver].

pub mod bdd;
pub mod cache;
pub mod checker;
pub mod eval;
pub mod expr;
pub mod indexing;
pub mod path;
pub mod reference;
pub mod sat;
pub mod solver;
pub mod system;
pub mod table;
pub mod types;
pub mod utils;
pub mod valuation;
