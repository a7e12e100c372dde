//! Core traits and types for local continuous optimization.
//!
//! This crate provides the foundational pieces for building derivative-based
//! local minimizers: the objective-function contract with evaluation
//! counting, immutable iteration-state snapshots, the polymorphic algorithm
//! step, and the iteration engine that drives a run from setup to
//! termination while accumulating history and counters.
//!
//! # Key Concepts
//!
//! - **Algorithm**: the one step every concrete solver variant implements
//! - **Solver**: the engine owning the loop, counters, and status machine
//! - **IterationStatus**: continue / success / no-progress / out-of-control
//! - **StoppingCriterion**: external predicates, consulted only for
//!   algorithms without a built-in convergence test
//!
//! # Modules
//!
//! - [`callback`]: run observers with early-stop support
//! - [`constraints`]: feasible-set projections
//! - [`error`]: error types for configuration and precondition failures
//! - [`function`]: objective function interface and evaluation counting
//! - [`line_search`]: step-size selection for descent algorithms
//! - [`solver`]: the iteration engine
//! - [`state`]: per-iteration state snapshots
//! - [`stopping`]: external stopping criteria
//! - [`types`]: scalar trait, type aliases and numerical constants

pub mod callback;
pub mod constraints;
pub mod error;
pub mod function;
pub mod line_search;
pub mod solver;
pub mod state;
pub mod stopping;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{Result, SolverError};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use localopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{CallbackInfo, NoOpCallback, PrintProgressCallback, SolverCallback};
    pub use crate::constraints::{BoundConstraints, Constraints, Unconstrained};
    pub use crate::error::{Result, SolverError};
    pub use crate::function::{
        CountedFunction, EvaluationCounts, ObjectiveFunction, QuadraticObjective,
    };
    pub use crate::line_search::{
        BacktrackingLineSearch, FixedStepSize, LineSearch, LineSearchParams, LineSearchResult,
    };
    pub use crate::solver::{Algorithm, IterationStatus, SolveResult, Solver};
    pub use crate::state::SolverState;
    pub use crate::stopping::{
        AllOf, AnyOf, GradientNormBelow, MaxIterations, StoppingCriterion, ValueBelow,
    };
    pub use crate::types::{DMatrix, DVector, Scalar};
}
