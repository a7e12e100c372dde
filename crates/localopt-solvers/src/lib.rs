//! Minimization algorithms for the localopt framework.
//!
//! This crate provides concrete algorithm bodies for the iteration engine
//! in `localopt-core`, covering first-order, second-order, and
//! derivative-free local minimization.
//!
//! # Available Minimizers
//!
//! - **SteepestDescent**: gradient descent with fixed step or Armijo
//!   backtracking; built-in gradient-norm stopping criterion
//! - **Newton**: damped Newton with escalating Tikhonov regularization;
//!   stopped by an external criterion
//! - **NelderMead**: derivative-free simplex search tracking n+1 points
//!
//! # Examples
//!
//! ```
//! use localopt_core::prelude::*;
//! use localopt_solvers::{SteepestDescent, SteepestDescentConfig};
//!
//! let objective = QuadraticObjective::<f64>::simple(2);
//! let descent = SteepestDescent::new(
//!     SteepestDescentConfig::new()
//!         .with_step_size(0.5)
//!         .with_gradient_tolerance(1e-8),
//! );
//!
//! let mut solver = Solver::new(descent);
//! let x0 = nalgebra::DVector::from_vec(vec![3.0, -4.0]);
//! let result = solver.solve(&objective, &x0, &MaxIterations::new(1_000))?;
//! assert!(result.converged);
//! # Ok::<(), localopt_core::SolverError>(())
//! ```

pub mod nelder_mead;
pub mod newton;
pub mod steepest_descent;

// Re-export the minimizers for convenience
pub use nelder_mead::{NelderMead, NelderMeadConfig};
pub use newton::{Newton, NewtonConfig};
pub use steepest_descent::{SteepestDescent, SteepestDescentConfig};

// Re-export commonly used items from core
pub use localopt_core::{
    line_search::{BacktrackingLineSearch, FixedStepSize, LineSearch, LineSearchParams},
    solver::{Algorithm, IterationStatus, SolveResult, Solver},
};
