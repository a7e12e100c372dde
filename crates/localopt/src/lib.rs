//! Local continuous optimization in Rust.
//!
//! `localopt` bundles the iteration engine from [`localopt_core`] with the
//! concrete minimizers from [`localopt_solvers`] behind one facade. The
//! engine owns the run: setup, the iteration loop, evaluation counters,
//! state history, and the continue/success/no-progress/out-of-control
//! status machine. Algorithms plug in through a single step interface.
//!
//! # Quick start
//!
//! ```
//! use localopt::prelude::*;
//!
//! // f(x, y) = ½(x² + y²), minimum at the origin
//! let objective = QuadraticObjective::<f64>::simple(2);
//!
//! let descent = SteepestDescent::new(
//!     SteepestDescentConfig::new()
//!         .with_step_size(0.5)
//!         .with_gradient_tolerance(1e-8),
//! );
//! let mut solver = Solver::new(descent);
//!
//! let x0 = nalgebra::DVector::from_vec(vec![3.0, -4.0]);
//! let result = solver.solve(&objective, &x0, &MaxIterations::new(1_000))?;
//!
//! assert!(result.converged);
//! assert!(result.best_point().norm() < 1e-6);
//! assert_eq!(result.iterations, result.states.len());
//! # Ok::<(), localopt::SolverError>(())
//! ```

pub use localopt_core;
pub use localopt_solvers;

// Re-export the math backend so downstream crates can name vector types
// without depending on nalgebra directly.
pub use nalgebra;

pub use localopt_core::{Result, SolverError};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use localopt::prelude::*;
/// ```
pub mod prelude {
    pub use localopt_core::prelude::*;
    pub use localopt_solvers::{
        NelderMead, NelderMeadConfig, Newton, NewtonConfig, SteepestDescent,
        SteepestDescentConfig,
    };
}
