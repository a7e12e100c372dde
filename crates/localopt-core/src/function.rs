//! Objective function interface for optimization algorithms.
//!
//! This module provides the trait that algorithms use to evaluate the
//! objective and its derivatives, along with a counting wrapper that tracks
//! how many evaluations a run has spent.
//!
//! # Design Philosophy
//!
//! The objective interface is designed to be flexible and efficient:
//! - Value, gradient, and Hessian are evaluated lazily and on demand
//! - Finite-difference fallbacks when analytic derivatives aren't available
//! - Evaluation counters live with the function, not the solver: the
//!   iteration engine reads them but never writes them

use crate::{
    error::{Result, SolverError},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::cell::Cell;
use std::fmt::Debug;

/// Trait for objective functions f: R^n -> R.
///
/// This is the main trait that optimization algorithms use to evaluate
/// the objective function and its derivatives. Implementations must be
/// deterministic for a fixed point within one run.
pub trait ObjectiveFunction<T: Scalar>: Debug {
    /// Returns the dimension n of the function's domain.
    fn dimension(&self) -> usize;

    /// Evaluates the objective at a point.
    fn evaluate(&self, x: &DVector<T>) -> Result<T>;

    /// Evaluates the gradient at a point.
    ///
    /// # Default Implementation
    ///
    /// Uses forward finite differences on [`evaluate`](Self::evaluate).
    fn gradient(&self, x: &DVector<T>) -> Result<DVector<T>> {
        let f0 = self.evaluate(x)?;
        let sqrt_eps = <T as Float>::sqrt(T::EPSILON);
        let mut grad = DVector::zeros(x.len());
        for i in 0..x.len() {
            let h = sqrt_eps * <T as Float>::max(T::one(), <T as Float>::abs(x[i]));
            let mut xh = x.clone();
            xh[i] = xh[i] + h;
            grad[i] = (self.evaluate(&xh)? - f0) / h;
        }
        Ok(grad)
    }

    /// Evaluates the objective and its gradient at a point.
    ///
    /// Override when both can be computed together more cheaply than
    /// two separate calls.
    fn evaluate_with_gradient(&self, x: &DVector<T>) -> Result<(T, DVector<T>)> {
        Ok((self.evaluate(x)?, self.gradient(x)?))
    }

    /// Evaluates the Hessian matrix at a point.
    ///
    /// # Default Implementation
    ///
    /// Uses central finite differences on [`gradient`](Self::gradient) and
    /// symmetrizes the result. Override for second-order methods when an
    /// analytic Hessian is available.
    fn hessian(&self, x: &DVector<T>) -> Result<DMatrix<T>> {
        let n = x.len();
        let sqrt_eps = <T as Float>::sqrt(T::EPSILON);
        let two = <T as Scalar>::from_f64(2.0);
        let mut hess = DMatrix::zeros(n, n);
        for i in 0..n {
            let h = sqrt_eps * <T as Float>::max(T::one(), <T as Float>::abs(x[i]));
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[i] = xp[i] + h;
            xm[i] = xm[i] - h;
            let gp = self.gradient(&xp)?;
            let gm = self.gradient(&xm)?;
            hess.set_column(i, &((gp - gm) * (T::one() / (two * h))));
        }
        // Finite differences are not exactly symmetric; average the halves.
        let sym = (&hess + hess.transpose()) * <T as Scalar>::from_f64(0.5);
        Ok(sym)
    }
}

/// Snapshot of the evaluation counters of a [`CountedFunction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationCounts {
    /// Number of objective evaluations.
    pub function: usize,
    /// Number of gradient evaluations.
    pub gradient: usize,
    /// Number of Hessian evaluations.
    pub hessian: usize,
}

/// Wrapper that counts evaluations made through it.
///
/// The counters belong to the function side of the solver contract: the
/// iteration engine wraps the user's objective in a `CountedFunction` at
/// setup and reads the counters when reporting, but only calls made through
/// the wrapper advance them. Counts are monotonically non-decreasing within
/// a run and reset when a new wrapper is created at the next setup.
#[derive(Debug)]
pub struct CountedFunction<'a, T: Scalar> {
    inner: &'a dyn ObjectiveFunction<T>,
    function_count: Cell<usize>,
    gradient_count: Cell<usize>,
    hessian_count: Cell<usize>,
}

impl<'a, T: Scalar> CountedFunction<'a, T> {
    /// Creates a new counting wrapper around an objective function.
    pub fn new(inner: &'a dyn ObjectiveFunction<T>) -> Self {
        Self {
            inner,
            function_count: Cell::new(0),
            gradient_count: Cell::new(0),
            hessian_count: Cell::new(0),
        }
    }

    /// Returns the wrapped objective function.
    pub fn inner(&self) -> &dyn ObjectiveFunction<T> {
        self.inner
    }

    /// Returns the current evaluation counts.
    pub fn counts(&self) -> EvaluationCounts {
        EvaluationCounts {
            function: self.function_count.get(),
            gradient: self.gradient_count.get(),
            hessian: self.hessian_count.get(),
        }
    }

    /// Resets all counters to zero.
    pub fn reset_counts(&self) {
        self.function_count.set(0);
        self.gradient_count.set(0);
        self.hessian_count.set(0);
    }
}

impl<T: Scalar> ObjectiveFunction<T> for CountedFunction<'_, T> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn evaluate(&self, x: &DVector<T>) -> Result<T> {
        self.function_count.set(self.function_count.get() + 1);
        self.inner.evaluate(x)
    }

    fn gradient(&self, x: &DVector<T>) -> Result<DVector<T>> {
        self.gradient_count.set(self.gradient_count.get() + 1);
        self.inner.gradient(x)
    }

    fn evaluate_with_gradient(&self, x: &DVector<T>) -> Result<(T, DVector<T>)> {
        self.function_count.set(self.function_count.get() + 1);
        self.gradient_count.set(self.gradient_count.get() + 1);
        self.inner.evaluate_with_gradient(x)
    }

    fn hessian(&self, x: &DVector<T>) -> Result<DMatrix<T>> {
        self.hessian_count.set(self.hessian_count.get() + 1);
        self.inner.hessian(x)
    }
}

/// Quadratic objective f(x) = ½ xᵀAx − bᵀx with analytic derivatives.
///
/// `A` must be symmetric; the minimizer is the solution of Ax = b when `A`
/// is positive definite. Used by tests and as a reference objective.
#[derive(Debug, Clone)]
pub struct QuadraticObjective<T: Scalar> {
    a: DMatrix<T>,
    b: DVector<T>,
}

impl<T: Scalar> QuadraticObjective<T> {
    /// Creates a quadratic objective from a symmetric matrix and a linear term.
    pub fn new(a: DMatrix<T>, b: DVector<T>) -> Result<Self> {
        if a.nrows() != a.ncols() || a.nrows() != b.len() {
            return Err(SolverError::dimension_mismatch(
                format!("square matrix matching b (length {})", b.len()),
                format!("{}x{}", a.nrows(), a.ncols()),
            ));
        }
        Ok(Self { a, b })
    }

    /// Creates the simple quadratic f(x) = ½ ‖x‖² in the given dimension.
    pub fn simple(dim: usize) -> Self {
        Self {
            a: DMatrix::identity(dim, dim),
            b: DVector::zeros(dim),
        }
    }
}

impl<T: Scalar> ObjectiveFunction<T> for QuadraticObjective<T> {
    fn dimension(&self) -> usize {
        self.b.len()
    }

    fn evaluate(&self, x: &DVector<T>) -> Result<T> {
        let ax = &self.a * x;
        Ok(x.dot(&ax) * <T as Scalar>::from_f64(0.5) - self.b.dot(x))
    }

    fn gradient(&self, x: &DVector<T>) -> Result<DVector<T>> {
        Ok(&self.a * x - &self.b)
    }

    fn hessian(&self, _x: &DVector<T>) -> Result<DMatrix<T>> {
        Ok(self.a.clone())
    }
}
