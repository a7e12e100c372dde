//! Line search strategies for descent algorithms.
//!
//! Given a point x, a descent direction d, and an objective f, a line search
//! picks a step size α so that f(x + αd) satisfies a sufficient decrease
//! condition. The backtracking search enforces the Armijo condition
//!
//! f(x + αd) ≤ f(x) + c₁ α ⟨∇f(x), d⟩
//!
//! with 0 < c₁ < 1 (typically 10⁻⁴), halving α until it holds. A failed
//! search is reported through [`LineSearchResult::success`], which concrete
//! algorithms translate into a stagnation outcome rather than an error.

use crate::{
    error::{Result, SolverError},
    function::ObjectiveFunction,
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;

/// Parameters shared by the line search strategies.
#[derive(Debug, Clone)]
pub struct LineSearchParams<T: Scalar> {
    /// First step size tried.
    pub initial_step: T,
    /// Armijo sufficient decrease constant c₁.
    pub c1: T,
    /// Multiplicative backtracking factor in (0, 1).
    pub backtracking_factor: T,
    /// Maximum number of step-size reductions.
    pub max_iterations: usize,
    /// Smallest step size tried before giving up.
    pub min_step: T,
}

impl<T: Scalar> Default for LineSearchParams<T> {
    fn default() -> Self {
        Self {
            initial_step: T::one(),
            c1: <T as Scalar>::from_f64(1e-4),
            backtracking_factor: <T as Scalar>::from_f64(0.5),
            max_iterations: 30,
            min_step: T::MIN_STEP_SIZE,
        }
    }
}

impl<T: Scalar> LineSearchParams<T> {
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first step size tried.
    pub fn with_initial_step(mut self, step: T) -> Self {
        self.initial_step = step;
        self
    }

    /// Sets the Armijo constant c₁.
    pub fn with_c1(mut self, c1: T) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the backtracking factor.
    pub fn with_backtracking_factor(mut self, factor: T) -> Self {
        self.backtracking_factor = factor;
        self
    }

    /// Sets the maximum number of reductions.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Outcome of a line search.
#[derive(Debug, Clone)]
pub struct LineSearchResult<T: Scalar> {
    /// The accepted (or last tried) step size.
    pub step_size: T,
    /// The point x + αd.
    pub new_point: DVector<T>,
    /// The objective value at the new point.
    pub new_value: T,
    /// Whether the sufficient decrease condition was met.
    pub success: bool,
    /// Number of trial steps evaluated.
    pub iterations: usize,
}

/// Trait for line search strategies.
pub trait LineSearch<T: Scalar>: Debug {
    /// Searches along `direction` from `point` for an acceptable step.
    ///
    /// `value` and `gradient` are f and ∇f at `point`; `direction` must be a
    /// descent direction (⟨∇f, d⟩ < 0).
    fn search(
        &self,
        func: &dyn ObjectiveFunction<T>,
        point: &DVector<T>,
        value: T,
        gradient: &DVector<T>,
        direction: &DVector<T>,
        params: &LineSearchParams<T>,
    ) -> Result<LineSearchResult<T>>;
}

/// Armijo backtracking line search.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingLineSearch;

impl BacktrackingLineSearch {
    /// Creates a new backtracking line search.
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> LineSearch<T> for BacktrackingLineSearch {
    fn search(
        &self,
        func: &dyn ObjectiveFunction<T>,
        point: &DVector<T>,
        value: T,
        gradient: &DVector<T>,
        direction: &DVector<T>,
        params: &LineSearchParams<T>,
    ) -> Result<LineSearchResult<T>> {
        let slope = gradient.dot(direction);
        if slope >= T::zero() {
            return Err(SolverError::numerical_error(
                "line search requires a descent direction",
            ));
        }

        let mut step = params.initial_step;
        let mut iterations = 0;
        let mut candidate = point + direction * step;
        let mut candidate_value = func.evaluate(&candidate)?;

        while iterations < params.max_iterations {
            iterations += 1;
            let sufficient = value + params.c1 * step * slope;
            if <T as Float>::is_finite(candidate_value) && candidate_value <= sufficient {
                return Ok(LineSearchResult {
                    step_size: step,
                    new_point: candidate,
                    new_value: candidate_value,
                    success: true,
                    iterations,
                });
            }

            step = step * params.backtracking_factor;
            if step < params.min_step {
                break;
            }
            candidate = point + direction * step;
            candidate_value = func.evaluate(&candidate)?;
        }

        Ok(LineSearchResult {
            step_size: step,
            new_point: candidate,
            new_value: candidate_value,
            success: false,
            iterations,
        })
    }
}

/// Line search that always takes the configured initial step.
///
/// Succeeds whenever the resulting value is finite; useful for algorithms
/// with externally tuned step sizes.
#[derive(Debug, Clone, Default)]
pub struct FixedStepSize;

impl FixedStepSize {
    /// Creates a new fixed-step strategy.
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> LineSearch<T> for FixedStepSize {
    fn search(
        &self,
        func: &dyn ObjectiveFunction<T>,
        point: &DVector<T>,
        _value: T,
        _gradient: &DVector<T>,
        direction: &DVector<T>,
        params: &LineSearchParams<T>,
    ) -> Result<LineSearchResult<T>> {
        let new_point = point + direction * params.initial_step;
        let new_value = func.evaluate(&new_point)?;
        Ok(LineSearchResult {
            step_size: params.initial_step,
            success: <T as Float>::is_finite(new_value),
            new_point,
            new_value,
            iterations: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::QuadraticObjective;
    use approx::assert_relative_eq;

    #[test]
    fn test_backtracking_accepts_full_step_on_quadratic() {
        let q = QuadraticObjective::<f64>::simple(1);
        let point = DVector::from_vec(vec![1.0]);
        let value = 0.5;
        let gradient = DVector::from_vec(vec![1.0]);
        let direction = DVector::from_vec(vec![-1.0]);

        let result = BacktrackingLineSearch::new()
            .search(&q, &point, value, &gradient, &direction, &LineSearchParams::default())
            .unwrap();

        assert!(result.success);
        assert_relative_eq!(result.step_size, 1.0);
        assert_relative_eq!(result.new_value, 0.0);
    }

    #[test]
    fn test_backtracking_shrinks_oversized_step() {
        let q = QuadraticObjective::<f64>::simple(1);
        let point = DVector::from_vec(vec![1.0]);
        let gradient = DVector::from_vec(vec![1.0]);
        let direction = DVector::from_vec(vec![-1.0]);
        let params = LineSearchParams::default().with_initial_step(8.0);

        let result = BacktrackingLineSearch::new()
            .search(&q, &point, 0.5, &gradient, &direction, &params)
            .unwrap();

        assert!(result.success);
        assert!(result.step_size < 8.0);
        assert!(result.new_value < 0.5);
    }

    #[test]
    fn test_backtracking_rejects_ascent_direction() {
        let q = QuadraticObjective::<f64>::simple(1);
        let point = DVector::from_vec(vec![1.0]);
        let gradient = DVector::from_vec(vec![1.0]);
        let direction = DVector::from_vec(vec![1.0]);

        let result = BacktrackingLineSearch::new().search(
            &q,
            &point,
            0.5,
            &gradient,
            &direction,
            &LineSearchParams::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_step() {
        let q = QuadraticObjective::<f64>::simple(1);
        let point = DVector::from_vec(vec![1.0]);
        let gradient = DVector::from_vec(vec![1.0]);
        let direction = DVector::from_vec(vec![-1.0]);
        let params = LineSearchParams::default().with_initial_step(0.25);

        let result = FixedStepSize::new()
            .search(&q, &point, 0.5, &gradient, &direction, &params)
            .unwrap();

        assert!(result.success);
        assert_relative_eq!(result.new_point[0], 0.75);
    }
}
