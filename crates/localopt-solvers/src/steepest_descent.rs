//! Steepest descent minimizer.
//!
//! The fundamental first-order algorithm: step along the negative gradient,
//! either with a fixed step size or with Armijo backtracking.
//!
//! # Algorithm Overview
//!
//! At the current iterate x_k:
//! 1. Take d_k = −∇f(x_k)
//! 2. Pick a step size α_k (fixed, or by backtracking line search)
//! 3. Project x_k + α_k d_k onto the feasible set
//! 4. Classify the new iterate
//!
//! # Classification thresholds
//!
//! This algorithm carries its own stopping criterion
//! (`has_built_in_stopping_criterion` is `true`); an external
//! [`StoppingCriterion`](localopt_core::stopping::StoppingCriterion) is
//! never consulted for it.
//!
//! - `Success`: ‖∇f(x_{k+1})‖ < `gradient_tolerance`
//! - `NoProgress`: f decreased by less than
//!   `min_relative_decrease · (|f(x_k)| + min_relative_decrease)` while the
//!   gradient test is still unmet (this includes steps where f increased,
//!   e.g. a failed backtracking search)
//! - `OutOfControl`: the engine's divergence guard (non-finite values or
//!   magnitudes beyond the scalar's divergence bound)

use localopt_core::{
    constraints::Constraints,
    error::{Result, SolverError},
    function::{CountedFunction, ObjectiveFunction},
    line_search::{BacktrackingLineSearch, LineSearch, LineSearchParams},
    solver::{Algorithm, IterationStatus},
    state::SolverState,
    types::{DVector, Scalar},
};
use num_traits::Float;

/// Configuration for the steepest descent minimizer.
#[derive(Debug, Clone)]
pub struct SteepestDescentConfig<T: Scalar> {
    /// Step size (fixed mode) or initial trial step (line-search mode).
    pub step_size: T,

    /// Whether to pick the step by Armijo backtracking.
    pub use_line_search: bool,

    /// Maximum backtracking reductions per iteration.
    pub max_line_search_iterations: usize,

    /// Gradient norm below which the iteration reports success.
    pub gradient_tolerance: T,

    /// Relative decrease of f below which the iteration reports stagnation.
    pub min_relative_decrease: T,
}

impl<T: Scalar> Default for SteepestDescentConfig<T> {
    fn default() -> Self {
        Self {
            step_size: <T as Scalar>::from_f64(0.01),
            use_line_search: false,
            max_line_search_iterations: 30,
            gradient_tolerance: T::DEFAULT_GRADIENT_TOLERANCE,
            min_relative_decrease: T::EPSILON,
        }
    }
}

impl<T: Scalar> SteepestDescentConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step size.
    pub fn with_step_size(mut self, step_size: T) -> Self {
        self.step_size = step_size;
        self
    }

    /// Enables Armijo backtracking for the step size.
    pub fn with_line_search(mut self, max_iterations: usize) -> Self {
        self.use_line_search = true;
        self.max_line_search_iterations = max_iterations;
        self
    }

    /// Sets the gradient norm tolerance of the built-in stopping criterion.
    pub fn with_gradient_tolerance(mut self, tolerance: T) -> Self {
        self.gradient_tolerance = tolerance;
        self
    }

    /// Sets the stagnation threshold on the relative decrease of f.
    pub fn with_min_relative_decrease(mut self, threshold: T) -> Self {
        self.min_relative_decrease = threshold;
        self
    }
}

/// Steepest descent minimizer.
///
/// # Examples
///
/// ```
/// use localopt_solvers::{SteepestDescent, SteepestDescentConfig};
///
/// // Fixed step size
/// let descent = SteepestDescent::new(SteepestDescentConfig::new().with_step_size(0.1));
///
/// // Backtracking line search with a tighter convergence tolerance
/// let tuned = SteepestDescent::new(
///     SteepestDescentConfig::new()
///         .with_line_search(40)
///         .with_gradient_tolerance(1e-10),
/// );
/// ```
#[derive(Debug)]
pub struct SteepestDescent<T: Scalar> {
    config: SteepestDescentConfig<T>,
    line_search: BacktrackingLineSearch,
}

impl<T: Scalar> SteepestDescent<T> {
    /// Creates a steepest descent minimizer with the given configuration.
    pub fn new(config: SteepestDescentConfig<T>) -> Self {
        Self {
            config,
            line_search: BacktrackingLineSearch::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SteepestDescentConfig<T> {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        if !(self.config.step_size > T::zero() && <T as Float>::is_finite(self.config.step_size)) {
            return Err(SolverError::invalid_configuration(
                "step size must be positive and finite",
                "step_size",
                self.config.step_size.to_string(),
            ));
        }
        if !(self.config.gradient_tolerance > T::zero()) {
            return Err(SolverError::invalid_configuration(
                "gradient tolerance must be positive",
                "gradient_tolerance",
                self.config.gradient_tolerance.to_string(),
            ));
        }
        if self.config.min_relative_decrease < T::zero() {
            return Err(SolverError::invalid_configuration(
                "stagnation threshold must be non-negative",
                "min_relative_decrease",
                self.config.min_relative_decrease.to_string(),
            ));
        }
        Ok(())
    }

    fn classify(&self, previous_value: T, state: &SolverState<T>) -> IterationStatus {
        if state
            .gradient_norm()
            .is_some_and(|norm| norm < self.config.gradient_tolerance)
        {
            return IterationStatus::Success;
        }
        let decrease = previous_value - state.value();
        let threshold = self.config.min_relative_decrease
            * (<T as Float>::abs(previous_value) + self.config.min_relative_decrease);
        if decrease < threshold {
            return IterationStatus::NoProgress;
        }
        IterationStatus::Continue
    }
}

impl<T: Scalar> Algorithm<T> for SteepestDescent<T> {
    fn name(&self) -> &str {
        "Steepest descent"
    }

    fn initialize(
        &mut self,
        func: &CountedFunction<'_, T>,
        x0: &DVector<T>,
        constraints: &dyn Constraints<T>,
    ) -> Result<SolverState<T>> {
        self.validate()?;
        let x = constraints.project(x0);
        let (value, gradient) = func.evaluate_with_gradient(&x)?;
        Ok(SolverState::new(x, value).with_gradient(gradient))
    }

    fn step(
        &mut self,
        func: &CountedFunction<'_, T>,
        constraints: &dyn Constraints<T>,
        state: &SolverState<T>,
    ) -> Result<(SolverState<T>, IterationStatus)> {
        let gradient = match state.gradient() {
            Some(g) => g.clone(),
            None => func.gradient(state.point())?,
        };
        // Already at a stationary point within tolerance: nothing to step.
        if gradient.norm() < self.config.gradient_tolerance {
            return Ok((state.clone(), IterationStatus::Success));
        }
        let direction = -&gradient;

        let candidate = if self.config.use_line_search {
            let params = LineSearchParams::default()
                .with_initial_step(self.config.step_size)
                .with_max_iterations(self.config.max_line_search_iterations);
            let result = self.line_search.search(
                func,
                state.point(),
                state.value(),
                &gradient,
                &direction,
                &params,
            )?;
            if !result.success {
                return Ok((state.clone(), IterationStatus::NoProgress));
            }
            result.new_point
        } else {
            state.point() + direction * self.config.step_size
        };

        let projected = constraints.project(&candidate);
        let (value, new_gradient) = func.evaluate_with_gradient(&projected)?;
        let new_state = SolverState::new(projected, value).with_gradient(new_gradient);
        let status = self.classify(state.value(), &new_state);
        Ok((new_state, status))
    }

    fn has_built_in_stopping_criterion(&self) -> bool {
        true
    }
}
