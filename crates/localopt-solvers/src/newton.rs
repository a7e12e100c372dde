//! Damped Newton minimizer.
//!
//! Uses second-order information to achieve faster convergence than
//! first-order methods: each step solves (H + λI) d = −∇f and backtracks
//! along d until the Armijo condition holds.
//!
//! # Regularization
//!
//! The Hessian of a non-convex objective need not be positive definite. The
//! solve starts from `hessian_regularization` as λ and multiplies it by 10
//! until the Cholesky factorization succeeds and d is a descent direction;
//! if no λ works within `max_regularization_attempts`, the step falls back
//! to the steepest descent direction.
//!
//! # Classification thresholds
//!
//! This algorithm has no built-in stopping criterion: `Success` comes only
//! from the external criterion supplied to the solve. The step itself
//! classifies:
//!
//! - `NoProgress`: the line search found no acceptable decrease, or f
//!   decreased by less than
//!   `min_relative_decrease · (|f(x_k)| + min_relative_decrease)`
//! - `OutOfControl`: the engine's divergence guard

use localopt_core::{
    constraints::Constraints,
    error::{Result, SolverError},
    function::{CountedFunction, ObjectiveFunction},
    line_search::{BacktrackingLineSearch, LineSearch, LineSearchParams},
    solver::{Algorithm, IterationStatus},
    state::SolverState,
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;

/// Configuration for the damped Newton minimizer.
#[derive(Debug, Clone)]
pub struct NewtonConfig<T: Scalar> {
    /// Initial Tikhonov regularization λ added to the Hessian diagonal.
    pub hessian_regularization: T,

    /// Maximum number of tenfold λ escalations before the gradient fallback.
    pub max_regularization_attempts: usize,

    /// Line search parameters for the damping step.
    pub line_search_params: LineSearchParams<T>,

    /// Relative decrease of f below which the iteration reports stagnation.
    pub min_relative_decrease: T,
}

impl<T: Scalar> Default for NewtonConfig<T> {
    fn default() -> Self {
        Self {
            hessian_regularization: <T as Scalar>::from_f64(1e-8),
            max_regularization_attempts: 12,
            line_search_params: LineSearchParams::default(),
            min_relative_decrease: T::EPSILON,
        }
    }
}

impl<T: Scalar> NewtonConfig<T> {
    /// Creates a new Newton configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial Hessian regularization.
    pub fn with_regularization(mut self, regularization: T) -> Self {
        self.hessian_regularization = regularization;
        self
    }

    /// Sets the line search parameters.
    pub fn with_line_search_params(mut self, params: LineSearchParams<T>) -> Self {
        self.line_search_params = params;
        self
    }

    /// Sets the stagnation threshold on the relative decrease of f.
    pub fn with_min_relative_decrease(mut self, threshold: T) -> Self {
        self.min_relative_decrease = threshold;
        self
    }
}

/// Damped Newton minimizer.
///
/// # Examples
///
/// ```
/// use localopt_solvers::{Newton, NewtonConfig};
///
/// let newton = Newton::<f64>::new(NewtonConfig::new().with_regularization(1e-6));
/// ```
#[derive(Debug)]
pub struct Newton<T: Scalar> {
    config: NewtonConfig<T>,
    line_search: BacktrackingLineSearch,
}

impl<T: Scalar> Newton<T> {
    /// Creates a Newton minimizer with the given configuration.
    pub fn new(config: NewtonConfig<T>) -> Self {
        Self {
            config,
            line_search: BacktrackingLineSearch::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NewtonConfig<T> {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        if self.config.hessian_regularization < T::zero()
            || !<T as Float>::is_finite(self.config.hessian_regularization)
        {
            return Err(SolverError::invalid_configuration(
                "Hessian regularization must be non-negative and finite",
                "hessian_regularization",
                self.config.hessian_regularization.to_string(),
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

    /// Solves (H + λI) d = −g, escalating λ until the factorization yields
    /// a descent direction. Falls back to −g.
    fn newton_direction(&self, hessian: &DMatrix<T>, gradient: &DVector<T>) -> DVector<T> {
        let n = gradient.len();
        let mut lambda = self.config.hessian_regularization;
        for _ in 0..=self.config.max_regularization_attempts {
            let regularized = hessian + DMatrix::identity(n, n) * lambda;
            if let Some(factorization) = regularized.cholesky() {
                let direction = factorization.solve(&-gradient);
                if gradient.dot(&direction) < T::zero() {
                    return direction;
                }
            }
            lambda = if lambda > T::zero() {
                lambda * <T as Scalar>::from_f64(10.0)
            } else {
                <T as Scalar>::from_f64(1e-10)
            };
        }
        -gradient
    }
}

impl<T: Scalar> Algorithm<T> for Newton<T> {
    fn name(&self) -> &str {
        "Newton"
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
        let hessian = func.hessian(state.point())?;
        let direction = self.newton_direction(&hessian, &gradient);

        // A vanishing gradient leaves no descent direction; without a
        // built-in success test this is stagnation, not convergence.
        if gradient.dot(&direction) >= T::zero() {
            return Ok((state.clone(), IterationStatus::NoProgress));
        }

        let search = self.line_search.search(
            func,
            state.point(),
            state.value(),
            &gradient,
            &direction,
            &self.config.line_search_params,
        )?;
        if !search.success {
            return Ok((state.clone(), IterationStatus::NoProgress));
        }

        let projected = constraints.project(&search.new_point);
        let (value, new_gradient) = func.evaluate_with_gradient(&projected)?;
        let new_state = SolverState::new(projected, value).with_gradient(new_gradient);

        let decrease = state.value() - value;
        let threshold = self.config.min_relative_decrease
            * (<T as Float>::abs(state.value()) + self.config.min_relative_decrease);
        let status = if decrease < threshold {
            IterationStatus::NoProgress
        } else {
            IterationStatus::Continue
        };
        Ok((new_state, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use localopt_core::constraints::Unconstrained;
    use localopt_core::function::QuadraticObjective;

    fn convex_quadratic() -> QuadraticObjective<f64> {
        // f(x, y) = x^2 + 2 y^2 - x + y
        QuadraticObjective::new(
            DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 4.0])),
            DVector::from_vec(vec![1.0, -1.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_full_newton_step_on_quadratic() {
        let objective = convex_quadratic();
        let counted = CountedFunction::new(&objective);
        let mut newton = Newton::new(NewtonConfig::default());

        let state = newton
            .initialize(&counted, &DVector::from_vec(vec![5.0, 5.0]), &Unconstrained)
            .unwrap();
        let (next, status) = newton.step(&counted, &Unconstrained, &state).unwrap();

        // One full Newton step lands on the minimizer of a quadratic.
        assert_eq!(status, IterationStatus::Continue);
        assert_relative_eq!(next.point()[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(next.point()[1], -0.25, epsilon = 1e-6);
        assert_eq!(counted.counts().hessian, 1);
    }

    #[test]
    fn test_stagnation_at_minimizer() {
        let objective = convex_quadratic();
        let counted = CountedFunction::new(&objective);
        let mut newton = Newton::new(NewtonConfig::default());

        let minimizer = DVector::from_vec(vec![0.5, -0.25]);
        let state = newton
            .initialize(&counted, &minimizer, &Unconstrained)
            .unwrap();
        let (_, status) = newton.step(&counted, &Unconstrained, &state).unwrap();
        assert_eq!(status, IterationStatus::NoProgress);
    }

    #[test]
    fn test_indefinite_hessian_falls_back_to_descent() {
        // f(x) = -x^2 has H = [-2]; regularization must rescue the solve.
        let objective = QuadraticObjective::new(
            DMatrix::from_diagonal(&DVector::from_vec(vec![-2.0])),
            DVector::zeros(1),
        )
        .unwrap();
        let counted = CountedFunction::new(&objective);
        let newton = Newton::new(NewtonConfig::default());

        let gradient = DVector::from_vec(vec![-2.0]); // at x = 1
        let hessian = counted.hessian(&DVector::from_vec(vec![1.0])).unwrap();
        let direction = newton.newton_direction(&hessian, &gradient);
        assert!(gradient.dot(&direction) < 0.0);
    }

    #[test]
    fn test_negative_regularization_rejected() {
        let objective = convex_quadratic();
        let counted = CountedFunction::new(&objective);
        let mut newton = Newton::new(NewtonConfig::new().with_regularization(-1.0));
        let result = newton.initialize(&counted, &DVector::zeros(2), &Unconstrained);
        assert!(matches!(
            result,
            Err(SolverError::InvalidConfiguration { .. })
        ));
    }
}
