//! External stopping criteria.
//!
//! A stopping criterion is a predicate over the solver state and the
//! iteration count, consulted by the engine after each iteration — but only
//! when the active algorithm declares no built-in criterion of its own
//! (a built-in criterion always takes precedence). A stop requested here is
//! reported as a successful termination.

use crate::{
    state::SolverState,
    types::Scalar,
};

/// Trait for external stopping criteria.
///
/// Closures of the right shape implement it directly:
///
/// ```
/// use localopt_core::stopping::StoppingCriterion;
/// use localopt_core::state::SolverState;
///
/// let stop = |state: &SolverState<f64>, _n_iter: usize| state.value() < 1e-9;
/// let state = SolverState::new(nalgebra::DVector::from_vec(vec![0.0]), 0.0);
/// assert!(stop.should_stop(&state, 3));
/// ```
pub trait StoppingCriterion<T: Scalar> {
    /// Whether the run should halt at this state and iteration count.
    fn should_stop(&self, state: &SolverState<T>, n_iter: usize) -> bool;
}

impl<T: Scalar, F> StoppingCriterion<T> for F
where
    F: Fn(&SolverState<T>, usize) -> bool,
{
    fn should_stop(&self, state: &SolverState<T>, n_iter: usize) -> bool {
        self(state, n_iter)
    }
}

/// Stops after a fixed number of iterations.
#[derive(Debug, Clone, Copy)]
pub struct MaxIterations {
    max_iterations: usize,
}

impl MaxIterations {
    /// Creates a criterion that stops once `max_iterations` have completed.
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl<T: Scalar> StoppingCriterion<T> for MaxIterations {
    fn should_stop(&self, _state: &SolverState<T>, n_iter: usize) -> bool {
        n_iter >= self.max_iterations
    }
}

/// Stops when the recorded gradient norm falls below a tolerance.
///
/// States without a recorded gradient never satisfy this criterion.
#[derive(Debug, Clone, Copy)]
pub struct GradientNormBelow<T: Scalar> {
    tolerance: T,
}

impl<T: Scalar> GradientNormBelow<T> {
    /// Creates a criterion with the given tolerance.
    pub fn new(tolerance: T) -> Self {
        Self { tolerance }
    }
}

impl<T: Scalar> StoppingCriterion<T> for GradientNormBelow<T> {
    fn should_stop(&self, state: &SolverState<T>, _n_iter: usize) -> bool {
        state
            .gradient_norm()
            .is_some_and(|norm| norm < self.tolerance)
    }
}

/// Stops when the objective value reaches a target.
#[derive(Debug, Clone, Copy)]
pub struct ValueBelow<T: Scalar> {
    target: T,
}

impl<T: Scalar> ValueBelow<T> {
    /// Creates a criterion with the given target value.
    pub fn new(target: T) -> Self {
        Self { target }
    }
}

impl<T: Scalar> StoppingCriterion<T> for ValueBelow<T> {
    fn should_stop(&self, state: &SolverState<T>, _n_iter: usize) -> bool {
        state.value() <= self.target
    }
}

/// Stops when any of the wrapped criteria stops.
pub struct AnyOf<T: Scalar> {
    criteria: Vec<Box<dyn StoppingCriterion<T>>>,
}

impl<T: Scalar> AnyOf<T> {
    /// Creates an empty disjunction (never stops until criteria are added).
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// Adds a criterion to the disjunction.
    pub fn or(mut self, criterion: impl StoppingCriterion<T> + 'static) -> Self {
        self.criteria.push(Box::new(criterion));
        self
    }
}

impl<T: Scalar> Default for AnyOf<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> StoppingCriterion<T> for AnyOf<T> {
    fn should_stop(&self, state: &SolverState<T>, n_iter: usize) -> bool {
        self.criteria.iter().any(|c| c.should_stop(state, n_iter))
    }
}

/// Stops only when all of the wrapped criteria stop.
pub struct AllOf<T: Scalar> {
    criteria: Vec<Box<dyn StoppingCriterion<T>>>,
}

impl<T: Scalar> AllOf<T> {
    /// Creates an empty conjunction (stops immediately until criteria are added).
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// Adds a criterion to the conjunction.
    pub fn and(mut self, criterion: impl StoppingCriterion<T> + 'static) -> Self {
        self.criteria.push(Box::new(criterion));
        self
    }
}

impl<T: Scalar> Default for AllOf<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> StoppingCriterion<T> for AllOf<T> {
    fn should_stop(&self, state: &SolverState<T>, n_iter: usize) -> bool {
        self.criteria.iter().all(|c| c.should_stop(state, n_iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DVector;

    fn state_with_gradient(value: f64, grad: f64) -> SolverState<f64> {
        SolverState::new(DVector::from_vec(vec![0.0]), value)
            .with_gradient(DVector::from_vec(vec![grad]))
    }

    #[test]
    fn test_max_iterations() {
        let crit = MaxIterations::new(10);
        let state = SolverState::new(DVector::from_vec(vec![0.0]), 1.0);
        assert!(!crit.should_stop(&state, 9));
        assert!(crit.should_stop(&state, 10));
    }

    #[test]
    fn test_gradient_norm_below() {
        let crit = GradientNormBelow::new(1e-6);
        assert!(crit.should_stop(&state_with_gradient(1.0, 1e-8), 1));
        assert!(!crit.should_stop(&state_with_gradient(1.0, 1e-3), 1));

        // No recorded gradient: never stops.
        let state = SolverState::new(DVector::from_vec(vec![0.0]), 1.0);
        assert!(!crit.should_stop(&state, 1));
    }

    #[test]
    fn test_value_below() {
        let crit = ValueBelow::new(0.5);
        assert!(crit.should_stop(&state_with_gradient(0.4, 1.0), 1));
        assert!(!crit.should_stop(&state_with_gradient(0.6, 1.0), 1));
    }

    #[test]
    fn test_combinators() {
        let state = state_with_gradient(0.4, 1e-3);

        let any = AnyOf::new()
            .or(ValueBelow::new(0.5))
            .or(GradientNormBelow::new(1e-6));
        assert!(any.should_stop(&state, 1));

        let all = AllOf::new()
            .and(ValueBelow::new(0.5))
            .and(GradientNormBelow::new(1e-6));
        assert!(!all.should_stop(&state, 1));
    }

    #[test]
    fn test_closure_criterion() {
        let stop = |_state: &SolverState<f64>, n_iter: usize| n_iter > 3;
        let state = SolverState::new(DVector::from_vec(vec![0.0]), 1.0);
        assert!(!stop.should_stop(&state, 3));
        assert!(stop.should_stop(&state, 4));
    }
}
