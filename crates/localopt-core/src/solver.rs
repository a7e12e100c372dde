//! The solver iteration engine.
//!
//! This module provides the machinery that drives a single local
//! minimization run from setup to termination. It defines the interface
//! that all concrete algorithms implement, along with the engine that owns
//! the iteration loop, counters, and state history.
//!
//! # Key Components
//!
//! - **Algorithm trait**: the polymorphic step every concrete solver provides
//! - **Solver**: orchestrates setup, iteration, stopping and bookkeeping
//! - **IterationStatus**: classification of each iteration's outcome
//! - **SolveResult**: the record handed back across the system boundary
//!
//! # Status Machine
//!
//! Each iteration ends in exactly one of four statuses. `Continue` keeps the
//! loop going; the other three are terminal. Stagnation (`NoProgress`) and
//! divergence (`OutOfControl`) are reported outcomes, not errors: a run that
//! hits them still returns cleanly with its accumulated history. Before
//! `setup` is called the engine holds no run at all, and iteration
//! operations fail with [`SolverError::NotInitialized`].

use crate::{
    callback::{CallbackInfo, SolverCallback},
    constraints::{Constraints, Unconstrained},
    error::{Result, SolverError},
    function::{CountedFunction, EvaluationCounts, ObjectiveFunction},
    state::SolverState,
    stopping::StoppingCriterion,
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Classification of one iteration's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IterationStatus {
    /// The iteration made acceptable progress; the loop continues.
    Continue,
    /// A stopping condition (built-in or external) is satisfied.
    Success,
    /// The algorithm is stagnating without satisfying a success criterion.
    NoProgress,
    /// The iterate diverges or became non-finite.
    OutOfControl,
}

impl IterationStatus {
    /// Whether this status terminates the run.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Trait for concrete minimization algorithms.
///
/// An algorithm supplies the step that advances one [`SolverState`] to the
/// next; the [`Solver`] engine owns everything around it (counters, history,
/// the stopping protocol). Algorithm-specific tunables live in the
/// algorithm's own configuration struct, and the numerical thresholds it
/// uses to classify a step as stagnant or divergent are documented there.
pub trait Algorithm<T: Scalar>: Debug {
    /// Returns the name of the algorithm.
    fn name(&self) -> &str;

    /// Validates the configuration and produces the initial state at `x0`.
    ///
    /// Called once per run by [`Solver::setup`]. Evaluates whatever the
    /// method needs at the starting point (at least the objective value).
    fn initialize(
        &mut self,
        func: &CountedFunction<'_, T>,
        x0: &DVector<T>,
        constraints: &dyn Constraints<T>,
    ) -> Result<SolverState<T>>;

    /// Computes the next state from the current one and classifies it.
    ///
    /// Constraint projection is this method's responsibility; the engine
    /// never projects. Numerical-quality failures should be reported by
    /// returning an `OutOfControl`/`NoProgress` status (or a
    /// [`SolverError::NumericalError`], which the engine converts to
    /// `OutOfControl`), never by panicking.
    fn step(
        &mut self,
        func: &CountedFunction<'_, T>,
        constraints: &dyn Constraints<T>,
        state: &SolverState<T>,
    ) -> Result<(SolverState<T>, IterationStatus)>;

    /// Whether this algorithm embeds its own convergence test.
    ///
    /// When `true`, the engine never consults an external
    /// [`StoppingCriterion`]; returning `Success` from
    /// [`step`](Self::step) is solely this algorithm's responsibility.
    fn has_built_in_stopping_criterion(&self) -> bool {
        false
    }
}

/// Result of a minimization run.
///
/// History entries are shared snapshots: callers may hold on to individual
/// states for diagnostics after the solver is discarded or re-used.
#[derive(Debug, Clone)]
pub struct SolveResult<T: Scalar> {
    /// Terminal status of the run.
    pub status: IterationStatus,
    /// The final state.
    pub state: Arc<SolverState<T>>,
    /// One state per completed iteration, in chronological order.
    pub states: Vec<Arc<SolverState<T>>>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Number of objective evaluations.
    pub function_evaluations: usize,
    /// Number of gradient evaluations.
    pub gradient_evaluations: usize,
    /// Number of Hessian evaluations.
    pub hessian_evaluations: usize,
    /// Wall-clock duration of the iteration loop, when timing was requested.
    pub duration: Option<Duration>,
    /// Whether the run terminated successfully.
    pub converged: bool,
}

impl<T: Scalar> SolveResult<T> {
    /// The objective value at the final state.
    pub fn best_value(&self) -> T {
        self.state.value()
    }

    /// The representative point of the final state.
    pub fn best_point(&self) -> &DVector<T> {
        self.state.point()
    }
}

/// Live data of one run, created by `setup` and replaced by the next one.
struct Run<'a, T: Scalar> {
    func: CountedFunction<'a, T>,
    constraints: Box<dyn Constraints<T> + 'a>,
    state: SolverState<T>,
    status: IterationStatus,
    n_iter: usize,
}

/// The iteration engine.
///
/// A `Solver` pairs one algorithm with the bookkeeping of a run: evaluation
/// counters (owned by the wrapped objective, read here), the iteration
/// count, the live state, and the status machine. One instance drives one
/// run at a time and is reset by the next `setup`; it is not meant to be
/// shared across threads — run one instance per thread instead.
///
/// # Examples
///
/// ```
/// use localopt_core::prelude::*;
/// # use localopt_core::error::Result;
/// # use localopt_core::solver::{Algorithm, IterationStatus};
/// # use localopt_core::types::DVector;
/// # #[derive(Debug)]
/// # struct Halving;
/// # impl Algorithm<f64> for Halving {
/// #     fn name(&self) -> &str { "halving" }
/// #     fn initialize(
/// #         &mut self,
/// #         func: &CountedFunction<'_, f64>,
/// #         x0: &DVector<f64>,
/// #         constraints: &dyn Constraints<f64>,
/// #     ) -> Result<SolverState<f64>> {
/// #         let x = constraints.project(x0);
/// #         let f = func.evaluate(&x)?;
/// #         Ok(SolverState::new(x, f))
/// #     }
/// #     fn step(
/// #         &mut self,
/// #         func: &CountedFunction<'_, f64>,
/// #         constraints: &dyn Constraints<f64>,
/// #         state: &SolverState<f64>,
/// #     ) -> Result<(SolverState<f64>, IterationStatus)> {
/// #         let x = constraints.project(&(state.point() * 0.5));
/// #         let f = func.evaluate(&x)?;
/// #         let status = if x.norm() < 1e-6 {
/// #             IterationStatus::Success
/// #         } else {
/// #             IterationStatus::Continue
/// #         };
/// #         Ok((SolverState::new(x, f), status))
/// #     }
/// #     fn has_built_in_stopping_criterion(&self) -> bool { true }
/// # }
/// let objective = QuadraticObjective::<f64>::simple(2);
/// let mut solver = Solver::new(Halving);
/// let x0 = DVector::from_vec(vec![4.0, -4.0]);
/// let result = solver.solve(&objective, &x0, &MaxIterations::new(100))?;
/// assert!(result.converged);
/// # Ok::<(), localopt_core::SolverError>(())
/// ```
pub struct Solver<'a, T: Scalar, A: Algorithm<T>> {
    algorithm: A,
    run: Option<Run<'a, T>>,
}

impl<'a, T: Scalar, A: Algorithm<T>> Solver<'a, T, A> {
    /// Creates a solver driving the given algorithm.
    pub fn new(algorithm: A) -> Self {
        Self {
            algorithm,
            run: None,
        }
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Prepares an unconstrained run starting at `x0`.
    ///
    /// See [`setup_constrained`](Self::setup_constrained).
    pub fn setup(&mut self, func: &'a dyn ObjectiveFunction<T>, x0: &DVector<T>) -> Result<()> {
        self.setup_constrained(func, x0, Box::new(Unconstrained))
    }

    /// Prepares a run starting at `x0` under the given constraints.
    ///
    /// Resets the iteration count and all evaluation counters to zero,
    /// validates that `x0` matches the objective's domain dimension, and
    /// asks the algorithm for the initial state. Any previous run is
    /// discarded. Fails with [`SolverError::DimensionMismatch`] before any
    /// evaluation when the dimensions disagree.
    pub fn setup_constrained(
        &mut self,
        func: &'a dyn ObjectiveFunction<T>,
        x0: &DVector<T>,
        constraints: Box<dyn Constraints<T> + 'a>,
    ) -> Result<()> {
        if func.dimension() != x0.len() {
            return Err(SolverError::dimension_mismatch(
                format!("initial point of length {}", func.dimension()),
                format!("length {}", x0.len()),
            ));
        }

        let counted = CountedFunction::new(func);
        let state = self
            .algorithm
            .initialize(&counted, x0, constraints.as_ref())?;
        // A non-finite starting state terminates the run before it begins.
        let status = if Self::diverged(&state) {
            IterationStatus::OutOfControl
        } else {
            IterationStatus::Continue
        };
        self.run = Some(Run {
            func: counted,
            constraints,
            state,
            status,
            n_iter: 0,
        });
        Ok(())
    }

    /// Advances the run by one iteration and classifies the outcome.
    ///
    /// Fails with [`SolverError::NotInitialized`] before `setup` and with
    /// [`SolverError::InvalidState`] once the run is terminal. A
    /// [`SolverError::NumericalError`] escaping the algorithm's step is
    /// classified as `OutOfControl` rather than propagated; the iteration
    /// count then stays unchanged because no new state was produced.
    pub fn iterate(&mut self) -> Result<IterationStatus> {
        let Self { algorithm, run } = self;
        let run = run
            .as_mut()
            .ok_or_else(|| SolverError::not_initialized("iterate"))?;
        if run.status.is_terminal() {
            return Err(SolverError::invalid_state(
                "iterate called on a terminated run; call setup to start a new one",
            ));
        }

        match algorithm.step(&run.func, run.constraints.as_ref(), &run.state) {
            Ok((state, status)) => {
                let status = if Self::diverged(&state) {
                    IterationStatus::OutOfControl
                } else {
                    status
                };
                run.state = state;
                run.n_iter += 1;
                run.status = status;
                Ok(status)
            }
            Err(SolverError::NumericalError { .. }) => {
                run.status = IterationStatus::OutOfControl;
                Ok(IterationStatus::OutOfControl)
            }
            Err(e) => Err(e),
        }
    }

    /// Runs a complete unconstrained minimization.
    pub fn solve(
        &mut self,
        func: &'a dyn ObjectiveFunction<T>,
        x0: &DVector<T>,
        stop_crit: &dyn StoppingCriterion<T>,
    ) -> Result<SolveResult<T>> {
        self.solve_inner(func, x0, stop_crit, Box::new(Unconstrained), None, false)
    }

    /// Runs a complete minimization under constraints.
    ///
    /// When `time_test` is true the wall-clock duration of the iteration
    /// loop is recorded in the result; timing never alters the trajectory.
    pub fn solve_constrained(
        &mut self,
        func: &'a dyn ObjectiveFunction<T>,
        x0: &DVector<T>,
        stop_crit: &dyn StoppingCriterion<T>,
        constraints: Box<dyn Constraints<T> + 'a>,
        time_test: bool,
    ) -> Result<SolveResult<T>> {
        self.solve_inner(func, x0, stop_crit, constraints, None, time_test)
    }

    /// Runs a complete unconstrained minimization with an observer.
    ///
    /// The callback sees every produced state; returning `false` from its
    /// iteration hook stops the run, reported as `Success`.
    pub fn solve_with_callback(
        &mut self,
        func: &'a dyn ObjectiveFunction<T>,
        x0: &DVector<T>,
        stop_crit: &dyn StoppingCriterion<T>,
        callback: &mut dyn SolverCallback<T>,
    ) -> Result<SolveResult<T>> {
        self.solve_inner(
            func,
            x0,
            stop_crit,
            Box::new(Unconstrained),
            Some(callback),
            false,
        )
    }

    fn solve_inner(
        &mut self,
        func: &'a dyn ObjectiveFunction<T>,
        x0: &DVector<T>,
        stop_crit: &dyn StoppingCriterion<T>,
        constraints: Box<dyn Constraints<T> + 'a>,
        mut callback: Option<&mut dyn SolverCallback<T>>,
        time_test: bool,
    ) -> Result<SolveResult<T>> {
        let start = Instant::now();
        self.setup_constrained(func, x0, constraints)?;
        if let Some(cb) = callback.as_deref_mut() {
            cb.on_start()?;
        }

        let built_in = self.algorithm.has_built_in_stopping_criterion();
        let mut states: Vec<Arc<SolverState<T>>> = Vec::new();
        let mut status = self.status()?;

        while !status.is_terminal() {
            let produced_before = self.n_iter()?;
            status = self.iterate()?;
            let run = self
                .run
                .as_mut()
                .ok_or_else(|| SolverError::not_initialized("solve"))?;

            if run.n_iter > produced_before {
                states.push(Arc::new(run.state.clone()));
            }

            if let Some(cb) = callback.as_deref_mut() {
                let info = CallbackInfo {
                    state: run.state.clone(),
                    n_iter: run.n_iter,
                    status,
                    elapsed: start.elapsed(),
                };
                if !cb.on_iteration(&info)? && !status.is_terminal() {
                    status = IterationStatus::Success;
                    run.status = status;
                }
            }

            // The external criterion is consulted only for algorithms
            // without a built-in one; an external stop is a success.
            if !status.is_terminal() && !built_in && stop_crit.should_stop(&run.state, run.n_iter)
            {
                status = IterationStatus::Success;
                run.status = status;
            }
        }

        let duration = time_test.then(|| start.elapsed());
        let run = self
            .run
            .as_ref()
            .ok_or_else(|| SolverError::not_initialized("solve"))?;

        if let Some(cb) = callback.as_deref_mut() {
            let info = CallbackInfo {
                state: run.state.clone(),
                n_iter: run.n_iter,
                status,
                elapsed: start.elapsed(),
            };
            cb.on_end(&info)?;
        }

        let counts = run.func.counts();
        let state = states
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::new(run.state.clone()));

        Ok(SolveResult {
            status,
            state,
            states,
            iterations: run.n_iter,
            function_evaluations: counts.function,
            gradient_evaluations: counts.gradient,
            hessian_evaluations: counts.hessian,
            duration,
            converged: status == IterationStatus::Success,
        })
    }

    fn active_run(&self, operation: &str) -> Result<&Run<'a, T>> {
        self.run
            .as_ref()
            .ok_or_else(|| SolverError::not_initialized(operation))
    }

    /// The current state.
    pub fn state(&self) -> Result<&SolverState<T>> {
        Ok(&self.active_run("state")?.state)
    }

    /// The representative current point x_k.
    pub fn x(&self) -> Result<&DVector<T>> {
        Ok(self.active_run("x")?.state.point())
    }

    /// All points currently tracked by the algorithm, one per column.
    ///
    /// Single-point methods yield an n×1 matrix identical to [`x`](Self::x).
    pub fn x_array(&self) -> Result<&DMatrix<T>> {
        Ok(self.active_run("x_array")?.state.points())
    }

    /// The objective value f(x_k).
    pub fn value(&self) -> Result<T> {
        Ok(self.active_run("value")?.state.value())
    }

    /// The gradient at the current point, freshly evaluated.
    ///
    /// Delegates to the objective function; the gradient evaluation counter
    /// advances, the iteration count does not.
    pub fn gradient(&self) -> Result<DVector<T>> {
        let run = self.active_run("gradient")?;
        run.func.gradient(run.state.point())
    }

    /// The Hessian at the current point, freshly evaluated.
    ///
    /// Delegates to the objective function; the Hessian evaluation counter
    /// advances, the iteration count does not.
    pub fn hessian(&self) -> Result<DMatrix<T>> {
        let run = self.active_run("hessian")?;
        run.func.hessian(run.state.point())
    }

    /// The number of iterations since the last setup.
    pub fn n_iter(&self) -> Result<usize> {
        Ok(self.active_run("n_iter")?.n_iter)
    }

    /// Snapshot of all evaluation counters.
    pub fn evaluation_counts(&self) -> Result<EvaluationCounts> {
        Ok(self.active_run("evaluation_counts")?.func.counts())
    }

    /// The number of objective evaluations since the last setup.
    pub fn num_function_evaluations(&self) -> Result<usize> {
        Ok(self.evaluation_counts()?.function)
    }

    /// The number of gradient evaluations since the last setup.
    pub fn num_gradient_evaluations(&self) -> Result<usize> {
        Ok(self.evaluation_counts()?.gradient)
    }

    /// The number of Hessian evaluations since the last setup.
    pub fn num_hessian_evaluations(&self) -> Result<usize> {
        Ok(self.evaluation_counts()?.hessian)
    }

    /// The status of the most recent iteration.
    pub fn status(&self) -> Result<IterationStatus> {
        Ok(self.active_run("status")?.status)
    }

    /// The objective function of the active run.
    pub fn objective(&self) -> Result<&dyn ObjectiveFunction<T>> {
        Ok(self.active_run("objective")?.func.inner())
    }

    fn diverged(state: &SolverState<T>) -> bool {
        !state.is_finite()
            || <T as Float>::abs(state.value()) > T::DIVERGENCE_BOUND
            || state.point().norm() > T::DIVERGENCE_BOUND
    }
}
