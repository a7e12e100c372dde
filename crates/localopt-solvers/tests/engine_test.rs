//! Engine-level integration tests: counters, history, setup semantics.

use localopt_core::prelude::*;
use localopt_solvers::{NelderMead, NelderMeadConfig, SteepestDescent, SteepestDescentConfig};
use nalgebra::DVector;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn descent() -> SteepestDescent<f64> {
    SteepestDescent::new(
        SteepestDescentConfig::new()
            .with_step_size(0.5)
            .with_gradient_tolerance(1e-8),
    )
}

#[test]
fn test_history_length_equals_iteration_count() {
    let objective = QuadraticObjective::<f64>::simple(3);
    let mut solver = Solver::new(descent());

    let result = solver
        .solve(
            &objective,
            &DVector::from_vec(vec![1.0, 2.0, 3.0]),
            &MaxIterations::new(10_000),
        )
        .unwrap();

    assert_eq!(result.iterations, result.states.len());
    assert_eq!(solver.n_iter().unwrap(), result.iterations);
    // The last history entry is the final state.
    assert_eq!(
        result.states.last().unwrap().value(),
        result.state.value()
    );
}

#[test]
fn test_history_is_chronological() {
    let objective = QuadraticObjective::<f64>::simple(2);
    let mut solver = Solver::new(descent());

    let result = solver
        .solve(
            &objective,
            &DVector::from_vec(vec![5.0, -5.0]),
            &MaxIterations::new(10_000),
        )
        .unwrap();

    // Descent on a convex quadratic: each recorded value improves on the
    // previous one, so insertion order is iteration order.
    for pair in result.states.windows(2) {
        assert!(pair[1].value() < pair[0].value());
    }
}

#[test]
fn test_counters_are_monotone_within_a_run() {
    let objective = QuadraticObjective::<f64>::simple(2);
    let mut solver = Solver::new(descent());
    solver
        .setup(&objective, &DVector::from_vec(vec![3.0, 4.0]))
        .unwrap();

    let mut previous = solver.evaluation_counts().unwrap();
    while !solver.iterate().unwrap().is_terminal() {
        let current = solver.evaluation_counts().unwrap();
        assert!(current.function >= previous.function);
        assert!(current.gradient >= previous.gradient);
        assert!(current.hessian >= previous.hessian);
        previous = current;
    }
}

#[test]
fn test_setup_resets_counters_and_history_position() {
    let objective = QuadraticObjective::<f64>::simple(2);
    let mut solver = Solver::new(descent());
    let x0 = DVector::from_vec(vec![3.0, 4.0]);

    solver.setup(&objective, &x0).unwrap();
    for _ in 0..4 {
        solver.iterate().unwrap();
    }
    assert_eq!(solver.n_iter().unwrap(), 4);
    assert!(solver.num_function_evaluations().unwrap() > 1);

    solver.setup(&objective, &x0).unwrap();
    assert_eq!(solver.n_iter().unwrap(), 0);
    // Exactly the initialization evaluation of the new run.
    assert_eq!(solver.num_function_evaluations().unwrap(), 1);
    assert_eq!(solver.num_gradient_evaluations().unwrap(), 1);
    assert_eq!(solver.num_hessian_evaluations().unwrap(), 0);
}

#[test]
fn test_dimension_mismatch_is_a_setup_error() {
    let objective = QuadraticObjective::<f64>::simple(4);
    let mut solver = Solver::new(descent());

    let err = solver
        .solve(
            &objective,
            &DVector::from_vec(vec![1.0, 2.0]),
            &MaxIterations::new(10),
        )
        .unwrap_err();
    assert!(matches!(err, SolverError::DimensionMismatch { .. }));
}

#[test]
fn test_two_algorithm_families_share_the_engine() {
    // The same engine drives a single-point and a multi-point algorithm.
    let objective = QuadraticObjective::<f64>::simple(2);
    let x0 = DVector::from_vec(vec![2.0, 2.0]);

    let mut gradient_solver = Solver::new(descent());
    let gradient_result = gradient_solver
        .solve(&objective, &x0, &MaxIterations::new(10_000))
        .unwrap();

    let mut simplex_solver = Solver::new(NelderMead::new(NelderMeadConfig::default()));
    let simplex_result = simplex_solver
        .solve(&objective, &x0, &MaxIterations::new(10_000))
        .unwrap();

    assert!(gradient_result.converged);
    assert!(simplex_result.converged);
    assert_eq!(gradient_result.states[0].num_points(), 1);
    assert_eq!(simplex_result.states[0].num_points(), 3);
}

#[test]
fn test_callback_observes_and_stops_a_run() {
    struct StopAfter {
        seen: usize,
        limit: usize,
    }

    impl SolverCallback<f64> for StopAfter {
        fn on_iteration(&mut self, info: &CallbackInfo<f64>) -> Result<bool> {
            self.seen += 1;
            assert_eq!(info.n_iter, self.seen);
            Ok(self.seen < self.limit)
        }
    }

    let objective = QuadraticObjective::<f64>::simple(1);
    // Tiny step so the run would otherwise take thousands of iterations.
    let slow = SteepestDescent::new(
        SteepestDescentConfig::new()
            .with_step_size(1e-4)
            .with_gradient_tolerance(1e-12),
    );
    let mut solver = Solver::new(slow);
    let mut callback = StopAfter { seen: 0, limit: 7 };

    let result = solver
        .solve_with_callback(
            &objective,
            &DVector::from_vec(vec![1.0]),
            &MaxIterations::new(1_000_000),
            &mut callback,
        )
        .unwrap();

    assert_eq!(result.iterations, 7);
    assert_eq!(result.status, IterationStatus::Success);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Descent from any finite start converges on a convex quadratic, and
    /// the engine invariants hold along the way.
    #[test]
    fn prop_descent_converges_on_convex_quadratic(
        x in -10.0f64..10.0,
        y in -10.0f64..10.0,
    ) {
        let objective = QuadraticObjective::<f64>::simple(2);
        let mut solver = Solver::new(SteepestDescent::new(
            SteepestDescentConfig::new()
                .with_step_size(1.0)
                .with_line_search(40)
                .with_gradient_tolerance(1e-6),
        ));

        let result = solver
            .solve(
                &objective,
                &DVector::from_vec(vec![x, y]),
                &MaxIterations::new(100_000),
            )
            .unwrap();

        prop_assert_eq!(result.status, IterationStatus::Success);
        prop_assert!(result.state.gradient_norm().unwrap() < 1e-6);
        prop_assert_eq!(result.iterations, result.states.len());
    }
}
