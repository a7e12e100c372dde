//! Integration tests for the steepest descent minimizer

use localopt_core::prelude::*;
use localopt_solvers::{SteepestDescent, SteepestDescentConfig};
use nalgebra::{DMatrix, DVector};

/// f(x) = x² in one dimension, minimum at 0.
fn parabola() -> QuadraticObjective<f64> {
    QuadraticObjective::new(
        DMatrix::from_diagonal(&DVector::from_vec(vec![2.0])),
        DVector::zeros(1),
    )
    .unwrap()
}

/// f(x) = -x², unbounded below.
fn inverted_parabola() -> QuadraticObjective<f64> {
    QuadraticObjective::new(
        DMatrix::from_diagonal(&DVector::from_vec(vec![-2.0])),
        DVector::zeros(1),
    )
    .unwrap()
}

#[test]
fn test_fixed_step_descent_on_parabola() {
    let objective = parabola();
    let descent = SteepestDescent::new(
        SteepestDescentConfig::new()
            .with_step_size(0.1)
            .with_gradient_tolerance(1e-6),
    );
    let mut solver = Solver::new(descent);
    solver
        .setup(&objective, &DVector::from_vec(vec![10.0]))
        .unwrap();

    // Drive the run by hand: every accepted iterate strictly decreases f.
    let mut previous = solver.value().unwrap();
    let mut status = IterationStatus::Continue;
    for _ in 0..10_000 {
        status = solver.iterate().unwrap();
        let current = solver.value().unwrap();
        assert!(current < previous || status == IterationStatus::Success);
        previous = current;
        if status.is_terminal() {
            break;
        }
    }

    assert_eq!(status, IterationStatus::Success);
    assert!(solver.x().unwrap()[0].abs() < 1e-3);
    assert!(solver.gradient().unwrap().norm() < 1e-6);
}

#[test]
fn test_unbounded_objective_goes_out_of_control() {
    let objective = inverted_parabola();
    let descent = SteepestDescent::new(SteepestDescentConfig::new().with_step_size(0.1));
    let mut solver = Solver::new(descent);

    let never_stop = |_: &SolverState<f64>, _: usize| false;
    let result = solver
        .solve(&objective, &DVector::from_vec(vec![1.0]), &never_stop)
        .unwrap();

    // The run must terminate on its own instead of looping or crashing.
    assert_eq!(result.status, IterationStatus::OutOfControl);
    assert!(!result.converged);
    assert!(result.iterations > 0);
    assert_eq!(result.iterations, result.states.len());
}

#[test]
fn test_line_search_descent_converges_in_higher_dimension() {
    // Ill-conditioned convex quadratic
    let objective = QuadraticObjective::new(
        DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 10.0, 100.0])),
        DVector::zeros(3),
    )
    .unwrap();
    let descent = SteepestDescent::new(
        SteepestDescentConfig::new()
            .with_step_size(1.0)
            .with_line_search(40)
            .with_gradient_tolerance(1e-6),
    );
    let mut solver = Solver::new(descent);

    let result = solver
        .solve(
            &objective,
            &DVector::from_vec(vec![1.0, 1.0, 1.0]),
            &MaxIterations::new(100_000),
        )
        .unwrap();

    assert_eq!(result.status, IterationStatus::Success);
    assert!(result.state.gradient_norm().unwrap() < 1e-6);
    assert!(result.best_point().norm() < 1e-3);
}

#[test]
fn test_built_in_criterion_takes_precedence() {
    let objective = parabola();
    let descent = SteepestDescent::new(
        SteepestDescentConfig::new()
            .with_step_size(0.1)
            .with_gradient_tolerance(1e-6),
    );
    let mut solver = Solver::new(descent);

    // An external criterion that would stop immediately must be ignored
    // because steepest descent declares a built-in criterion.
    let always_stop = |_: &SolverState<f64>, _: usize| true;
    let result = solver
        .solve(&objective, &DVector::from_vec(vec![10.0]), &always_stop)
        .unwrap();

    assert!(result.iterations > 1);
    assert_eq!(result.status, IterationStatus::Success);
    assert!(result.best_point()[0].abs() < 1e-3);
}

#[test]
fn test_bounded_descent_stops_at_the_active_bound() {
    let objective = parabola();
    let descent = SteepestDescent::new(
        SteepestDescentConfig::new()
            .with_step_size(0.1)
            .with_gradient_tolerance(1e-6),
    );
    let mut solver = Solver::new(descent);

    let bounds = BoundConstraints::new(
        DVector::from_vec(vec![2.0]),
        DVector::from_vec(vec![20.0]),
    )
    .unwrap();
    let never_stop = |_: &SolverState<f64>, _: usize| false;
    let result = solver
        .solve_constrained(
            &objective,
            &DVector::from_vec(vec![10.0]),
            &never_stop,
            Box::new(bounds),
            false,
        )
        .unwrap();

    // The unconstrained minimum at 0 is infeasible; the iterates pile up on
    // the lower bound until the decrease stalls.
    assert_eq!(result.status, IterationStatus::NoProgress);
    assert_eq!(result.best_point()[0], 2.0);
}
