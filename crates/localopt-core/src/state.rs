//! Iteration state snapshots.
//!
//! A [`SolverState`] captures everything the engine needs to know about one
//! completed iteration: the representative point, the objective value there,
//! and — for algorithms that track several candidates at once — the full
//! point set. States are produced once per iteration by the concrete
//! algorithm, cloned into the run history, and never mutated afterwards, so
//! retained snapshots stay valid across later iterations.

use crate::{
    error::{Result, SolverError},
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;

/// Snapshot of one solver iteration.
///
/// Invariants, maintained by the constructors:
/// - the first column of [`points`](Self::points) equals
///   [`point`](Self::point);
/// - [`value`](Self::value) is the objective evaluated at `point` when the
///   state was produced;
/// - [`gradient_norm`](Self::gradient_norm) is the norm of
///   [`gradient`](Self::gradient) whenever the latter is recorded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverState<T: Scalar> {
    value: T,
    point: DVector<T>,
    points: DMatrix<T>,
    gradient: Option<DVector<T>>,
    gradient_norm: Option<T>,
}

impl<T: Scalar> SolverState<T> {
    /// Creates a single-point state (the point matrix is the point itself
    /// as its only column).
    pub fn new(point: DVector<T>, value: T) -> Self {
        let points = DMatrix::from_columns(&[point.clone()]);
        Self {
            value,
            point,
            points,
            gradient: None,
            gradient_norm: None,
        }
    }

    /// Creates a multi-point state from a matrix of candidate points.
    ///
    /// The first column is the representative (best) point and `value` is
    /// the objective value there. Fails when the matrix has no columns.
    pub fn from_points(points: DMatrix<T>, value: T) -> Result<Self> {
        if points.ncols() == 0 {
            return Err(SolverError::invalid_configuration(
                "point matrix must have at least one column",
                "points",
                "0 columns",
            ));
        }
        let point = points.column(0).into_owned();
        Ok(Self {
            value,
            point,
            points,
            gradient: None,
            gradient_norm: None,
        })
    }

    /// Attaches the gradient at the representative point.
    pub fn with_gradient(mut self, gradient: DVector<T>) -> Self {
        self.gradient_norm = Some(gradient.norm());
        self.gradient = Some(gradient);
        self
    }

    /// The objective value at the representative point.
    pub fn value(&self) -> T {
        self.value
    }

    /// The representative current point.
    pub fn point(&self) -> &DVector<T> {
        &self.point
    }

    /// All points tracked by the algorithm, one per column.
    ///
    /// Single-point methods store an n×1 matrix identical to
    /// [`point`](Self::point).
    pub fn points(&self) -> &DMatrix<T> {
        &self.points
    }

    /// The gradient at the representative point, if the algorithm recorded it.
    pub fn gradient(&self) -> Option<&DVector<T>> {
        self.gradient.as_ref()
    }

    /// The gradient norm, if the gradient was recorded.
    pub fn gradient_norm(&self) -> Option<T> {
        self.gradient_norm
    }

    /// The dimension n of the iterate.
    pub fn dimension(&self) -> usize {
        self.point.len()
    }

    /// The number k of points tracked by the algorithm.
    pub fn num_points(&self) -> usize {
        self.points.ncols()
    }

    /// Whether the value and every tracked point are finite.
    pub fn is_finite(&self) -> bool {
        <T as Float>::is_finite(self.value)
            && self.points.iter().all(|v| <T as Float>::is_finite(*v))
    }
}
