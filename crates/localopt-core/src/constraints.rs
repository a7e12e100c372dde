//! Feasible-set constraints.
//!
//! Constraints restrict where iterates may land. The contract is a single
//! projection: concrete algorithms project candidate points onto the
//! feasible set during step computation; the iteration engine itself never
//! projects. The default is [`Unconstrained`], whose projection is the
//! identity.

use crate::{
    error::{Result, SolverError},
    types::{DVector, Scalar},
};
use std::fmt::Debug;

/// Trait for constraint sets.
pub trait Constraints<T: Scalar>: Debug {
    /// Projects a point onto the feasible set.
    fn project(&self, x: &DVector<T>) -> DVector<T>;

    /// Whether a point already lies in the feasible set.
    fn contains(&self, x: &DVector<T>) -> bool {
        self.project(x) == *x
    }
}

/// The unconstrained feasible set R^n.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl<T: Scalar> Constraints<T> for Unconstrained {
    fn project(&self, x: &DVector<T>) -> DVector<T> {
        x.clone()
    }

    fn contains(&self, _x: &DVector<T>) -> bool {
        true
    }
}

/// Component-wise box bounds l ≤ x ≤ u.
///
/// Projection clamps each component into its interval.
#[derive(Debug, Clone)]
pub struct BoundConstraints<T: Scalar> {
    lower: DVector<T>,
    upper: DVector<T>,
}

impl<T: Scalar> BoundConstraints<T> {
    /// Creates box bounds, validating that the vectors have equal length and
    /// that every lower bound is at most its upper bound.
    pub fn new(lower: DVector<T>, upper: DVector<T>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(SolverError::dimension_mismatch(
                format!("bounds of equal length ({})", lower.len()),
                format!("upper of length {}", upper.len()),
            ));
        }
        for i in 0..lower.len() {
            if lower[i] > upper[i] {
                return Err(SolverError::invalid_configuration(
                    "lower bound exceeds upper bound",
                    format!("bounds[{i}]"),
                    format!("[{}, {}]", lower[i], upper[i]),
                ));
            }
        }
        Ok(Self { lower, upper })
    }

    /// The lower bounds.
    pub fn lower(&self) -> &DVector<T> {
        &self.lower
    }

    /// The upper bounds.
    pub fn upper(&self) -> &DVector<T> {
        &self.upper
    }
}

impl<T: Scalar> Constraints<T> for BoundConstraints<T> {
    fn project(&self, x: &DVector<T>) -> DVector<T> {
        DVector::from_iterator(
            x.len(),
            x.iter().enumerate().map(|(i, &v)| {
                if v < self.lower[i] {
                    self.lower[i]
                } else if v > self.upper[i] {
                    self.upper[i]
                } else {
                    v
                }
            }),
        )
    }

    fn contains(&self, x: &DVector<T>) -> bool {
        x.len() == self.lower.len()
            && x.iter()
                .enumerate()
                .all(|(i, &v)| v >= self.lower[i] && v <= self.upper[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_is_identity() {
        let x = DVector::from_vec(vec![1.0, -5.0, 100.0]);
        let c = Unconstrained;
        assert_eq!(Constraints::<f64>::project(&c, &x), x);
        assert!(Constraints::<f64>::contains(&c, &x));
    }

    #[test]
    fn test_bound_projection() {
        let bounds = BoundConstraints::new(
            DVector::from_vec(vec![0.0, 0.0]),
            DVector::from_vec(vec![1.0, 1.0]),
        )
        .unwrap();

        let x = DVector::from_vec(vec![-0.5, 2.0]);
        let projected = bounds.project(&x);
        assert_eq!(projected, DVector::from_vec(vec![0.0, 1.0]));
        assert!(bounds.contains(&projected));
        assert!(!bounds.contains(&x));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = BoundConstraints::new(
            DVector::from_vec(vec![1.0]),
            DVector::from_vec(vec![0.0]),
        );
        assert!(matches!(
            result,
            Err(SolverError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_mismatched_bounds_rejected() {
        let result = BoundConstraints::new(
            DVector::from_vec(vec![0.0, 0.0]),
            DVector::from_vec(vec![1.0]),
        );
        assert!(matches!(result, Err(SolverError::DimensionMismatch { .. })));
    }
}
