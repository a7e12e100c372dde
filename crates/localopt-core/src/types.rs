//! Type definitions and aliases for local optimization.
//!
//! This module provides common type aliases, traits for numeric types,
//! and constants used throughout the library.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the necessary numeric traits required
/// for the iteration engine and the concrete solver algorithms.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for convergence checks.
    const DEFAULT_TOLERANCE: Self;

    /// Default tolerance for gradient norm convergence.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Magnitude beyond which an iterate is considered out of control.
    ///
    /// Applies both to the objective value and to the iterate norm.
    const DIVERGENCE_BOUND: Self;

    /// Maximum value for line search step size.
    const MAX_STEP_SIZE: Self;

    /// Minimum value for line search step size.
    const MIN_STEP_SIZE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    ///
    /// Returns None if the conversion fails.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_to_f64` for a non-panicking version.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Try to convert to f64.
    ///
    /// Returns None if the conversion fails.
    fn try_to_f64(self) -> Option<f64> {
        num_traits::cast(self)
    }

    /// Convert from usize (for iteration counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_usize` for a non-panicking version.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }

    /// Try to convert from usize.
    ///
    /// Returns None if the conversion fails.
    fn try_from_usize(v: usize) -> Option<Self> {
        <Self as FromPrimitive>::from_usize(v)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-4;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DIVERGENCE_BOUND: Self = 1e8;
    const MAX_STEP_SIZE: Self = 1e3;
    const MIN_STEP_SIZE: Self = 1e-10;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-6;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-8;
    const DIVERGENCE_BOUND: Self = 1e10;
    const MAX_STEP_SIZE: Self = 1e6;
    const MIN_STEP_SIZE: Self = 1e-16;
}

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_constants() {
        assert!(f64::DEFAULT_GRADIENT_TOLERANCE < f64::DEFAULT_TOLERANCE);
        assert!(f32::DEFAULT_GRADIENT_TOLERANCE < f32::DEFAULT_TOLERANCE);
        assert!(f64::DIVERGENCE_BOUND > 1e9);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(<f64 as Scalar>::from_f64(1.5), 1.5);
        assert_eq!(<f32 as Scalar>::from_f64(0.5), 0.5_f32);
        assert_eq!(<f64 as Scalar>::from_usize(7), 7.0);
        assert_eq!(2.25_f64.to_f64(), 2.25);
        assert!(<f64 as Scalar>::try_from_f64(f64::NAN).is_some());
    }
}
