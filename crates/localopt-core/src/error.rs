//! Error types for the optimization framework.
//!
//! Structural and configuration problems are reported through [`SolverError`]
//! and propagate with `?`. Numerical-quality problems (divergence,
//! stagnation) are *not* errors: the iteration engine classifies them as
//! [`IterationStatus`](crate::solver::IterationStatus) outcomes so that a run
//! always completes cleanly with its accumulated history.

use thiserror::Error;

/// Errors that can occur while configuring or driving a solver.
#[derive(Debug, Clone, Error)]
pub enum SolverError {
    /// Dimension mismatch between the initial point and the objective domain.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Invalid solver or algorithm configuration.
    ///
    /// Raised at setup, before any iteration executes.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// An operation was invoked before the solver was set up.
    #[error("Solver is not set up: {operation} requires a prior call to setup")]
    NotInitialized {
        /// Name of the operation that was attempted
        operation: String,
    },

    /// An operation was invoked in a state where it is not allowed.
    #[error("Invalid solver state: {reason}")]
    InvalidState {
        /// Description of why the operation is not allowed
        reason: String,
    },

    /// Method or feature not implemented.
    ///
    /// Used for optional objective-function capabilities (e.g. an analytic
    /// Hessian) that a particular implementation does not provide.
    #[error("Feature not implemented: {feature}")]
    NotImplemented {
        /// Name of the unimplemented feature
        feature: String,
    },

    /// Numerical instability detected.
    ///
    /// The iteration engine intercepts this variant when it escapes an
    /// algorithm step and reports the run as out of control instead of
    /// failing the call.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl SolverError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create a NotInitialized error for a named operation.
    pub fn not_initialized<S: Into<String>>(operation: S) -> Self {
        Self::NotInitialized {
            operation: operation.into(),
        }
    }

    /// Create an InvalidState error with a custom reason.
    pub fn invalid_state<S: Into<String>>(reason: S) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Create a NotImplemented error for a specific feature.
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
