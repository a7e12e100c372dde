//! Callback support for monitoring a run.
//!
//! Callbacks observe the iteration loop without altering the numerical
//! trajectory. They can request an early stop, which the engine reports as
//! a successful termination.

use crate::{
    error::Result,
    solver::IterationStatus,
    state::SolverState,
    types::Scalar,
};
use std::time::Duration;

/// Information passed to callbacks after each iteration.
#[derive(Clone, Debug)]
pub struct CallbackInfo<T: Scalar> {
    /// Snapshot of the state produced by the iteration.
    pub state: SolverState<T>,
    /// Iterations completed so far in this run.
    pub n_iter: usize,
    /// Status returned by the iteration.
    pub status: IterationStatus,
    /// Elapsed time since the run started.
    pub elapsed: Duration,
}

/// Trait for run observers.
pub trait SolverCallback<T: Scalar> {
    /// Called once before the first iteration.
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called at the end of each iteration.
    ///
    /// Returns `true` to continue, `false` to stop early.
    fn on_iteration(&mut self, info: &CallbackInfo<T>) -> Result<bool> {
        let _ = info;
        Ok(true)
    }

    /// Called once after the run terminates.
    fn on_end(&mut self, info: &CallbackInfo<T>) -> Result<()> {
        let _ = info;
        Ok(())
    }
}

/// A no-op callback that does nothing.
pub struct NoOpCallback;

impl<T: Scalar> SolverCallback<T> for NoOpCallback {
    // Use default implementations
}

/// A callback that prints progress to stdout.
pub struct PrintProgressCallback {
    print_every: usize,
}

impl PrintProgressCallback {
    /// Creates a progress printer that reports every `print_every` iterations.
    pub fn new(print_every: usize) -> Self {
        Self {
            print_every: print_every.max(1),
        }
    }
}

impl<T: Scalar> SolverCallback<T> for PrintProgressCallback {
    fn on_start(&mut self) -> Result<()> {
        println!("Starting minimization...");
        Ok(())
    }

    fn on_iteration(&mut self, info: &CallbackInfo<T>) -> Result<bool> {
        if info.n_iter % self.print_every == 0 {
            println!(
                "Iteration {}: f = {}, gradient norm = {:?}",
                info.n_iter,
                info.state.value(),
                info.state.gradient_norm()
            );
        }
        Ok(true)
    }

    fn on_end(&mut self, info: &CallbackInfo<T>) -> Result<()> {
        println!(
            "Terminated with {:?} after {} iterations. Final f: {}",
            info.status,
            info.n_iter,
            info.state.value()
        );
        Ok(())
    }
}
