//! Environment observer trait for progress reporting and data collection.

use crate::RunStatus;

/// What an environment advanced in one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepSource {
    /// One message of one of the environment's own schedulers.
    Scheduler,
    /// One step of a nested environment.
    Environment,
}

/// Callbacks invoked by [`Environment::execute_with`][crate::Environment::execute_with]
/// and [`Environment::synchronize_with`][crate::Environment::synchronize_with].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers only read; cell and agent state
/// is reachable through the `SpaceRef`s and agent handles the model kept.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { every: usize, steps: usize }
///
/// impl EnvObserver for ProgressPrinter {
///     fn on_step(&mut self, time: f64, _source: StepSource) {
///         self.steps += 1;
///         if self.steps % self.every == 0 {
///             println!("t = {time}: {} steps", self.steps);
///         }
///     }
/// }
/// ```
pub trait EnvObserver {
    /// Called after every step, with the time of the event that ran.
    fn on_step(&mut self, _time: f64, _source: StepSource) {}

    /// Called after deferred structural changes were applied to every space.
    fn on_synchronize(&mut self, _time: f64) {}

    /// Called once whenever `execute_with` returns.
    fn on_run_end(&mut self, _time: f64, _status: RunStatus) {}
}

/// An [`EnvObserver`] that does nothing.  Use when you need to call
/// `execute_with` but don't want callbacks.
pub struct NoopObserver;

impl EnvObserver for NoopObserver {}
