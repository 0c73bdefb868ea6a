//! Host-side run control.
//!
//! A [`SimulationControl`] is owned by whoever drives the simulation and
//! handed to [`Environment::execute_with`](crate::Environment::execute_with).
//! It is consulted before every discrete step, which is the only point where
//! a run can be suspended.

/// How a call to `execute_with` ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The next event lies beyond the final time.
    Finished,
    /// Nothing is left to run.
    Exhausted,
    /// Paused with no single steps left; calling `execute_with` again resumes.
    Suspended,
    /// Stopped by the host.
    Stopped,
}

/// Pause, single-step, and stop commands for a running environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationControl {
    paused:  bool,
    steps:   u64,
    stopped: bool,
}

/// Verdict for the next step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Admit {
    Run,
    Suspend,
    Stop,
}

impl SimulationControl {
    /// Run freely until finished.
    pub fn running() -> Self {
        Self::default()
    }

    /// Start paused; use [`step`](Self::step) or [`resume`](Self::resume).
    pub fn paused() -> Self {
        Self { paused: true, ..Self::default() }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Leave pause mode.  Pending single steps are discarded.
    pub fn resume(&mut self) {
        self.paused = false;
        self.steps = 0;
    }

    /// While paused, allow `n` more steps.
    pub fn step(&mut self, n: u64) {
        self.steps = self.steps.saturating_add(n);
    }

    /// Stop for good.  Every later `execute_with` returns immediately.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Single steps still allowed while paused.
    pub fn pending_steps(&self) -> u64 {
        self.steps
    }

    pub(crate) fn admit(&mut self) -> Admit {
        if self.stopped {
            return Admit::Stop;
        }
        if !self.paused {
            return Admit::Run;
        }
        if self.steps > 0 {
            self.steps -= 1;
            return Admit::Run;
        }
        Admit::Suspend
    }
}
