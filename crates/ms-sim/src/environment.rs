//! The `Environment` and its time-ordered merge loop.

use std::fmt;

use tracing::debug;

use ms_behavior::{Agent, BehaviorError, GlobalAgentRef, LocalAgent, LocalAgentRef};
use ms_core::{AgentId, CoreError, Event};
use ms_schedule::{EventQueue, Scheduler};
use ms_spatial::SpaceRef;

use crate::control::Admit;
use crate::{
    EnvObserver, NoopObserver, RunStatus, SimError, SimResult, SimulationControl, StepSource,
};

/// What one call to [`Environment::step`] did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// One unit of work ran at `time`.
    Advanced { time: f64, source: StepSource },
    /// The earliest pending event lies beyond the final time.
    Finished,
    /// No scheduler or nested environment has anything left to run.
    Exhausted,
}

/// One scale of a multi-scale simulation.
///
/// An environment owns cellular spaces, agents, schedulers, and nested
/// environments.  Schedulers and nested environments are kept in two ordered
/// queues keyed by their next event; each step advances whichever head is
/// earlier by one unit of work and re-keys it by its new next event.  The
/// result is a globally time-ordered interleaving across arbitrarily deep
/// nesting without a shared queue.
pub struct Environment {
    name: String,

    spaces:        Vec<SpaceRef>,
    local_agents:  Vec<LocalAgentRef>,
    global_agents: Vec<GlobalAgentRef>,

    schedulers: EventQueue<Scheduler>,
    children:   EventQueue<Environment>,

    final_time: f64,
    /// Time of the last step; `-inf` before the first one.
    time:       f64,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:          name.into(),
            spaces:        Vec::new(),
            local_agents:  Vec::new(),
            global_agents: Vec::new(),
            schedulers:    EventQueue::new(),
            children:      EventQueue::new(),
            final_time:    f64::INFINITY,
            time:          f64::NEG_INFINITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Attach every registered local agent's first control mode to every cell
    /// currently in `space`, then keep the space.
    ///
    /// Either every agent is attached or, on error, none is.
    pub fn add_space(&mut self, space: SpaceRef) -> SimResult<()> {
        let mut agents = self
            .local_agents
            .iter()
            .map(|a| a.try_borrow_mut().map_err(|_| SimError::AgentBorrowed))
            .collect::<SimResult<Vec<_>>>()?;
        for agent in &agents {
            ensure_attachable(&**agent)?;
        }
        if space.try_borrow_mut().is_err() {
            return Err(SimError::SpaceBorrowed(self.spaces.len()));
        }

        for agent in &mut agents {
            agent.attach_space(&space)?;
        }
        self.spaces.push(space);
        Ok(())
    }

    /// Attach the agent's first control mode to every cell of every
    /// registered space, then keep the agent.
    ///
    /// Either every space is attached or, on error, none is.
    pub fn add_local_agent(&mut self, agent: LocalAgentRef) -> SimResult<()> {
        let id = agent.try_borrow().map_err(|_| SimError::AgentBorrowed)?.id();
        self.check_unique(id)?;
        {
            let mut a = agent.try_borrow_mut().map_err(|_| SimError::AgentBorrowed)?;
            if !self.spaces.is_empty() {
                ensure_attachable(&*a)?;
            }
            if let Some(i) = self.spaces.iter().position(|s| s.try_borrow_mut().is_err()) {
                return Err(SimError::SpaceBorrowed(i));
            }
            for space in &self.spaces {
                a.attach_space(space)?;
            }
        }
        self.local_agents.push(agent);
        Ok(())
    }

    /// Keep a global agent.  Global agents track no per-cell state.
    pub fn add_global_agent(&mut self, agent: GlobalAgentRef) -> SimResult<()> {
        let id = agent.try_borrow().map_err(|_| SimError::AgentBorrowed)?.id();
        self.check_unique(id)?;
        self.global_agents.push(agent);
        Ok(())
    }

    /// Register a scheduler, keyed by its current head event.
    pub fn add_scheduler(&mut self, scheduler: Scheduler) {
        let key = scheduler.next_event();
        self.schedulers.push(key, scheduler);
    }

    /// Register a nested environment, keyed by its current head event.
    pub fn add_environment(&mut self, environment: Environment) {
        let key = environment.next_event();
        self.children.push(key, environment);
    }

    fn check_unique(&self, id: AgentId) -> SimResult<()> {
        let local = self
            .local_agents
            .iter()
            .map(|a| a.try_borrow().map(|a| a.id()));
        let global = self
            .global_agents
            .iter()
            .map(|a| a.try_borrow().map(|a| a.id()));
        for existing in local.chain(global) {
            if existing.map_err(|_| SimError::AgentBorrowed)? == id {
                return Err(SimError::DuplicateAgent(id));
            }
        }
        Ok(())
    }

    // ── Configuration and inspection ──────────────────────────────────────

    /// Stop once the next event lies beyond `final_time`.  A NaN final time
    /// is rejected, as in `KernelConfig::validate`.
    pub fn config(&mut self, final_time: f64) -> SimResult<()> {
        if final_time.is_nan() {
            return Err(CoreError::Config("final_time must not be NaN".into()).into());
        }
        self.final_time = final_time;
        Ok(())
    }

    pub fn final_time(&self) -> f64 {
        self.final_time
    }

    /// Time of the last step, `-inf` before the first.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Earliest head-event time over all schedulers and nested environments,
    /// or `None` when neither kind is registered.
    pub fn initial_time(&self) -> Option<f64> {
        self.head().map(|(_, event)| event.time())
    }

    /// The event this environment would run next, or [`Event::never`] when
    /// it has nothing left to run before its final time.
    pub fn next_event(&self) -> Event {
        match self.head() {
            Some((_, event)) if event.time() <= self.final_time => event,
            _ => Event::never(),
        }
    }

    pub fn spaces(&self) -> &[SpaceRef] {
        &self.spaces
    }

    pub fn local_agents(&self) -> &[LocalAgentRef] {
        &self.local_agents
    }

    pub fn global_agents(&self) -> &[GlobalAgentRef] {
        &self.global_agents
    }

    /// Schedulers in next-event order.
    pub fn schedulers(&self) -> impl Iterator<Item = &Scheduler> + '_ {
        self.schedulers.iter().map(|(_, s)| s)
    }

    /// Nested environments in next-event order.
    pub fn environments(&self) -> impl Iterator<Item = &Environment> + '_ {
        self.children.iter().map(|(_, e)| e)
    }

    /// The earlier of the two queue heads.  Ties go to the schedulers.
    fn head(&self) -> Option<(StepSource, Event)> {
        match (self.schedulers.peek_event(), self.children.peek_event()) {
            (None, None) => None,
            (Some(s), None) => Some((StepSource::Scheduler, s)),
            (None, Some(c)) => Some((StepSource::Environment, c)),
            (Some(s), Some(c)) => {
                if c.time() < s.time() {
                    Some((StepSource::Environment, c))
                } else {
                    Some((StepSource::Scheduler, s))
                }
            }
        }
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Advance by exactly one unit of work: one message of the earliest
    /// scheduler, or one step of the earliest nested environment.
    pub fn step(&mut self) -> Step {
        let Some((source, head)) = self.head() else {
            return Step::Exhausted;
        };
        if head.is_never() {
            return Step::Exhausted;
        }
        if head.time() > self.final_time {
            return Step::Finished;
        }

        match source {
            StepSource::Scheduler => {
                if let Some((_, mut scheduler)) = self.schedulers.pop() {
                    let next = scheduler.execute();
                    self.schedulers.push(next, scheduler);
                }
            }
            StepSource::Environment => {
                if let Some((_, mut child)) = self.children.pop() {
                    child.step();
                    let next = child.next_event();
                    self.children.push(next, child);
                }
            }
        }

        self.time = head.time();
        debug!(env = %self.name, time = self.time, source = ?source, "step");
        Step::Advanced { time: self.time, source }
    }

    /// Run until finished or exhausted.
    pub fn execute(&mut self) -> RunStatus {
        self.execute_with(&mut SimulationControl::running(), &mut NoopObserver)
    }

    /// Run under host control, reporting every step to `observer`.
    ///
    /// `control` is checked before each step.  A `Suspended` run continues
    /// from where it stopped on the next call.
    pub fn execute_with<O: EnvObserver>(
        &mut self,
        control:  &mut SimulationControl,
        observer: &mut O,
    ) -> RunStatus {
        let status = loop {
            match control.admit() {
                Admit::Stop => break RunStatus::Stopped,
                Admit::Suspend => break RunStatus::Suspended,
                Admit::Run => {}
            }
            match self.step() {
                Step::Advanced { time, source } => observer.on_step(time, source),
                Step::Finished => break RunStatus::Finished,
                Step::Exhausted => break RunStatus::Exhausted,
            }
        };
        debug!(env = %self.name, time = self.time, status = ?status, "run ended");
        observer.on_run_end(self.time, status);
        status
    }

    /// Apply deferred structural changes in every owned space.  Returns the
    /// number of changes applied.
    pub fn synchronize(&mut self) -> SimResult<usize> {
        self.synchronize_with(&mut NoopObserver)
    }

    pub fn synchronize_with<O: EnvObserver>(&mut self, observer: &mut O) -> SimResult<usize> {
        let mut applied = 0;
        for (i, space) in self.spaces.iter().enumerate() {
            applied += space
                .try_borrow_mut()
                .map_err(|_| SimError::SpaceBorrowed(i))?
                .update()?;
        }
        observer.on_synchronize(self.time);
        Ok(applied)
    }
}

/// A local agent with no control modes cannot be attached to any cell.
fn ensure_attachable(agent: &LocalAgent) -> SimResult<()> {
    if agent.core().modes().is_empty() {
        return Err(BehaviorError::NoControlModes(agent.id()).into());
    }
    Ok(())
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("environment")
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .field("time", &self.time)
            .field("final_time", &self.final_time)
            .field("spaces", &self.spaces.len())
            .field("local_agents", &self.local_agents.len())
            .field("global_agents", &self.global_agents.len())
            .field("schedulers", &self.schedulers.len())
            .field("environments", &self.children.len())
            .finish()
    }
}
