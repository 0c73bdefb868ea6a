//! Fluent builder for constructing an [`Environment`] from a [`KernelConfig`].

use tracing::error;

use ms_behavior::{Agent, GlobalAgentRef, LocalAgentRef};
use ms_core::{KernelConfig, SimRng};
use ms_schedule::Scheduler;
use ms_spatial::SpaceRef;

use crate::{Environment, SimError, SimResult};

/// Fluent builder for [`Environment`].
///
/// # What `build` does
///
/// 1. Validates the [`KernelConfig`].
/// 2. Applies the config's agent settings (`max_jump_chain`,
///    `failure_policy`) to every agent and builds it; an unresolved jump
///    target aborts with [`SimError::Behavior`].
/// 3. Registers spaces first, then agents, so every local agent is attached
///    to every space given here.
/// 4. Sets the environment's final time from the config.
///
/// # Example
///
/// ```rust,ignore
/// let config = KernelConfig::with_final_time(100.0);
/// let mut env = EnvironmentBuilder::new("world", config)
///     .space(space)
///     .local_agent(agent)
///     .scheduler(scheduler)
///     .build()?;
/// env.execute();
/// ```
pub struct EnvironmentBuilder {
    name:          String,
    config:        KernelConfig,
    spaces:        Vec<SpaceRef>,
    local_agents:  Vec<LocalAgentRef>,
    global_agents: Vec<GlobalAgentRef>,
    schedulers:    Vec<Scheduler>,
    environments:  Vec<Environment>,
}

impl EnvironmentBuilder {
    pub fn new(name: impl Into<String>, config: KernelConfig) -> Self {
        Self {
            name: name.into(),
            config,
            spaces:        Vec::new(),
            local_agents:  Vec::new(),
            global_agents: Vec::new(),
            schedulers:    Vec::new(),
            environments:  Vec::new(),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// A model-setup RNG seeded from the config.
    pub fn rng(&self) -> SimRng {
        SimRng::new(self.config.seed)
    }

    pub fn space(mut self, space: SpaceRef) -> Self {
        self.spaces.push(space);
        self
    }

    pub fn local_agent(mut self, agent: LocalAgentRef) -> Self {
        self.local_agents.push(agent);
        self
    }

    pub fn global_agent(mut self, agent: GlobalAgentRef) -> Self {
        self.global_agents.push(agent);
        self
    }

    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.schedulers.push(scheduler);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environments.push(environment);
        self
    }

    /// Validate, configure and build the agents, and return a ready-to-run
    /// [`Environment`].
    pub fn build(self) -> SimResult<Environment> {
        self.config.validate()?;

        for agent in &self.local_agents {
            let mut a = agent.try_borrow_mut().map_err(|_| SimError::AgentBorrowed)?;
            prepare(&mut *a, &self.config)?;
        }
        for agent in &self.global_agents {
            let mut a = agent.try_borrow_mut().map_err(|_| SimError::AgentBorrowed)?;
            prepare(&mut *a, &self.config)?;
        }

        let mut env = Environment::new(self.name);
        env.config(self.config.final_time)?;
        for space in self.spaces {
            env.add_space(space)?;
        }
        for agent in self.local_agents {
            env.add_local_agent(agent)?;
        }
        for agent in self.global_agents {
            env.add_global_agent(agent)?;
        }
        for scheduler in self.schedulers {
            env.add_scheduler(scheduler);
        }
        for environment in self.environments {
            env.add_environment(environment);
        }
        Ok(env)
    }
}

fn prepare<A: Agent + ?Sized>(agent: &mut A, config: &KernelConfig) -> SimResult<()> {
    agent.configure(config);
    agent.try_build().map_err(|e| {
        error!(agent = %agent.id(), error = %e, "agent build failed");
        SimError::from(e)
    })
}
