//! life: Conway's Game of Life on the multi-scale simulation kernel.
//!
//! Every cell of a toroidal grid runs a two-mode local automaton, "dead" and
//! "alive".  One scheduler drives the generations: at each integer time it
//! first snapshots the grid (so neighbors are read from the previous
//! generation), then executes the agent over every cell.
//!
//! Usage: `life [config.toml]`.  Without a config file the run lasts
//! `GENERATIONS` generations with seed `SEED`.  Set `RUST_LOG=debug` to see
//! every kernel step.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ms_behavior::{Agent, ControlMode, JumpCondition, LocalAgent, Process, RuleError};
use ms_core::{AgentId, Event, KernelConfig};
use ms_schedule::Scheduler;
use ms_sim::{messages, EnvObserver, EnvironmentBuilder, RunStatus, SimulationControl, StepSource};
use ms_spatial::{CellIndex, CellState, CellularSpace, SpaceRef};

// ── Constants ─────────────────────────────────────────────────────────────────

const WIDTH:        u32 = 32;
const HEIGHT:       u32 = 16;
const DENSITY:      f64 = 0.3;
const SEED:         u64 = 42;
const GENERATIONS:  f64 = 50.0;
const REPORT_EVERY: f64 = 10.0;

const LIFE:  AgentId = AgentId(0);
const ALIVE: &str    = "alive";
const HOOD:  &str    = "moore";

// ── Rules ─────────────────────────────────────────────────────────────────────

fn is_alive(state: &CellState) -> bool {
    state.flag(ALIVE) == Some(true)
}

/// Dead cell with exactly three live neighbors comes alive.
fn birth() -> JumpCondition {
    JumpCondition::from_fn("alive", |_, _, site| {
        let site = site.ok_or(RuleError::NoSite)?;
        if site.count_neighbors(HOOD, is_alive) != 3 {
            return Ok(false);
        }
        site.set(ALIVE, true)?;
        Ok(true)
    })
}

/// Live cell with fewer than two or more than three live neighbors dies.
fn death() -> JumpCondition {
    JumpCondition::from_fn("dead", |_, _, site| {
        let site = site.ok_or(RuleError::NoSite)?;
        let n = site.count_neighbors(HOOD, is_alive);
        if (2..=3).contains(&n) {
            return Ok(false);
        }
        site.set(ALIVE, false)?;
        Ok(true)
    })
}

fn life_agent() -> LocalAgent {
    let mut agent = LocalAgent::new(LIFE, "life");
    agent.add_control_mode(ControlMode::new("dead").process(Process::new().jump(birth())));
    agent.add_control_mode(ControlMode::new("alive").process(Process::new().jump(death())));
    agent
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs the population every `REPORT_EVERY` generations.
struct Census {
    space:       SpaceRef,
    next_report: f64,
}

impl Census {
    fn population(&self) -> usize {
        self.space.borrow().cells().filter(|c| is_alive(c.state())).count()
    }
}

impl EnvObserver for Census {
    fn on_step(&mut self, time: f64, _source: StepSource) {
        if time >= self.next_report {
            info!(generation = time, population = self.population(), "census");
            self.next_report = time + REPORT_EVERY;
        }
    }

    fn on_run_end(&mut self, time: f64, status: RunStatus) {
        info!(generation = time, population = self.population(), status = ?status, "run ended");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration.
    let config = match std::env::args().nth(1) {
        Some(path) => KernelConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => KernelConfig { seed: SEED, ..KernelConfig::with_final_time(GENERATIONS) },
    };
    info!(?config, "configuration");

    // 2. Space: a torus with a Moore neighborhood.
    let mut grid = CellularSpace::grid("board", WIDTH, HEIGHT)?;
    let links = grid.create_moore_neighborhood(HOOD, false, true);
    info!(cells = grid.len(), links, "grid built");

    // 3. Agent and scheduler.
    let space = grid.into_ref();
    let agent = Rc::new(RefCell::new(life_agent()));

    let mut scheduler = Scheduler::new();
    scheduler.add(Event::new(0.0, 1.0, 0), messages::synchronize_space(&space))?;
    scheduler.add(Event::new(0.0, 1.0, 1), messages::execute_agent(&agent))?;

    let builder = EnvironmentBuilder::new("life", config);
    let mut rng = builder.rng();
    let mut env = builder
        .space(Rc::clone(&space))
        .local_agent(Rc::clone(&agent))
        .scheduler(scheduler)
        .build()?;

    // 4. Random initial population.  Live cells start in the "alive" mode.
    let alive_mode = agent
        .borrow()
        .core()
        .modes()
        .by_name("alive")
        .ok_or_else(|| anyhow::anyhow!("life agent has no \"alive\" mode"))?;
    for cell in space.borrow_mut().cells_mut() {
        let alive = rng.gen_bool(DENSITY);
        cell.set(ALIVE, alive);
        if alive {
            cell.attach_control_mode(LIFE, alive_mode);
        }
    }

    // 5. Run.
    let mut census = Census { space: Rc::clone(&space), next_report: 0.0 };
    env.execute_with(&mut SimulationControl::running(), &mut census);

    let failures = agent.borrow_mut().take_failures();
    if !failures.is_empty() {
        eprintln!("{} rule failures; first: {:?}", failures.len(), failures[0]);
    }

    // 6. Final board.
    println!();
    let board = space.borrow();
    for y in 0..HEIGHT as i32 {
        let row: String = (0..WIDTH as i32)
            .map(|x| match board.cell_at(CellIndex::new(x, y)) {
                Some(c) if is_alive(c.state()) => '#',
                _ => '.',
            })
            .collect();
        println!("{row}");
    }
    Ok(())
}
