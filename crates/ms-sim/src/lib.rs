//! `ms-sim`: multi-scale environments for the simulation kernel.
//!
//! # Time-ordered merge
//!
//! ```text
//! Environment
//!   schedulers: EventQueue<Scheduler>     keyed by each scheduler's head event
//!   children:   EventQueue<Environment>   keyed by each child's next event
//!
//! step():
//!   pick the earlier head (ties → scheduler)
//!   head beyond final_time → Finished
//!   scheduler   → run one message, re-key by the new head
//!   environment → child.step(), re-key by child.next_event()
//! ```
//!
//! Nested environments step one unit of work at a time, so events from every
//! scale run in global time order without a shared queue.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Parallel snapshot copy in `CellularSpace::synchronize`. |
//! | `fx-hash`  | FxHash for the per-cell control-mode map.               |
//! | `serde`    | Serde derives and `KernelConfig::from_toml_str`.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ms_core::{Event, KernelConfig};
//! use ms_schedule::Scheduler;
//! use ms_sim::{messages, EnvironmentBuilder};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Event::new(0.0, 1.0, 0), messages::execute_agent(&agent))?;
//! let mut env = EnvironmentBuilder::new("world", KernelConfig::with_final_time(10.0))
//!     .space(space)
//!     .local_agent(agent)
//!     .scheduler(scheduler)
//!     .build()?;
//! env.execute();
//! ```

pub mod builder;
pub mod control;
pub mod environment;
pub mod error;
pub mod messages;
pub mod observer;


pub use builder::EnvironmentBuilder;
pub use control::{RunStatus, SimulationControl};
pub use environment::{Environment, Step};
pub use error::{SimError, SimResult};
pub use observer::{EnvObserver, NoopObserver, StepSource};
