//! `ms-schedule`: event queues, messages, and the single-scale scheduler.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`queue`]     | `EventQueue<T>`: ordered multiset keyed by `Event`       |
//! | [`message`]   | `Message` trait (closures implement it)                   |
//! | [`scheduler`] | `Scheduler`: `(Event, Message)` queue plus its own clock |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Step model (summary)
//!
//! ```text
//! (event, msg) = pop head
//! clock        = event.time
//! if msg.execute(event):  push (event with time = clock + period, msg)
//! return new head event   (Event::never() when empty)
//! ```

pub mod error;
pub mod message;
pub mod queue;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use message::Message;
pub use queue::EventQueue;
pub use scheduler::Scheduler;
