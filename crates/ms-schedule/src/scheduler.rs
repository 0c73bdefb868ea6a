//! `Scheduler`: the single-scale clock and dispatcher.

use std::fmt;

use ms_core::Event;

use crate::{EventQueue, Message, ScheduleError, ScheduleResult};

/// An ordered queue of `(Event, Message)` pairs plus the time it last
/// advanced to.
///
/// A scheduler is driven either directly ([`execute`](Self::execute),
/// [`execute_until`](Self::execute_until)) or one step at a time by the
/// `Environment` that owns it.
pub struct Scheduler {
    queue: EventQueue<Box<dyn Message>>,
    /// Time of the last executed event; `-inf` before the first step.
    time:  f64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { queue: EventQueue::new(), time: f64::NEG_INFINITY }
    }

    /// Schedule `message` at `event`.
    ///
    /// Rejects a NaN or infinite time and a NaN or negative period; everything else is
    /// accepted, including several messages under the same event.
    pub fn add(&mut self, event: Event, message: impl Message + 'static) -> ScheduleResult<()> {
        self.add_boxed(event, Box::new(message))
    }

    pub fn add_boxed(&mut self, event: Event, message: Box<dyn Message>) -> ScheduleResult<()> {
        if !event.time().is_finite() {
            return Err(ScheduleError::NonFiniteTime(event));
        }
        if event.period().is_nan() || event.period() < 0.0 {
            return Err(ScheduleError::InvalidPeriod(event));
        }
        self.queue.push(event, message);
        Ok(())
    }

    /// Run the ordered-first message.
    ///
    /// The clock moves to the popped event's time before the message runs.
    /// If the message returns `true` it is reinserted at `clock + period`
    /// with the same priority; otherwise it is dropped.  Returns the new head
    /// event, or [`Event::never`] once the queue is empty.  On an empty queue
    /// this is a no-op.
    pub fn execute(&mut self) -> Event {
        let Some((event, mut message)) = self.queue.pop() else {
            return Event::never();
        };
        self.time = event.time();

        let keep = message.execute(&event);
        tracing::trace!(time = self.time, priority = event.priority(), keep, "message executed");
        if keep {
            self.queue.push(event.rescheduled_from(self.time), message);
        }
        self.next_event()
    }

    /// Execute events while the head's time does not exceed `final_time`.
    ///
    /// When the next event would overshoot, the clock is clamped to
    /// `final_time` and that event is left unexecuted.  Returns the clock.
    pub fn execute_until(&mut self, final_time: f64) -> f64 {
        while let Some(next) = self.queue.peek_event() {
            if next.time() > final_time {
                self.time = final_time;
                break;
            }
            self.execute();
        }
        self.time
    }

    /// The head event, or [`Event::never`] when empty.
    pub fn next_event(&self) -> Event {
        self.queue.peek_event().unwrap_or_else(Event::never)
    }

    /// Pending events in execution order.
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.queue.events()
    }

    /// Time of the last executed event.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Rewind the clock to `-inf`.  Pending messages are kept.
    pub fn reset(&mut self) {
        self.time = f64::NEG_INFINITY;
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("time", &self.time)
            .field("pending", &self.queue.len())
            .field("next", &self.queue.peek_event())
            .finish()
    }
}
