//! The `Message` capability: an executable unit scheduled against an event.

use ms_core::Event;

/// Something a [`Scheduler`](crate::Scheduler) runs when its event fires.
///
/// Return `true` to be rescheduled one period later, `false` to be dropped.
/// The scheduler looks only at the returned flag; whatever the message does
/// internally (including failing) is its own business.
///
/// Any `FnMut(&Event) -> bool` closure is a message:
///
/// ```
/// use ms_core::Event;
/// use ms_schedule::Scheduler;
///
/// let mut sched = Scheduler::new();
/// sched.add(Event::at(0.0), |_: &Event| false).unwrap();
/// sched.execute();
/// assert!(sched.is_empty());
/// ```
pub trait Message {
    fn execute(&mut self, event: &Event) -> bool;
}

impl<F> Message for F
where
    F: FnMut(&Event) -> bool,
{
    fn execute(&mut self, event: &Event) -> bool {
        self(event)
    }
}
