//! Unit tests for ms-schedule.

use std::cell::RefCell;
use std::rc::Rc;

use ms_core::Event;

use crate::{EventQueue, Message, ScheduleError, Scheduler};

// ── Helpers ───────────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<(f64, i32)>>>;

/// A message that records `(time, priority)` and runs `runs` times in total.
fn recorder(log: &Log, mut runs: u32) -> impl Message + 'static {
    let log = Rc::clone(log);
    move |e: &Event| {
        log.borrow_mut().push((e.time(), e.priority()));
        runs = runs.saturating_sub(1);
        runs > 0
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use super::*;

    #[test]
    fn equal_keys_pop_in_insertion_order() {
        let mut q = EventQueue::new();
        q.push(Event::at(1.0), "first");
        q.push(Event::at(1.0), "second");
        q.push(Event::at(0.5), "earliest");

        assert_eq!(q.pop().unwrap().1, "earliest");
        assert_eq!(q.pop().unwrap().1, "first");
        assert_eq!(q.pop().unwrap().1, "second");
        assert!(q.pop().is_none());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut q = EventQueue::new();
        q.push(Event::at(3.0), 1u8);
        assert_eq!(q.peek_event(), Some(Event::at(3.0)));
        assert_eq!(q.len(), 1);
        assert_eq!(*q.peek().unwrap().1, 1);
    }

    #[test]
    fn empty_queue() {
        let q: EventQueue<()> = EventQueue::default();
        assert!(q.is_empty());
        assert!(q.peek_event().is_none());
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use super::*;

    #[test]
    fn pops_in_time_then_priority_order() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::new(5.0, 1.0, 0), recorder(&log, 1)).unwrap();
        s.add(Event::new(2.0, 1.0, 1), recorder(&log, 1)).unwrap();
        s.add(Event::new(2.0, 1.0, 0), recorder(&log, 1)).unwrap();

        while !s.is_empty() {
            s.execute();
        }
        assert_eq!(*log.borrow(), vec![(2.0, 0), (2.0, 1), (5.0, 0)]);
    }

    #[test]
    fn true_reschedules_one_period_later() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::new(1.0, 0.5, 7), recorder(&log, 2)).unwrap();

        let next = s.execute();
        assert_eq!(s.time(), 1.0);
        assert_eq!(next.time(), 1.5);
        assert_eq!(next.priority(), 7);
        assert_eq!(s.len(), 1);
        assert_eq!(s.events().collect::<Vec<_>>(), vec![Event::new(1.5, 0.5, 7)]);
    }

    #[test]
    fn false_drops_permanently() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::at(0.0), recorder(&log, 1)).unwrap();
        assert!(s.execute().is_never());
        assert!(s.is_empty());
        s.execute();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn execute_on_empty_is_noop() {
        let mut s = Scheduler::new();
        let head = s.execute();
        assert!(head.is_never());
        assert!(s.is_empty());
        assert_eq!(s.time(), f64::NEG_INFINITY);
    }

    #[test]
    fn execute_returns_new_head() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::at(1.0), recorder(&log, 1)).unwrap();
        s.add(Event::at(4.0), recorder(&log, 1)).unwrap();
        assert_eq!(s.execute().time(), 4.0);
    }

    #[test]
    fn execute_until_clamps_without_running_overshoot() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::new(0.0, 1.0, 0), recorder(&log, u32::MAX)).unwrap();

        let t = s.execute_until(3.5);
        assert_eq!(t, 3.5);
        let times: Vec<f64> = log.borrow().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(s.next_event().time(), 4.0);
    }

    #[test]
    fn execute_until_includes_final_time() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::new(0.0, 1.0, 0), recorder(&log, u32::MAX)).unwrap();
        assert_eq!(s.execute_until(2.0), 2.0);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn execute_until_stops_when_exhausted() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::at(1.0), recorder(&log, 1)).unwrap();
        assert_eq!(s.execute_until(10.0), 1.0);
        assert!(s.is_empty());
    }

    #[test]
    fn reset_rewinds_clock_only() {
        let log: Log = Rc::default();
        let mut s = Scheduler::new();
        s.add(Event::at(2.0), recorder(&log, 2)).unwrap();
        s.execute();
        s.reset();
        assert_eq!(s.time(), f64::NEG_INFINITY);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn invalid_events_rejected() {
        let mut s = Scheduler::new();
        assert!(s.add(Event::at(f64::NAN), |_: &Event| false).is_err());
        assert!(matches!(
            s.add(Event::new(f64::NEG_INFINITY, 1.0, 0), |_: &Event| true),
            Err(ScheduleError::NonFiniteTime(_))
        ));
        assert!(s.add(Event::at(f64::INFINITY), |_: &Event| false).is_err());
        assert!(s.add(Event::new(0.0, -1.0, 0), |_: &Event| false).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn message_failure_does_not_abort() {
        // A message whose own work fails still only reports a flag.
        let mut s = Scheduler::new();
        s.add(Event::at(0.0), |_: &Event| "not a number".parse::<f64>().is_ok()).unwrap();
        s.add(Event::at(1.0), |_: &Event| false).unwrap();
        s.execute();
        assert_eq!(s.len(), 1);
        s.execute();
        assert!(s.is_empty());
    }
}
