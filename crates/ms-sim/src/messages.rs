//! Ready-made scheduler messages for the common kernel actions.
//!
//! Each helper returns a closure usable with `Scheduler::add`.  The returned
//! message keeps itself scheduled while its action succeeds; a failure is
//! logged and the message drops out of the queue.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;

use ms_behavior::Agent;
use ms_core::Event;
use ms_spatial::{SpaceRef, SyncScope};

/// Execute `agent` every time the event fires.
pub fn execute_agent<A>(agent: &Rc<RefCell<A>>) -> impl FnMut(&Event) -> bool + 'static
where
    A: Agent + 'static,
{
    let agent = Rc::clone(agent);
    move |event: &Event| {
        let Ok(mut a) = agent.try_borrow_mut() else {
            error!(time = event.time(), "agent is borrowed elsewhere; dropping its message");
            return false;
        };
        match a.execute(event) {
            Ok(()) => true,
            Err(e) => {
                error!(agent = %a.id(), time = event.time(), error = %e, "agent execution failed");
                false
            }
        }
    }
}

/// Apply deferred structural changes, then snapshot every cell's state.
pub fn synchronize_space(space: &SpaceRef) -> impl FnMut(&Event) -> bool + 'static {
    let space = SpaceRef::clone(space);
    move |event: &Event| {
        let Ok(mut s) = space.try_borrow_mut() else {
            error!(time = event.time(), "cellular space is borrowed elsewhere; dropping its message");
            return false;
        };
        if let Err(e) = s.update() {
            error!(space = %s.name(), time = event.time(), error = %e, "structural update failed");
            return false;
        }
        s.synchronize(SyncScope::All);
        true
    }
}
