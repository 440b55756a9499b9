use crate::runtime::{ContextId, RuntimeError, Scheduler};
use crate::time::SimTime;
use std::{
    cmp,
    fmt::{Debug, Display},
};

///
/// A runtime unqiue identifier for a event.
///
/// Ids are handed out in strictly increasing order, so they double as
/// the insertion sequence used to break ties between equal-time events.
///
pub type EventId = u64;

/// The type-erased callable stored for each scheduled event.
pub(crate) type Action<A> = Box<dyn FnOnce(&mut Scheduler<A>) -> Result<(), RuntimeError>>;

///
/// A type that can handle an event, specific to the given aplication.
///
/// Closures can be scheduled directly, this trait exists to better
/// isolate larger events and their associated data into named types.
///
pub trait Event<App>: 'static {
    ///
    /// A function to handle an upcoming event.
    ///
    /// # Errors
    ///
    /// An error aborts the active run of the scheduler.
    ///
    fn handle(self, rt: &mut Scheduler<App>) -> Result<(), RuntimeError>;
}

///
/// A cancellation token for a scheduled event.
///
/// The handle only refers to the event by id, it does not keep the event
/// alive. Cancelling an event that already fired is a no-op.
///
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle {
    pub(crate) id: EventId,
    pub(crate) time: SimTime,
    pub(crate) context: Option<ContextId>,
}

impl EventHandle {
    /// The id assigned to the event.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// The time the event fires at.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// The context the event executes in.
    #[must_use]
    pub fn context(&self) -> Option<ContextId> {
        self.context
    }
}

impl Debug for EventHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventHandle {{ id: {} time: {}", self.id, self.time)?;
        if let Some(ctx) = self.context {
            write!(f, " ctx: {ctx}")?;
        }
        write!(f, " }}")
    }
}

///
/// A bin-heap node of a scheduled action.
///
pub(crate) struct EventNode<A> {
    /// The deadline timestamp for the event.
    pub(crate) time: SimTime,
    /// A runtime-specific unique identifier.
    pub(crate) id: EventId,
    /// The entity this event executes on behalf of.
    pub(crate) context: Option<ContextId>,
    /// The actual action.
    pub(crate) action: Action<A>,
}

impl<A> EventNode<A> {
    pub(crate) fn key(&self) -> (SimTime, EventId) {
        (self.time, self.id)
    }

    pub(crate) fn handle(&self) -> EventHandle {
        EventHandle {
            id: self.id,
            time: self.time,
            context: self.context,
        }
    }
}

impl<A> cmp::PartialEq for EventNode<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> cmp::Eq for EventNode<A> {}

impl<A> cmp::PartialOrd for EventNode<A> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> cmp::Ord for EventNode<A> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        // Inverted call should act as reverse
        other.key().cmp(&self.key())
    }
}

impl<A> Debug for EventNode<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EventNode {{ id: {} time: {} ctx: {:?} }}",
            self.id, self.time, self.context
        )
    }
}

impl<A> Display for EventNode<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}
