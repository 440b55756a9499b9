use crate::time::Duration;
use std::{any::Any, error::Error as StdError, fmt::Display};
use thiserror::Error;

/// An error rejected by the scheduling API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The requested delay was negative, or the resulting
    /// fire time is not representable.
    #[error("invalid delay {0}: events can only be scheduled into the future")]
    InvalidDelay(Duration),

    /// The scheduler was torn down using [`Scheduler::destroy`].
    ///
    /// [`Scheduler::destroy`]: crate::runtime::Scheduler::destroy
    #[error("scheduler was destroyed")]
    EngineStopped,
}

/// An error that occurred during the simulation.
///
/// Any error returned by an event action is wrapped into this type
/// and aborts the current [`run`](crate::runtime::Scheduler::run).
#[derive(Debug)]
pub struct RuntimeError {
    inner: Box<dyn StdErrorAny>,
}

impl RuntimeError {
    /// As any
    pub fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }

    /// Returns the wrapped error, if it is of type `T`.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// The wrapped error as a plain error object.
    pub fn as_error(&self) -> &(dyn StdError + 'static) {
        self.inner.as_error()
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}

impl<T: StdError + Any + 'static> From<T> for RuntimeError {
    fn from(err: T) -> Self {
        RuntimeError {
            inner: Box::new(err),
        }
    }
}

trait StdErrorAny: StdError + Any {
    fn as_any(&self) -> &dyn Any;
    fn as_error(&self) -> &(dyn StdError + 'static);
}

impl<T: StdError + Any + 'static> StdErrorAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}
