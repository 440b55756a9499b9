//!
//! Convenience re-export of common members.
//!

pub use crate::runtime::Builder;
pub use crate::runtime::ContextId;
pub use crate::runtime::Event;
pub use crate::runtime::EventHandle;
pub use crate::runtime::EventId;
pub use crate::runtime::Periodic;
pub use crate::runtime::PeriodicHandle;
pub use crate::runtime::Profiler;
pub use crate::runtime::RunLimit;
pub use crate::runtime::RunOutcome;
pub use crate::runtime::RuntimeError;
pub use crate::runtime::Scheduler;
pub use crate::runtime::SchedulerError;

pub use crate::stats::channel_busy_ratio;
pub use crate::stats::ChannelStats;
pub use crate::stats::IttTable;
pub use crate::stats::RateChoice;
pub use crate::stats::RateSelector;
pub use crate::stats::SlotCounters;
pub use crate::stats::StatsError;

pub use crate::time::Duration;
pub use crate::time::SimTime;
