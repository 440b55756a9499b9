mod event_set;
pub(crate) use event_set::*;

mod types;
pub use types::*;
