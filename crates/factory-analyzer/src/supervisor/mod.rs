//! Serialised, coalescing rebuilds of the definition index.
//!
//! Watch events, settings changes and activation all become
//! [`RebuildTrigger`] messages on one queue. A single task drains the queue,
//! so two rebuilds never run at once. Triggers that pile up while a rebuild is
//! in flight collapse into exactly one follow-up rebuild.

mod change_supervisor;
mod types;

pub use change_supervisor::ChangeSupervisor;
pub use types::{FileEventKind, RebuildSummary, RebuildTrigger, SupervisorState, SupervisorStatus};
