use std::path::PathBuf;

use crate::index::IndexStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Changed,
    Deleted,
}

/// Why a rebuild was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildTrigger {
    Activation,
    SettingsChanged,
    WorkspaceChanged,
    FileEvent {
        path: PathBuf,
        kind: FileEventKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    #[default]
    Idle,
    Rebuilding,
}

/// Outcome of one completed rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebuildSummary {
    pub index: IndexStats,
    pub located: usize,
    pub unreadable: usize,
    /// Triggers folded into this rebuild beyond the one that started it.
    pub coalesced: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    pub completed_rebuilds: u64,
    pub last: Option<RebuildSummary>,
}
