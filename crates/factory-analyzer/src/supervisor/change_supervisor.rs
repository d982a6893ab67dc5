use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::sync::{RwLock, mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    index::DefinitionIndex,
    supervisor::types::{RebuildSummary, RebuildTrigger, SupervisorState, SupervisorStatus},
    workspace::{FactoryScope, WorkspaceFs, collect_factory_files},
};

/// Handle to the background task that owns index rebuilds.
///
/// The task lives as long as any clone of this handle. Dropping the last one
/// closes the queue; an in-flight rebuild still finishes.
#[derive(Clone)]
pub struct ChangeSupervisor {
    sender: mpsc::UnboundedSender<RebuildTrigger>,
    scope: Arc<RwLock<FactoryScope>>,
    status: watch::Receiver<SupervisorStatus>,
}

impl ChangeSupervisor {
    /// Start the supervisor task. Must be called inside a Tokio runtime.
    ///
    /// Nothing is indexed until the first trigger arrives.
    pub fn spawn(
        index: Arc<DefinitionIndex>,
        fs: Arc<dyn WorkspaceFs>,
        scope: FactoryScope,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SupervisorStatus::default());
        let scope = Arc::new(RwLock::new(scope));

        let worker = RebuildWorker {
            index,
            fs,
            scope: scope.clone(),
            status: status_tx,
        };
        tokio::spawn(worker.run(receiver));

        Self {
            sender,
            scope,
            status: status_rx,
        }
    }

    /// Queue a rebuild.
    ///
    /// File events outside the watched globs are dropped here and `false` is
    /// returned. Everything else is queued.
    pub async fn notify(
        &self,
        trigger: RebuildTrigger,
    ) -> bool {
        if let RebuildTrigger::FileEvent {
            path,
            kind,
        } = &trigger
            && !self.scope.read().await.matches(path)
        {
            debug!("ignoring {kind:?} event outside factory paths: {}", path.display());
            return false;
        }

        if self.sender.send(trigger).is_err() {
            warn!("factory index supervisor has stopped; dropping rebuild trigger");
            return false;
        }
        true
    }

    /// Replace the watched scope. Takes effect from the next rebuild.
    pub async fn set_scope(
        &self,
        scope: FactoryScope,
    ) {
        *self.scope.write().await = scope;
    }

    pub async fn scope(&self) -> FactoryScope {
        self.scope.read().await.clone()
    }

    pub fn status(&self) -> SupervisorStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status.clone()
    }

    /// Wait until at least `count` rebuilds have completed.
    pub async fn wait_for_rebuilds(
        &self,
        count: u64,
    ) -> SupervisorStatus {
        let mut status = self.status.clone();
        let reached = status.wait_for(|s| s.completed_rebuilds >= count).await.map(|current| *current);
        reached.unwrap_or_else(|_| *status.borrow())
    }
}

struct RebuildWorker {
    index: Arc<DefinitionIndex>,
    fs: Arc<dyn WorkspaceFs>,
    scope: Arc<RwLock<FactoryScope>>,
    status: watch::Sender<SupervisorStatus>,
}

impl RebuildWorker {
    async fn run(
        self,
        mut receiver: mpsc::UnboundedReceiver<RebuildTrigger>,
    ) {
        while let Some(trigger) = receiver.recv().await {
            debug!("factory index rebuild requested: {trigger:?}");
            // Anything already queued is covered by the rebuild about to start.
            let mut coalesced = drain(&mut receiver);

            loop {
                self.status.send_modify(|s| s.state = SupervisorState::Rebuilding);
                let summary = self.rebuild_once(coalesced).await;

                let arrived_meanwhile = drain(&mut receiver);
                let follow_up = arrived_meanwhile > 0;
                self.status.send_modify(|s| {
                    s.completed_rebuilds += 1;
                    if summary.is_some() {
                        s.last = summary;
                    }
                    if !follow_up {
                        s.state = SupervisorState::Idle;
                    }
                });

                if !follow_up {
                    break;
                }
                debug!("{arrived_meanwhile} trigger(s) arrived during rebuild; rebuilding once more");
                coalesced = arrived_meanwhile - 1;
            }
        }
        debug!("factory index supervisor stopped");
    }

    /// One full rebuild. A panic inside is logged and swallowed so the
    /// supervisor keeps serving later triggers.
    async fn rebuild_once(
        &self,
        coalesced: usize,
    ) -> Option<RebuildSummary> {
        let scope = self.scope.read().await.clone();
        let result = AssertUnwindSafe(async {
            let files = collect_factory_files(self.fs.as_ref(), &scope).await;
            let located = files.located;
            let unreadable = files.unreadable;
            let index = self.index.rebuild(files.contents);
            RebuildSummary {
                index,
                located,
                unreadable,
                coalesced,
            }
        })
        .catch_unwind()
        .await;

        match result {
            Ok(summary) => {
                info!(
                    "Indexed {} factory definition(s) from {} file(s) (generation {})",
                    summary.index.definitions, summary.index.files_scanned, summary.index.generation
                );
                if summary.unreadable > 0 {
                    debug!("{} factory file(s) could not be read", summary.unreadable);
                }
                Some(summary)
            },
            Err(_) => {
                warn!("factory index rebuild panicked; keeping previous index");
                None
            },
        }
    }
}

fn drain(receiver: &mut mpsc::UnboundedReceiver<RebuildTrigger>) -> usize {
    let mut drained = 0;
    while receiver.try_recv().is_ok() {
        drained += 1;
    }
    drained
}

#[cfg(test)]
#[path = "../../tests/src/supervisor/change_supervisor_tests.rs"]
mod tests;
