use std::{
    panic::AssertUnwindSafe,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::FutureExt;
use tokio::sync::{RwLock, watch};
use tower_lsp::{
    Client,
    lsp_types::{ClientCapabilities, MessageType, WorkspaceFolder},
};
use tracing::warn;

use crate::{
    document::DocumentStore,
    index::DefinitionIndex,
    links::LinkProvider,
    server::{handler::prefixed_client_message, settings::ServerSettings},
    supervisor::{ChangeSupervisor, SupervisorStatus},
    workspace::{DiskFs, FactoryScope, WorkspaceFs},
};

/// The factory-analyzer backend that implements the Language Server Protocol.
pub struct FactoryLanguageServer {
    /// The LSP client handle, used for log messages and watcher registration.
    pub(crate) client: Client,

    /// Thread-safe store of all open documents.
    pub(crate) document_store: Arc<DocumentStore>,

    /// Resolves `create`/`build` usages against the current index generation.
    pub(crate) link_provider: LinkProvider,

    /// Owns index rebuilds; every trigger goes through here.
    pub(crate) supervisor: ChangeSupervisor,

    /// Workspace root folders, populated during `initialize`.
    pub(crate) workspace_roots: RwLock<Vec<WorkspaceFolder>>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,

    /// Whether the client lets us register file watchers at runtime.
    pub(crate) dynamic_watchers: AtomicBool,

    /// Whether the client understands `RelativePattern` globs.
    pub(crate) relative_watch_patterns: AtomicBool,

    /// Set while a watcher registration is live on the client.
    pub(crate) watchers_registered: AtomicBool,
}

impl FactoryLanguageServer {
    /// Create a server reading factory files from the local disk.
    pub fn new(client: Client) -> Self {
        Self::with_fs(client, Arc::new(DiskFs))
    }

    /// Create a server over an arbitrary [`WorkspaceFs`].
    ///
    /// Spawns the rebuild supervisor, so this must run inside a Tokio runtime.
    pub fn with_fs(
        client: Client,
        fs: Arc<dyn WorkspaceFs>,
    ) -> Self {
        let settings = ServerSettings::default();
        let index = Arc::new(DefinitionIndex::new());
        let scope = FactoryScope::new(None, settings.factories.paths.clone());
        let supervisor = ChangeSupervisor::spawn(Arc::clone(&index), fs, scope);
        let settings = Arc::new(RwLock::new(settings));

        tokio::spawn(report_rebuilds(client.clone(), Arc::clone(&settings), supervisor.subscribe()));

        Self {
            client,
            document_store: Arc::new(DocumentStore::new()),
            link_provider: LinkProvider::new(index),
            supervisor,
            workspace_roots: RwLock::new(Vec::new()),
            settings,
            dynamic_watchers: AtomicBool::new(false),
            relative_watch_patterns: AtomicBool::new(false),
            watchers_registered: AtomicBool::new(false),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        *self.settings.write().await = settings;
    }

    pub(crate) fn record_client_capabilities(
        &self,
        capabilities: &ClientCapabilities,
    ) {
        let watched_files = capabilities.workspace.as_ref().and_then(|w| w.did_change_watched_files.as_ref());
        let dynamic = watched_files.and_then(|c| c.dynamic_registration).unwrap_or(false);
        let relative = watched_files.and_then(|c| c.relative_pattern_support).unwrap_or(false);
        self.dynamic_watchers.store(dynamic, Ordering::Relaxed);
        self.relative_watch_patterns.store(relative, Ordering::Relaxed);
    }

    /// Local paths of the open workspace folders, in client order.
    pub(crate) async fn workspace_root_paths(&self) -> Vec<PathBuf> {
        self.workspace_roots.read().await.iter().filter_map(|f| f.uri.to_file_path().ok()).collect()
    }

    /// Point the supervisor at the current roots and factory globs.
    pub(crate) async fn refresh_scope(&self) -> FactoryScope {
        let roots = self.workspace_root_paths().await;
        let patterns = self.settings.read().await.factories.paths.clone();
        let scope = FactoryScope::from_roots(&roots, patterns);
        self.supervisor.set_scope(scope.clone()).await;
        scope
    }

    /// The rebuild supervisor, for waiting on index rebuilds.
    pub fn supervisor(&self) -> &ChangeSupervisor {
        &self.supervisor
    }
}

/// Forward each completed rebuild to the client's log while info-level
/// logging is enabled.
async fn report_rebuilds(
    client: Client,
    settings: Arc<RwLock<ServerSettings>>,
    mut status: watch::Receiver<SupervisorStatus>,
) {
    let mut reported = 0;
    while status.changed().await.is_ok() {
        let current = *status.borrow_and_update();
        if current.completed_rebuilds == reported {
            continue;
        }
        reported = current.completed_rebuilds;

        let Some(summary) = current.last else {
            continue;
        };
        if !settings.read().await.logging.level.allows_info() {
            continue;
        }
        let message = prefixed_client_message(format!(
            "Indexed {} factory definition(s) from {} file(s)",
            summary.index.definitions, summary.index.files_scanned
        ));
        let sent = AssertUnwindSafe(client.log_message(MessageType::INFO, message)).catch_unwind().await;
        if sent.is_err() {
            warn!("log_message panicked (client may have disconnected)");
        }
    }
}
