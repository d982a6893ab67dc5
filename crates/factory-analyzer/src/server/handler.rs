use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info, warn};

use crate::{
    links::{to_document_link, to_location},
    server::{settings::ServerSettings, state::FactoryLanguageServer, watcher::file_event_trigger},
    supervisor::RebuildTrigger,
};

const CLIENT_NOTIFICATION_PREFIX: &str = "factory-analyzer:";

#[tower_lsp::async_trait]
impl LanguageServer for FactoryLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing factory-analyzer...");

        let initial_settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(initial_settings).await;
        self.record_client_capabilities(&params.capabilities);

        if let Some(folders) = params.workspace_folders {
            *self.workspace_roots.write().await = folders;
        } else if let Some(root) = params.root_uri {
            *self.workspace_roots.write().await = vec![WorkspaceFolder {
                uri: root,
                name: "root".to_string(),
            }];
        }
        self.refresh_scope().await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                document_link_provider: Some(DocumentLinkOptions {
                    resolve_provider: Some(false),
                    work_done_progress_options: Default::default(),
                }),
                definition_provider: Some(OneOf::Left(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "factory-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("factory-analyzer initialized");

        let scope = self.supervisor.scope().await;
        if scope.root().is_none() {
            info!("No workspace folder open; factory links stay empty");
        }
        self.register_factory_watchers(&scope).await;
        self.supervisor.notify(RebuildTrigger::Activation).await;
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        let factory_paths_changed = merged.factories != current.factories;
        self.apply_settings(merged).await;
        info!("Applied updated factory-analyzer settings");

        if factory_paths_changed {
            let scope = self.refresh_scope().await;
            self.register_factory_watchers(&scope).await;
            self.supervisor.notify(RebuildTrigger::SettingsChanged).await;
        }
    }

    async fn did_change_workspace_folders(
        &self,
        params: DidChangeWorkspaceFoldersParams,
    ) {
        {
            let mut roots = self.workspace_roots.write().await;
            roots.retain(|folder| !params.event.removed.iter().any(|removed| removed.uri == folder.uri));
            for added in params.event.added {
                if !roots.iter().any(|folder| folder.uri == added.uri) {
                    roots.push(added);
                }
            }
            debug!("{} workspace folder(s) open", roots.len());
        }

        let previous_root = self.supervisor.scope().await.root().map(|root| root.to_path_buf());
        let scope = self.refresh_scope().await;
        if scope.root() == previous_root.as_deref() {
            return;
        }
        self.register_factory_watchers(&scope).await;
        self.supervisor.notify(RebuildTrigger::WorkspaceChanged).await;
    }

    async fn did_change_watched_files(
        &self,
        params: DidChangeWatchedFilesParams,
    ) {
        for change in &params.changes {
            let Some(trigger) = file_event_trigger(change) else {
                debug!("ignoring watch event for {}", change.uri);
                continue;
            };
            self.supervisor.notify(trigger).await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down factory-analyzer");
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let document = params.text_document;
        let filename = short_name(&document.uri);
        let allow_client_info_logs = self.settings_snapshot().await.logging.level.allows_info();

        debug!("Opened {filename} (v{}, {} bytes)", document.version, document.text.len());
        if allow_client_info_logs {
            let result = AssertUnwindSafe(
                self.client.log_message(MessageType::INFO, prefixed_client_message(format!("Opened {filename}"))),
            )
            .catch_unwind()
            .await;
            if result.is_err() {
                warn!("log_message panicked (client may have disconnected)");
            }
        }

        self.document_store.open(document.uri, document.language_id, document.text, document.version);
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        self.document_store.apply_changes(
            &params.text_document.uri,
            params.content_changes,
            params.text_document.version,
        );
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        self.document_store.close(&params.text_document.uri);
    }

    async fn document_link(
        &self,
        params: DocumentLinkParams,
    ) -> Result<Option<Vec<DocumentLink>>> {
        let uri = params.text_document.uri;
        let Some(document) = self.document_store.get(&uri) else {
            return Ok(None);
        };
        if !document.is_ruby() {
            return Ok(None);
        }

        let links: Vec<DocumentLink> = self
            .link_provider
            .produce_links(&document.text)
            .iter()
            .filter_map(|link| to_document_link(&document, link))
            .collect();
        debug!("{} factory link(s) in {}", links.len(), short_name(&uri));
        Ok(Some(links))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(document) = self.document_store.get(&uri) else {
            return Ok(None);
        };
        if !document.is_ruby() {
            return Ok(None);
        }
        let Some(offset) = document.offset_of(position) else {
            return Ok(None);
        };

        let location = self
            .link_provider
            .definition_at(&document.text, offset)
            .and_then(|link| to_location(&link.target));
        debug!(
            "goto-def {}:{}:{} -> {}",
            short_name(&uri),
            position.line + 1,
            position.character + 1,
            location.as_ref().map_or("none".to_string(), |l| l.uri.to_string())
        );
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }
}

fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

pub(crate) fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
