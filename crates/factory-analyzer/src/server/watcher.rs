use std::{panic::AssertUnwindSafe, path::Path, sync::atomic::Ordering};

use futures::FutureExt;
use tower_lsp::lsp_types::{
    DidChangeWatchedFilesRegistrationOptions, FileChangeType, FileEvent, FileSystemWatcher, GlobPattern, OneOf,
    Registration, RelativePattern, Unregistration, Url,
};
use tracing::{debug, warn};

use crate::{
    server::state::FactoryLanguageServer,
    supervisor::{FileEventKind, RebuildTrigger},
    workspace::FactoryScope,
};

pub(crate) const WATCH_REGISTRATION_ID: &str = "factory-analyzer/watch-factories";
const WATCH_METHOD: &str = "workspace/didChangeWatchedFiles";

impl FactoryLanguageServer {
    /// Replace the client-side file watchers with one per factory glob.
    pub(crate) async fn register_factory_watchers(
        &self,
        scope: &FactoryScope,
    ) {
        if !self.dynamic_watchers.load(Ordering::Relaxed) {
            debug!("client does not support dynamic file watcher registration");
            return;
        }

        if self.watchers_registered.swap(false, Ordering::Relaxed) {
            let unregistration = Unregistration {
                id: WATCH_REGISTRATION_ID.to_string(),
                method: WATCH_METHOD.to_string(),
            };
            let result =
                AssertUnwindSafe(self.client.unregister_capability(vec![unregistration])).catch_unwind().await;
            match result {
                Ok(Ok(())) => {},
                Ok(Err(error)) => debug!("failed to unregister factory watchers: {error}"),
                Err(_) => warn!("unregister_capability panicked (client may have disconnected)"),
            }
        }

        let relative = self.relative_watch_patterns.load(Ordering::Relaxed);
        let watchers = factory_watchers(scope, relative);
        if watchers.is_empty() {
            return;
        }

        let register_options = match serde_json::to_value(DidChangeWatchedFilesRegistrationOptions {
            watchers,
        }) {
            Ok(options) => options,
            Err(error) => {
                warn!("failed to encode factory watcher options: {error}");
                return;
            },
        };
        let registration = Registration {
            id: WATCH_REGISTRATION_ID.to_string(),
            method: WATCH_METHOD.to_string(),
            register_options: Some(register_options),
        };

        let result = AssertUnwindSafe(self.client.register_capability(vec![registration])).catch_unwind().await;
        match result {
            Ok(Ok(())) => {
                self.watchers_registered.store(true, Ordering::Relaxed);
                debug!("watching {} factory path pattern(s)", scope.patterns().len());
            },
            Ok(Err(error)) => debug!("failed to register factory watchers: {error}"),
            Err(_) => warn!("register_capability panicked (client may have disconnected)"),
        }
    }
}

/// One watcher per glob, anchored at the scope root.
///
/// Clients without `RelativePattern` support get absolute string globs.
pub(crate) fn factory_watchers(
    scope: &FactoryScope,
    relative: bool,
) -> Vec<FileSystemWatcher> {
    let Some(root) = scope.root() else {
        return Vec::new();
    };
    let Ok(base_uri) = Url::from_directory_path(root) else {
        return Vec::new();
    };

    scope
        .patterns()
        .iter()
        .map(|pattern| {
            let pattern = pattern.trim_start_matches("./");
            let glob_pattern = if relative {
                GlobPattern::Relative(RelativePattern {
                    base_uri: OneOf::Right(base_uri.clone()),
                    pattern: pattern.to_string(),
                })
            } else {
                GlobPattern::String(absolute_glob(root, pattern))
            };
            FileSystemWatcher {
                glob_pattern,
                kind: None,
            }
        })
        .collect()
}

fn absolute_glob(
    root: &Path,
    pattern: &str,
) -> String {
    let root = root.to_string_lossy().replace('\\', "/");
    format!("{}/{pattern}", root.trim_end_matches('/'))
}

/// Translate a client file event into a supervisor trigger.
pub(crate) fn file_event_trigger(event: &FileEvent) -> Option<RebuildTrigger> {
    let kind = match event.typ {
        FileChangeType::CREATED => FileEventKind::Created,
        FileChangeType::CHANGED => FileEventKind::Changed,
        FileChangeType::DELETED => FileEventKind::Deleted,
        _ => return None,
    };
    let path = event.uri.to_file_path().ok()?;
    Some(RebuildTrigger::FileEvent {
        path,
        kind,
    })
}

#[cfg(test)]
#[path = "../../tests/src/server/watcher_tests.rs"]
mod tests;
