use std::path::PathBuf;

use tracing::debug;

use crate::workspace::{fs::WorkspaceFs, scope::FactoryScope};

/// Resolve every pattern of `scope` against its root.
///
/// Results are concatenated in pattern order, then in the order the
/// filesystem returned them. A file matched by two patterns is listed twice.
pub async fn locate(
    fs: &dyn WorkspaceFs,
    scope: &FactoryScope,
) -> Vec<PathBuf> {
    let Some(root) = scope.root() else {
        debug!("no workspace root; skipping factory file search");
        return Vec::new();
    };

    let mut located = Vec::new();
    for pattern in scope.patterns() {
        let found = fs.find_files(root, pattern).await;
        debug!("factory path '{pattern}' matched {} file(s)", found.len());
        located.extend(found);
    }
    located
}

#[cfg(test)]
#[path = "../../tests/src/workspace/locator_tests.rs"]
mod tests;
