//! Locating and reading the factory files that feed the definition index.

mod fs;
mod locator;
mod scope;

use std::path::PathBuf;

use tracing::debug;

pub use fs::{DiskFs, FileReadError, WorkspaceFs};
pub use locator::locate;
pub use scope::FactoryScope;

/// Default value of the `factoryPaths` setting.
pub const DEFAULT_FACTORY_PATTERN: &str = "spec/factories/**/*.rb";

/// Contents of the watched file set, ready for [`DefinitionIndex::rebuild`].
///
/// [`DefinitionIndex::rebuild`]: crate::index::DefinitionIndex::rebuild
#[derive(Debug, Default)]
pub struct FactoryFiles {
    pub contents: Vec<(PathBuf, Vec<u8>)>,
    pub located: usize,
    pub unreadable: usize,
}

/// Locate every factory file in `scope` and read it.
///
/// Unreadable files are skipped; the rest of the set is still returned.
pub async fn collect_factory_files(
    fs: &dyn WorkspaceFs,
    scope: &FactoryScope,
) -> FactoryFiles {
    let paths = locate(fs, scope).await;
    let mut files = FactoryFiles {
        contents: Vec::with_capacity(paths.len()),
        located: paths.len(),
        unreadable: 0,
    };

    for path in paths {
        match fs.read_file(&path).await {
            Ok(bytes) => files.contents.push((path, bytes)),
            Err(error) => {
                debug!("skipping factory file: {error}");
                files.unreadable += 1;
            },
        }
    }
    files
}
