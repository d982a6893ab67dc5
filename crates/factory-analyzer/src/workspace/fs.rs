use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into while searching for factory files.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// File access the indexer needs from its host.
///
/// The server uses [`DiskFs`]; tests substitute in-memory or gated fakes.
#[async_trait]
pub trait WorkspaceFs: Send + Sync {
    /// Files under `root` whose root-relative path matches `pattern`.
    ///
    /// An unparsable pattern yields no files.
    async fn find_files(
        &self,
        root: &Path,
        pattern: &str,
    ) -> Vec<PathBuf>;

    async fn read_file(
        &self,
        path: &Path,
    ) -> Result<Vec<u8>, FileReadError>;
}

#[derive(Debug)]
pub struct FileReadError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl Display for FileReadError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "failed to read {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for FileReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// [`WorkspaceFs`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

#[async_trait]
impl WorkspaceFs for DiskFs {
    async fn find_files(
        &self,
        root: &Path,
        pattern: &str,
    ) -> Vec<PathBuf> {
        let Some(matcher) = compile_pattern(pattern) else {
            return Vec::new();
        };
        let root = root.to_path_buf();
        let base = root.join(literal_prefix(pattern));

        let walk = tokio::task::spawn_blocking(move || walk_matching(&root, &base, &matcher)).await;
        match walk {
            Ok(files) => files,
            Err(error) => {
                warn!("factory file search for '{pattern}' failed: {error}");
                Vec::new()
            },
        }
    }

    async fn read_file(
        &self,
        path: &Path,
    ) -> Result<Vec<u8>, FileReadError> {
        tokio::fs::read(path).await.map_err(|source| FileReadError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Compile a workspace glob so that `*` stays within one path segment and
/// `**` spans directories.
pub(crate) fn compile_pattern(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(normalize_pattern(pattern)).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(error) => {
            debug!("ignoring invalid factory path pattern '{pattern}': {error}");
            None
        },
    }
}

pub(crate) fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim_start_matches("./")
}

/// Root-relative path with `/` separators, the form globs are matched against.
pub(crate) fn relative_slash_path(
    root: &Path,
    path: &Path,
) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Leading directories of `pattern` that contain no glob syntax.
///
/// `spec/factories/**/*.rb` -> `spec/factories`. Walking starts there instead
/// of at the workspace root.
fn literal_prefix(pattern: &str) -> PathBuf {
    let segments: Vec<&str> = normalize_pattern(pattern).split('/').collect();
    let mut prefix = PathBuf::new();
    for segment in &segments[..segments.len().saturating_sub(1)] {
        if segment.is_empty() || *segment == "." || *segment == ".." || segment.contains(GLOB_META) {
            break;
        }
        prefix.push(segment);
    }
    prefix
}

fn walk_matching(
    root: &Path,
    base: &Path,
    matcher: &GlobMatcher,
) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(base)
        .follow_links(true)
        .into_iter()
        .filter_entry(should_descend)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = relative_slash_path(root, entry.path())?;
            matcher.is_match(relative.as_str()).then(|| entry.into_path())
        })
        .collect();
    files.sort();
    files
}

fn should_descend(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    entry.file_name().to_str().is_none_or(|name| !SKIPPED_DIRS.contains(&name))
}

#[cfg(test)]
#[path = "../../tests/src/workspace/fs_tests.rs"]
mod tests;
