use std::path::{Path, PathBuf};

use globset::{GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::workspace::fs::{compile_pattern, relative_slash_path};

/// The watched file set: first workspace root plus the configured globs.
#[derive(Debug, Clone)]
pub struct FactoryScope {
    root: Option<PathBuf>,
    patterns: Vec<String>,
    matcher: GlobSet,
}

impl Default for FactoryScope {
    fn default() -> Self {
        Self::new(None, Vec::new())
    }
}

impl FactoryScope {
    pub fn new(
        root: Option<PathBuf>,
        patterns: Vec<String>,
    ) -> Self {
        let matcher = build_glob_set(&patterns);
        Self {
            root,
            patterns,
            matcher,
        }
    }

    /// Scope over the first of `roots`. Any further roots are ignored.
    pub fn from_roots(
        roots: &[PathBuf],
        patterns: Vec<String>,
    ) -> Self {
        if roots.len() > 1 {
            debug!("{} workspace roots open; only {} is searched for factories", roots.len(), roots[0].display());
        }
        Self::new(roots.first().cloned(), patterns)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a watch event for `path` concerns a factory file.
    pub fn matches(
        &self,
        path: &Path,
    ) -> bool {
        let Some(root) = self.root.as_deref() else {
            return false;
        };
        relative_slash_path(root, path).is_some_and(|relative| self.matcher.is_match(relative.as_str()))
    }
}

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Some(matcher) = compile_pattern(pattern) {
            builder.add(matcher.glob().clone());
        }
    }
    builder.build().unwrap_or_else(|error| {
        debug!("factory path patterns {patterns:?} could not be combined: {error}");
        GlobSet::empty()
    })
}

#[cfg(test)]
#[path = "../../tests/src/workspace/scope_tests.rs"]
mod tests;
