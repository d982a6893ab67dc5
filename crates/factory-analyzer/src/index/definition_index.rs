use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use crate::{
    index::types::{DefinitionLocation, IndexGeneration, IndexStats},
    pattern::{find_definitions, line_of_offset},
};

/// Name -> location map of every factory in the watched files.
///
/// The map is never edited in place. Each [`rebuild`](Self::rebuild) scans
/// into a fresh map and swaps it in whole, so a concurrent
/// [`lookup`](Self::lookup) sees either the previous generation or the new
/// one, never a partial one.
pub struct DefinitionIndex {
    current: ArcSwap<IndexGeneration>,
    next_generation: AtomicU64,
}

impl Default for DefinitionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionIndex {
    /// An empty index that reports not ready until the first rebuild.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(IndexGeneration::default()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Replace the index with the definitions found in `files`.
    ///
    /// Later occurrences of a name win, both across files (in iteration
    /// order) and within a file (in document order).
    pub fn rebuild<I>(
        &self,
        files: I,
    ) -> IndexStats
    where
        I: IntoIterator<Item = (PathBuf, Vec<u8>)>,
    {
        let mut definitions: HashMap<String, DefinitionLocation> = HashMap::new();
        let mut files_scanned = 0usize;
        let mut overwritten = 0usize;

        for (path, bytes) in files {
            files_scanned += 1;
            let text = String::from_utf8_lossy(&bytes);
            for occurrence in find_definitions(&text) {
                let location = DefinitionLocation {
                    source_path: path.clone(),
                    line: line_of_offset(&text, occurrence.offset),
                };
                if let Some(previous) = definitions.insert(occurrence.name.clone(), location) {
                    overwritten += 1;
                    trace!(
                        "factory :{} redefined, replacing {}:{}",
                        occurrence.name,
                        previous.source_path.display(),
                        previous.line + 1
                    );
                }
            }
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let stats = IndexStats {
            generation,
            files_scanned,
            definitions: definitions.len(),
            overwritten,
        };
        self.current.store(Arc::new(IndexGeneration {
            generation,
            definitions,
            files_scanned,
        }));
        debug!(
            "installed factory index generation {generation}: {} definition(s) from {files_scanned} file(s)",
            stats.definitions
        );
        stats
    }

    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<DefinitionLocation> {
        self.current.load().definitions.get(name).cloned()
    }

    /// `true` once any rebuild has completed.
    pub fn is_ready(&self) -> bool {
        self.current.load().generation > 0
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    pub fn len(&self) -> usize {
        self.current.load().definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The generation currently installed.
    pub fn snapshot(&self) -> Arc<IndexGeneration> {
        self.current.load_full()
    }
}

#[cfg(test)]
#[path = "../../tests/src/index/definition_index_tests.rs"]
mod tests;
