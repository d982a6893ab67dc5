use std::{collections::HashMap, path::PathBuf};

/// Where a factory is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLocation {
    pub source_path: PathBuf,
    /// Zero-based line of the `factory` keyword.
    pub line: u32,
}

/// One complete rebuild pass.
///
/// Generation `0` is the empty snapshot that exists before the first rebuild.
#[derive(Debug, Clone, Default)]
pub struct IndexGeneration {
    pub generation: u64,
    pub definitions: HashMap<String, DefinitionLocation>,
    pub files_scanned: usize,
}

/// Summary of a rebuild, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub generation: u64,
    pub files_scanned: usize,
    pub definitions: usize,
    /// Definitions that replaced an earlier one with the same name.
    pub overwritten: usize,
}
