use std::{ops::Range, sync::Arc};

use tracing::trace;

use crate::{
    index::{DefinitionIndex, DefinitionLocation},
    pattern::{UsageOccurrence, find_usages, usage_at},
};

/// A usage site that resolved to a known factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryLink {
    pub name: String,
    /// Byte range of the `:name` token in the scanned text.
    pub range: Range<usize>,
    pub target: DefinitionLocation,
}

/// Turns document text into factory links. Holds no per-document state.
#[derive(Clone)]
pub struct LinkProvider {
    index: Arc<DefinitionIndex>,
}

impl LinkProvider {
    pub fn new(index: Arc<DefinitionIndex>) -> Self {
        Self {
            index,
        }
    }

    pub fn index(&self) -> &DefinitionIndex {
        &self.index
    }

    /// Every resolved `create`/`build` usage in `text`, in document order.
    ///
    /// Returns nothing until the index has completed its first rebuild so a
    /// half-initialised server never reports stale targets.
    pub fn produce_links(
        &self,
        text: &str,
    ) -> Vec<FactoryLink> {
        if !self.index.is_ready() {
            trace!("factory index not ready; no links");
            return Vec::new();
        }
        find_usages(text).into_iter().filter_map(|usage| self.resolve(usage)).collect()
    }

    /// The resolved usage under `offset`, for go-to-definition.
    pub fn definition_at(
        &self,
        text: &str,
        offset: usize,
    ) -> Option<FactoryLink> {
        if !self.index.is_ready() {
            return None;
        }
        usage_at(text, offset).and_then(|usage| self.resolve(usage))
    }

    fn resolve(
        &self,
        usage: UsageOccurrence,
    ) -> Option<FactoryLink> {
        let target = self.index.lookup(&usage.name)?;
        Some(FactoryLink {
            name: usage.name,
            range: usage.range,
            target,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src/links/provider_tests.rs"]
mod tests;
