use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::workspace::DEFAULT_FACTORY_PATTERN;

pub(crate) const SETTINGS_SECTION_KEY: &str = "factory-analyzer";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerSettings {
    pub factories: FactorySettings,
    pub logging: LoggingSettings,
}

impl ServerSettings {
    pub fn from_lsp_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    /// Overlay `payload` onto a copy of these settings.
    ///
    /// Accepts both the flat form and the form scoped under
    /// `"factory-analyzer"`; unknown keys are ignored.
    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(factory_paths) = patch.factory_paths {
            self.factories.paths = factory_paths;
        }
        if let Some(logging) = patch.logging {
            self.logging.apply_patch(logging);
        }
    }

    fn normalize(&mut self) {
        self.factories.normalize();
    }
}

/// Where factory definitions live, as globs relative to the workspace root.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorySettings {
    pub paths: Vec<String>,
}

impl Default for FactorySettings {
    fn default() -> Self {
        Self {
            paths: vec![DEFAULT_FACTORY_PATTERN.to_string()],
        }
    }
}

impl FactorySettings {
    /// Trim entries and drop blanks and repeats. An explicitly empty list is
    /// kept empty: the user asked for no factory files.
    fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.paths = self
            .paths
            .iter()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .filter(|path| seen.insert(path.clone()))
            .collect();
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl LoggingSettings {
    fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(level) = patch.level {
            self.level = level;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn allows_info(self) -> bool {
        self >= LogLevel::Info
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    factory_paths: Option<Vec<String>>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoggingSettingsPatch {
    level: Option<LogLevel>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());

    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }

    candidates
}

#[cfg(test)]
#[path = "../../tests/src/server/settings_tests.rs"]
mod tests;
