//! Server settings.
//!
//! One file per category. [`ServerSettings`] aggregates them and handles JSON
//! deserialization from LSP initialization options and
//! `didChangeConfiguration` payloads; `c-analyzer.toml` project files add
//! search paths on top.

pub(crate) mod indexing;
pub(crate) mod logging;
pub(crate) mod paths;
pub(crate) mod project;
pub(crate) mod schema;

use std::collections::HashMap;

use indexing::IndexingSettingsPatch;
pub use indexing::{DEFAULT_EXTENSIONS, IndexingSettings, MAX_CACHE_SIZE, MIN_CACHE_SIZE};
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use paths::PathSettingsPatch;
pub use paths::PathSettings;
pub use project::{PROJECT_FILENAME, ProjectFile, find_project_file};
pub use schema::{
    SchemaField, SchemaType, generate_configuration_markdown, generate_package_json_properties, schema_fields,
};
use serde::Deserialize;
use serde_json::Value;

pub const SETTINGS_SECTION_KEY: &str = "c-analyzer";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSettings {
    pub indexing: IndexingSettings,
    pub paths: PathSettings,
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

    /// Settings for one file: these paths plus those of the nearest project file.
    pub fn with_project(
        &self,
        project: Option<ProjectFile>,
    ) -> Self {
        let mut settings = self.clone();
        if let Some(project) = project {
            settings.paths.extend(project.base_paths, project.system_paths);
        }
        settings
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(p) = patch.indexing {
            self.indexing.apply_patch(p);
        }
        if let Some(p) = patch.paths {
            self.paths.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.indexing.normalize();
        self.paths.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    indexing: Option<IndexingSettingsPatch>,
    paths: Option<PathSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = vec![payload.clone()];
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
