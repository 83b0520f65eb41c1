//! Layered settings.
//!
//! Each category lives in its own file with a public settings struct and a
//! private `*Patch` struct for partial deserialization. [`ServerSettings`]
//! aggregates the categories and merges, in order: defaults, the nearest
//! `.test-selector.toml`, then the LSP `initializationOptions` or
//! `didChangeConfiguration` payload.

pub(crate) mod file;
pub(crate) mod logging;
pub(crate) mod population;
pub(crate) mod selector;

use std::{collections::HashMap, path::Path};

pub use file::{CONFIG_FILENAME, ConfigFileError, find_config_file};
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use population::PopulationSettingsPatch;
pub use population::{DEFAULT_DEBOUNCE_MS, MAX_DEBOUNCE_MS, PopulationSettings};
use selector::SelectorSettingsPatch;
pub use selector::SelectorSettings;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const SETTINGS_SECTION_KEY: &str = "test-selector";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSettings {
    pub selector: SelectorSettings,
    pub population: PopulationSettings,
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
            match serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                Ok(patch) => merged.apply_patch(patch),
                Err(error) => debug!("[config] ignoring settings payload: {error}"),
            }
        }

        merged.normalize();
        merged
    }

    /// Merge the settings file at `path` on top of `self`.
    pub fn merged_with_file(
        &self,
        path: &Path,
    ) -> Result<Self, ConfigFileError> {
        let payload = file::load_payload(path)?;
        Ok(self.merged_with_payload(&payload))
    }

    /// Defaults, then the nearest settings file above `root` (if any).
    pub fn discover(root: &Path) -> Result<Self, ConfigFileError> {
        match find_config_file(root) {
            Some(path) => {
                debug!("[config] using {}", path.display());
                Self::default().merged_with_file(&path)
            },
            None => Ok(Self::default()),
        }
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(p) = patch.selector {
            self.selector.apply_patch(p);
        }
        if let Some(p) = patch.population {
            self.population.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.selector.normalize();
        self.population.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    selector: Option<SelectorSettingsPatch>,
    population: Option<PopulationSettingsPatch>,
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
