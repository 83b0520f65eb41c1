use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const MAX_DEBOUNCE_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSettings {
    /// Quiet period after the last `didChange` before re-populating.
    /// Zero re-populates on every change.
    pub debounce_ms: u64,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl PopulationSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: PopulationSettingsPatch,
    ) {
        if let Some(v) = patch.debounce_ms {
            self.debounce_ms = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.debounce_ms = self.debounce_ms.min(MAX_DEBOUNCE_MS);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PopulationSettingsPatch {
    #[serde(alias = "debounce_ms")]
    pub(crate) debounce_ms: Option<u64>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
