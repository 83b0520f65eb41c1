use std::{collections::HashMap, sync::Arc};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::scan::{PatternError, SelectorPatterns, TestFramework};

/// Which declarations count as tests and how they are suppressed.
///
/// `framework` picks a preset; each `Some` override replaces the preset's
/// value. Overrides are validated only by [`compile`](Self::compile).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorSettings {
    pub framework: TestFramework,
    pub declaration_pattern: Option<String>,
    pub suppress_pattern: Option<String>,
    pub marker_text: Option<String>,
    pub skip_blank_lines: bool,
}

impl SelectorSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: SelectorSettingsPatch,
    ) {
        if let Some(v) = patch.framework {
            match TestFramework::from_setting_value(&v) {
                Some(framework) => self.framework = framework,
                None => warn!("[config] unknown framework '{v}', keeping {}", self.framework),
            }
        }
        if let Some(v) = patch.declaration_pattern {
            self.declaration_pattern = Some(v);
        }
        if let Some(v) = patch.suppress_pattern {
            self.suppress_pattern = Some(v);
        }
        if let Some(v) = patch.marker_text {
            self.marker_text = Some(v);
        }
        if let Some(v) = patch.skip_blank_lines {
            self.skip_blank_lines = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        // Patterns are trimmed; the marker keeps its indentation.
        for pattern in [&mut self.declaration_pattern, &mut self.suppress_pattern] {
            *pattern = pattern.take().map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        }
        self.marker_text = self.marker_text.take().filter(|m| !m.trim().is_empty());
    }

    pub fn is_preset(&self) -> bool {
        self.declaration_pattern.is_none()
            && self.suppress_pattern.is_none()
            && self.marker_text.is_none()
            && !self.skip_blank_lines
    }

    pub fn compile(&self) -> Result<Arc<SelectorPatterns>, PatternError> {
        if self.is_preset() {
            return Ok(self.framework.patterns());
        }
        let patterns = SelectorPatterns::new(
            self.declaration_pattern.as_deref().unwrap_or(self.framework.declaration_pattern()),
            self.suppress_pattern.as_deref().unwrap_or(self.framework.suppress_pattern()),
            self.marker_text.as_deref().unwrap_or(self.framework.marker_text()),
        )?;
        Ok(Arc::new(patterns.with_skip_blank_lines(self.skip_blank_lines)))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SelectorSettingsPatch {
    pub(crate) framework: Option<String>,
    #[serde(alias = "declaration_pattern")]
    pub(crate) declaration_pattern: Option<String>,
    #[serde(alias = "suppress_pattern")]
    pub(crate) suppress_pattern: Option<String>,
    #[serde(alias = "marker_text")]
    pub(crate) marker_text: Option<String>,
    #[serde(alias = "skip_blank_lines")]
    pub(crate) skip_blank_lines: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
