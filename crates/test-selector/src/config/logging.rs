use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tower_lsp::lsp_types::MessageType;

/// Threshold for messages forwarded to the client's log
/// (`window/logMessage`). Process logging is controlled by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Whether a client-bound message of `kind` passes the threshold.
    /// `MessageType::LOG` counts as debug output.
    pub fn allows(
        self,
        kind: MessageType,
    ) -> bool {
        let required = match kind {
            MessageType::ERROR => Self::Error,
            MessageType::WARNING => Self::Warn,
            MessageType::INFO => Self::Info,
            _ => Self::Debug,
        };
        self >= required
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl LoggingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        self.level = patch.level.unwrap_or(self.level);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LoggingSettingsPatch {
    pub(crate) level: Option<LogLevel>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
