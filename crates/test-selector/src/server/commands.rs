//! `workspace/executeCommand` surface.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tower_lsp::lsp_types::Url;

pub const TOGGLE_SUPPRESSION: &str = "testSelector.toggleSuppression";
pub const SET_SUPPRESSED: &str = "testSelector.setSuppressed";
pub const SET_ALL_SUPPRESSED: &str = "testSelector.setAllSuppressed";
pub const NAVIGATE: &str = "testSelector.navigate";
pub const FILTER: &str = "testSelector.filter";
pub const REFRESH: &str = "testSelector.refresh";

pub const ALL_COMMANDS: [&str; 6] = [TOGGLE_SUPPRESSION, SET_SUPPRESSED, SET_ALL_SUPPRESSED, NAVIGATE, FILTER, REFRESH];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` expects argument {index} ({expected})")]
    MissingArgument {
        command: &'static str,
        index: usize,
        expected: &'static str,
    },
    #[error("`{command}` argument {index} is not a valid {expected}: {reason}")]
    InvalidArgument {
        command: &'static str,
        index: usize,
        expected: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorCommand {
    ToggleSuppression {
        uri: Url,
        name: String,
    },
    SetSuppressed {
        uri: Url,
        name: String,
        suppressed: bool,
    },
    SetAllSuppressed {
        uri: Url,
        suppressed: bool,
    },
    Navigate {
        uri: Url,
        name: String,
    },
    Filter {
        uri: Url,
        pattern: String,
    },
    Refresh {
        uri: Url,
    },
}

impl SelectorCommand {
    pub fn parse(
        command: &str,
        arguments: &[Value],
    ) -> Result<Self, CommandError> {
        let command = ALL_COMMANDS
            .iter()
            .copied()
            .find(|known| *known == command)
            .ok_or_else(|| CommandError::Unknown(command.to_string()))?;
        let args = Arguments {
            command,
            values: arguments,
        };

        let parsed = match command {
            TOGGLE_SUPPRESSION => Self::ToggleSuppression {
                uri: args.get(0, "document URI")?,
                name: args.get(1, "test name")?,
            },
            SET_SUPPRESSED => Self::SetSuppressed {
                uri: args.get(0, "document URI")?,
                name: args.get(1, "test name")?,
                suppressed: args.get(2, "boolean")?,
            },
            SET_ALL_SUPPRESSED => Self::SetAllSuppressed {
                uri: args.get(0, "document URI")?,
                suppressed: args.get(1, "boolean")?,
            },
            NAVIGATE => Self::Navigate {
                uri: args.get(0, "document URI")?,
                name: args.get(1, "test name")?,
            },
            FILTER => Self::Filter {
                uri: args.get(0, "document URI")?,
                pattern: args.get_or_default(1, "filter pattern")?,
            },
            REFRESH => Self::Refresh {
                uri: args.get(0, "document URI")?,
            },
            _ => return Err(CommandError::Unknown(command.to_string())),
        };
        Ok(parsed)
    }

    pub fn uri(&self) -> &Url {
        match self {
            Self::ToggleSuppression {
                uri,
                ..
            }
            | Self::SetSuppressed {
                uri,
                ..
            }
            | Self::SetAllSuppressed {
                uri,
                ..
            }
            | Self::Navigate {
                uri,
                ..
            }
            | Self::Filter {
                uri,
                ..
            }
            | Self::Refresh {
                uri,
            } => uri,
        }
    }
}

struct Arguments<'a> {
    command: &'static str,
    values: &'a [Value],
}

impl Arguments<'_> {
    fn get<T: DeserializeOwned>(
        &self,
        index: usize,
        expected: &'static str,
    ) -> Result<T, CommandError> {
        let value = self.values.get(index).ok_or(CommandError::MissingArgument {
            command: self.command,
            index,
            expected,
        })?;
        serde_json::from_value(value.clone()).map_err(|error| CommandError::InvalidArgument {
            command: self.command,
            index,
            expected,
            reason: error.to_string(),
        })
    }

    /// A missing or `null` argument yields `T::default()`.
    fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        index: usize,
        expected: &'static str,
    ) -> Result<T, CommandError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(_) => self.get(index, expected),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/server/commands_tests.rs"]
mod tests;
