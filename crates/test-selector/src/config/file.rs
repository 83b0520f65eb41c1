use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = ".test-selector.toml";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to convert {path}: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Walks parent directories from `start` looking for `.test-selector.toml`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Reads the file as TOML and re-encodes it as JSON so it merges through the
/// same patch structs as an LSP payload.
pub(crate) fn load_payload(path: &Path) -> Result<Value, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_value(table).map_err(|source| ConfigFileError::Convert {
        path: path.to_path_buf(),
        source,
    })
}
