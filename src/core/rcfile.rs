//! `~/.cbtrc` dotfile
//!
//! The file shares its format with the `cbt` tool: one `key = value` pair per
//! line, keys limited to `project`, `instance` and `creds`. Blank lines are
//! skipped; there is no comment syntax.

use directories::BaseDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::config::ConfigError;

/// Dotfile name inside the home directory
pub const RC_FILE_NAME: &str = ".cbtrc";

/// Values read from the dotfile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RcFile {
    pub project: Option<String>,
    pub instance: Option<String>,
    pub creds: Option<String>,
}

impl RcFile {
    /// `~/.cbtrc`, if a home directory can be determined
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(RC_FILE_NAME))
    }

    /// Load and parse the dotfile; a missing file yields empty values
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loaded rc file");
                Self::parse(path, &content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse dotfile content; `path` is only used in error messages
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let mut rc = Self::default();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::BadLine {
                    path: path.to_path_buf(),
                    line: line.to_string(),
                });
            };

            let value = value.trim().to_string();
            match key.trim() {
                "project" => rc.project = Some(value),
                "instance" => rc.instance = Some(value),
                "creds" => rc.creds = Some(value),
                other => {
                    return Err(ConfigError::UnknownKey {
                        path: path.to_path_buf(),
                        key: other.to_string(),
                    })
                }
            }
        }

        Ok(rc)
    }
}
