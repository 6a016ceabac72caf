//! gcloud configuration helper
//!
//! `gcloud config config-helper` reports the active project together with a
//! short-lived access token. The resolver only talks to it through the
//! [`ConfigHelper`] trait so tests can substitute a canned snapshot.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::process::Command;
use thiserror::Error;

use crate::core::token::Token;

/// Arguments passed to the helper binary
pub const HELPER_ARGS: [&str; 3] = [
    "config",
    "config-helper",
    "--format=json(configuration.properties.core.project,credential)",
];

/// Helper failures
///
/// Messages are deliberately generic: the helper's stderr may contain account
/// details, so it is only ever logged at debug level.
#[derive(Debug, Error)]
pub enum HelperError {
    #[error("Could not retrieve gcloud configuration")]
    Exec,

    #[error("Could not parse gcloud configuration")]
    Parse,
}

/// Point-in-time view of the operator's gcloud configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudSnapshot {
    pub project: String,
    pub access_token: String,
    pub token_expiry: DateTime<Utc>,
}

impl GcloudSnapshot {
    pub fn token(&self) -> Token {
        Token::bearer(self.access_token.clone(), self.token_expiry)
    }

    /// Parse the JSON printed by `gcloud config config-helper`
    pub fn from_json(bytes: &[u8]) -> Result<Self, HelperError> {
        let raw: HelperOutput = serde_json::from_slice(bytes).map_err(|e| {
            tracing::debug!(error = %e, "unparsable config-helper output");
            HelperError::Parse
        })?;

        Ok(Self {
            project: raw.configuration.properties.core.project,
            access_token: raw.credential.access_token,
            token_expiry: raw.credential.token_expiry,
        })
    }
}

#[derive(Debug, Deserialize)]
struct HelperOutput {
    #[serde(default)]
    configuration: HelperConfiguration,
    credential: HelperCredential,
}

#[derive(Debug, Default, Deserialize)]
struct HelperConfiguration {
    #[serde(default)]
    properties: HelperProperties,
}

#[derive(Debug, Default, Deserialize)]
struct HelperProperties {
    #[serde(default)]
    core: HelperCore,
}

#[derive(Debug, Default, Deserialize)]
struct HelperCore {
    #[serde(default)]
    project: String,
}

#[derive(Debug, Deserialize)]
struct HelperCredential {
    access_token: String,
    token_expiry: DateTime<Utc>,
}

/// Source of gcloud snapshots
pub trait ConfigHelper: Send + Sync {
    fn fetch_snapshot(&self) -> Result<GcloudSnapshot, HelperError>;
}

/// Runs the real `gcloud` binary
#[derive(Debug, Clone)]
pub struct GcloudCommand {
    program: String,
    args: Vec<String>,
}

impl GcloudCommand {
    /// Create a helper invoking `program` with `args`
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Platform-specific gcloud executable name
    pub fn default_program() -> &'static str {
        if cfg!(windows) {
            "gcloud.cmd"
        } else {
            "gcloud"
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for GcloudCommand {
    fn default() -> Self {
        Self::new(Self::default_program(), HELPER_ARGS)
    }
}

impl ConfigHelper for GcloudCommand {
    fn fetch_snapshot(&self) -> Result<GcloudSnapshot, HelperError> {
        tracing::debug!(program = %self.program, "invoking configuration helper");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| {
                tracing::debug!(error = %e, "failed to spawn configuration helper");
                HelperError::Exec
            })?;

        if !output.status.success() {
            tracing::debug!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "configuration helper failed"
            );
            return Err(HelperError::Exec);
        }

        GcloudSnapshot::from_json(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HELPER_JSON: &str = r#"{
        "configuration": {"properties": {"core": {"project": "my-project"}}},
        "credential": {
            "access_token": "ya29.token",
            "token_expiry": "2030-01-02T03:04:05Z"
        }
    }"#;

    #[test]
    fn test_parse_helper_output() {
        let snapshot = GcloudSnapshot::from_json(HELPER_JSON.as_bytes()).unwrap();
        assert_eq!(snapshot.project, "my-project");
        assert_eq!(snapshot.access_token, "ya29.token");
        assert_eq!(
            snapshot.token_expiry,
            Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()
        );

        let token = snapshot.token();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.access_token, "ya29.token");
    }

    #[test]
    fn test_parse_fractional_expiry() {
        let json = r#"{"credential": {"access_token": "a", "token_expiry": "2030-01-02T03:04:05.123456Z"}}"#;
        let snapshot = GcloudSnapshot::from_json(json.as_bytes()).unwrap();
        assert_eq!(snapshot.project, "");
        assert_eq!(
            snapshot.token_expiry.timestamp(),
            Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap().timestamp()
        );
    }

    #[test]
    fn test_parse_garbage_is_generic_error() {
        let err = GcloudSnapshot::from_json(b"ERROR: (gcloud) not logged in").unwrap_err();
        assert!(matches!(err, HelperError::Parse));
        assert_eq!(err.to_string(), "Could not parse gcloud configuration");
    }

    #[test]
    fn test_default_command() {
        let cmd = GcloudCommand::default();
        assert_eq!(cmd.program(), GcloudCommand::default_program());
        assert_eq!(cmd.args, HELPER_ARGS);
    }

    #[test]
    fn test_missing_binary_is_exec_error() {
        let cmd = GcloudCommand::new("btcli-no-such-helper", HELPER_ARGS);
        let err = cmd.fetch_snapshot().unwrap_err();
        assert!(matches!(err, HelperError::Exec));
        assert_eq!(err.to_string(), "Could not retrieve gcloud configuration");
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_helper_process() {
        let script = format!("printf '%s' '{}'", HELPER_JSON.replace('\n', " "));
        let cmd = GcloudCommand::new("sh", ["-c".to_string(), script]);
        let snapshot = cmd.fetch_snapshot().unwrap();
        assert_eq!(snapshot.project, "my-project");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_hides_stderr() {
        let cmd = GcloudCommand::new("sh", ["-c", "echo 'secret account detail' >&2; exit 1"]);
        let err = cmd.fetch_snapshot().unwrap_err();
        assert!(!err.to_string().contains("secret"));
    }
}
