//! Project, instance and credential resolution
//!
//! Precedence, highest first:
//! 1. `--project` / `--instance` / `--creds` flags
//! 2. `~/.cbtrc`
//! 3. `GOOGLE_APPLICATION_CREDENTIALS` (credentials only)
//! 4. the gcloud configuration helper (project and access token)
//!
//! The helper is only invoked when the project or the credentials file is
//! still unknown after the first three layers.

use console::style;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::gcloud::{ConfigHelper, GcloudCommand, HelperError};
use crate::core::rcfile::RcFile;
use crate::core::token::{HelperTokenSource, ReuseTokenSource};

/// Environment variable naming an application default credentials file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Errors raised while resolving the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bad line in {}: {line:?}", .path.display())]
    BadLine { path: PathBuf, line: String },

    #[error("Unknown key in {}: {key:?}", .path.display())]
    UnknownKey { path: PathBuf, key: String },

    #[error("Reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Helper(#[from] HelperError),

    #[error("No project configured. Pass --project, add 'project = ...' to ~/.cbtrc, or set a gcloud active project")]
    MissingProject,

    #[error("No instance configured. Pass --instance or add 'instance = ...' to ~/.cbtrc")]
    MissingInstance,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub project: Option<String>,
    pub instance: Option<String>,
    pub creds: Option<PathBuf>,
}

/// How the storage client authenticates
#[derive(Clone)]
pub enum Credentials {
    /// Service account / application default credentials file
    File(PathBuf),
    /// gcloud access token, refreshed through the helper on expiry
    TokenSource(Arc<ReuseTokenSource>),
}

impl Credentials {
    /// Short name of the authentication mode
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::File(_) => "credentials_file",
            Credentials::TokenSource(_) => "gcloud",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::File(path) => f.debug_tuple("File").field(path).finish(),
            Credentials::TokenSource(source) => f
                .debug_struct("TokenSource")
                .field("cached_expiry", &source.cached_expiry())
                .finish(),
        }
    }
}

/// Fully resolved connection settings
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project: String,
    pub instance: String,
    pub credentials: Credentials,
}

impl ResolvedConfig {
    /// Credentials file, when authentication goes through one
    pub fn credentials_path(&self) -> Option<&Path> {
        match &self.credentials {
            Credentials::File(path) => Some(path),
            Credentials::TokenSource(_) => None,
        }
    }

    /// Token source, when authentication goes through gcloud
    pub fn token_source(&self) -> Option<&Arc<ReuseTokenSource>> {
        match &self.credentials {
            Credentials::File(_) => None,
            Credentials::TokenSource(source) => Some(source),
        }
    }

    /// Environment a storage client process should be started with
    ///
    /// Replaces exporting the credentials path into our own environment.
    pub fn credentials_env(&self) -> Vec<(&'static str, PathBuf)> {
        self.credentials_path()
            .map(|p| vec![(CREDENTIALS_ENV, p.to_path_buf())])
            .unwrap_or_default()
    }

    /// Data commands need both a project and an instance
    pub fn require_target(&self) -> Result<(), ConfigError> {
        if self.project.is_empty() {
            return Err(ConfigError::MissingProject);
        }
        if self.instance.is_empty() {
            return Err(ConfigError::MissingInstance);
        }
        Ok(())
    }
}

/// Applies the precedence chain
pub struct CredentialResolver {
    rc_path: Option<PathBuf>,
    ambient_credentials: Option<PathBuf>,
    helper: Arc<dyn ConfigHelper>,
}

impl CredentialResolver {
    /// Resolver reading `~/.cbtrc`, the real environment and the given helper
    pub fn new(helper: Arc<dyn ConfigHelper>) -> Self {
        Self {
            rc_path: RcFile::default_path(),
            ambient_credentials: std::env::var_os(CREDENTIALS_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            helper,
        }
    }

    /// Resolver backed by the `gcloud` binary
    pub fn with_gcloud() -> Self {
        Self::new(Arc::new(GcloudCommand::default()))
    }

    /// Read the dotfile from `path` instead (None disables it)
    pub fn rc_path(mut self, path: Option<PathBuf>) -> Self {
        self.rc_path = path;
        self
    }

    /// Override the captured `GOOGLE_APPLICATION_CREDENTIALS` value
    pub fn ambient_credentials(mut self, path: Option<PathBuf>) -> Self {
        self.ambient_credentials = path;
        self
    }

    /// Resolve the configuration, writing operator notes to `err`
    pub fn resolve(
        &self,
        flags: &FlagOverrides,
        err: &mut dyn Write,
    ) -> Result<ResolvedConfig, ConfigError> {
        let rc = match &self.rc_path {
            Some(path) => RcFile::load(path)?,
            None => RcFile::default(),
        };

        // An empty flag value counts as unset.
        let mut project = flags
            .project
            .clone()
            .filter(|p| !p.is_empty())
            .or(rc.project)
            .unwrap_or_default();
        let instance = flags
            .instance
            .clone()
            .filter(|i| !i.is_empty())
            .or(rc.instance)
            .unwrap_or_default();
        let mut creds = flags
            .creds
            .clone()
            .or_else(|| rc.creds.map(PathBuf::from))
            .filter(|p| !p.as_os_str().is_empty());

        if creds.is_none() {
            creds = self.ambient_credentials.clone();
            if creds.is_none() {
                note(err, "--creds flag unset, will use gcloud credential")?;
            }
        }

        if project.is_empty() {
            note(err, "--project flag unset, will use gcloud active project")?;
        }

        if let Some(path) = &creds {
            if !project.is_empty() {
                tracing::debug!(%project, creds = %path.display(), "resolved without helper");
                return Ok(ResolvedConfig {
                    project,
                    instance,
                    credentials: Credentials::File(path.clone()),
                });
            }
        }

        let snapshot = self.helper.fetch_snapshot()?;

        if project.is_empty() && !snapshot.project.is_empty() {
            note(
                err,
                &format!("gcloud active project is {:?}", snapshot.project),
            )?;
            project = snapshot.project.clone();
        }

        let credentials = match creds {
            Some(path) => Credentials::File(path),
            None => Credentials::TokenSource(Arc::new(ReuseTokenSource::new(
                Some(snapshot.token()),
                HelperTokenSource::new(Arc::clone(&self.helper)),
            ))),
        };

        Ok(ResolvedConfig {
            project,
            instance,
            credentials,
        })
    }
}

fn note(err: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(err, "{} {}", style("!").yellow().for_stderr(), message)
}
