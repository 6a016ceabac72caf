//! Storage backend seam
//!
//! The Bigtable client and the row printer live outside this crate. The CLI
//! compiles a [`Request`] and submits it, together with the resolved
//! connection settings and credentials, to whatever [`Backend`] it was given.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::config::{Credentials, ResolvedConfig};
use crate::core::request::Request;
use crate::core::token::TokenSource;

/// Opaque backend failure, reported to the operator verbatim
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Executes compiled requests against the resolved project and instance
///
/// `config` carries the credentials the storage client must authenticate
/// with: a credentials file, or the gcloud token source.
pub trait Backend {
    fn submit(&mut self, config: &ResolvedConfig, request: &Request) -> Result<(), BackendError>;
}

/// Writes each request as one JSON line for an external executor
///
/// A credentials file is handed over as the environment the executor must
/// run with. For gcloud authentication the token is checked (and refreshed
/// if needed) but only its expiry is written; the token itself never is.
pub struct JsonLinesBackend<W: Write> {
    out: W,
}

#[derive(Serialize)]
struct Envelope<'a> {
    project: &'a str,
    instance: &'a str,
    auth: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<&'static str, PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_expiry: Option<DateTime<Utc>>,
    request: &'a Request,
}

impl<W: Write> JsonLinesBackend<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Backend for JsonLinesBackend<W> {
    fn submit(&mut self, config: &ResolvedConfig, request: &Request) -> Result<(), BackendError> {
        let token_expiry = match &config.credentials {
            Credentials::File(_) => None,
            Credentials::TokenSource(source) => {
                let token = source.token().map_err(|e| {
                    BackendError::with_source("Could not obtain a gcloud access token", e)
                })?;
                Some(token.expiry)
            }
        };

        let envelope = Envelope {
            project: &config.project,
            instance: &config.instance,
            auth: config.credentials.kind(),
            env: config.credentials_env().into_iter().collect(),
            token_expiry,
            request,
        };

        serde_json::to_writer(&mut self.out, &envelope)
            .map_err(|e| BackendError::with_source("Failed to encode request", e))?;
        writeln!(self.out).map_err(|e| BackendError::with_source("Failed to write request", e))?;
        self.out
            .flush()
            .map_err(|e| BackendError::with_source("Failed to write request", e))
    }
}
