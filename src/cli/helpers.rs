//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use std::io;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::core::backend::{Backend, JsonLinesBackend};
use crate::core::config::{CredentialResolver, ResolvedConfig};
use crate::core::decode::DECODE_TYPE_ENV;
use crate::core::gcloud::{GcloudCommand, HELPER_ARGS};
use crate::core::request::Request;

/// Build the resolver described by the global options
pub fn resolver(global: &GlobalOpts) -> CredentialResolver {
    let resolver = match &global.gcloud {
        Some(program) => CredentialResolver::new(Arc::new(GcloudCommand::new(
            program.as_str(),
            HELPER_ARGS,
        ))),
        None => CredentialResolver::with_gcloud(),
    };

    match &global.rc {
        Some(path) => resolver.rc_path(Some(path.clone())),
        None => resolver,
    }
}

/// Resolve the configuration, printing operator notes to stderr
pub fn resolve_config(global: &GlobalOpts) -> Result<ResolvedConfig> {
    resolver(global)
        .resolve(&global.flag_overrides(), &mut io::stderr().lock())
        .map_err(|e| miette::miette!("{}", e))
}

/// Resolve the target and hand `request` to the backend
pub fn submit(global: &GlobalOpts, request: Request) -> Result<()> {
    let config = resolve_config(global)?;
    config
        .require_target()
        .map_err(|e| miette::miette!("{}", e))?;

    let mut backend = JsonLinesBackend::new(io::stdout().lock());
    submit_to(&mut backend, &config, &request)
}

/// Hand `request` and the resolved credentials to a specific backend
pub fn submit_to(
    backend: &mut dyn Backend,
    config: &ResolvedConfig,
    request: &Request,
) -> Result<()> {
    tracing::debug!(?request, "submitting request");
    backend
        .submit(config, request)
        .into_diagnostic()
}

/// Default decode type from the environment
pub fn env_decode_type() -> Option<String> {
    std::env::var(DECODE_TYPE_ENV).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::BackendError;
    use crate::core::config::Credentials;
    use std::path::PathBuf;

    struct Recording(Vec<(ResolvedConfig, Request)>);

    impl Backend for Recording {
        fn submit(
            &mut self,
            config: &ResolvedConfig,
            request: &Request,
        ) -> Result<(), BackendError> {
            self.0.push((config.clone(), request.clone()));
            Ok(())
        }
    }

    struct Failing;

    impl Backend for Failing {
        fn submit(&mut self, _: &ResolvedConfig, _: &Request) -> Result<(), BackendError> {
            Err(BackendError::new("table \"t\" not found"))
        }
    }

    fn config() -> ResolvedConfig {
        ResolvedConfig {
            project: "p".into(),
            instance: "i".into(),
            credentials: Credentials::File(PathBuf::from("/k.json")),
        }
    }

    #[test]
    fn test_submit_to_passes_target_and_credentials() {
        let mut backend = Recording(Vec::new());
        let request = Request::Count { table: "t".into() };
        submit_to(&mut backend, &config(), &request).unwrap();

        assert_eq!(backend.0.len(), 1);
        assert_eq!(backend.0[0].0.project, "p");
        assert_eq!(backend.0[0].0.instance, "i");
        assert_eq!(
            backend.0[0].0.credentials_path(),
            Some(std::path::Path::new("/k.json"))
        );
        assert_eq!(backend.0[0].1, request);
    }

    #[test]
    fn test_backend_error_reported_verbatim() {
        let err = submit_to(&mut Failing, &config(), &Request::ListTables).unwrap_err();
        assert_eq!(err.to_string(), "table \"t\" not found");
    }

    #[test]
    fn test_resolver_uses_rc_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let rc = tmp.path().join("rc");
        std::fs::write(&rc, "project = from-rc\ninstance = i\ncreds = /k.json\n").unwrap();

        let global = GlobalOpts {
            rc: Some(rc),
            ..Default::default()
        };
        let config = resolver(&global)
            .ambient_credentials(None)
            .resolve(&global.flag_overrides(), &mut Vec::new())
            .unwrap();
        assert_eq!(config.project, "from-rc");
    }
}
