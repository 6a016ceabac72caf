//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a btcli command isolated from the caller's environment
///
/// HOME points at `home`, so `~/.cbtrc` is whatever the test writes there.
pub fn btcli(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("btcli"));
    cmd.env("HOME", home.path())
        .env_remove("GOOGLE_APPLICATION_CREDENTIALS")
        .env_remove("BTCLI_DECODE_TYPE")
        .env_remove("BTCLI_LOG")
        .env("BTCLI_GCLOUD", home.path().join("no-such-gcloud"));
    cmd
}

/// Helper to get a btcli command with a complete set of connection flags
pub fn btcli_with_target(home: &TempDir) -> Command {
    let mut cmd = btcli(home);
    cmd.args([
        "--project",
        "test-project",
        "--instance",
        "test-instance",
        "--creds",
        "/keys/sa.json",
    ]);
    cmd
}

/// Helper to create an empty home directory
pub fn setup_home() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper to write `~/.cbtrc`
pub fn write_rc(home: &TempDir, content: &str) -> PathBuf {
    let path = home.path().join(".cbtrc");
    fs::write(&path, content).unwrap();
    path
}

/// Parse every stdout line as JSON
pub fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// Helper to install a fake `gcloud` that prints a config-helper snapshot
#[cfg(unix)]
pub fn fake_gcloud(dir: &Path, project: &str) -> PathBuf {
    let json = format!(
        r#"{{"configuration":{{"properties":{{"core":{{"project":"{}"}}}}}},"credential":{{"access_token":"fake-token","token_expiry":"2099-01-01T00:00:00Z"}}}}"#,
        project
    );
    write_script(
        dir,
        "gcloud",
        &format!("#!/bin/sh\ncat <<'JSON'\n{}\nJSON\n", json),
    )
}

/// Helper to install a fake `gcloud` that fails noisily
#[cfg(unix)]
pub fn failing_gcloud(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "gcloud",
        "#!/bin/sh\necho 'ERROR: account operator@example.com is not logged in' >&2\nexit 1\n",
    )
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}
