//! System-wide trust anchor installation and removal.
//!
//! Distinct from the credential store: these paths mutate the OS-global
//! set of trusted roots. Linux re-encodes to PEM and copies into the CA
//! directory; macOS hands the raw binary export to the `security` tool.
//! Commands are waited on but their exit status is only logged, never
//! fatal; only local filesystem failures propagate.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cert::Certificate;
use crate::error::TrustError;
use crate::runner::CommandRunner;

/// Fixed destination directory picked up by `update-ca-certificates`.
pub const LINUX_CA_DIR: &str = "/usr/local/share/ca-certificates";

/// Keychain that holds system-wide trust settings on macOS.
pub const MACOS_SYSTEM_KEYCHAIN: &str = "/Library/Keychains/System.keychain";

/// Install into the Linux trust anchor set. Writes `<name>.crt` (PEM) under
/// the scratch directory, copies it into [`LINUX_CA_DIR`] with elevation,
/// then refreshes the CA bundle. Returns the system path needed for removal.
pub fn install_linux(
    runner: &dyn CommandRunner,
    cert: &Certificate,
    scratch_dir: &Path,
    name: &str,
) -> Result<PathBuf, TrustError> {
    let temp_path = scratch_dir.join(format!("{name}.crt"));
    write_scratch(&temp_path, cert.pem().as_bytes())?;

    let system_path = Path::new(LINUX_CA_DIR).join(format!("{name}.crt"));
    let temp = temp_path.to_string_lossy();
    let system = system_path.to_string_lossy();

    run_logged(runner, "sudo", &["cp", temp.as_ref(), system.as_ref()]);
    run_logged(runner, "sudo", &["update-ca-certificates"]);

    Ok(system_path)
}

/// Remove a previously installed Linux anchor and refresh the CA bundle.
/// `system_path` is the exact path recorded at install time.
pub fn remove_linux(runner: &dyn CommandRunner, system_path: &Path) {
    let system = system_path.to_string_lossy();
    run_logged(runner, "sudo", &["rm", system.as_ref()]);
    run_logged(runner, "sudo", &["update-ca-certificates"]);
}

/// Install into the macOS system keychain as a trusted root. Writes
/// `<name>.cer` (raw DER, no re-encoding) under the scratch directory and
/// marks it trusted. Returns the scratch path needed for removal.
pub fn install_macos(
    runner: &dyn CommandRunner,
    cert: &Certificate,
    scratch_dir: &Path,
    name: &str,
) -> Result<PathBuf, TrustError> {
    let temp_path = scratch_dir.join(format!("{name}.cer"));
    write_scratch(&temp_path, cert.der())?;

    let temp = temp_path.to_string_lossy();
    run_logged(
        runner,
        "security",
        &[
            "-v",
            "add-trusted-cert",
            "-d",
            "-r",
            "trustRoot",
            "-k",
            MACOS_SYSTEM_KEYCHAIN,
            temp.as_ref(),
        ],
    );

    Ok(temp_path)
}

/// Remove macOS trust settings for the certificate at `cert_path` (the
/// scratch path recorded at install time).
pub fn remove_macos(runner: &dyn CommandRunner, cert_path: &Path) {
    let path = cert_path.to_string_lossy();
    run_logged(
        runner,
        "security",
        &["-v", "remove-trusted-cert", "-d", path.as_ref()],
    );
}

fn write_scratch(path: &Path, bytes: &[u8]) -> Result<(), TrustError> {
    write_file(path, bytes).map_err(TrustError::SystemTrust)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create scratch dir: {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write scratch cert: {}", path.display()))
}

/// Run a trust command and wait for it. Outcomes are logged but never
/// propagated; the teardown-over-perfection priority means a failed anchor
/// command must not abort the surrounding scope.
fn run_logged(runner: &dyn CommandRunner, program: &str, args: &[&str]) {
    match runner.run(program, args) {
        Ok(status) if status.success() => {
            debug!(program, ?args, "trust command completed");
        }
        Ok(status) => {
            warn!(program, ?args, %status, "trust command exited with failure");
        }
        Err(e) => {
            warn!(program, ?args, error = %e, "trust command could not be executed");
        }
    }
}
