//! Credential store adapters.
//!
//! The credential store is the per-user/per-machine certificate repository,
//! distinct from the OS-wide trust anchor set handled by [`crate::anchors`].
//! The adapter value itself is the open handle: dropping it releases the
//! store.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cert::Certificate;
use crate::name;

/// Whether the store belongs to the current user or the whole machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreLocation {
    CurrentUser,
    LocalMachine,
}

impl StoreLocation {
    fn as_dir(self) -> &'static str {
        match self {
            StoreLocation::CurrentUser => "current-user",
            StoreLocation::LocalMachine => "local-machine",
        }
    }
}

/// Identifies the target credential store: a (name, location) pair, e.g.
/// `("Root", CurrentUser)`.
#[derive(Debug, Clone)]
pub struct StoreIdentity {
    pub name: String,
    pub location: StoreLocation,
}

impl StoreIdentity {
    pub fn new(name: impl Into<String>, location: StoreLocation) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    pub fn current_user(name: impl Into<String>) -> Self {
        Self::new(name, StoreLocation::CurrentUser)
    }
}

/// Add/remove certificates in a credential store, opened read-write.
///
/// Failures are fatal to scope construction and propagate unmodified.
pub trait CredentialStore: Send + Sync {
    fn add(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()>;
    fn remove(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()>;
    fn contains(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<bool>;
}

/// Directory-backed credential store: one DER file per certificate, keyed
/// by serial under `<root>/<location>/<name>/`. The default on platforms
/// without a native store tool, and the store integration tests run
/// against.
pub struct DirCredentialStore {
    root: PathBuf,
}

impl DirCredentialStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cert_path(&self, identity: &StoreIdentity, cert: &Certificate) -> PathBuf {
        self.root
            .join(identity.location.as_dir())
            .join(&identity.name)
            .join(format!("{}.der", cert.serial()))
    }
}

impl CredentialStore for DirCredentialStore {
    fn add(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()> {
        let path = self.cert_path(identity, cert);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("open store dir: {}", parent.display()))?;
        }
        fs::write(&path, cert.der())
            .with_context(|| format!("add certificate: {}", path.display()))
    }

    fn remove(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()> {
        let path = self.cert_path(identity, cert);
        fs::remove_file(&path)
            .with_context(|| format!("remove certificate: {}", path.display()))
    }

    fn contains(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<bool> {
        Ok(self.cert_path(identity, cert).is_file())
    }
}

/// Windows store backed by `certutil`. Certificates are staged to a temp
/// file for `-addstore` and removed by serial with `-delstore`.
pub struct CertutilStore;

impl CertutilStore {
    fn location_flag(location: StoreLocation) -> Option<&'static str> {
        match location {
            StoreLocation::CurrentUser => Some("-user"),
            StoreLocation::LocalMachine => None,
        }
    }

    fn stage(cert: &Certificate) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("certscope-{}.cer", cert.serial()));
        fs::write(&path, cert.der())
            .with_context(|| format!("stage certificate: {}", path.display()))?;
        Ok(path)
    }
}

impl CredentialStore for CertutilStore {
    fn add(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()> {
        let staged = Self::stage(cert)?;
        let mut cmd = Command::new("certutil");
        cmd.arg("-addstore");
        if let Some(flag) = Self::location_flag(identity.location) {
            cmd.arg(flag);
        }
        let status = cmd
            .arg(&identity.name)
            .arg(&staged)
            .status()
            .context("certutil addstore")?;
        if !status.success() {
            anyhow::bail!("certutil addstore failed: {status}");
        }
        Ok(())
    }

    fn remove(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()> {
        let mut cmd = Command::new("certutil");
        cmd.arg("-delstore");
        if let Some(flag) = Self::location_flag(identity.location) {
            cmd.arg(flag);
        }
        let status = cmd
            .arg(&identity.name)
            .arg(cert.serial())
            .status()
            .context("certutil delstore")?;
        if !status.success() {
            anyhow::bail!("certutil delstore failed: {status}");
        }
        Ok(())
    }

    fn contains(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<bool> {
        let mut cmd = Command::new("certutil");
        cmd.arg("-verifystore");
        if let Some(flag) = Self::location_flag(identity.location) {
            cmd.arg(flag);
        }
        let output = cmd
            .arg(&identity.name)
            .output()
            .context("certutil verifystore")?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
        Ok(stdout.contains(&cert.serial().to_lowercase()))
    }
}

/// macOS store backed by the `security` tool. Removal targets the
/// certificate's Common Name, so CN-less certificates are rejected.
pub struct KeychainStore;

impl KeychainStore {
    fn keychain(location: StoreLocation) -> Option<&'static str> {
        match location {
            StoreLocation::CurrentUser => None,
            StoreLocation::LocalMachine => Some("/Library/Keychains/System.keychain"),
        }
    }

    fn require_cn(cert: &Certificate) -> Result<&str> {
        name::common_name(cert.subject())
            .ok_or_else(|| anyhow::anyhow!("certificate has no Common Name"))
    }
}

impl CredentialStore for KeychainStore {
    fn add(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()> {
        let staged = std::env::temp_dir().join(format!("certscope-{}.cer", cert.serial()));
        fs::write(&staged, cert.der())
            .with_context(|| format!("stage certificate: {}", staged.display()))?;

        let mut cmd = Command::new("security");
        cmd.arg("add-certificates");
        if let Some(keychain) = Self::keychain(identity.location) {
            cmd.args(["-k", keychain]);
        }
        let status = cmd.arg(&staged).status().context("security add-certificates")?;
        if !status.success() {
            anyhow::bail!("security add-certificates failed: {status}");
        }
        Ok(())
    }

    fn remove(&self, identity: &StoreIdentity, cert: &Certificate) -> Result<()> {
        let cn = Self::require_cn(cert)?;
        let mut cmd = Command::new("security");
        cmd.args(["delete-certificate", "-c", cn]);
        if let Some(keychain) = Self::keychain(identity.location) {
            cmd.arg(keychain);
        }
        let status = cmd.status().context("security delete-certificate")?;
        if !status.success() {
            anyhow::bail!("security delete-certificate failed: {status}");
        }
        Ok(())
    }

    fn contains(&self, _identity: &StoreIdentity, cert: &Certificate) -> Result<bool> {
        let cn = Self::require_cn(cert)?;
        let output = Command::new("security")
            .args(["find-certificate", "-c", cn])
            .output()
            .context("security find-certificate")?;
        Ok(output.status.success())
    }
}

/// Pick the credential store for this host.
///
/// If `CERTSCOPE_STORE_DIR` is set (e.g. in tests), a directory-backed
/// store rooted there is used on every platform.
pub fn default_credential_store() -> Box<dyn CredentialStore> {
    if let Ok(dir) = std::env::var("CERTSCOPE_STORE_DIR") {
        return Box::new(DirCredentialStore::new(dir));
    }

    #[cfg(windows)]
    return Box::new(CertutilStore);

    #[cfg(target_os = "macos")]
    return Box::new(KeychainStore);

    #[cfg(not(any(windows, target_os = "macos")))]
    Box::new(DirCredentialStore::new(
        std::env::temp_dir().join("certscope-store"),
    ))
}
