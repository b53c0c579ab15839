//! Scoped certificate trust: install on construction, guaranteed
//! symmetric teardown on disposal or drop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::Duration;
use tracing::{debug, warn};

use crate::anchors;
use crate::cert::Certificate;
use crate::error::TrustError;
use crate::name;
use crate::platform::Platform;
use crate::runner::{CommandRunner, ShellRunner};
use crate::store::{default_credential_store, CredentialStore, StoreIdentity};

/// Default maximum tolerated validity window (`notAfter - notBefore`).
pub const DEFAULT_VALIDITY_CEILING: Duration = Duration::hours(2);

/// Optional capability of the certificate's source: export a revocation
/// list when trust is granted and release it when the scope ends.
///
/// Supplied explicitly at construction; the scope never inspects the
/// source object for it.
pub trait RevocationListExporter: Send + Sync {
    fn export_crl(&self) -> anyhow::Result<()>;
    fn release(&self);
}

/// Configuration for a [`TrustedCertificateScope`].
///
/// Defaults: 2 h validity ceiling, system trust disabled on all platforms,
/// host-detected platform, [`ShellRunner`] commands, and the host's
/// default credential store.
pub struct TrustOptions {
    identity: StoreIdentity,
    scratch_dir: PathBuf,
    ceiling: Duration,
    linux_system_trust: bool,
    mac_system_trust: bool,
    store: Box<dyn CredentialStore>,
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
    crl: Option<Box<dyn RevocationListExporter>>,
}

impl TrustOptions {
    pub fn new(identity: StoreIdentity, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            scratch_dir: scratch_dir.into(),
            ceiling: DEFAULT_VALIDITY_CEILING,
            linux_system_trust: false,
            mac_system_trust: false,
            store: default_credential_store(),
            runner: Arc::new(ShellRunner),
            platform: Platform::current(),
            crl: None,
        }
    }

    /// Override the maximum tolerated validity window.
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Extend trust to the Linux system anchor set (when running on Linux).
    pub fn enable_linux_system_trust(mut self, enable: bool) -> Self {
        self.linux_system_trust = enable;
        self
    }

    /// Extend trust to the macOS system keychain (when running on macOS).
    pub fn enable_mac_system_trust(mut self, enable: bool) -> Self {
        self.mac_system_trust = enable;
        self
    }

    /// Use a specific credential store instead of the host default.
    pub fn with_store(mut self, store: Box<dyn CredentialStore>) -> Self {
        self.store = store;
        self
    }

    /// Use a specific command runner (tests substitute a recording mock).
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Override platform detection (tests exercise both command paths on
    /// any host).
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Supply the optional revocation-list capability of the certificate's
    /// source.
    pub fn with_crl_exporter(mut self, crl: Box<dyn RevocationListExporter>) -> Self {
        self.crl = Some(crl);
        self
    }
}

/// A certificate granted trust for the lifetime of this value.
///
/// Construction validates the validity window, adds the certificate to the
/// credential store, optionally extends trust to the OS anchor set, and
/// triggers the CRL export hook. [`dispose`](Self::dispose) reverses every
/// step in the fixed teardown order; dropping the scope disposes it.
pub struct TrustedCertificateScope<'a> {
    cert: &'a Certificate,
    identity: StoreIdentity,
    store: Box<dyn CredentialStore>,
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
    resolved_name: String,
    system_trust_path: Option<PathBuf>,
    mac_trust_path: Option<PathBuf>,
    crl: Option<Box<dyn RevocationListExporter>>,
    disposed: bool,
}

impl std::fmt::Debug for TrustedCertificateScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustedCertificateScope")
            .field("cert", &self.cert)
            .field("identity", &self.identity)
            .field("platform", &self.platform)
            .field("resolved_name", &self.resolved_name)
            .field("system_trust_path", &self.system_trust_path)
            .field("mac_trust_path", &self.mac_trust_path)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<'a> TrustedCertificateScope<'a> {
    /// Grant scoped trust to `cert`.
    ///
    /// Fails with [`TrustError::InvalidPeriod`] before touching any store
    /// if the validity window exceeds the configured ceiling. Credential
    /// store failures propagate as [`TrustError::StoreAccess`]; nothing
    /// needs unwinding at that point because the store mutation is the
    /// first acquisition.
    pub fn create(cert: &'a Certificate, options: TrustOptions) -> Result<Self, TrustError> {
        let actual = cert.validity();
        if actual > options.ceiling {
            return Err(TrustError::InvalidPeriod {
                actual,
                ceiling: options.ceiling,
            });
        }

        options
            .store
            .add(&options.identity, cert)
            .map_err(TrustError::StoreAccess)?;
        debug!(store = %options.identity.name, subject = cert.subject(), "certificate added to credential store");

        let resolved_name = name::resolve_cert_name(cert.subject());

        let mut system_trust_path = None;
        let mut mac_trust_path = None;
        if options.linux_system_trust && options.platform == Platform::Linux {
            system_trust_path = Some(anchors::install_linux(
                options.runner.as_ref(),
                cert,
                &options.scratch_dir,
                &resolved_name,
            )?);
        } else if options.mac_system_trust && options.platform == Platform::MacOs {
            mac_trust_path = Some(anchors::install_macos(
                options.runner.as_ref(),
                cert,
                &options.scratch_dir,
                &resolved_name,
            )?);
        }

        if let Some(crl) = &options.crl {
            crl.export_crl().map_err(TrustError::CrlExport)?;
        }

        Ok(Self {
            cert,
            identity: options.identity,
            store: options.store,
            runner: options.runner,
            platform: options.platform,
            resolved_name,
            system_trust_path,
            mac_trust_path,
            crl: options.crl,
            disposed: false,
        })
    }

    /// The filesystem-safe name used for scratch and anchor files.
    pub fn resolved_name(&self) -> &str {
        &self.resolved_name
    }

    /// System anchor path, set iff Linux system-trust installation ran.
    pub fn system_trust_path(&self) -> Option<&Path> {
        self.system_trust_path.as_deref()
    }

    /// Whether macOS system-trust installation ran.
    pub fn mac_trust_installed(&self) -> bool {
        self.mac_trust_path.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Revert every trust change. Idempotent; later calls are no-ops.
    ///
    /// Teardown is best-effort and never raises: each step runs even when
    /// an earlier one fails, so the credential store is always released
    /// ahead of (possibly imperfect) anchor cleanup. Order: credential
    /// store removal, Linux anchor removal + bundle refresh, macOS anchor
    /// removal, CRL release.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        if let Err(e) = self.store.remove(&self.identity, self.cert) {
            warn!(store = %self.identity.name, error = %e, "failed to remove certificate from credential store");
        } else {
            debug!(store = %self.identity.name, "certificate removed from credential store");
        }

        if self.platform == Platform::Linux {
            if let Some(path) = self.system_trust_path.take() {
                anchors::remove_linux(self.runner.as_ref(), &path);
            }
        }

        if self.platform == Platform::MacOs {
            if let Some(path) = self.mac_trust_path.take() {
                anchors::remove_macos(self.runner.as_ref(), &path);
            }
        }

        if let Some(crl) = self.crl.take() {
            crl.release();
        }

        self.disposed = true;
    }
}

impl Drop for TrustedCertificateScope<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}
