//! Error taxonomy for scope construction and teardown.

use thiserror::Error;
use time::Duration;

/// Errors surfaced by [`crate::TrustedCertificateScope`].
///
/// Disposal never returns an error: teardown is best-effort and failures
/// are logged, not raised.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The certificate's validity window exceeds the configured ceiling.
    /// Raised before any store mutation; nothing needs unwinding.
    #[error("certificate validity window of {actual} exceeds the configured ceiling of {ceiling}")]
    InvalidPeriod { actual: Duration, ceiling: Duration },

    /// Credential store open/add failed. Propagated unmodified, not retried.
    #[error("credential store access failed")]
    StoreAccess(#[source] anyhow::Error),

    /// Writing the scratch copy of the certificate for system trust
    /// installation failed. Command outcomes are not reported here.
    #[error("system trust installation failed")]
    SystemTrust(#[source] anyhow::Error),

    /// The revocation-list export side effect failed. No retry.
    #[error("revocation list export failed")]
    CrlExport(#[source] anyhow::Error),
}
