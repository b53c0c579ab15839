//! Certscope - scoped, fully-reversible certificate trust for tests.
//!
//! A [`TrustedCertificateScope`] installs a certificate into a platform
//! credential store (and optionally into the OS-wide trust anchor set) for
//! the duration of a test, and reverses every trust change when the scope
//! is disposed or dropped.

pub mod anchors;
pub mod cert;
pub mod error;
pub mod name;
pub mod platform;
pub mod runner;
pub mod scope;
pub mod store;

pub use cert::Certificate;
pub use error::TrustError;
pub use platform::Platform;
pub use runner::{CommandRunner, ShellRunner};
pub use scope::{RevocationListExporter, TrustOptions, TrustedCertificateScope};
pub use store::{CredentialStore, DirCredentialStore, StoreIdentity, StoreLocation};
