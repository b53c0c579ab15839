//! Shared test helpers.
#![allow(dead_code)]

use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use certscope::{Certificate, CommandRunner};

/// Create a temp directory for scratch files and directory-backed stores.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn scratch_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("certscope_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| std::path::Path::new(".").into()))
        .expect("temp dir")
}

/// Self-signed CA cert with subject `CN=<cn>, O=Example` valid for `hours`.
pub fn cert_with_validity(cn: &str, hours: i64) -> Certificate {
    let pem = cert_pem(Some(cn), hours);
    Certificate::from_pem(&pem).expect("parse generated cert")
}

/// Self-signed cert whose subject has no CN component.
pub fn cert_without_cn(hours: i64) -> Certificate {
    let pem = cert_pem(None, hours);
    Certificate::from_pem(&pem).expect("parse generated cert")
}

fn cert_pem(cn: Option<&str>, hours: i64) -> String {
    let key = rcgen::KeyPair::generate().expect("generate key");

    let mut params = rcgen::CertificateParams::default();
    params.distinguished_name = rcgen::DistinguishedName::new();
    if let Some(cn) = cn {
        params.distinguished_name.push(
            rcgen::DnType::CommonName,
            rcgen::DnValue::Utf8String(cn.to_string()),
        );
    }
    params.distinguished_name.push(
        rcgen::DnType::OrganizationName,
        rcgen::DnValue::Utf8String("Example".to_string()),
    );
    params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);

    // Whole-second timestamps so the encoded validity window is exact.
    let now = time::OffsetDateTime::from_unix_timestamp(
        time::OffsetDateTime::now_utc().unix_timestamp(),
    )
    .expect("timestamp");
    params.not_before = now;
    params.not_after = now + time::Duration::hours(hours);

    params.self_signed(&key).expect("self-sign").pem()
}

/// CommandRunner that records every invocation and reports success.
pub struct MockRunner {
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExitStatus> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{program} {}", args.join(" ")));
        Ok(exit_ok())
    }
}

#[cfg(unix)]
fn exit_ok() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

#[cfg(windows)]
fn exit_ok() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}
