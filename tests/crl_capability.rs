//! Optional revocation-list capability of the certificate source.

mod common;

use certscope::{
    DirCredentialStore, Platform, RevocationListExporter, StoreIdentity, TrustError,
    TrustOptions, TrustedCertificateScope,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Counters {
    exports: u32,
    releases: u32,
}

struct MockExporter {
    counters: Arc<Mutex<Counters>>,
    fail_export: bool,
}

impl RevocationListExporter for MockExporter {
    fn export_crl(&self) -> anyhow::Result<()> {
        self.counters.lock().unwrap().exports += 1;
        if self.fail_export {
            anyhow::bail!("crl export refused");
        }
        Ok(())
    }

    fn release(&self) {
        self.counters.lock().unwrap().releases += 1;
    }
}

fn options(scratch: &std::path::Path) -> TrustOptions {
    TrustOptions::new(StoreIdentity::current_user("Root"), scratch)
        .with_store(Box::new(DirCredentialStore::new(scratch.join("store"))))
        .with_runner(common::MockRunner::new())
        .with_platform(Platform::Other)
}

#[test]
fn exporter_invoked_once_at_create_and_released_at_dispose() {
    let dir = common::scratch_dir();
    let cert = common::cert_with_validity("TestRoot", 1);
    let counters = Arc::new(Mutex::new(Counters::default()));

    let opts = options(dir.path()).with_crl_exporter(Box::new(MockExporter {
        counters: counters.clone(),
        fail_export: false,
    }));
    let mut scope = TrustedCertificateScope::create(&cert, opts).unwrap();

    {
        let c = counters.lock().unwrap();
        assert_eq!(c.exports, 1);
        assert_eq!(c.releases, 0);
    }

    scope.dispose();
    scope.dispose();

    let c = counters.lock().unwrap();
    assert_eq!(c.exports, 1);
    assert_eq!(c.releases, 1, "release must run exactly once");
}

#[test]
fn scope_without_exporter_is_unaffected() {
    let dir = common::scratch_dir();
    let cert = common::cert_with_validity("TestRoot", 1);

    let mut scope = TrustedCertificateScope::create(&cert, options(dir.path())).unwrap();
    scope.dispose();
    assert!(scope.is_disposed());
}

#[test]
fn export_failure_propagates() {
    let dir = common::scratch_dir();
    let cert = common::cert_with_validity("TestRoot", 1);
    let counters = Arc::new(Mutex::new(Counters::default()));

    let opts = options(dir.path()).with_crl_exporter(Box::new(MockExporter {
        counters,
        fail_export: true,
    }));
    let err = TrustedCertificateScope::create(&cert, opts).expect_err("export fails");
    assert!(matches!(err, TrustError::CrlExport(_)));
}
