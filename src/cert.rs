//! Parsed, read-only view of a certificate under trust.

use anyhow::{Context, Result};
use time::{Duration, OffsetDateTime};
use x509_parser::prelude::FromDer;

/// A certificate as seen by a trust scope: both encodings plus the handful
/// of attributes the scope needs. The scope never mutates the certificate,
/// only its trust state.
#[derive(Debug, Clone)]
pub struct Certificate {
    pem: String,
    der: Vec<u8>,
    subject: String,
    serial: String,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl Certificate {
    /// Parse the first certificate in a PEM document.
    ///
    /// Both the PEM text and the DER bytes are retained: the Linux trust
    /// path writes the textual form, the macOS path the raw binary form.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let der = rustls_pemfile::certs(&mut pem.as_bytes())
            .next()
            .and_then(|r| r.ok())
            .context("no certificate block in PEM input")?;

        let (_, x509) = x509_parser::prelude::X509Certificate::from_der(der.as_ref())
            .map_err(|e| anyhow::anyhow!("parse X.509: {e:?}"))?;

        let subject = x509.subject().to_string();
        let serial = x509.raw_serial_as_string().replace(':', "");

        let validity = x509.validity();
        let not_before = OffsetDateTime::from_unix_timestamp(validity.not_before.timestamp())
            .map_err(|e| anyhow::anyhow!("invalid notBefore: {e:?}"))?;
        let not_after = OffsetDateTime::from_unix_timestamp(validity.not_after.timestamp())
            .map_err(|e| anyhow::anyhow!("invalid notAfter: {e:?}"))?;

        Ok(Self {
            pem: pem.to_string(),
            der: der.to_vec(),
            subject,
            serial,
            not_before,
            not_after,
        })
    }

    /// Textual PEM encoding.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Raw DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name, rendered as `CN=..., O=...` tokens.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Serial number as lowercase hex (stable per-certificate key).
    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    /// Length of the validity window (`notAfter - notBefore`).
    pub fn validity(&self) -> Duration {
        self.not_after - self.not_before
    }
}
