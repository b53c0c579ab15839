//! Stable, filesystem-safe names for temp certificate files.

/// Prefix used when a subject name yields no usable Common Name.
pub const FALLBACK_PREFIX: &str = "scoped-ca-";

/// Extract the Common Name from a subject rendered as `key=value` tokens.
///
/// The subject is tokenized on `=` and `,`; the value following a token
/// exactly equal to `CN` wins. Returns `None` for malformed or CN-less
/// subjects.
pub fn common_name(subject: &str) -> Option<&str> {
    let tokens: Vec<&str> = subject
        .split(['=', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    tokens
        .windows(2)
        .find(|pair| pair[0] == "CN")
        .map(|pair| pair[1])
}

/// Derive a stable name from a certificate subject for temp-file naming.
///
/// Subjects without a CN get a generated unique name under
/// [`FALLBACK_PREFIX`], so pathological subjects still produce distinct
/// file names on repeated calls.
pub fn resolve_cert_name(subject: &str) -> String {
    match common_name(subject) {
        Some(cn) => sanitize(cn),
        None => format!("{FALLBACK_PREFIX}{}", uuid::Uuid::new_v4()),
    }
}

/// Keep alphanumerics, `-`, `_` and `.`; everything else becomes `-`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
