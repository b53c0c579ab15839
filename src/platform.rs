//! Host platform detection for trust-anchor gating.

/// Platform families that matter for system trust anchors. Everything that
/// is neither Linux nor macOS gets credential-store-only trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Detect the compile-target platform of the running host.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }
}
