//! Synchronous external-command execution.

use anyhow::{Context, Result};
use std::process::{Command, ExitStatus};

/// Runs a privileged OS command and waits for it to exit.
///
/// Callers only require completion; exit codes are surfaced for logging
/// but never turned into errors by the trust-anchor layer.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

/// Default runner: spawns via `std::process::Command` and blocks until
/// exit. No timeout; a hanging privileged command blocks the scope.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("spawn {program}"))
    }
}
