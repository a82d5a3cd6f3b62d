//! External program invocation.

use std::path::Path;
use std::process::Command;

use crate::error::Result;

/// Result of one external program run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Zero exit status
    pub success: bool,
    /// Combined stdout and stderr
    pub output: String,
}

impl CommandOutcome {
    /// A successful run with no output.
    pub fn ok() -> Self {
        Self {
            success: true,
            output: String::new(),
        }
    }

    /// A failed run with the given output.
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Runs external formatting tools. Implementations must be shareable across
/// the concurrent per-target jobs.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` in `dir` and wait for it to finish.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<CommandOutcome>;
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<CommandOutcome> {
        log::debug!("running '{} {}' in {}", program, args.join(" "), dir.display());
        let output = Command::new(program).args(args).current_dir(dir).output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            log::debug!("'{}' completed successfully", program);
        } else {
            log::warn!("{} did not complete successfully ({})", program, output.status);
        }
        Ok(CommandOutcome {
            success: output.status.success(),
            output: text,
        })
    }
}
