// SPDX-License-Identifier: GPL-3.0-only

//! Subprocess execution seam
//!
//! All provisioning commands run through [`CommandRunner`] so that the
//! facade and driver can be exercised against scripted runners without
//! touching real block devices.

use std::process::Command;

use crate::{Result, SysError};

/// Runs an external program and hands back its captured output.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// Returns stdout on success. A non-zero exit is an error carrying
    /// the program, its arguments, and everything the process printed.
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>>;
}

/// The real runner: spawns the program with the caller's environment,
/// pinning `LC_NUMERIC` so capacity values always use `.` as the decimal
/// separator regardless of the host locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>> {
        tracing::debug!(cmd = program, ?args, "executing command");

        let output = Command::new(program)
            .args(args)
            .env("LC_NUMERIC", "en_US.UTF-8")
            .output()?;

        if !output.status.success() {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);

            return Err(SysError::CommandFailed {
                program: program.to_string(),
                args: args.to_vec(),
                output: String::from_utf8_lossy(&combined).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_successful_command() {
        let out = SystemRunner
            .run("sh", &["-c".to_string(), "printf hello".to_string()])
            .expect("command runs");
        assert_eq!(out, b"hello");
    }

    #[test]
    fn nonzero_exit_carries_program_args_and_output() {
        let err = SystemRunner
            .run(
                "sh",
                &["-c".to_string(), "echo oops >&2; exit 3".to_string()],
            )
            .expect_err("command fails");

        match err {
            SysError::CommandFailed {
                program,
                args,
                output,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(args[0], "-c");
                assert!(output.contains("oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
