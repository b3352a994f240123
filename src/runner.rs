//! External command execution
//!
//! Every collaborator outside this crate (pactl, amixer, dbus-send, the
//! desktop session tools) is reached through [`CommandRunner`], so the
//! controller and the relays can be tested against scripted output.

use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{Result, VolumenError};

/// Runs an external command and captures its standard output
pub trait CommandRunner {
    /// Run `program` with `args`, returning stdout on a zero exit status
    ///
    /// A command that cannot be started or exits non-zero is an error.
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = command_line(program, args);
        debug!("Running `{}`", command);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| VolumenError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(VolumenError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Render a program and its arguments as a single shell-like line
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_joins_arguments() {
        assert_eq!(
            command_line("amixer", &["-q", "sset", "Master", "1%+"]),
            "amixer -q sset Master 1%+"
        );
        assert_eq!(command_line("true", &[]), "true");
    }

    #[test]
    fn test_system_runner_captures_stdout() {
        let out = SystemRunner.run("sh", &["-c", "echo hello"]).unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_system_runner_non_zero_exit_is_error() {
        let err = SystemRunner
            .run("sh", &["-c", "echo oops >&2; exit 3"])
            .unwrap_err();
        match err {
            VolumenError::CommandFailed { command, stderr, .. } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_missing_program_is_spawn_error() {
        let err = SystemRunner
            .run("volumen-test-no-such-program", &[])
            .unwrap_err();
        assert!(matches!(err, VolumenError::CommandSpawn { .. }));
    }
}
