//! Desktop session relay

use tracing::info;

use crate::error::{Result, VolumenError};
use crate::runner::CommandRunner;

/// Open the desktop environment's shutdown dialog
///
/// `command` is the program followed by its arguments.
pub fn power_off_dialog(runner: &dyn CommandRunner, command: &[String]) -> Result<()> {
    let (program, args) = command.split_first().ok_or_else(|| VolumenError::CommandFailed {
        command: "session.off_command".to_string(),
        status: "not run".to_string(),
        stderr: "session off command is empty".to_string(),
    })?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    info!("Opening shutdown dialog with {}", program);
    runner.run(program, &args)?;
    Ok(())
}
