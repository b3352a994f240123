//! MPRIS2 media player relay

use tracing::info;

use crate::error::Result;
use crate::runner::CommandRunner;

/// Player commands forwarded over D-Bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MediaCommand {
    /// Toggle play / pause
    Pause,
    Next,
    Previous,
    Stop,
}

impl MediaCommand {
    /// org.mpris.MediaPlayer2.Player method name
    pub fn method(self) -> &'static str {
        match self {
            MediaCommand::Pause => "PlayPause",
            MediaCommand::Next => "Next",
            MediaCommand::Previous => "Previous",
            MediaCommand::Stop => "Stop",
        }
    }
}

/// Send `command` to `org.mpris.MediaPlayer2.<player>` through dbus-send
pub fn send(runner: &dyn CommandRunner, player: &str, command: MediaCommand) -> Result<()> {
    let destination = format!("--dest=org.mpris.MediaPlayer2.{}", player);
    let method = format!("org.mpris.MediaPlayer2.Player.{}", command.method());

    info!("Sending {} to {}", command.method(), player);
    runner.run(
        "dbus-send",
        &[
            "--print-reply",
            &destination,
            "/org/mpris/MediaPlayer2",
            &method,
        ],
    )?;
    Ok(())
}
