use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use volumen::app::Config;
use volumen::backend::{create_backend, BackendKind, Direction};
use volumen::media::{self, MediaCommand};
use volumen::notify::{Coordinator, DesktopPopup, NotificationPayload, Outcome};
use volumen::runner::{CommandRunner, SystemRunner};
use volumen::session;
use volumen::volume::VolumeController;

/// Volumen - volume notification tool
#[derive(Parser)]
#[command(name = "volumen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Volume backend (defaults to the configured one)
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendKind>,

    /// Force PulseAudio pactl, same as --backend pulse
    #[arg(long, global = true, conflicts_with = "backend")]
    pulse: bool,

    /// Config file (defaults to ~/.config/volumen/config.toml)
    #[arg(long, env = "VOLUMEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Increase volume level
    Up {
        /// Percent to add (defaults to the configured step)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        step: Option<u32>,
    },
    /// Decrease volume level
    Down {
        /// Percent to remove (defaults to the configured step)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        step: Option<u32>,
    },
    /// Show current volume level
    Show,
    /// Control the media player
    #[command(alias = "spotify")]
    Media {
        #[arg(value_enum)]
        action: MediaCommand,
        /// MPRIS2 player name (defaults to the configured one)
        #[arg(long)]
        player: Option<String>,
    },
    /// Open the desktop shutdown dialog
    SessionOff,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ログ初期化
    init_logging(&cli.log_level)?;

    let result = run(cli);
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    // --config 指定がなければ ~/.config/volumen/config.toml
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let backend = if cli.pulse {
        BackendKind::Pulse
    } else {
        cli.backend.unwrap_or(config.volume.backend)
    };
    let runner = SystemRunner;

    match cli.command {
        Commands::Up { step } => adjust_and_show(&runner, &config, backend, Direction::Up, step),
        Commands::Down { step } => {
            adjust_and_show(&runner, &config, backend, Direction::Down, step)
        }
        Commands::Show => show_volume(&runner, &config, backend),
        Commands::Media { action, player } => {
            let player = player.unwrap_or_else(|| config.media.player.clone());
            media::send(&runner, &player, action)
                .with_context(|| format!("Failed to send {:?} to {}", action, player))
        }
        Commands::SessionOff => session::power_off_dialog(&runner, &config.session.off_command)
            .context("Failed to open shutdown dialog"),
    }
}

fn adjust_and_show(
    runner: &dyn CommandRunner,
    config: &Config,
    backend: BackendKind,
    direction: Direction,
    step: Option<u32>,
) -> Result<()> {
    let step = step.unwrap_or(config.volume.step).max(1);
    let controller = VolumeController::new(create_backend(backend, &config.volume, runner));
    controller
        .adjust(direction, step)
        .context("Failed to adjust volume")?;

    show_volume(runner, config, backend)
}

fn show_volume(runner: &dyn CommandRunner, config: &Config, backend: BackendKind) -> Result<()> {
    let controller = VolumeController::new(create_backend(backend, &config.volume, runner));
    let reading = controller.read().context("Failed to read volume")?;
    let payload = NotificationPayload::from_reading(reading);
    info!("Volume: {}", payload.body);

    let mut coordinator = Coordinator::new(&config.coordination, DesktopPopup::new());
    let outcome = coordinator
        .publish(&payload)
        .context("Failed to display volume notification")?;

    if let Outcome::Owned(report) = outcome {
        debug!("Popup closed showing {}", report.last_body);
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let log_dir = directories::ProjectDirs::from("", "", "volumen")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("volumen"));

    std::fs::create_dir_all(&log_dir)?;
    // キーリピートで複数プロセスが同時に書くため追記モードで開く
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("volumen.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .init();

    debug!("volumen {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_up_with_backend() {
        let cli = Cli::parse_from(["volumen", "up", "--step", "5", "--backend", "alsa"]);
        assert_eq!(cli.backend, Some(BackendKind::Alsa));
        assert!(matches!(cli.command, Commands::Up { step: Some(5) }));
    }

    #[test]
    fn test_zero_step_is_rejected() {
        assert!(Cli::try_parse_from(["volumen", "down", "--step", "0"]).is_err());
    }

    #[test]
    fn test_pulse_conflicts_with_backend() {
        assert!(Cli::try_parse_from(["volumen", "--pulse", "--backend", "alsa", "show"]).is_err());
        let cli = Cli::parse_from(["volumen", "show", "--pulse"]);
        assert!(cli.pulse);
    }

    #[test]
    fn test_spotify_alias() {
        let cli = Cli::parse_from(["volumen", "spotify", "next"]);
        assert!(matches!(
            cli.command,
            Commands::Media {
                action: MediaCommand::Next,
                player: None
            }
        ));
    }
}
