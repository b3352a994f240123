use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::{AudioBackend, BackendKind, Direction};
use crate::error::Result;
use crate::runner::CommandRunner;

/// Sink addressed when `pactl list sinks short` yields nothing usable
const DEFAULT_SINK: &str = "@DEFAULT_SINK@";

fn volume_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*)Volume: front-left: \d+ / +(\d+)%(.*)$").expect("static regex")
    })
}

fn running_sink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(.*)RUNNING$").expect("static regex"))
}

fn any_sink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(.*)$").expect("static regex"))
}

/// PulseAudio / PipeWire backend driven through `pactl`
pub struct PulseBackend<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> PulseBackend<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Sink that volume changes are sent to
    fn target_sink(&self) -> Result<String> {
        let output = self.runner.run("pactl", &["list", "sinks", "short"])?;
        Ok(match parse_sink_number(&output) {
            SinkChoice::Running(n) => n.to_string(),
            SinkChoice::First(n) => {
                warn!("Running sink number not found, using sink {}", n);
                n.to_string()
            }
            SinkChoice::None => {
                warn!("No sink found, using {}", DEFAULT_SINK);
                DEFAULT_SINK.to_string()
            }
        })
    }
}

impl AudioBackend for PulseBackend<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::Pulse
    }

    fn adjust(&self, direction: Direction, step: u32) -> Result<()> {
        let sink = self.target_sink()?;
        let delta = format!("{}{}%", direction.sign(), step);
        self.runner
            .run("pactl", &["set-sink-volume", &sink, &delta])?;
        Ok(())
    }

    fn read_percentage(&self) -> Result<Option<u32>> {
        let output = self.runner.run("pactl", &["list", "sinks"])?;
        Ok(parse_sink_volume(&output))
    }
}

/// Outcome of sink discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChoice {
    /// Last sink in RUNNING state
    Running(u32),
    /// No sink is running; first listed sink
    First(u32),
    None,
}

/// Pick the sink to adjust from `pactl list sinks short`
pub fn parse_sink_number(output: &str) -> SinkChoice {
    let mut running = None;
    let mut first = None;

    for line in output.lines().map(str::trim_end) {
        if let Some(caps) = running_sink_regex().captures(line) {
            running = caps[1].parse().ok().or(running);
        }
        if first.is_none() {
            first = any_sink_regex()
                .captures(line)
                .and_then(|caps| caps[1].parse().ok());
        }
    }

    match (running, first) {
        (Some(n), _) => SinkChoice::Running(n),
        (None, Some(n)) => SinkChoice::First(n),
        (None, None) => SinkChoice::None,
    }
}

/// Extract the master volume from `pactl list sinks`
///
/// Every sink reports a front-left volume. Trailing sinks sitting at exactly
/// 0% or 100% are usually idle outputs (HDMI, monitors) and are skipped as
/// long as another candidate remains.
pub fn parse_sink_volume(output: &str) -> Option<u32> {
    let mut volumes: Vec<u32> = output
        .lines()
        .filter_map(|line| volume_regex().captures(line))
        .filter_map(|caps| caps[2].parse().ok())
        .collect();

    if volumes.is_empty() {
        return None;
    }
    debug!("All sink volumes: {:?}", volumes);

    while volumes.len() > 1 && matches!(volumes.last(), Some(0 | 100)) {
        volumes.pop();
    }
    volumes.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedRunner;

    const SINKS: &str = "\
Sink #0
\tState: SUSPENDED
\tName: alsa_output.pci-0000_01_00.1.hdmi-stereo
\tVolume: front-left: 65536 / 100% / 0.00 dB,   front-right: 65536 / 100% / 0.00 dB
Sink #1
\tState: RUNNING
\tName: alsa_output.pci-0000_00_1f.3.analog-stereo
\tVolume: front-left: 27525 /  42% / -22.61 dB,   front-right: 27525 /  42% / -22.61 dB
Sink #2
\tState: SUSPENDED
\tName: bluez_output.headset
\tVolume: front-left: 0 /   0% / -inf dB,   front-right: 0 /   0% / -inf dB
";

    #[test]
    fn test_parse_documented_line() {
        assert_eq!(
            parse_sink_volume("Volume: front-left: 50 / 65% / ..."),
            Some(65)
        );
    }

    #[test]
    fn test_parse_skips_trailing_idle_sinks() {
        assert_eq!(parse_sink_volume(SINKS), Some(42));
    }

    #[test]
    fn test_parse_keeps_single_extreme_value() {
        assert_eq!(
            parse_sink_volume("\tVolume: front-left: 65536 / 100% / 0.00 dB"),
            Some(100)
        );
        assert_eq!(
            parse_sink_volume("\tVolume: front-left: 0 /   0% / -inf dB"),
            Some(0)
        );
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_sink_volume("Connection failure: Connection refused"), None);
        assert_eq!(parse_sink_volume(""), None);
    }

    #[test]
    fn test_sink_number_prefers_last_running() {
        let short = "0\thdmi\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tSUSPENDED\n\
                     1\tanalog\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tRUNNING\n\
                     3\tbluez\tmodule-bluez5-device.c\ts16le 2ch 44100Hz\tRUNNING\n";
        assert_eq!(parse_sink_number(short), SinkChoice::Running(3));
    }

    #[test]
    fn test_sink_number_falls_back_to_first() {
        let short = "4\thdmi\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tSUSPENDED\n\
                     5\tanalog\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tIDLE\n";
        assert_eq!(parse_sink_number(short), SinkChoice::First(4));
        assert_eq!(parse_sink_number(""), SinkChoice::None);
    }

    #[test]
    fn test_adjust_targets_running_sink() {
        let runner = ScriptedRunner::default().with_output(
            "pactl list sinks short",
            "2\tanalog\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tRUNNING\n",
        );
        let backend = PulseBackend::new(&runner);

        backend.adjust(Direction::Down, 5).unwrap();

        assert_eq!(
            runner.calls(),
            vec!["pactl list sinks short", "pactl set-sink-volume 2 -5%"]
        );
    }

    #[test]
    fn test_adjust_without_sinks_uses_default_sink() {
        let runner = ScriptedRunner::default();
        PulseBackend::new(&runner).adjust(Direction::Up, 1).unwrap();
        assert_eq!(runner.calls()[1], "pactl set-sink-volume @DEFAULT_SINK@ +1%");
    }

    #[test]
    fn test_read_percentage_propagates_command_failure() {
        let runner = ScriptedRunner::default().with_failure("pactl list sinks");
        assert!(PulseBackend::new(&runner).read_percentage().is_err());
    }
}
