use regex::Regex;
use std::sync::OnceLock;

use super::{AudioBackend, BackendKind, Direction};
use crate::error::Result;
use crate::runner::CommandRunner;

fn playback_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:Mono|Front Left): Playback \d+ \[(\d+)%\](?: \[-?\d+\.?\d*dB\])?(?: \[(on|off)\])?\s*$",
        )
        .expect("static regex")
    })
}

/// ALSA mixer backend driven through `amixer`
///
/// Without a card it talks to the default (software) mixer; with a card it
/// addresses that card's hardware mixer directly.
pub struct AmixerBackend<'a> {
    runner: &'a dyn CommandRunner,
    control: String,
    card: Option<u32>,
}

impl<'a> AmixerBackend<'a> {
    pub fn software(runner: &'a dyn CommandRunner, control: String) -> Self {
        Self {
            runner,
            control,
            card: None,
        }
    }

    pub fn hardware(runner: &'a dyn CommandRunner, control: String, card: u32) -> Self {
        Self {
            runner,
            control,
            card: Some(card),
        }
    }

    /// `amixer [-q] [-c N] <rest...>`
    fn amixer(&self, quiet: bool, rest: &[&str]) -> Result<String> {
        let card = self.card.map(|c| c.to_string());
        let mut args: Vec<&str> = Vec::with_capacity(rest.len() + 3);
        if quiet {
            args.push("-q");
        }
        if let Some(card) = card.as_deref() {
            args.extend(["-c", card]);
        }
        args.extend_from_slice(rest);
        self.runner.run("amixer", &args)
    }
}

impl AudioBackend for AmixerBackend<'_> {
    fn kind(&self) -> BackendKind {
        if self.card.is_some() {
            BackendKind::Hardware
        } else {
            BackendKind::Alsa
        }
    }

    fn adjust(&self, direction: Direction, step: u32) -> Result<()> {
        let amount = format!("{}%{}", step, direction.sign());
        self.amixer(true, &["sset", &self.control, &amount])?;
        Ok(())
    }

    fn read_percentage(&self) -> Result<Option<u32>> {
        let output = self.amixer(false, &["get", &self.control])?;
        Ok(parse_playback_volume(&output))
    }
}

/// Extract the volume from `amixer get <control>`
///
/// The first mono or front-left playback line wins; a switched-off channel
/// reads as muted. Controls without a playback switch count as on.
pub fn parse_playback_volume(output: &str) -> Option<u32> {
    output
        .lines()
        .filter_map(|line| playback_regex().captures(line))
        .find_map(|caps| match caps.get(2).map(|m| m.as_str()) {
            Some("off") => Some(0),
            _ => caps[1].parse().ok(),
        })
}
