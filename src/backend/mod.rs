//! Audio backends
//!
//! Exactly one backend is queried per invocation. All of them drive a
//! command-line mixer through [`CommandRunner`] and scrape its text output.

pub mod alsa;
pub mod pulse;

use serde::{Deserialize, Serialize};

use crate::app::VolumeConfig;
use crate::error::Result;
use crate::runner::CommandRunner;

pub use self::alsa::AmixerBackend;
pub use self::pulse::PulseBackend;

/// 音量バックエンドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// PulseAudio / PipeWire via pactl
    Pulse,
    /// ALSA software mixer via amixer
    Alsa,
    /// ALSA hardware mixer of a specific card via amixer -c
    Hardware,
}

/// 音量調整の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// pactl / amixer 共通の符号
    pub fn sign(self) -> char {
        match self {
            Direction::Up => '+',
            Direction::Down => '-',
        }
    }
}

/// ミキサーバックエンドの共通インターフェース
pub trait AudioBackend {
    /// バックエンドの種類を返す
    fn kind(&self) -> BackendKind;

    /// 音量を `step` パーセント上げ下げする
    fn adjust(&self, direction: Direction, step: u32) -> Result<()>;

    /// 現在の音量を取得
    ///
    /// `Ok(None)` はミキサーの出力を解析できなかったことを表す
    fn read_percentage(&self) -> Result<Option<u32>>;
}

/// 選択されたバックエンドを生成
pub fn create_backend<'a>(
    kind: BackendKind,
    config: &VolumeConfig,
    runner: &'a dyn CommandRunner,
) -> Box<dyn AudioBackend + 'a> {
    match kind {
        BackendKind::Pulse => Box::new(PulseBackend::new(runner)),
        BackendKind::Alsa => Box::new(AmixerBackend::software(runner, config.control.clone())),
        BackendKind::Hardware => Box::new(AmixerBackend::hardware(
            runner,
            config.control.clone(),
            config.card,
        )),
    }
}
