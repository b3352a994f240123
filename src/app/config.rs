use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::backend::BackendKind;
use crate::error::{Result, VolumenError};

/// アプリケーション設定
///
/// 起動ごとに一度だけ読み込み、コントローラとコーディネータに渡す（以後変更しない）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 音量バックエンド設定
    #[serde(default)]
    pub volume: VolumeConfig,
    /// 通知の集約設定
    #[serde(default)]
    pub coordination: CoordinationConfig,
    /// メディアプレイヤー中継設定
    #[serde(default)]
    pub media: MediaConfig,
    /// デスクトップセッション中継設定
    #[serde(default)]
    pub session: SessionConfig,
}

/// 音量バックエンド設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// フラグ未指定時のバックエンド: pulse | alsa | hardware
    pub backend: BackendKind,
    /// up / down で増減するパーセント
    pub step: u32,
    /// amixer のコントロール名
    pub control: String,
    /// hardware バックエンドの ALSA カード番号
    pub card: u32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Pulse,
            step: 1,
            control: "Master".to_string(),
            card: 0,
        }
    }
}

/// 通知の集約設定
///
/// Timings must satisfy `session_window + 2 * poll_interval < liveness_threshold`:
/// the owner never touches the record, so after the last write it stays alive
/// for up to one tick to notice it, the window, and one more tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// 全プロセスで共有する調停ファイル
    pub path: PathBuf,
    /// これより新しいレコードは生存中のオーナーのもの
    pub liveness_threshold_ms: u64,
    /// 最後の変更からポップアップを表示し続ける時間
    pub session_window_ms: u64,
    /// オーナーのポーリング間隔
    pub poll_interval_ms: u64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir().join("volumen-current"),
            liveness_threshold_ms: 5000,
            session_window_ms: 1000,
            poll_interval_ms: 50,
        }
    }
}

impl CoordinationConfig {
    pub fn liveness_threshold(&self) -> Duration {
        Duration::from_millis(self.liveness_threshold_ms)
    }

    pub fn session_window(&self) -> Duration {
        Duration::from_millis(self.session_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// タイミングの整合性チェック
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("coordination.poll_interval_ms must be greater than 0".to_string());
        }

        let owner_lifetime = self
            .session_window_ms
            .saturating_add(self.poll_interval_ms.saturating_mul(2));
        if owner_lifetime >= self.liveness_threshold_ms {
            return Err(format!(
                "coordination.liveness_threshold_ms ({}) must exceed \
                 session_window_ms + 2 * poll_interval_ms ({})",
                self.liveness_threshold_ms, owner_lifetime
            ));
        }

        Ok(())
    }
}

/// メディアプレイヤー中継設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// MPRIS2 プレイヤー名（org.mpris.MediaPlayer2.<player>）
    pub player: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            player: "spotify".to_string(),
        }
    }
}

/// デスクトップセッション中継設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// シャットダウンダイアログを開くコマンドと引数
    pub off_command: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            off_command: vec!["xfce4-session-logout".to_string()],
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み（存在しない場合はデフォルトを作成して保存）
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Failed to save default config: {}", e);
            }
            Ok(config)
        }
    }

    /// 指定した設定ファイルから読み込み
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VolumenError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| VolumenError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.coordination.validate()?;
        Ok(config)
    }

    /// 設定ファイルパスを取得
    pub fn config_path() -> Result<PathBuf> {
        // ~/.config/volumen/config.toml を使用
        let base_dirs = directories::BaseDirs::new().ok_or_else(|| VolumenError::Config {
            path: PathBuf::from("~/.config/volumen/config.toml"),
            message: "Failed to determine home directory".to_string(),
        })?;
        Ok(base_dirs.home_dir().join(".config/volumen/config.toml"))
    }

    /// 現在の設定をファイルに保存
    ///
    /// 同時起動した他プロセスが書きかけの内容を読まないよう、
    /// 一時ファイルに書いてから rename で置き換える
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let to_config_error = |message: String| VolumenError::Config {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| to_config_error(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| to_config_error(e.to_string()))?;

        static SAVE_SEQ: AtomicU64 = AtomicU64::new(0);
        let tmp_path = path.with_extension(format!(
            "toml.{}.{}.tmp",
            std::process::id(),
            SAVE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp_path, content).map_err(|e| to_config_error(e.to_string()))?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(to_config_error(e.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn timings(liveness: u64, window: u64, tick: u64) -> String {
        format!(
            "[coordination]\nliveness_threshold_ms = {}\nsession_window_ms = {}\npoll_interval_ms = {}\n",
            liveness, window, tick
        )
    }

    #[test]
    fn test_defaults_match_original_timings() {
        let config = Config::default();
        assert_eq!(config.volume.step, 1);
        assert_eq!(config.volume.backend, BackendKind::Pulse);
        assert_eq!(config.coordination.liveness_threshold(), Duration::from_secs(5));
        assert_eq!(config.coordination.session_window(), Duration::from_secs(1));
        assert_eq!(config.coordination.poll_interval(), Duration::from_millis(50));
        assert!(config.coordination.path.ends_with("volumen-current"));
        assert_eq!(config.media.player, "spotify");
        assert!(config.coordination.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[volume]
backend = "alsa"
step = 5

[coordination]
session_window_ms = 1500
"#,
        )
        .unwrap();

        assert_eq!(config.volume.backend, BackendKind::Alsa);
        assert_eq!(config.volume.step, 5);
        assert_eq!(config.volume.control, "Master");
        assert_eq!(config.coordination.session_window_ms, 1500);
        assert_eq!(config.coordination.liveness_threshold_ms, 5000);
        assert_eq!(config.session.off_command, vec!["xfce4-session-logout"]);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Config::parse("[volume]\nbackend = \"oss\"\n").is_err());
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let err = Config::parse(&timings(5000, 1000, 0)).unwrap_err();
        assert!(err.contains("poll_interval_ms"));
    }

    #[test]
    fn test_window_reaching_liveness_threshold_is_rejected() {
        // Owner would still be on screen when its record looks stale.
        assert!(Config::parse(&timings(200, 600, 10)).is_err());
        assert!(Config::parse(&timings(1010, 1000, 10)).is_err());
        assert!(Config::parse(&timings(1020, 1000, 10)).is_err());
        assert!(Config::parse(&timings(1021, 1000, 10)).is_ok());
    }

    #[test]
    fn test_load_from_rejects_invalid_timings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, timings(200, 600, 10)).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, VolumenError::Config { .. }));
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.media.player = "vlc".to_string();
        config.volume.backend = BackendKind::Hardware;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.media.player, "vlc");
        assert_eq!(loaded.volume.backend, BackendKind::Hardware);
    }

    #[test]
    fn test_save_replaces_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[volume").unwrap();

        Config::default().save_to(&path).unwrap();

        assert!(Config::load_from(&path).is_ok());
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("config.toml")]);
    }

    #[test]
    fn test_concurrent_first_run_saves_never_expose_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        Config::default().save_to(&path).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            if path.exists() {
                Config::load_from(&path).unwrap();
            }
        }
        for writer in writers {
            writer.join().unwrap();
        }
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, VolumenError::Config { .. }));
    }
}
