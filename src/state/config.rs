//! Configuration management

use super::options::TalkingOptions;
use crate::speech::AudioStream;
use crate::text::Color;
use crate::{Result, TalkError};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persistent settings for the talking view
///
/// Stored as INI in ~/.talkingtext.cfg with a `[voice]` section for speech
/// parameters and a `[style]` section for the highlight colours.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from ~/.talkingtext.cfg, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, writing the defaults there if missing
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| TalkError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| TalkError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| TalkError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".talkingtext.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("voice"))
            .set("pan", "0.0")
            .set("volume", "1.0")
            .set("delay", "0")
            .set("stream", "system")
            .set("language", "");

        ini.with_section(Some("style"))
            .set("spoken_background", "yellow")
            .set("spoken_foreground", "black");

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Stereo pan, clamped to -1.0..=1.0
    pub fn pan(&self) -> f32 {
        self.get_float("voice", "pan", 0.0).clamp(-1.0, 1.0)
    }

    /// Volume, clamped to 0.0..=1.0
    pub fn volume(&self) -> f32 {
        self.get_float("voice", "volume", 1.0).clamp(0.0, 1.0)
    }

    /// Delay before each word; negative values count as zero
    pub fn delay(&self) -> Duration {
        let ms = self.get_int("voice", "delay", 0).max(0) as u64;
        Duration::from_millis(ms)
    }

    /// Audio stream, system when unset or unknown
    pub fn stream(&self) -> AudioStream {
        let value = self.get_string("voice", "stream", "system");
        value.parse().unwrap_or_else(|e| {
            warn!("Ignoring [voice] stream: {}", e);
            AudioStream::System
        })
    }

    /// Voice language, None when unset
    pub fn language(&self) -> Option<String> {
        let lang = self.get_string("voice", "language", "");
        let lang = lang.trim();
        (!lang.is_empty()).then(|| lang.to_string())
    }

    /// Highlight colour under `[style] key`
    ///
    /// Empty or unparseable values mean no colour.
    pub fn color(&self, key: &str) -> Option<Color> {
        let value = self.get_string("style", key, "");
        if value.trim().is_empty() {
            return None;
        }
        match value.parse() {
            Ok(color) => Some(color),
            Err(e) => {
                warn!("Ignoring [style] {}: {}", key, e);
                None
            }
        }
    }

    /// Options for constructing a view from this config
    pub fn options(&self) -> TalkingOptions {
        TalkingOptions {
            spoken_background: self.color("spoken_background"),
            spoken_foreground: self.color("spoken_foreground"),
            voice_pan: self.pan(),
            voice_volume: self.volume(),
            delay: self.delay(),
            stream: self.stream(),
            language: self.language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_written_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.cfg");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.pan(), 0.0);
        assert_eq!(config.volume(), 1.0);
        assert_eq!(config.delay(), Duration::ZERO);
        assert_eq!(config.language(), None);
        assert_eq!(config.stream(), AudioStream::System);
        assert_eq!(config.color("spoken_background"), Some(Color::rgb(0xff, 0xff, 0)));
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.cfg");
        std::fs::write(
            &path,
            "[voice]\npan=-3\nvolume=7.5\ndelay=-20\nstream=alarm\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.stream(), AudioStream::System);
        assert_eq!(config.pan(), -1.0);
        assert_eq!(config.volume(), 1.0);
        assert_eq!(config.delay(), Duration::ZERO);
    }
}
