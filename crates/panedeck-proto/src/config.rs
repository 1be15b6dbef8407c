use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Share of the available width given to the sidebar, in percent.
    #[serde(default = "default_sidebar_percent")]
    pub sidebar_percent: u16,
    #[serde(default = "default_sidebar_min_width")]
    pub sidebar_min_width: u16,
    #[serde(default = "default_detail_min_width")]
    pub detail_min_width: u16,
    /// Preferred modal width; clamped to the terminal on every render.
    #[serde(default = "default_modal_width")]
    pub modal_width: u16,
    #[serde(default = "default_true")]
    pub mouse: bool,
    #[serde(default = "default_true")]
    pub show_keys_bar: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Window in which a second Escape counts as a double press.
    #[serde(default = "default_double_press_ms")]
    pub double_press_ms: u64,
}

/// Adaptive refresh intervals for the attached pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_fast_ms")]
    pub fast_ms: u64,
    #[serde(default = "default_medium_ms")]
    pub medium_ms: u64,
    #[serde(default = "default_slow_ms")]
    pub slow_ms: u64,
    #[serde(default = "default_medium_after_secs")]
    pub medium_after_secs: u64,
    #[serde(default = "default_slow_after_secs")]
    pub slow_after_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Allow attaching to a live tmux pane and forwarding keystrokes.
    #[serde(default)]
    pub interactive_input: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// TOML file with `[[issues]]` tables feeding the issue list.
    #[serde(default)]
    pub issues_file: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sidebar_percent: default_sidebar_percent(),
            sidebar_min_width: default_sidebar_min_width(),
            detail_min_width: default_detail_min_width(),
            modal_width: default_modal_width(),
            mouse: true,
            show_keys_bar: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_press_ms: default_double_press_ms(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fast_ms: default_fast_ms(),
            medium_ms: default_medium_ms(),
            slow_ms: default_slow_ms(),
            medium_after_secs: default_medium_after_secs(),
            slow_after_secs: default_slow_after_secs(),
        }
    }
}

impl InputConfig {
    pub fn double_press_window(&self) -> Duration {
        Duration::from_millis(self.double_press_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_sidebar_percent() -> u16 {
    30
}

fn default_sidebar_min_width() -> u16 {
    25
}

fn default_detail_min_width() -> u16 {
    40
}

fn default_modal_width() -> u16 {
    60
}

fn default_double_press_ms() -> u64 {
    150
}

fn default_fast_ms() -> u64 {
    50
}

fn default_medium_ms() -> u64 {
    200
}

fn default_slow_ms() -> u64 {
    500
}

fn default_medium_after_secs() -> u64 {
    2
}

fn default_slow_after_secs() -> u64 {
    10
}

impl Config {
    /// Load `config.toml`, writing the defaults back when the file is missing.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Like `load`, but never fails: a broken file falls back to defaults.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("config: falling back to defaults: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ui.sidebar_percent, 30);
        assert_eq!(config.ui.sidebar_min_width, 25);
        assert_eq!(config.ui.detail_min_width, 40);
        assert_eq!(config.ui.modal_width, 60);
        assert_eq!(config.input.double_press_window(), Duration::from_millis(150));
        assert_eq!(config.polling.fast_ms, 50);
        assert!(!config.features.interactive_input);
        assert!(config.paths.issues_file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
[features]
interactive_input = true

[ui]
modal_width = 72
"#,
        )
        .unwrap();
        assert!(config.features.interactive_input);
        assert_eq!(config.ui.modal_width, 72);
        assert_eq!(config.ui.sidebar_min_width, 25);
        assert_eq!(config.polling.slow_after_secs, 10);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let mut config = Config::default();
        config.paths.issues_file = Some(PathBuf::from("/tmp/issues.toml"));
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.paths.issues_file, config.paths.issues_file);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[ui]\nmodal_width = \"wide\"").is_err());
    }
}
