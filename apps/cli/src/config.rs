use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use resizer_window_state::{FallbackPolicy, TransitionOptions};
use serde::Deserialize;

const APP_DIR: &str = "window-resizer";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub resize: ResizeConfig,
    pub monitor: MonitorConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResizeConfig {
    #[serde(default = "default_true")]
    pub center: bool,
    #[serde(default = "default_true")]
    pub activate: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            center: true,
            activate: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MonitorConfig {
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub journal: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            journal: true,
            directory: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// `explicit` must exist. The per-user file is optional.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn transition_options(&self) -> TransitionOptions {
        TransitionOptions {
            center: self.resize.center,
            activate: self.resize.activate,
            monitor_fallback: self.monitor.fallback,
        }
    }

    pub fn journal_directory(&self) -> Option<PathBuf> {
        self.log
            .directory
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR)))
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.transition_options(), TransitionOptions::default());
        assert_eq!(config.log.level, "info");
        assert!(config.log.journal);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [resize]
            center = false

            [monitor]
            fallback = "primary"

            [log]
            directory = "C:/logs"
            "#,
        )
        .unwrap();

        let options = config.transition_options();
        assert!(!options.center);
        assert!(options.activate);
        assert_eq!(options.monitor_fallback, FallbackPolicy::Primary);
        assert_eq!(config.journal_directory(), Some(PathBuf::from("C:/logs")));
        assert!(config.log.journal);
    }

    #[test]
    fn unknown_fallback_is_rejected() {
        let result = toml::from_str::<Config>("[monitor]\nfallback = \"leftmost\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("window-resizer-missing-config.toml");
        let err = Config::resolve(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "window-resizer-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[resize]\nactivate = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!config.resize.activate);
        assert!(config.resize.center);
    }
}
