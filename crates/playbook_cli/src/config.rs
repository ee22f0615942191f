//! Playbook configuration file handling

use anyhow::{Context, Result};
use playbook_animation::SchedulerConfig;
use playbook_core::FieldSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "playbook.toml";

/// Top-level configuration (playbook.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PlaybookConfig {
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Field dimensions in field-space units
#[derive(Debug, Deserialize, Serialize)]
pub struct FieldConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    playbook_core::geometry::DEFAULT_FIELD_WIDTH
}

fn default_height() -> f32 {
    playbook_core::geometry::DEFAULT_FIELD_HEIGHT
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Playback timing
#[derive(Debug, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Initial speed multiplier (0.5 - 3.0)
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Seconds per keyframe transition at 1x
    #[serde(default = "default_transition_secs")]
    pub transition_secs: f64,
    /// Simulated display refresh rate for headless runs
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,
}

fn default_speed() -> f32 {
    1.0
}

fn default_transition_secs() -> f64 {
    2.0
}

fn default_refresh_hz() -> u32 {
    60
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            transition_secs: default_transition_secs(),
            refresh_hz: default_refresh_hz(),
        }
    }
}

/// Logging
#[derive(Debug, Deserialize, Serialize)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset and no -v flag is given
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl PlaybookConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `playbook.toml` in the
    /// working directory is used if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_file(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No config found at {}. Run `playbook init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.field.width > 0.0 && self.field.height > 0.0,
            "field dimensions must be positive"
        );
        anyhow::ensure!(
            self.playback.transition_secs.is_finite() && self.playback.transition_secs > 0.0,
            "playback.transition_secs must be positive"
        );
        anyhow::ensure!(
            self.playback.speed.is_finite() && self.playback.speed > 0.0,
            "playback.speed must be a positive number"
        );
        anyhow::ensure!(self.playback.refresh_hz > 0, "playback.refresh_hz must be positive");
        Ok(())
    }

    pub fn field_size(&self) -> FieldSize {
        FieldSize::new(self.field.width, self.field.height)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            transition: Duration::from_secs_f64(self.playback.transition_secs),
            default_speed: self.playback.speed,
            ..SchedulerConfig::default()
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: PlaybookConfig = toml::from_str(
            r#"
            [playback]
            speed = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.playback.speed, 2.5);
        assert_eq!(config.playback.transition_secs, 2.0);
        assert_eq!(config.playback.refresh_hz, 60);
        assert_eq!(config.field.width, 800.0);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_scheduler_config_mapping() {
        let mut config = PlaybookConfig::default();
        config.playback.transition_secs = 1.5;
        config.playback.speed = 0.75;

        let scheduler = config.scheduler_config();
        assert_eq!(scheduler.transition, Duration::from_millis(1500));
        assert_eq!(scheduler.default_speed, 0.75);
        assert_eq!(scheduler.max_speed, 3.0);
    }

    #[test]
    fn test_validation_rejects_zero_refresh() {
        let mut config = PlaybookConfig::default();
        config.playback.refresh_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_finite_speed() {
        let mut config = PlaybookConfig::default();
        config.playback.speed = f32::NAN;
        assert!(config.validate().is_err());

        config.playback.speed = f32::INFINITY;
        assert!(config.validate().is_err());

        config.playback.speed = 0.0;
        assert!(config.validate().is_err());

        config.playback.speed = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_trip_default() {
        let text = PlaybookConfig::default().to_toml().unwrap();
        let parsed: PlaybookConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.field.height, 500.0);
    }
}
