use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hand::BarrePolicy;
use crate::music::{Tuning, TuningName};
use crate::planner::Planner;
use crate::resolver::{Fretboard, MAX_FRET, MAX_SPAN};
use crate::shape::STRINGS;
use crate::tab::{DEFAULT_BAR_WIDTH, MAX_WIDTH, MIN_BAR_WIDTH};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Application configuration loaded from TOML config file.
/// Every field has a default, so the file and each key in it are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Characters per whole-note bar.
    pub bar_width: usize,
    /// Widest staff line before wrapping.
    pub max_width: usize,
    /// Widest fret spread allowed within one chord shape.
    pub max_span: u8,
    /// Highest usable fret.
    pub max_fret: u8,
    /// Whether barre-completed strings are printed.
    pub barre: BarrePolicy,
    pub tuning: TuningName,
    /// Explicit open-string offsets from low E, lowest string first.
    /// Overrides `tuning` when set.
    pub tuning_offsets: Option<[i32; STRINGS]>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bar_width: DEFAULT_BAR_WIDTH,
            max_width: MAX_WIDTH,
            max_span: MAX_SPAN,
            max_fret: MAX_FRET,
            barre: BarrePolicy::default(),
            tuning: TuningName::default(),
            tuning_offsets: None,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/tabwright/config.toml`.
    /// Returns default config if the file doesn't exist.
    /// Logs a warning if the file exists but can't be read or parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::read(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("{e}. Using defaults.");
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Read a specific config file. Errors are returned, not defaulted.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Bar width with the printable minimum applied.
    pub fn bar_width(&self) -> usize {
        self.bar_width.max(MIN_BAR_WIDTH)
    }

    pub fn tuning(&self) -> Tuning {
        match self.tuning_offsets {
            Some(offsets) => Tuning::from_offsets(offsets),
            None => Tuning::named(self.tuning),
        }
    }

    pub fn fretboard(&self) -> Fretboard {
        Fretboard {
            tuning: self.tuning(),
            max_fret: self.max_fret,
            max_span: self.max_span,
        }
    }

    pub fn planner(&self) -> Planner {
        Planner::new(self.fretboard()).with_barre_policy(self.barre)
    }

    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bar_width(), 32);
        assert_eq!(config.max_width, 67);
        assert_eq!(config.fretboard(), Fretboard::default());
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::parse(
            r#"
bar_width = 48
barre = "sound-barre"
tuning = "drop-d"
"#,
        )
        .unwrap();
        assert_eq!(config.bar_width, 48);
        assert_eq!(config.barre, BarrePolicy::SoundBarre);
        assert_eq!(config.tuning(), Tuning::DROP_D);
        assert_eq!(config.max_span, MAX_SPAN);
    }

    #[test]
    fn test_offsets_override_named_tuning() {
        let config = AppConfig::parse(
            r#"
tuning = "drop-d"
tuning_offsets = [-1, 4, 9, 14, 18, 23]
"#,
        )
        .unwrap();
        assert_eq!(config.tuning(), Tuning::from_offsets([-1, 4, 9, 14, 18, 23]));
    }

    #[test]
    fn test_narrow_bar_width_clamped() {
        let config = AppConfig {
            bar_width: 3,
            ..AppConfig::default()
        };
        assert_eq!(config.bar_width(), MIN_BAR_WIDTH);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(AppConfig::parse(r#"tuning = "open-g""#).is_err());
        assert!(AppConfig::parse("tuning_offsets = [0, 5, 10]").is_err());
        assert!(AppConfig::parse("max_span = -1").is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let err = AppConfig::read(Path::new("/nonexistent/tabwright.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
