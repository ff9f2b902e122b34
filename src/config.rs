//! Run settings loaded from an optional TOML file.
//!
//! ```toml
//! [linalg]
//! fuzz = 1e-14
//! row_ops = "direct"
//! ```
//!
//! Every key is optional and falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::linalg::LinalgConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML settings file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("The fuzz tolerance must be a finite, non-negative number, but was {0}.")]
    InvalidFuzz(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub linalg: LinalgConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml_string = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&toml_string)?;
        settings.validate()?;
        log::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fuzz = self.linalg.fuzz;
        if !fuzz.is_finite() || fuzz < 0.0 {
            return Err(ConfigError::InvalidFuzz(fuzz));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{DEFAULT_FUZZ, RowOpStrategy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_partial_settings() {
        let file = settings_file("[linalg]\nrow_ops = \"direct\"\n");
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.linalg.row_ops, RowOpStrategy::Direct);
        assert_eq!(settings.linalg.fuzz, DEFAULT_FUZZ);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = settings_file("");
        assert_eq!(Settings::load(file.path()).unwrap(), Settings::default());
    }

    #[test]
    fn negative_fuzz_is_rejected() {
        let file = settings_file("[linalg]\nfuzz = -1.0\n");
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFuzz(value) if value == -1.0));
    }

    #[test]
    fn custom_fuzz_is_kept() {
        let file = settings_file("[linalg]\nfuzz = 1e-10\n");
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.linalg.fuzz, 1e-10);
    }
}
