//! Plan generation configuration file support.
//!
//! This module reads tunables for the pipeline from TOML. Every field has a
//! default, so an empty file (or no file at all) yields the documented behavior.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PlanError;

/// Pipeline configuration from file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    #[serde(default)]
    pub validation: ValidationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Chart validation settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationSettings {
    /// Treat out-of-range house/degree values as blocking instead of repairing them.
    #[serde(default)]
    pub strict_ranges: bool,
}

/// Priority scoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringSettings {
    #[serde(default = "default_min_priority_confidence")]
    pub min_priority_confidence: f64,
    #[serde(default = "default_top_areas")]
    pub top_areas: usize,
}

/// Chart analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSettings {
    /// Orb (degrees) within which Moon contacts contribute to its stress score.
    #[serde(default = "default_working_orb")]
    pub working_orb: f64,
}

fn default_min_priority_confidence() -> f64 {
    0.5
}

fn default_top_areas() -> usize {
    3
}

fn default_working_orb() -> f64 {
    8.0
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            min_priority_confidence: default_min_priority_confidence(),
            top_areas: default_top_areas(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            working_orb: default_working_orb(),
        }
    }
}

impl PlanConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PlanConfig)` if the file parses and every value is in range
    /// * `Err(PlanError::Config)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlanError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| PlanError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and check value ranges.
    pub fn from_toml_str(content: &str) -> Result<Self, PlanError> {
        let config: PlanConfig = toml::from_str(content)
            .map_err(|e| PlanError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `astroplan.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, PlanError> {
        let search_paths = vec![
            PathBuf::from("astroplan.toml"),
            PathBuf::from("rust_backend/astroplan.toml"),
            PathBuf::from("../astroplan.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PlanError::Config(
            "No astroplan.toml found in standard locations".to_string(),
        ))
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), PlanError> {
        let min_conf = self.scoring.min_priority_confidence;
        if !(0.0..=1.0).contains(&min_conf) {
            return Err(PlanError::Config(format!(
                "scoring.min_priority_confidence must be within [0, 1], got {}",
                min_conf
            )));
        }

        if self.scoring.top_areas == 0 {
            return Err(PlanError::Config(
                "scoring.top_areas must be at least 1".to_string(),
            ));
        }

        if !(self.analysis.working_orb > 0.0) {
            return Err(PlanError::Config(format!(
                "analysis.working_orb must be positive, got {}",
                self.analysis.working_orb
            )));
        }

        Ok(())
    }
}
