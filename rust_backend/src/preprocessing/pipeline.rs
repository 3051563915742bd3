use std::path::Path;

use crate::core::domain::Chart;
use crate::error::{PlanError, PlanResult};
use crate::parsing::json_parser::{parse_chart_json, parse_chart_json_str, RawChart};
use crate::parsing::normalizer::normalize_chart;
use crate::preprocessing::sanitizer::ChartSanitizer;
use crate::preprocessing::validator::{ChartValidator, ValidationResult};

/// Result of preprocessing operation
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    pub chart: Chart,
    pub validation: ValidationResult,
    pub repairs: Vec<String>,
}

/// Configuration for the preprocessing pipeline
#[derive(Debug, Clone, Default)]
pub struct PreprocessConfig {
    pub strict_ranges: bool,
}

/// Normalize → validate → sanitize.
pub struct PreprocessPipeline {
    config: PreprocessConfig,
}

impl PreprocessPipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self {
            config: PreprocessConfig::default(),
        }
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Process a raw chart into a sanitized one.
    ///
    /// # Returns
    /// `PlanError::Validation` carrying every blocking error (and the warnings
    /// gathered so far) if the chart cannot be analyzed.
    pub fn process(&self, raw: RawChart) -> PlanResult<PreprocessResult> {
        // Step 1: Canonical tokens
        let normalized = normalize_chart(raw);

        // Step 2: Validate
        let validation = ChartValidator::validate(&normalized, self.config.strict_ranges);
        if !validation.is_valid {
            return Err(PlanError::Validation {
                errors: validation.errors,
                warnings: validation.warnings,
            });
        }

        // Step 3: Repair
        let sanitized = ChartSanitizer::sanitize(&normalized);

        Ok(PreprocessResult {
            chart: sanitized.chart,
            validation,
            repairs: sanitized.repairs,
        })
    }

    /// Process from JSON string (useful for testing or API usage)
    ///
    /// Input that is not even shaped like a chart is a blocking validation error.
    pub fn process_json_str(&self, json_str: &str) -> PlanResult<PreprocessResult> {
        let raw = parse_chart_json_str(json_str).map_err(|e| PlanError::Validation {
            errors: vec![e.to_string()],
            warnings: Vec::new(),
        })?;
        self.process(raw)
    }

    /// Process a chart file
    pub fn process_file(&self, path: &Path) -> PlanResult<PreprocessResult> {
        let raw = parse_chart_json(path).map_err(|e| PlanError::Validation {
            errors: vec![format!("{:#}", e)],
            warnings: Vec::new(),
        })?;
        self.process(raw)
    }
}

impl Default for PreprocessPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to preprocess a chart JSON string
pub fn preprocess_chart(json_str: &str, strict_ranges: bool) -> PlanResult<PreprocessResult> {
    PreprocessPipeline::with_config(PreprocessConfig { strict_ranges }).process_json_str(json_str)
}
