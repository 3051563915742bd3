use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::catalog::ExerciseCatalog;
use crate::parsing::json_parser::{self, RawChart};
use crate::services::plan::ExercisePlan;

/// Represents the source type of input data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSourceType {
    File,
    Inline,
}

/// Result of loading a chart
#[derive(Debug)]
pub struct ChartLoadResult {
    pub chart: RawChart,
    pub source_type: InputSourceType,
    pub num_planets: usize,
    pub num_aspects: usize,
}

impl ChartLoadResult {
    pub fn new(chart: RawChart, source_type: InputSourceType) -> Self {
        let num_planets = chart.planets.as_ref().map_or(0, Vec::len);
        let num_aspects = chart.aspects.as_ref().map_or(0, Vec::len);
        Self {
            chart,
            source_type,
            num_planets,
            num_aspects,
        }
    }
}

/// Loads raw charts from JSON
pub struct ChartLoader;

impl ChartLoader {
    /// Load a chart from a file; only `.json` is accepted
    pub fn load_from_file(path: &Path) -> Result<ChartLoadResult> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "json" => {
                let chart = json_parser::parse_chart_json(path).context("Failed to parse chart file")?;
                Ok(ChartLoadResult::new(chart, InputSourceType::File))
            }
            _ => anyhow::bail!("Unsupported chart format: {}", extension),
        }
    }

    /// Load a chart from a JSON string
    pub fn load_from_json_str(json_str: &str) -> Result<ChartLoadResult> {
        let chart =
            json_parser::parse_chart_json_str(json_str).context("Failed to parse chart JSON string")?;
        Ok(ChartLoadResult::new(chart, InputSourceType::Inline))
    }
}

/// Loads exercise catalogs from JSON
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load_from_file(path: &Path) -> Result<ExerciseCatalog> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        ExerciseCatalog::from_json_str(&content, &path.display().to_string())
            .context("Failed to load exercise catalog")
    }
}

/// Serialize a plan as pretty JSON
pub fn plan_to_json(plan: &ExercisePlan) -> Result<String> {
    serde_json::to_string_pretty(plan).context("Failed to serialize plan")
}

/// Write a plan as pretty JSON
pub fn write_plan_json(plan: &ExercisePlan, path: &Path) -> Result<()> {
    let json = plan_to_json(plan)?;
    fs::write(path, json).with_context(|| format!("Failed to write plan: {}", path.display()))
}
