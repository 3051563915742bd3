//! Plan assembly.
//!
//! Runs every stage in fixed order and builds the [`ExercisePlan`]. Only
//! structural validation failures are returned as errors; everything else is
//! recovered inside the stages and surfaced through `chartAnalysis.notes`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::algorithms::analysis::{ChartAnalysis, ChartAnalyzer};
use crate::algorithms::conflicts::{detect_conflicts, resolve_conflicts, ExerciseConflict};
use crate::algorithms::phases::{
    distribute_phases, ExercisePhase, KeyThemeProvider, PhaseThemeProvider,
};
use crate::algorithms::rules::{PriorityArea, RulesEngine};
use crate::algorithms::scoring::{ScoredPriority, ScoringEngine};
use crate::algorithms::selection::select_exercises;
use crate::catalog::ExerciseCatalog;
use crate::config::PlanConfig;
use crate::core::domain::Chart;
use crate::error::{PlanError, PlanResult};
use crate::logging::PlanLogger;
use crate::parsing::json_parser::RawChart;
use crate::preprocessing::pipeline::{PreprocessConfig, PreprocessPipeline, PreprocessResult};

/// Plans span three weeks.
pub const PLAN_DAYS: u32 = 21;
const DAYS_PER_PHASE: u32 = 7;
pub const MIN_DAILY_MINUTES: u32 = 10;
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// The three phases of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPhases {
    pub phase1: ExercisePhase,
    pub phase2: ExercisePhase,
    pub phase3: ExercisePhase,
}

impl PlanPhases {
    pub fn iter(&self) -> impl Iterator<Item = &ExercisePhase> {
        [&self.phase1, &self.phase2, &self.phase3].into_iter()
    }
}

/// Confidence block copied from the analysis, plus input diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    pub confidence: f64,
    pub confidence_reasons: Vec<String>,
    pub low_confidence: bool,
    pub validation_warnings: Vec<String>,
    pub repairs: Vec<String>,
    /// Conflicts present in the final phased set.
    pub conflicts: Vec<ExerciseConflict>,
    pub used_fallback_rule: bool,
}

/// A 21-day exercise plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePlan {
    pub id: String,
    pub chart_analysis: ChartAnalysis,
    pub priorities: Vec<ScoredPriority>,
    pub top_areas: Vec<PriorityArea>,
    pub phases: PlanPhases,
    pub total_exercises: usize,
    pub estimated_daily_minutes: u32,
    pub meta: PlanMeta,
}

impl ExercisePlan {
    pub fn exercise_ids(&self) -> Vec<&str> {
        self.phases
            .iter()
            .flat_map(|p| p.exercises.iter().map(|e| e.id.as_str()))
            .collect()
    }
}

/// Plan generator with its rule set and theme provider
#[derive(Clone)]
pub struct PlanGenerator {
    config: PlanConfig,
    rules: RulesEngine,
    themes: Arc<dyn PhaseThemeProvider>,
}

impl PlanGenerator {
    pub fn new(config: PlanConfig) -> Self {
        Self {
            config,
            rules: RulesEngine::default(),
            themes: Arc::new(KeyThemeProvider),
        }
    }

    pub fn with_rules(mut self, rules: RulesEngine) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_theme_provider(mut self, themes: Arc<dyn PhaseThemeProvider>) -> Self {
        self.themes = themes;
        self
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    fn preprocessor(&self) -> PreprocessPipeline {
        PreprocessPipeline::with_config(PreprocessConfig {
            strict_ranges: self.config.validation.strict_ranges,
        })
    }

    /// Generate a plan from a raw chart.
    ///
    /// # Arguments
    /// * `raw` - Chart as received, possibly with localized tokens
    /// * `catalog` - Read-only exercise catalog
    /// * `logger` - Receives one summary line per stage
    ///
    /// # Returns
    /// The plan, or `PlanError::Validation` when the chart has blocking errors
    pub fn generate(
        &self,
        raw: RawChart,
        catalog: &ExerciseCatalog,
        logger: &dyn PlanLogger,
    ) -> PlanResult<ExercisePlan> {
        let preprocessed = self.preprocessor().process(raw).inspect_err(|e| {
            logger.warn(&e.to_string());
        })?;
        self.assemble(preprocessed, catalog, logger)
    }

    /// Generate a plan from chart JSON text.
    pub fn generate_from_json(
        &self,
        json_str: &str,
        catalog: &ExerciseCatalog,
        logger: &dyn PlanLogger,
    ) -> PlanResult<ExercisePlan> {
        let preprocessed = self.preprocessor().process_json_str(json_str).inspect_err(|e| {
            logger.warn(&e.to_string());
        })?;
        self.assemble(preprocessed, catalog, logger)
    }

    /// Run analysis through phase distribution on an already-preprocessed chart.
    pub fn assemble(
        &self,
        preprocessed: PreprocessResult,
        catalog: &ExerciseCatalog,
        logger: &dyn PlanLogger,
    ) -> PlanResult<ExercisePlan> {
        let PreprocessResult {
            chart,
            validation,
            repairs,
        } = preprocessed;

        let mut analysis = ChartAnalyzer::new(&self.config.analysis).analyze(&chart);
        logger.debug(&format!(
            "Analysis: dominant {} / secondary {}, Moon stress {:.1}, confidence {:.3}",
            analysis.dominant_element.as_str(),
            analysis.secondary_element.as_str(),
            analysis.moon_stress(),
            analysis.confidence.score
        ));

        let report = self.rules.evaluate(&chart, &analysis, logger);
        for skipped in &report.skipped {
            analysis
                .notes
                .push(format!("Rule {} skipped: {}", skipped.rule_id, skipped.reason));
        }
        if report.used_fallback {
            analysis
                .notes
                .push("No rule fired; maintenance priority applied".to_string());
        }

        let scoring = ScoringEngine::new(&self.config.scoring).score(&report.outputs, &analysis);
        analysis.notes.extend(scoring.notes.iter().cloned());
        logger.debug(&format!(
            "Scoring: {} ranked, {} selected",
            scoring.ranked.len(),
            scoring.selected.len()
        ));

        let selection = select_exercises(catalog, &scoring.selected, &analysis, logger);
        analysis.notes.extend(selection.notes.iter().cloned());

        let resolution = resolve_conflicts(selection.exercises(), logger);
        analysis.notes.extend(resolution.notes.iter().cloned());

        let distribution = distribute_phases(
            resolution.exercises,
            catalog,
            &analysis,
            self.themes.as_ref(),
            logger,
        );
        analysis.notes.extend(distribution.notes.iter().cloned());

        let mut phases = distribution.phases.into_iter();
        let (Some(phase1), Some(phase2), Some(phase3)) = (phases.next(), phases.next(), phases.next())
        else {
            return Err(PlanError::Internal("phase distribution returned fewer than 3 phases".to_string()));
        };
        let phases = PlanPhases {
            phase1,
            phase2,
            phase3,
        };

        // Backfill runs after resolution, so the final set is checked again.
        let final_set: Vec<_> = phases
            .iter()
            .flat_map(|p| p.exercises.iter().cloned())
            .collect();
        let conflicts = detect_conflicts(&final_set);
        for conflict in conflicts.iter().filter(|c| c.is_blocking()) {
            let note = format!("Unresolved blocking conflict: {}", conflict.reason);
            if !analysis.notes.contains(&note) {
                logger.warn(&note);
                analysis.notes.push(note);
            }
        }

        let total_exercises = final_set.len();
        let estimated_daily_minutes = estimated_daily_minutes(&phases);
        let id = plan_id(&chart, catalog)?;

        let meta = PlanMeta {
            confidence: analysis.confidence.score,
            confidence_reasons: analysis.confidence.reasons.clone(),
            low_confidence: analysis.confidence.score < LOW_CONFIDENCE_THRESHOLD,
            validation_warnings: validation.warnings,
            repairs,
            conflicts,
            used_fallback_rule: report.used_fallback,
        };

        logger.info(&format!(
            "Generated plan {}: {} exercises, {} min/day, confidence {:.3}",
            id, total_exercises, estimated_daily_minutes, meta.confidence
        ));

        Ok(ExercisePlan {
            id,
            chart_analysis: analysis,
            priorities: scoring.selected,
            top_areas: scoring.top_areas,
            phases,
            total_exercises,
            estimated_daily_minutes,
            meta,
        })
    }
}

impl Default for PlanGenerator {
    fn default() -> Self {
        Self::new(PlanConfig::default())
    }
}

/// Each phase runs for a week: `max(10, round(Σ 7·phase minutes / 21))`.
pub fn estimated_daily_minutes(phases: &PlanPhases) -> u32 {
    let total = phases.iter().fold(0u64, |total, p| {
        total.saturating_add(u64::from(DAYS_PER_PHASE) * u64::from(p.total_duration()))
    });
    let daily = (total as f64 / PLAN_DAYS as f64).round() as u32;
    daily.max(MIN_DAILY_MINUTES)
}

/// Deterministic plan id over the sanitized chart and the catalog ids.
pub fn plan_id(chart: &Chart, catalog: &ExerciseCatalog) -> PlanResult<String> {
    use sha2::{Digest, Sha256};

    let chart_json = serde_json::to_string(chart)
        .map_err(|e| PlanError::Internal(format!("Failed to serialize chart: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(chart_json.as_bytes());
    for id in catalog.ids() {
        hasher.update(b"\n");
        hasher.update(id.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    Ok(format!("plan-{}", &digest[..16]))
}

/// Generate a plan with the default rules and theme provider.
pub fn generate_plan(
    raw: RawChart,
    catalog: &ExerciseCatalog,
    config: &PlanConfig,
    logger: &dyn PlanLogger,
) -> PlanResult<ExercisePlan> {
    PlanGenerator::new(config.clone()).generate(raw, catalog, logger)
}

/// Generate a plan from chart JSON with the default rules and theme provider.
pub fn generate_plan_from_json(
    json_str: &str,
    catalog: &ExerciseCatalog,
    config: &PlanConfig,
    logger: &dyn PlanLogger,
) -> PlanResult<ExercisePlan> {
    PlanGenerator::new(config.clone()).generate_from_json(json_str, catalog, logger)
}

/// Run [`generate_plan`] on the blocking pool so async callers are not stalled.
pub async fn generate_plan_async(
    raw: RawChart,
    catalog: Arc<ExerciseCatalog>,
    config: PlanConfig,
    logger: Arc<dyn PlanLogger>,
) -> PlanResult<ExercisePlan> {
    tokio::task::spawn_blocking(move || generate_plan(raw, &catalog, &config, logger.as_ref()))
        .await
        .map_err(|e| PlanError::Internal(format!("Plan task failed: {}", e)))?
}
