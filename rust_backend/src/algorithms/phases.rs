//! Phase distribution: three phases of two exercises each, gentlest first.
//!
//! Thematic presentation (sacred geometry, chakras, instructions) lives
//! outside the core behind [`PhaseThemeProvider`]. The core derives only a
//! deterministic theme sign from the analysis and asks the provider for the
//! matching metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::algorithms::analysis::ChartAnalysis;
use crate::catalog::{ExerciseCatalog, ExerciseTemplate};
use crate::core::domain::{Modality, Sign};
use crate::logging::PlanLogger;

pub const PHASE_COUNT: usize = 3;
pub const EXERCISES_PER_PHASE: usize = 2;
pub const PLAN_SIZE: usize = PHASE_COUNT * EXERCISES_PER_PHASE;

/// Presentational metadata for one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTheme {
    pub sacred_geometry: String,
    pub chakras: Vec<String>,
    pub instructions: String,
}

/// External lookup of phase metadata by theme sign.
pub trait PhaseThemeProvider: Send + Sync {
    fn theme(&self, sign: Sign, phase_number: u8) -> PhaseTheme;
}

/// Emits lookup keys of the form `<sign>.phase<N>` instead of resolved text.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyThemeProvider;

impl KeyThemeProvider {
    pub fn key(sign: Sign, phase_number: u8) -> String {
        format!("{}.phase{}", sign.as_str(), phase_number)
    }
}

impl PhaseThemeProvider for KeyThemeProvider {
    fn theme(&self, sign: Sign, phase_number: u8) -> PhaseTheme {
        let key = Self::key(sign, phase_number);
        PhaseTheme {
            sacred_geometry: format!("{}.geometry", key),
            chakras: vec![format!("{}.chakras", key)],
            instructions: format!("{}.instructions", key),
        }
    }
}

/// One of the three plan phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePhase {
    pub phase_number: u8,
    pub exercises: Vec<ExerciseTemplate>,
    pub theme_sign: Sign,
    pub theme_key: String,
    pub sacred_geometry: String,
    pub chakras: Vec<String>,
    pub instructions: String,
}

impl ExercisePhase {
    pub fn total_duration(&self) -> u32 {
        self.exercises
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.duration))
    }
}

/// Output of phase distribution
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDistribution {
    pub phases: Vec<ExercisePhase>,
    pub notes: Vec<String>,
}

/// Theme sign: the dominant element combined with a modality chosen by
/// stress (fixed at Moon stress 6 or more), then weak dignities (cardinal at
/// three or more), else the chart's dominant modality.
///
/// # Examples
///
/// ```
/// use astroplan_rust::algorithms::analysis::analyze_chart;
/// use astroplan_rust::algorithms::phases::theme_sign;
/// use astroplan_rust::core::domain::{Chart, Sign};
///
/// // Empty chart: fire dominant, cardinal by default.
/// assert_eq!(theme_sign(&analyze_chart(&Chart::default())), Sign::Aries);
/// ```
pub fn theme_sign(analysis: &ChartAnalysis) -> Sign {
    let modality = if analysis.moon_stress() >= 6.0 {
        Modality::Fixed
    } else if analysis.weak_dignities.len() >= 3 {
        Modality::Cardinal
    } else {
        analysis.dominant_modality
    };
    Sign::from_parts(analysis.dominant_element, modality)
}

fn conflicts_with_any(candidate: &ExerciseTemplate, chosen: &[ExerciseTemplate]) -> bool {
    chosen
        .iter()
        .any(|c| c.contraindicates(candidate) || candidate.contraindicates(c))
}

/// Split a resolved exercise set into three phases.
///
/// # Arguments
/// * `exercises` - Conflict-resolved exercises in rank order
/// * `catalog` - Source for deterministic backfill
/// * `analysis` - Drives the theme sign
/// * `provider` - Resolves phase metadata
/// * `logger` - Receives backfill and shortfall diagnostics
///
/// # Returns
/// PhaseDistribution with three phases ordered by ascending intensity
pub fn distribute_phases(
    exercises: Vec<ExerciseTemplate>,
    catalog: &ExerciseCatalog,
    analysis: &ChartAnalysis,
    provider: &dyn PhaseThemeProvider,
    logger: &dyn PlanLogger,
) -> PhaseDistribution {
    let mut notes = Vec::new();

    let mut seen = HashSet::new();
    let mut chosen: Vec<ExerciseTemplate> = exercises
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect();

    if chosen.len() > PLAN_SIZE {
        let dropped: Vec<String> = chosen.drain(PLAN_SIZE..).map(|e| e.id).collect();
        notes.push(format!("Trimmed to {} exercises: dropped {}", PLAN_SIZE, dropped.join(", ")));
    }

    if chosen.len() < PLAN_SIZE {
        let mut candidates: Vec<&ExerciseTemplate> = catalog
            .iter()
            .filter(|e| !chosen.iter().any(|c| c.id == e.id))
            .collect();
        candidates.sort_by(|a, b| a.intensity.cmp(&b.intensity).then_with(|| a.id.cmp(&b.id)));

        let before = chosen.len();
        // Low-risk candidates first, then high-risk ones. Contraindicated
        // pairs are never re-formed.
        for strict in [true, false] {
            for candidate in &candidates {
                if chosen.len() >= PLAN_SIZE {
                    break;
                }
                if chosen.iter().any(|c| c.id == candidate.id) {
                    continue;
                }
                if conflicts_with_any(candidate, &chosen) || (strict && candidate.is_high_risk()) {
                    continue;
                }
                chosen.push((*candidate).clone());
            }
        }

        if chosen.len() > before {
            let note = format!("Backfilled {} exercises from the catalog", chosen.len() - before);
            logger.debug(&note);
            notes.push(note);
        }
        if chosen.len() < PLAN_SIZE {
            let note = format!(
                "Catalog too small: only {} of {} exercises available",
                chosen.len(),
                PLAN_SIZE
            );
            logger.warn(&note);
            notes.push(note);
        }
    }

    chosen.sort_by_key(|e| e.intensity);

    let sign = theme_sign(analysis);
    let mut remaining = chosen.into_iter();
    let phases = (1..=PHASE_COUNT as u8)
        .map(|number| {
            let theme = provider.theme(sign, number);
            ExercisePhase {
                phase_number: number,
                exercises: remaining.by_ref().take(EXERCISES_PER_PHASE).collect(),
                theme_sign: sign,
                theme_key: KeyThemeProvider::key(sign, number),
                sacred_geometry: theme.sacred_geometry,
                chakras: theme.chakras,
                instructions: theme.instructions,
            }
        })
        .collect();

    PhaseDistribution { phases, notes }
}
