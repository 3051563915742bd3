use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::analysis::ChartAnalysis;
use crate::algorithms::rules::{PriorityArea, RuleOutput};
use crate::config::ScoringSettings;

const CONTEXT_BONUS: f64 = 5.0;
const CONVERGENCE_BONUS: f64 = 5.0;
const MISSING_BODY_PENALTY: f64 = 0.7;
const COMPLETE_DATA_BOOST: f64 = 1.05;
const COMPLETE_DATA_THRESHOLD: f64 = 0.85;

/// A rule output with its normalized score and re-derived confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPriority {
    pub rule_id: String,
    pub priority_area: PriorityArea,
    pub severity: u8,
    pub suggestions: Vec<String>,
    pub indicators: Vec<String>,
    pub rationale: String,
    /// Confidence after data-availability adjustments.
    pub confidence: f64,
    /// Confidence as emitted by the rule.
    pub rule_confidence: f64,
    /// In `[0, 100]`.
    pub score: f64,
}

/// Ranked priorities ready for exercise selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoringOutcome {
    /// Every scored output, ranked.
    pub ranked: Vec<ScoredPriority>,
    /// Ranked outputs that passed the confidence filter.
    pub selected: Vec<ScoredPriority>,
    pub top_areas: Vec<PriorityArea>,
    pub notes: Vec<String>,
}

/// Priority scoring engine
pub struct ScoringEngine {
    min_confidence: f64,
    top_areas: usize,
}

impl ScoringEngine {
    pub fn new(settings: &ScoringSettings) -> Self {
        Self {
            min_confidence: settings.min_priority_confidence,
            top_areas: settings.top_areas,
        }
    }

    /// Score, rank and filter rule outputs.
    ///
    /// `score = severity*20 + min(20, indicators*4) + confidence*10 + context
    /// + 5 per additional rule sharing the area`, clamped to `[0, 100]`.
    /// Outputs below the confidence floor are dropped; if that would drop
    /// everything, the best one is kept and a note explains why.
    pub fn score(&self, outputs: &[RuleOutput], analysis: &ChartAnalysis) -> ScoringOutcome {
        let ranked = score_priorities(outputs, analysis);
        let mut notes = Vec::new();

        let mut selected: Vec<ScoredPriority> = ranked
            .iter()
            .filter(|p| p.confidence >= self.min_confidence)
            .cloned()
            .collect();
        if selected.is_empty() {
            if let Some(best) = ranked.first() {
                notes.push(format!(
                    "Every priority fell below confidence {:.2}; kept {} ({:.2})",
                    self.min_confidence, best.rule_id, best.confidence
                ));
                selected.push(best.clone());
            }
        }

        let mut top_areas = Vec::new();
        for priority in &selected {
            if top_areas.len() >= self.top_areas {
                break;
            }
            if !top_areas.contains(&priority.priority_area) {
                top_areas.push(priority.priority_area);
            }
        }

        ScoringOutcome {
            ranked,
            selected,
            top_areas,
            notes,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(&ScoringSettings::default())
    }
}

/// Re-derives the confidence of one output from data availability.
pub fn derive_confidence(output: &RuleOutput, analysis: &ChartAnalysis) -> f64 {
    let mut confidence = output.confidence;
    if let Some(body) = output.priority_area.relevant_body() {
        if !analysis.has_body(body) {
            confidence *= MISSING_BODY_PENALTY;
        }
    }
    if analysis.confidence.score >= COMPLETE_DATA_THRESHOLD {
        confidence *= COMPLETE_DATA_BOOST;
    }
    confidence.clamp(0.0, 1.0)
}

fn context_bonus(analysis: &ChartAnalysis) -> f64 {
    let mut bonus = 0.0;
    if analysis.tensions_count > 5 {
        bonus += CONTEXT_BONUS;
    }
    if analysis.weak_dignities.len() >= 3 {
        bonus += CONTEXT_BONUS;
    }
    if analysis.moon_stress() >= 6.0 {
        bonus += CONTEXT_BONUS;
    }
    bonus
}

/// Scores and ranks every output: score descending, then confidence
/// descending, then rule id.
///
/// # Examples
///
/// ```
/// use astroplan_rust::algorithms::analysis::analyze_chart;
/// use astroplan_rust::algorithms::rules::maintenance_output;
/// use astroplan_rust::algorithms::scoring::score_priorities;
/// use astroplan_rust::core::domain::Chart;
///
/// let analysis = analyze_chart(&Chart::default());
/// let ranked = score_priorities(&[maintenance_output(&analysis)], &analysis);
///
/// // 1*20 + min(20, 2*4) + 0.6*10
/// assert!((ranked[0].score - 34.0).abs() < 1e-9);
/// ```
pub fn score_priorities(outputs: &[RuleOutput], analysis: &ChartAnalysis) -> Vec<ScoredPriority> {
    let mut per_area: BTreeMap<PriorityArea, usize> = BTreeMap::new();
    for output in outputs {
        *per_area.entry(output.priority_area).or_insert(0) += 1;
    }
    let context = context_bonus(analysis);

    let mut ranked: Vec<ScoredPriority> = outputs
        .iter()
        .map(|output| {
            let confidence = derive_confidence(output, analysis);
            let extra_rules = per_area
                .get(&output.priority_area)
                .copied()
                .unwrap_or(1)
                .saturating_sub(1);

            let raw = output.severity as f64 * 20.0
                + (output.indicators.len() as f64 * 4.0).min(20.0)
                + confidence * 10.0
                + context
                + CONVERGENCE_BONUS * extra_rules as f64;

            ScoredPriority {
                rule_id: output.rule_id.clone(),
                priority_area: output.priority_area,
                severity: output.severity,
                suggestions: output.suggestions.clone(),
                indicators: output.indicators.clone(),
                rationale: output.rationale.clone(),
                confidence,
                rule_confidence: output.confidence,
                score: raw.clamp(0.0, 100.0),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });
    ranked
}
