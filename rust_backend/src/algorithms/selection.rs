//! Exercise matching and tiered selection.
//!
//! Every catalog entry receives a weighted match score against the scored
//! priorities and the chart's elemental and modal profile. Selection then
//! proceeds in tiers, each greedy over the remaining candidates:
//!
//! 1. up to 4 dominant-element matches
//! 2. up to 2 secondary-element matches
//! 3. the grounding booster (earth secondary, Moon stress of 6 or more)
//! 4. one lowest-intensity exercise per essential category not yet used
//! 5. low-risk, low-intensity filler in `(intensity, id)` order
//!
//! No tier uses randomness; identical inputs select identical exercises.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::algorithms::analysis::{ChartAnalysis, BASE_MOON_STRESS};
use crate::algorithms::scoring::ScoredPriority;
use crate::catalog::{ExerciseCatalog, ExerciseTemplate, Timing};
use crate::core::domain::{Element, Modality};
use crate::logging::PlanLogger;

/// Maximum number of exercises a selection yields.
pub const MAX_SELECTION: usize = 6;

/// Fallback categories, in the order they are tried.
pub const ESSENTIAL_CATEGORIES: [&str; 6] = [
    "breathwork",
    "meditation",
    "movement",
    "journaling",
    "grounding",
    "relaxation",
];

const DOMINANT_CAP: usize = 4;
const SECONDARY_CAP: usize = 2;

const W_CATEGORY: f64 = 0.30;
const W_DOMINANT: f64 = 0.25;
const W_SECONDARY: f64 = 0.10;
const W_INTENSITY: f64 = 0.10;
const W_SAFETY: f64 = 0.10;
const W_MODALITY: f64 = 0.10;
const DIVERSITY_PENALTY: f64 = 0.15;

const BOOSTER_STRESS: f64 = 6.0;

/// Tier an exercise was selected in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    Dominant,
    Secondary,
    Booster,
    Essential,
    Filler,
}

/// Per-term breakdown of a match score, each term in `[0, 1]` before weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub category: f64,
    pub dominant: f64,
    pub secondary: f64,
    pub intensity: f64,
    pub safety: f64,
    pub modality: f64,
}

impl MatchBreakdown {
    /// Weighted sum before the diversity penalty.
    pub fn base(&self) -> f64 {
        W_CATEGORY * self.category
            + W_DOMINANT * self.dominant
            + W_SECONDARY * self.secondary
            + W_INTENSITY * self.intensity
            + W_SAFETY * self.safety
            + W_MODALITY * self.modality
    }
}

/// A selected exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub exercise: ExerciseTemplate,
    pub tier: SelectionTier,
    /// Match score at the time of picking, penalty included.
    pub score: f64,
}

/// Result of exercise selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionOutcome {
    /// Picks in rank order.
    pub picks: Vec<Pick>,
    pub notes: Vec<String>,
}

impl SelectionOutcome {
    pub fn exercises(&self) -> Vec<ExerciseTemplate> {
        self.picks.iter().map(|p| p.exercise.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.picks.iter().any(|p| p.exercise.id == id)
    }
}

/// Keywords that signal an element in an exercise's id, name, category or tags.
pub fn element_keywords(element: Element) -> &'static [&'static str] {
    match element {
        Element::Fire => &["fire", "sun", "activation", "power", "cardio", "dynamic", "dance"],
        Element::Earth => &["earth", "grounding", "nature", "walk", "strength", "posture", "body"],
        Element::Air => &["air", "breath", "mind", "focus", "visualization", "journal"],
        Element::Water => &["water", "emotion", "flow", "relax", "heart", "yin", "bath"],
    }
}

fn modality_keywords(modality: Modality) -> &'static [&'static str] {
    match modality {
        Modality::Cardinal => &["activation", "sun", "power", "dynamic", "start"],
        Modality::Fixed => &["restorative", "yin", "hold", "grounding", "strength", "posture"],
        Modality::Mutable => &["flow", "dance", "stretch", "release", "breath"],
    }
}

/// Intensity the selection aims for: higher Moon stress asks for gentler work.
pub fn target_intensity(moon_stress: f64) -> f64 {
    (4.5 - moon_stress * 0.35).clamp(1.0, 5.0)
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Scores catalog entries against priorities and chart profile
pub struct ExerciseMatcher<'a> {
    priorities: &'a [ScoredPriority],
    dominant: Element,
    secondary: Element,
    modality: Modality,
    target: f64,
}

impl<'a> ExerciseMatcher<'a> {
    pub fn new(priorities: &'a [ScoredPriority], analysis: &ChartAnalysis) -> Self {
        Self {
            priorities,
            dominant: analysis.dominant_element,
            secondary: analysis.secondary_element,
            modality: analysis.dominant_modality,
            target: target_intensity(effective_stress(analysis)),
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn breakdown(&self, exercise: &ExerciseTemplate) -> MatchBreakdown {
        let text = exercise.search_text();

        let suggested = self
            .priorities
            .iter()
            .any(|p| p.suggestions.iter().any(|s| s == &exercise.id));
        let preferred_rank = self.priorities.iter().position(|p| {
            p.priority_area
                .preferred_categories()
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&exercise.category))
        });
        let category = if suggested {
            1.0
        } else {
            match preferred_rank {
                Some(0) => 0.7,
                Some(_) => 0.5,
                None => 0.0,
            }
        };

        let modality_hit = matches_any(&text, modality_keywords(self.modality))
            || (self.modality == Modality::Cardinal && exercise.timing == Timing::Morning);

        MatchBreakdown {
            category,
            dominant: f64::from(u8::from(matches_any(&text, element_keywords(self.dominant)))),
            secondary: f64::from(u8::from(matches_any(&text, element_keywords(self.secondary)))),
            intensity: 1.0 - (exercise.intensity as f64 - self.target).abs() / 4.0,
            safety: if exercise.is_high_risk() { 0.0 } else { 1.0 },
            modality: f64::from(u8::from(modality_hit)),
        }
    }
}

/// Moon stress used for intensity targeting; charts without a Moon get the base term.
fn effective_stress(analysis: &ChartAnalysis) -> f64 {
    if analysis.has_body("moon") {
        analysis.moon_stress()
    } else {
        BASE_MOON_STRESS
    }
}

/// Greedy pick of up to `cap` candidates by penalized match score; ties go to the smaller id.
fn greedy_pick<'c>(
    candidates: Vec<&'c ExerciseTemplate>,
    bases: &HashMap<&str, f64>,
    picks: &mut Vec<Pick>,
    cap: usize,
    tier: SelectionTier,
) -> usize {
    let mut available: Vec<&ExerciseTemplate> = candidates
        .into_iter()
        .filter(|c| !picks.iter().any(|p| p.exercise.id == c.id))
        .collect();
    let mut taken = 0;

    while taken < cap && picks.len() < MAX_SELECTION && !available.is_empty() {
        let penalized = |e: &ExerciseTemplate| {
            let base = bases.get(e.id.as_str()).copied().unwrap_or(0.0);
            if picks.iter().any(|p| p.exercise.category == e.category) {
                base - DIVERSITY_PENALTY
            } else {
                base
            }
        };

        let best = available
            .iter()
            .enumerate()
            .fold(None::<(usize, f64)>, |best, (idx, e)| {
                let score = penalized(*e);
                match best {
                    Some((b, bs)) if bs > score || (bs == score && available[b].id <= e.id) => best,
                    _ => Some((idx, score)),
                }
            });

        let Some((idx, score)) = best else {
            break;
        };
        let exercise = available.remove(idx);
        picks.push(Pick {
            exercise: exercise.clone(),
            tier,
            score,
        });
        taken += 1;
    }

    taken
}

/// Lowest-intensity entry of `entries`, ties broken by id.
fn gentlest<'c>(entries: impl Iterator<Item = &'c ExerciseTemplate>) -> Option<&'c ExerciseTemplate> {
    entries.min_by(|a, b| a.intensity.cmp(&b.intensity).then_with(|| a.id.cmp(&b.id)))
}

/// Select up to six exercises for the given priorities.
///
/// # Arguments
/// * `catalog` - Read-only exercise catalog
/// * `priorities` - Ranked priorities that passed the confidence filter
/// * `analysis` - Chart analysis supplying elements, modality and Moon stress
/// * `logger` - Receives a summary of the tiers used
///
/// # Returns
/// SelectionOutcome with distinct picks in rank order
pub fn select_exercises(
    catalog: &ExerciseCatalog,
    priorities: &[ScoredPriority],
    analysis: &ChartAnalysis,
    logger: &dyn PlanLogger,
) -> SelectionOutcome {
    let matcher = ExerciseMatcher::new(priorities, analysis);
    let breakdowns: HashMap<&str, MatchBreakdown> = catalog
        .iter()
        .map(|e| (e.id.as_str(), matcher.breakdown(e)))
        .collect();
    let bases: HashMap<&str, f64> = breakdowns.iter().map(|(id, b)| (*id, b.base())).collect();

    let mut picks: Vec<Pick> = Vec::new();
    let mut notes = Vec::new();

    let dominant: Vec<&ExerciseTemplate> = catalog
        .iter()
        .filter(|e| breakdowns.get(e.id.as_str()).is_some_and(|b| b.dominant > 0.0))
        .collect();
    let dominant_taken = greedy_pick(dominant, &bases, &mut picks, DOMINANT_CAP, SelectionTier::Dominant);

    let secondary: Vec<&ExerciseTemplate> = catalog
        .iter()
        .filter(|e| breakdowns.get(e.id.as_str()).is_some_and(|b| b.secondary > 0.0))
        .collect();
    let secondary_taken = greedy_pick(
        secondary,
        &bases,
        &mut picks,
        SECONDARY_CAP,
        SelectionTier::Secondary,
    );

    let stress = effective_stress(analysis);
    if analysis.secondary_element == Element::Earth
        && stress >= BOOSTER_STRESS
        && !picks.iter().any(|p| p.exercise.is_grounding())
    {
        let grounding = gentlest(catalog.iter().filter(|e| e.is_grounding() && !e.is_high_risk()));
        match grounding {
            Some(exercise) if picks.len() < MAX_SELECTION => {
                notes.push(format!(
                    "Grounding booster added {} (earth secondary, Moon stress {:.1})",
                    exercise.id, stress
                ));
                picks.push(Pick {
                    exercise: exercise.clone(),
                    tier: SelectionTier::Booster,
                    score: bases.get(exercise.id.as_str()).copied().unwrap_or(0.0),
                });
            }
            Some(exercise) => notes.push(format!(
                "Grounding booster skipped: no room for {}",
                exercise.id
            )),
            None => notes.push("Grounding booster skipped: catalog has no grounding exercise".to_string()),
        }
    }

    if picks.len() < MAX_SELECTION {
        let before = picks.len();
        for category in ESSENTIAL_CATEGORIES {
            if picks.len() >= MAX_SELECTION {
                break;
            }
            if picks.iter().any(|p| p.exercise.category.eq_ignore_ascii_case(category)) {
                continue;
            }
            let candidate = gentlest(catalog.iter().filter(|e| {
                e.category.eq_ignore_ascii_case(category)
                    && !e.is_high_risk()
                    && !picks.iter().any(|p| p.exercise.id == e.id)
            }));
            if let Some(exercise) = candidate {
                picks.push(Pick {
                    exercise: exercise.clone(),
                    tier: SelectionTier::Essential,
                    score: bases.get(exercise.id.as_str()).copied().unwrap_or(0.0),
                });
            }
        }
        if picks.len() > before {
            notes.push(format!(
                "Selection shortfall: {} essential-category exercises added",
                picks.len() - before
            ));
        }
    }

    if picks.len() < MAX_SELECTION {
        let mut filler: Vec<&ExerciseTemplate> = catalog
            .iter()
            .filter(|e| !e.is_high_risk() && !picks.iter().any(|p| p.exercise.id == e.id))
            .collect();
        filler.sort_by(|a, b| a.intensity.cmp(&b.intensity).then_with(|| a.id.cmp(&b.id)));

        let before = picks.len();
        for exercise in filler.into_iter().take(MAX_SELECTION - before) {
            picks.push(Pick {
                exercise: exercise.clone(),
                tier: SelectionTier::Filler,
                score: bases.get(exercise.id.as_str()).copied().unwrap_or(0.0),
            });
        }
        if picks.len() > before {
            notes.push(format!(
                "Selection shortfall: {} low-intensity filler exercises added",
                picks.len() - before
            ));
        }
    }

    logger.debug(&format!(
        "Selection: {} dominant, {} secondary, {} total (target intensity {:.2})",
        dominant_taken,
        secondary_taken,
        picks.len(),
        matcher.target()
    ));

    SelectionOutcome { picks, notes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::rules::PriorityArea;
    use crate::catalog::fixtures::{exercise, sample_catalog};
    use crate::logging::NoopLogger;
    use std::collections::BTreeMap;

    fn analysis(dominant: Element, secondary: Element, moon_stress: Option<f64>) -> ChartAnalysis {
        use crate::algorithms::analysis::{Confidence, Dominances, MoonStress, PlanetDetail};
        use crate::algorithms::dignity::DignityInfo;

        let mut details = BTreeMap::new();
        if let Some(score) = moon_stress {
            details.insert(
                "moon".to_string(),
                PlanetDetail {
                    sign: "scorpio".into(),
                    house: 9,
                    degree: 215.0,
                    retrograde: false,
                    dignity: DignityInfo::neutral("moon", "scorpio"),
                    hard_aspects: 0,
                    soft_aspects: 0,
                    aspects: vec![],
                    stress: Some(MoonStress {
                        score,
                        level: "alto".into(),
                        contributions: vec![],
                    }),
                },
            );
        }

        ChartAnalysis {
            confidence: Confidence {
                score: 1.0,
                reasons: vec![],
            },
            dominances: Dominances {
                elements: BTreeMap::new(),
                modalities: BTreeMap::new(),
            },
            dominant_element: dominant,
            secondary_element: secondary,
            dominant_modality: Modality::Fixed,
            details,
            weak_dignities: vec![],
            strong_dignities: vec![],
            stellium_houses: vec![],
            tensions_count: 0,
            harmonies_count: 0,
            notes: vec![],
        }
    }

    fn priority(area: PriorityArea, suggestions: &[&str]) -> ScoredPriority {
        ScoredPriority {
            rule_id: "test".into(),
            priority_area: area,
            severity: 2,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            indicators: vec!["fact".into()],
            rationale: String::new(),
            confidence: 0.8,
            rule_confidence: 0.8,
            score: 60.0,
        }
    }

    #[test]
    fn test_target_intensity_decreases_with_stress() {
        assert!((target_intensity(0.0) - 4.5).abs() < 1e-9);
        assert!((target_intensity(2.0) - 3.8).abs() < 1e-9);
        assert!((target_intensity(10.0) - 1.0).abs() < 1e-9);
        assert!(target_intensity(8.5) < target_intensity(4.0));
    }

    #[test]
    fn test_high_risk_scores_zero_safety() {
        let analysis = analysis(Element::Fire, Element::Air, Some(2.0));
        let matcher = ExerciseMatcher::new(&[], &analysis);
        let mut risky = exercise("risky", "cardio", 5, Timing::Morning);
        risky.safety_info = Some("High risk".into());
        assert_eq!(matcher.breakdown(&risky).safety, 0.0);
    }

    #[test]
    fn test_suggested_ids_score_full_category_term() {
        let analysis = analysis(Element::Water, Element::Earth, Some(2.0));
        let priorities = [priority(PriorityArea::Emotional, &["breath-478"])];
        let matcher = ExerciseMatcher::new(&priorities, &analysis);
        let catalog = sample_catalog();

        let suggested = matcher.breakdown(catalog.get("breath-478").unwrap());
        let preferred = matcher.breakdown(catalog.get("journal-gratitude").unwrap());
        let other = matcher.breakdown(catalog.get("cardio-jog").unwrap());
        assert_eq!(suggested.category, 1.0);
        assert_eq!(preferred.category, 0.7);
        assert_eq!(other.category, 0.0);
    }

    #[test]
    fn test_selection_is_capped_distinct_and_deterministic() {
        let analysis = analysis(Element::Water, Element::Air, Some(5.0));
        let priorities = [
            priority(PriorityArea::Emotional, &["breath-478", "journal-emotional"]),
            priority(PriorityArea::Physical, &["relaxation-pmr"]),
        ];
        let catalog = sample_catalog();

        let first = select_exercises(&catalog, &priorities, &analysis, &NoopLogger);
        let second = select_exercises(&catalog, &priorities, &analysis, &NoopLogger);

        assert_eq!(first, second);
        assert_eq!(first.picks.len(), MAX_SELECTION);
        let mut ids: Vec<_> = first.picks.iter().map(|p| p.exercise.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MAX_SELECTION);

        let dominant = first
            .picks
            .iter()
            .filter(|p| p.tier == SelectionTier::Dominant)
            .count();
        assert!(dominant <= 4);
    }

    #[test]
    fn test_fallback_tiers_fill_small_catalog() {
        let mut entries = vec![
            exercise("b-1", "breathwork", 2, Timing::Anytime),
            exercise("b-0", "breathwork", 1, Timing::Anytime),
            exercise("m-1", "meditation", 1, Timing::Evening),
            exercise("x-1", "misc", 2, Timing::Anytime),
            exercise("x-2", "misc", 1, Timing::Anytime),
        ];
        let mut risky = exercise("x-3", "misc", 1, Timing::Anytime);
        risky.safety_info = Some("Requires medical supervision".into());
        entries.push(risky);
        let catalog = ExerciseCatalog::from_templates(entries).unwrap();
        let analysis = analysis(Element::Fire, Element::Earth, Some(2.0));

        let outcome = select_exercises(&catalog, &[], &analysis, &NoopLogger);
        let ids: Vec<_> = outcome.picks.iter().map(|p| p.exercise.id.as_str()).collect();

        assert_eq!(ids, vec!["b-0", "m-1", "x-2", "b-1", "x-1"]);
        assert_eq!(outcome.picks[0].tier, SelectionTier::Essential);
        assert_eq!(outcome.picks[2].tier, SelectionTier::Filler);
        assert_eq!(outcome.notes.len(), 2);
    }

    #[test]
    fn test_grounding_booster() {
        let tagged = |id: &str, category: &str, intensity: u8, tag: &str| {
            let mut e = exercise(id, category, intensity, Timing::Anytime);
            e.tags = vec![tag.to_string()];
            e
        };
        let catalog = ExerciseCatalog::from_templates(vec![
            tagged("fire-a", "cardio", 3, "fire"),
            tagged("earth-1", "strength", 2, "earth"),
            tagged("earth-2", "yoga", 2, "posture"),
            exercise("g-1", "grounding", 5, Timing::Anytime),
        ])
        .unwrap();

        let stressed = analysis(Element::Fire, Element::Earth, Some(7.0));
        let outcome = select_exercises(&catalog, &[], &stressed, &NoopLogger);
        let ids: Vec<_> = outcome.picks.iter().map(|p| p.exercise.id.as_str()).collect();
        assert_eq!(ids, vec!["fire-a", "earth-1", "earth-2", "g-1"]);
        assert_eq!(outcome.picks[3].tier, SelectionTier::Booster);

        let calm = analysis(Element::Fire, Element::Earth, Some(3.0));
        let outcome = select_exercises(&catalog, &[], &calm, &NoopLogger);
        assert!(outcome.picks.iter().all(|p| p.tier != SelectionTier::Booster));
        assert!(outcome.contains("g-1"));
    }

    #[test]
    fn test_grounding_booster_skips_high_risk_entries() {
        let mut earth_1 = exercise("earth-1", "strength", 2, Timing::Anytime);
        earth_1.tags = vec!["earth".into()];
        let mut earth_2 = exercise("earth-2", "yoga", 2, Timing::Anytime);
        earth_2.tags = vec!["posture".into()];
        let mut fire = exercise("fire-a", "cardio", 3, Timing::Anytime);
        fire.tags = vec!["fire".into()];
        let mut risky = exercise("g-risky", "grounding", 1, Timing::Anytime);
        risky.safety_info = Some("High risk: barefoot on ice".into());
        let catalog = ExerciseCatalog::from_templates(vec![
            fire,
            earth_1,
            earth_2,
            risky,
            exercise("g-safe", "grounding", 3, Timing::Anytime),
        ])
        .unwrap();

        let stressed = analysis(Element::Fire, Element::Earth, Some(7.0));
        let outcome = select_exercises(&catalog, &[], &stressed, &NoopLogger);
        let booster: Vec<_> = outcome
            .picks
            .iter()
            .filter(|p| p.tier == SelectionTier::Booster)
            .map(|p| p.exercise.id.as_str())
            .collect();
        assert_eq!(booster, vec!["g-safe"]);
        assert!(!outcome.contains("g-risky"));
    }
}
