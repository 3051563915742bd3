//! End-to-end plan generation: chart scenarios and pipeline-wide properties.

mod support;

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use serde_json::json;

use astroplan_rust::algorithms::analysis::analyze_chart;
use astroplan_rust::algorithms::conflicts::{detect_conflicts, resolve_conflicts, ConflictType};
use astroplan_rust::catalog::{ExerciseCatalog, ExerciseTemplate};
use astroplan_rust::config::PlanConfig;
use astroplan_rust::core::domain::{Aspect, AspectType, Body, Chart, Planet, Sign};
use astroplan_rust::logging::NoopLogger;
use astroplan_rust::parsing::json_parser::RawChart;
use astroplan_rust::services::{generate_plan, ExercisePlan};
use astroplan_rust::PlanError;

use support::*;

fn plan_for(raw: RawChart) -> ExercisePlan {
    generate_plan(raw, &sample_catalog(), &PlanConfig::default(), &NoopLogger).unwrap()
}

fn assert_plan_invariants(plan: &ExercisePlan) {
    let phases: Vec<_> = plan.phases.iter().collect();
    assert_eq!(phases.len(), 3);
    for (i, phase) in phases.iter().enumerate() {
        assert_eq!(phase.phase_number as usize, i + 1);
        assert_eq!(phase.exercises.len(), 2);
    }

    let ids = plan.exercise_ids();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(plan.total_exercises, ids.len());

    assert_eq!(plan.meta.confidence, plan.chart_analysis.confidence.score);
    assert_eq!(plan.meta.confidence_reasons, plan.chart_analysis.confidence.reasons);
    assert_eq!(plan.meta.low_confidence, plan.meta.confidence < 0.6);
    assert!(plan.estimated_daily_minutes >= 10);

    for pair in plan.priorities.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].confidence >= pair[1].confidence)
        );
    }

    let intensities: Vec<u8> = plan
        .phases
        .iter()
        .flat_map(|p| p.exercises.iter().map(|e| e.intensity))
        .collect();
    assert!(intensities.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_fall_moon_scenario() {
    let plan = plan_for(fall_moon_chart());
    assert_plan_invariants(&plan);

    let stress = plan
        .chart_analysis
        .detail("moon")
        .and_then(|d| d.stress.as_ref())
        .unwrap();
    assert!((stress.score - 8.5).abs() < 1e-9);
    assert_eq!(stress.level, "alto/crítico");
    assert!(plan
        .priorities
        .iter()
        .any(|p| p.rule_id == "moon_stress"));
}

#[test]
fn test_missing_birth_time_lowers_confidence() {
    let complete = plan_for(full_chart());
    assert!(complete.chart_analysis.confidence.score >= 0.85);
    assert!(!complete.meta.low_confidence);

    let plan = plan_for(chart_without_birth_time());
    assert!(plan.chart_analysis.confidence.score < 0.85);
    assert!(plan
        .meta
        .confidence_reasons
        .iter()
        .any(|r| r.contains("time of birth")));
    assert_plan_invariants(&plan);
}

#[test]
fn test_empty_aspects_reduce_moon_stress_to_base() {
    let raw = RawChart {
        planets: Some(vec![raw_planet("Luna", "Capricornio", 280.0, 10)]),
        aspects: Some(vec![]),
        ..Default::default()
    };
    let plan = plan_for(raw);
    let moon = plan.chart_analysis.detail("moon").unwrap();
    assert_eq!(moon.hard_aspects, 0);
    assert_eq!(moon.soft_aspects, 0);
    // base 2.0 + detriment 2.0
    assert!((moon.stress.as_ref().unwrap().score - 4.0).abs() < 1e-9);
    assert_plan_invariants(&plan);
}

#[test]
fn test_localized_tokens_are_normalized() {
    let plan = plan_for(full_chart());
    assert!(plan.chart_analysis.has_body("moon"));
    assert!(plan.chart_analysis.has_body("pluto"));
    assert_eq!(plan.chart_analysis.detail("mercury").map(|d| d.retrograde), Some(true));
    assert!(plan.meta.validation_warnings.is_empty());
    assert_plan_invariants(&plan);
}

#[test]
fn test_blocking_errors_produce_no_plan() {
    let raw = RawChart {
        aspects: Some(vec![]),
        ..Default::default()
    };
    let err = generate_plan(raw, &sample_catalog(), &PlanConfig::default(), &NoopLogger).unwrap_err();
    match err {
        PlanError::Validation { errors, .. } => {
            assert_eq!(errors, vec!["Missing required array: planets".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_duplicate_planets_are_blocking() {
    let raw = RawChart {
        planets: Some(vec![
            raw_planet("moon", "cancer", 100.0, 4),
            raw_planet("Luna", "cancer", 101.0, 4),
        ]),
        aspects: Some(vec![]),
        ..Default::default()
    };
    let err = generate_plan(raw, &sample_catalog(), &PlanConfig::default(), &NoopLogger).unwrap_err();
    assert!(matches!(err, PlanError::Validation { .. }));
}

#[test]
fn test_warned_input_is_repaired() {
    let mut raw = full_chart();
    if let Some(planets) = raw.planets.as_mut() {
        planets[0].house = Some(json!(14));
        planets[1].degree = Some(json!(460.0));
    }
    let plan = plan_for(raw);
    assert_eq!(plan.meta.repairs.len(), 2);
    assert!(!plan.meta.validation_warnings.is_empty());
    assert_eq!(plan.chart_analysis.detail("sun").map(|d| d.house), Some(12));
    assert_plan_invariants(&plan);
}

#[test]
fn test_resolved_selection_has_no_blocking_conflicts() {
    let plan = plan_for(full_chart());
    let exercises: Vec<ExerciseTemplate> = plan
        .phases
        .iter()
        .flat_map(|p| p.exercises.iter().cloned())
        .collect();
    assert!(!detect_conflicts(&exercises).iter().any(|c| c.is_blocking()));
    assert!(plan.meta.conflicts.iter().all(|c| !c.is_blocking()));
}

fn small_catalog(entries: &[(&str, &str, u8, Option<&str>)]) -> ExerciseCatalog {
    let exercises: Vec<_> = entries
        .iter()
        .map(|(id, category, intensity, contraindication)| {
            let energy = if *intensity >= 4 { "high" } else { "low" };
            let contraindications: Vec<&str> = contraindication.iter().copied().collect();
            json!({
                "id": id,
                "category": category,
                "duration": 10,
                "intensity": intensity,
                "timing": "anytime",
                "energyLevel": energy,
                "contraindications": contraindications,
            })
        })
        .collect();
    ExerciseCatalog::from_json_str(&json!({ "exercises": exercises }).to_string(), "inline").unwrap()
}

fn final_ids(plan: &ExercisePlan) -> Vec<String> {
    plan.exercise_ids().into_iter().map(|id| id.to_string()).collect()
}

#[test]
fn test_backfill_never_restores_a_contraindicated_pair() {
    let catalog = small_catalog(&[
        ("a", "breathwork", 1, Some("b")),
        ("b", "meditation", 1, None),
        ("c", "journaling", 2, None),
        ("d", "movement", 2, None),
        ("e", "grounding", 2, None),
        ("f", "relaxation", 1, None),
    ]);
    let plan = generate_plan(fall_moon_chart(), &catalog, &PlanConfig::default(), &NoopLogger).unwrap();

    let ids = final_ids(&plan);
    assert!(!(ids.contains(&"a".to_string()) && ids.contains(&"b".to_string())), "{:?}", ids);
    assert_eq!(plan.total_exercises, 5);

    let exercises: Vec<ExerciseTemplate> = plan
        .phases
        .iter()
        .flat_map(|p| p.exercises.iter().cloned())
        .collect();
    assert_eq!(plan.meta.conflicts, detect_conflicts(&exercises));
    assert!(plan.meta.conflicts.iter().all(|c| !c.is_blocking()));
    assert!(plan
        .chart_analysis
        .notes
        .iter()
        .any(|n| n == "Catalog too small: only 5 of 6 exercises available"));
}

#[test]
fn test_blocking_conflict_restored_by_backfill_is_reported() {
    let catalog = small_catalog(&[
        ("hiit", "cardio", 5, None),
        ("sprint", "movement", 5, None),
        ("lift", "strength", 5, None),
        ("power-yoga", "yoga", 5, None),
        ("fire-breath", "breathwork", 5, None),
        ("plunge", "hydrotherapy", 5, None),
    ]);
    let plan = generate_plan(fall_moon_chart(), &catalog, &PlanConfig::default(), &NoopLogger).unwrap();

    assert_eq!(plan.total_exercises, 6);
    let energy = plan
        .meta
        .conflicts
        .iter()
        .find(|c| c.kind == ConflictType::Energy)
        .unwrap();
    assert!(energy.is_blocking());
    assert!(plan
        .chart_analysis
        .notes
        .iter()
        .any(|n| n == &format!("Unresolved blocking conflict: {}", energy.reason)));
}

const PLANET_KEYS: [&str; 10] = [
    "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune", "pluto",
];
const ASPECT_KEYS: [&str; 6] = ["conjunction", "opposition", "trine", "square", "sextile", "quincunx"];

fn arb_chart() -> impl Strategy<Value = RawChart> {
    (
        prop::sample::subsequence(PLANET_KEYS.to_vec(), 1..=10),
        prop::collection::vec((0usize..12, 0.0..360.0f64, 1u8..=12), 10),
        prop::collection::vec((0usize..10, 0usize..10, 0usize..6, 0.0..10.0f64), 0..10),
        any::<bool>(),
    )
        .prop_map(|(names, placements, aspects, timed)| {
            let planets = names
                .iter()
                .zip(placements)
                .map(|(name, (sign, degree, house))| {
                    raw_planet(name, Sign::ALL[sign].as_str(), degree, house)
                })
                .collect();
            let aspects = aspects
                .into_iter()
                .filter_map(|(a, b, kind, orb)| {
                    let (a, b) = (a % names.len(), b % names.len());
                    (a != b).then(|| raw_aspect(names[a], names[b], ASPECT_KEYS[kind], orb))
                })
                .collect();
            RawChart {
                planets: Some(planets),
                aspects: Some(aspects),
                birth_time: timed.then(|| "12:00".to_string()),
                ..Default::default()
            }
        })
}

fn arb_exercise_set() -> impl Strategy<Value = Vec<ExerciseTemplate>> {
    let all: Vec<ExerciseTemplate> = sample_catalog().iter().cloned().collect();
    prop::sample::subsequence(all, 0..=6)
}

fn moon_with_squares(count: usize, sign: &str) -> Chart {
    let others = ["saturn", "uranus", "mars", "pluto", "sun", "venus", "jupiter"];
    Chart {
        planets: vec![Planet {
            name: Body::Moon.as_str().to_string(),
            sign: sign.to_string(),
            degree: 0.0,
            house: 1,
            retrograde: false,
        }],
        aspects: others
            .iter()
            .take(count)
            .map(|other| Aspect {
                body_a: "moon".to_string(),
                body_b: other.to_string(),
                kind: AspectType::Square,
                orb: 3.0,
            })
            .collect(),
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_valid_chart_yields_a_well_formed_plan(raw in arb_chart()) {
        let catalog = sample_catalog();
        let plan = generate_plan(raw.clone(), &catalog, &PlanConfig::default(), &NoopLogger).unwrap();
        assert_plan_invariants(&plan);

        let again = generate_plan(raw, &catalog, &PlanConfig::default(), &NoopLogger).unwrap();
        prop_assert_eq!(plan, again);
    }

    #[test]
    fn prop_moon_stress_is_monotonic_in_hard_aspects(count in 0usize..7, sign_index in 0usize..12) {
        let sign = Sign::ALL[sign_index].as_str();
        let fewer = analyze_chart(&moon_with_squares(count, sign)).moon_stress();
        let more = analyze_chart(&moon_with_squares(count + 1, sign)).moon_stress();
        prop_assert!(more >= fewer);
    }

    #[test]
    fn prop_conflict_resolution_is_idempotent(set in arb_exercise_set()) {
        let first = resolve_conflicts(set, &NoopLogger);
        prop_assert!(!first.has_blocking());

        let second = resolve_conflicts(first.exercises.clone(), &NoopLogger);
        prop_assert!(!second.detected.iter().any(|c| c.is_blocking()));
    }
}
