use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{ExerciseTemplate, Timing};
use crate::logging::PlanLogger;

const HIGH_INTENSITY: u8 = 4;
const MAX_HIGH_INTENSITY: usize = 4;
const MAX_MEAN_INTENSITY: f64 = 3.5;
const MAX_PER_CATEGORY: usize = 5;
const MAX_PER_TARGET_AREA: usize = 4;
const TRIM_TO: usize = 4;
const MAX_PASSES: usize = 6;

/// Conflict class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Timing,
    Energy,
    Contraindication,
    Redundancy,
}

/// Resolution applied to a conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictAction {
    /// Informational only.
    None,
    /// Drop a single exercise.
    Remove(String),
    /// Drop several exercises at once (redundancy trims).
    RemoveAll(Vec<String>),
}

/// An incompatibility within a selected exercise set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConflict {
    #[serde(rename = "type")]
    pub kind: ConflictType,
    pub exercise_ids: Vec<String>,
    /// 1 (informational) to 3 (blocking).
    pub severity: u8,
    pub reason: String,
    #[serde(skip)]
    action: Option<ConflictAction>,
}

impl ExerciseConflict {
    fn new(kind: ConflictType, exercise_ids: Vec<String>, severity: u8, reason: String, action: ConflictAction) -> Self {
        Self {
            kind,
            exercise_ids,
            severity,
            reason,
            action: Some(action),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity >= 3
    }

    pub fn action(&self) -> ConflictAction {
        self.action.clone().unwrap_or(ConflictAction::None)
    }
}

/// Outcome of conflict resolution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConflictResolution {
    /// Surviving exercises, in their original rank order.
    pub exercises: Vec<ExerciseTemplate>,
    /// Conflicts found before any resolution.
    pub detected: Vec<ExerciseConflict>,
    /// Conflicts still present after resolution.
    pub remaining: Vec<ExerciseConflict>,
    pub removed: Vec<String>,
    pub notes: Vec<String>,
}

impl ConflictResolution {
    pub fn has_blocking(&self) -> bool {
        self.remaining.iter().any(ExerciseConflict::is_blocking)
    }
}

fn ids_of<'a>(items: impl Iterator<Item = &'a ExerciseTemplate>) -> Vec<String> {
    items.map(|e| e.id.clone()).collect()
}

/// Find every conflict in a ranked exercise set.
///
/// # Arguments
/// * `exercises` - Selected exercises, best-ranked first
///
/// # Returns
/// Conflicts in detection order: timing, energy, contraindication, redundancy
pub fn detect_conflicts(exercises: &[ExerciseTemplate]) -> Vec<ExerciseConflict> {
    let mut conflicts = Vec::new();

    // Timing overload
    let morning: Vec<_> = exercises.iter().filter(|e| e.timing == Timing::Morning).collect();
    let evening: Vec<_> = exercises.iter().filter(|e| e.timing == Timing::Evening).collect();
    if morning.len() >= 3 && evening.len() >= 3 {
        conflicts.push(ExerciseConflict::new(
            ConflictType::Timing,
            ids_of(morning.iter().chain(evening.iter()).copied()),
            1,
            format!(
                "{} morning and {} evening exercises compete for the daily routine",
                morning.len(),
                evening.len()
            ),
            ConflictAction::None,
        ));
    }

    // Energy overload
    let intense: Vec<(usize, &ExerciseTemplate)> = exercises
        .iter()
        .enumerate()
        .filter(|(_, e)| e.intensity >= HIGH_INTENSITY)
        .collect();
    let mean = if exercises.is_empty() {
        0.0
    } else {
        exercises.iter().map(|e| e.intensity as f64).sum::<f64>() / exercises.len() as f64
    };
    let too_many = intense.len() > MAX_HIGH_INTENSITY;
    let too_heavy = exercises.len() >= 2 && mean > MAX_MEAN_INTENSITY;
    if too_many || too_heavy {
        // Highest intensity; ties go to the latest-ranked.
        let drop = exercises
            .iter()
            .enumerate()
            .fold(None::<(usize, u8)>, |best, (idx, e)| match best {
                Some((_, bi)) if bi > e.intensity => best,
                _ => Some((idx, e.intensity)),
            })
            .map(|(idx, _)| exercises[idx].id.clone());

        let mut reasons = Vec::new();
        if too_many {
            reasons.push(format!("{} high-intensity exercises", intense.len()));
        }
        if too_heavy {
            reasons.push(format!("mean intensity {:.2}", mean));
        }
        let offending = if intense.is_empty() {
            ids_of(exercises.iter())
        } else {
            ids_of(intense.iter().map(|(_, e)| *e))
        };

        conflicts.push(ExerciseConflict::new(
            ConflictType::Energy,
            offending,
            if too_many && too_heavy { 3 } else { 2 },
            format!("Energy overload: {}", reasons.join(", ")),
            drop.map(ConflictAction::Remove).unwrap_or(ConflictAction::None),
        ));
    }

    // Explicit contraindications
    for (i, a) in exercises.iter().enumerate() {
        for b in exercises.iter().skip(i + 1) {
            if a.contraindicates(b) || b.contraindicates(a) {
                conflicts.push(ExerciseConflict::new(
                    ConflictType::Contraindication,
                    vec![a.id.clone(), b.id.clone()],
                    3,
                    format!("{} and {} are contraindicated together", a.id, b.id),
                    ConflictAction::Remove(b.id.clone()),
                ));
            }
        }
    }

    // Intense breathwork combined with intense cardio
    let intense_in = |category: &str| -> Vec<&ExerciseTemplate> {
        exercises
            .iter()
            .filter(|e| e.intensity >= HIGH_INTENSITY && e.category.eq_ignore_ascii_case(category))
            .collect()
    };
    let breath = intense_in("breathwork");
    let cardio = intense_in("cardio");
    if breath.len() >= 2 && cardio.len() >= 2 {
        let drop = breath.last().map(|e| e.id.clone());
        conflicts.push(ExerciseConflict::new(
            ConflictType::Contraindication,
            ids_of(breath.iter().chain(cardio.iter()).copied()),
            2,
            format!(
                "{} intense breathwork with {} intense cardio exercises",
                breath.len(),
                cardio.len()
            ),
            drop.map(ConflictAction::Remove).unwrap_or(ConflictAction::None),
        ));
    }

    // Redundancy by category
    let mut by_category: BTreeMap<String, Vec<&ExerciseTemplate>> = BTreeMap::new();
    for exercise in exercises {
        by_category
            .entry(exercise.category.to_lowercase())
            .or_default()
            .push(exercise);
    }
    for (category, members) in &by_category {
        if members.len() > MAX_PER_CATEGORY {
            conflicts.push(ExerciseConflict::new(
                ConflictType::Redundancy,
                ids_of(members.iter().copied()),
                2,
                format!("{} exercises share category {}", members.len(), category),
                ConflictAction::RemoveAll(ids_of(members.iter().skip(TRIM_TO).copied())),
            ));
        }
    }

    // Redundancy by target area
    let mut by_area: BTreeMap<String, Vec<&ExerciseTemplate>> = BTreeMap::new();
    for exercise in exercises {
        for area in &exercise.target_areas {
            by_area.entry(area.to_lowercase()).or_default().push(exercise);
        }
    }
    for (area, members) in &by_area {
        if members.len() > MAX_PER_TARGET_AREA {
            conflicts.push(ExerciseConflict::new(
                ConflictType::Redundancy,
                ids_of(members.iter().copied()),
                1,
                format!("{} exercises target {}", members.len(), area),
                ConflictAction::RemoveAll(ids_of(members.iter().skip(TRIM_TO).copied())),
            ));
        }
    }

    conflicts
}

/// Resolve conflicts by descending severity until none is actionable.
///
/// Each pass applies the most severe actionable conflict and re-detects.
/// Blocking conflicts that survive every pass are reported in `notes` and
/// logged; the caller proceeds with the best achievable set.
pub fn resolve_conflicts(exercises: Vec<ExerciseTemplate>, logger: &dyn PlanLogger) -> ConflictResolution {
    let detected = detect_conflicts(&exercises);
    let mut current = exercises;
    let mut removed = Vec::new();
    let mut notes = Vec::new();

    for _ in 0..MAX_PASSES {
        let conflicts = detect_conflicts(&current);
        let Some(conflict) = conflicts
            .iter()
            .filter(|c| c.action() != ConflictAction::None)
            .fold(None::<&ExerciseConflict>, |best, c| match best {
                Some(b) if b.severity >= c.severity => best,
                _ => Some(c),
            })
        else {
            break;
        };

        let targets = match conflict.action() {
            ConflictAction::Remove(id) => vec![id],
            ConflictAction::RemoveAll(ids) => ids,
            ConflictAction::None => Vec::new(),
        };
        current.retain(|e| !targets.contains(&e.id));
        notes.push(format!(
            "Resolved {:?} conflict (severity {}): removed {}",
            conflict.kind,
            conflict.severity,
            targets.join(", ")
        ));
        removed.extend(targets);
    }

    let remaining = detect_conflicts(&current);
    for conflict in remaining.iter().filter(|c| c.is_blocking()) {
        let note = format!("Unresolved blocking conflict: {}", conflict.reason);
        logger.warn(&note);
        notes.push(note);
    }

    logger.debug(&format!(
        "Conflicts: {} detected, {} removed, {} remaining",
        detected.len(),
        removed.len(),
        remaining.len()
    ));

    ConflictResolution {
        exercises: current,
        detected,
        remaining,
        removed,
        notes,
    }
}
