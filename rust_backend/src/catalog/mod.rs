//! Exercise catalog: the immutable, external collection of candidate activities.
//!
//! The core only ever reads the catalog. It is validated once on load
//! (unique ids, intensity within `1..=5`) and then shared, typically behind an
//! `Arc`, across any number of concurrent plan generations.

pub mod repository;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CatalogError, CatalogResult};

pub use repository::{CatalogRepository, FileCatalogRepository, LocalCatalogRepository};

/// Preferred time of day for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    Morning,
    Evening,
    Anytime,
}

/// Energy demand of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

/// Longest session a catalog entry may declare.
pub const MAX_DURATION_MINUTES: u32 = 240;

const HIGH_RISK_MARKERS: [&str; 5] = [
    "high risk",
    "alto riesgo",
    "medical supervision",
    "supervisión médica",
    "supervision medica",
];

/// A single catalog record.
///
/// `name`, `tags` and `targetAreas` are optional enrichments; catalogs that
/// only carry the core fields deserialize with them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTemplate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub category: String,
    /// Minutes per session.
    pub duration: u32,
    pub intensity: u8,
    pub timing: Timing,
    pub energy_level: EnergyLevel,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub safety_info: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub target_areas: Vec<String>,
}

impl ExerciseTemplate {
    /// Returns `true` when the safety notes flag the exercise as high risk,
    /// or when a maximal-intensity exercise carries contraindications.
    pub fn is_high_risk(&self) -> bool {
        let flagged = self
            .safety_info
            .as_deref()
            .map(|info| {
                let info = info.to_lowercase();
                HIGH_RISK_MARKERS.iter().any(|m| info.contains(m))
            })
            .unwrap_or(false);

        flagged || (self.intensity >= 5 && !self.contraindications.is_empty())
    }

    /// Case-insensitive match against the category or any tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.category.eq_ignore_ascii_case(tag) || self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_grounding(&self) -> bool {
        self.has_tag("grounding")
    }

    /// Lowercased text that keyword affinities are matched against.
    pub fn search_text(&self) -> String {
        let mut parts = vec![self.id.as_str(), self.category.as_str()];
        if let Some(name) = self.name.as_deref() {
            parts.push(name);
        }
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// Whether this exercise lists `other` (by id or category) as a contraindication.
    pub fn contraindicates(&self, other: &ExerciseTemplate) -> bool {
        self.contraindications
            .iter()
            .any(|c| c == &other.id || c.eq_ignore_ascii_case(&other.category))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<ExerciseTemplate>),
    Wrapped { exercises: Vec<ExerciseTemplate> },
}

/// Validated, ordered, read-only collection of exercise templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExerciseCatalog {
    exercises: Vec<ExerciseTemplate>,
}

impl ExerciseCatalog {
    /// Builds a catalog, rejecting duplicate ids and out-of-range intensities
    /// or durations.
    pub fn from_templates(exercises: Vec<ExerciseTemplate>) -> CatalogResult<Self> {
        let mut seen = HashSet::new();
        for exercise in &exercises {
            if !seen.insert(exercise.id.as_str()) {
                return Err(CatalogError::DuplicateId(exercise.id.clone()));
            }
            if !(1..=5).contains(&exercise.intensity) {
                return Err(CatalogError::InvalidIntensity {
                    id: exercise.id.clone(),
                    intensity: exercise.intensity,
                });
            }
            if !(1..=MAX_DURATION_MINUTES).contains(&exercise.duration) {
                return Err(CatalogError::InvalidDuration {
                    id: exercise.id.clone(),
                    duration: exercise.duration,
                    max: MAX_DURATION_MINUTES,
                });
            }
        }
        Ok(Self { exercises })
    }

    /// Parses a catalog from JSON: either a bare array or `{"exercises": [...]}`.
    ///
    /// `source` names the input in error messages.
    pub fn from_json_str(json_str: &str, source: &str) -> CatalogResult<Self> {
        let deserializer = &mut serde_json::Deserializer::from_str(json_str);
        let document: CatalogDocument =
            serde_path_to_error::deserialize(deserializer).map_err(|e| CatalogError::Parse {
                path: source.to_string(),
                message: format!("{} (at '{}')", e.inner(), e.path()),
            })?;

        let exercises = match document {
            CatalogDocument::List(list) => list,
            CatalogDocument::Wrapped { exercises } => exercises,
        };
        Self::from_templates(exercises)
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseTemplate> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseTemplate> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.exercises.iter().map(|e| e.id.as_str()).collect()
    }
}
