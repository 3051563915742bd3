//! Chart validation with detailed error and warning reporting.
//!
//! This module validates raw chart data for completeness, consistency, and
//! correctness. Errors are blocking: a chart with any error never reaches
//! analysis. Warnings describe input the sanitizer can repair or safely ignore.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::domain::{AspectType, Body, Sign};
use crate::parsing::json_parser::{loose_bool, loose_f64, RawChart, RawPlanet};

/// Comprehensive validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false, while warnings are informational but don't
/// fail validation.
///
/// # Examples
///
/// ```
/// use astroplan_rust::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_warning("Unrecognized sign: Ofiuco".to_string());
/// assert!(result.is_valid);
///
/// result.add_error("Missing required array: planets".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_planets: usize,
    pub total_aspects: usize,
    pub unknown_tokens: usize,
    pub missing_degrees: usize,
    pub out_of_range_values: usize,
    pub duplicate_planets: usize,
    pub incomplete_aspects: usize,
}

impl ValidationResult {
    /// Creates a new validation result with valid status and empty error/warning lists.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a blocking error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-blocking warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for raw natal chart input.
///
/// Expects tokens to have been normalized already; anything still not in
/// canonical form is reported as a warning.
///
/// # Examples
///
/// ```
/// use astroplan_rust::parsing::json_parser::parse_chart_json_str;
/// use astroplan_rust::preprocessing::validator::ChartValidator;
///
/// let raw = parse_chart_json_str(r#"{"aspects": []}"#).unwrap();
/// let result = ChartValidator::validate(&raw, false);
/// assert!(!result.is_valid);
/// assert_eq!(result.errors, vec!["Missing required array: planets".to_string()]);
/// ```
pub struct ChartValidator;

impl ChartValidator {
    /// Validates a normalized raw chart.
    ///
    /// # Arguments
    ///
    /// * `raw` - The chart to check
    /// * `strict_ranges` - When `true`, out-of-range house and degree values are
    ///   errors; otherwise they are warnings and the sanitizer repairs them.
    pub fn validate(raw: &RawChart, strict_ranges: bool) -> ValidationResult {
        let mut result = ValidationResult::new();

        match &raw.planets {
            None => result.add_error("Missing required array: planets".to_string()),
            Some(planets) if planets.is_empty() => {
                result.add_error("Chart has no planets".to_string())
            }
            Some(planets) => {
                result.stats.total_planets = planets.len();
                for (idx, planet) in planets.iter().enumerate() {
                    Self::validate_planet(idx, planet, strict_ranges, &mut result);
                }
                result.stats.duplicate_planets = Self::check_duplicates(planets, &mut result);
            }
        }

        match &raw.aspects {
            None => result.add_error("Missing required array: aspects".to_string()),
            Some(_) => Self::validate_aspects(raw, &mut result),
        }

        Self::validate_birth_data(raw, &mut result);

        result
    }

    fn validate_planet(
        idx: usize,
        planet: &RawPlanet,
        strict_ranges: bool,
        result: &mut ValidationResult,
    ) {
        let name = match planet.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                result.add_error(format!("Planet at index {} is missing a name", idx));
                format!("#{}", idx)
            }
        };

        if Body::from_key(&name).is_none() && planet.name.is_some() {
            result.stats.unknown_tokens += 1;
            result.add_warning(format!("Unrecognized planet name: {}", name));
        }

        match planet.sign.as_deref().map(str::trim) {
            Some(sign) if !sign.is_empty() => {
                if Sign::from_key(sign).is_none() {
                    result.stats.unknown_tokens += 1;
                    result.add_warning(format!("Planet {} has unrecognized sign: {}", name, sign));
                }
            }
            _ => result.add_error(format!("Planet {} is missing a sign", name)),
        }

        match planet.house.as_ref() {
            None => result.add_error(format!("Planet {} is missing a house", name)),
            Some(value) => match loose_f64(value) {
                None => result.add_error(format!("Planet {} has a non-numeric house: {}", name, value)),
                Some(house) if house.fract() != 0.0 || !(1.0..=12.0).contains(&house) => {
                    result.stats.out_of_range_values += 1;
                    let message = format!("Planet {} has house {} outside 1..=12", name, house);
                    if strict_ranges {
                        result.add_error(message);
                    } else {
                        result.add_warning(format!("{}; it will be clamped", message));
                    }
                }
                Some(_) => {}
            },
        }

        match planet.degree.as_ref() {
            None => {
                result.stats.missing_degrees += 1;
                result.add_warning(format!("Planet {} is missing a degree", name));
            }
            Some(value) => match loose_f64(value) {
                None => result.add_error(format!("Planet {} has a non-numeric degree: {}", name, value)),
                Some(degree) if !(0.0..360.0).contains(&degree) => {
                    result.stats.out_of_range_values += 1;
                    let message = format!("Planet {} has degree {} outside [0, 360)", name, degree);
                    if strict_ranges {
                        result.add_error(message);
                    } else {
                        result.add_warning(format!("{}; it will be wrapped", message));
                    }
                }
                Some(_) => {}
            },
        }

        if let Some(flag) = planet.retrograde.as_ref() {
            if loose_bool(flag).is_none() {
                result.add_warning(format!(
                    "Planet {} has an unreadable retrograde flag: {}; assuming direct",
                    name, flag
                ));
            }
        }
    }

    fn check_duplicates(planets: &[RawPlanet], result: &mut ValidationResult) -> usize {
        let mut seen = HashSet::new();
        let mut duplicates = 0;

        for name in planets.iter().filter_map(|p| p.name.as_deref()) {
            if !seen.insert(name) {
                duplicates += 1;
                result.add_error(format!("Duplicate planet: {}", name));
            }
        }

        duplicates
    }

    fn validate_aspects(raw: &RawChart, result: &mut ValidationResult) {
        let aspects = raw.aspects.as_deref().unwrap_or_default();
        result.stats.total_aspects = aspects.len();

        for (idx, aspect) in aspects.iter().enumerate() {
            let mut problems = Vec::new();

            match (aspect.body_a.as_deref(), aspect.body_b.as_deref()) {
                (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                    if a == b {
                        problems.push(format!("references {} twice", a));
                    }
                    for body in [a, b] {
                        if Body::from_key(body).is_none() {
                            result.stats.unknown_tokens += 1;
                            result.add_warning(format!(
                                "Aspect at index {} references unrecognized body: {}",
                                idx, body
                            ));
                        }
                    }
                }
                _ => problems.push("does not reference two bodies".to_string()),
            }

            match aspect.kind.as_deref() {
                Some(kind) if AspectType::from_key(kind).is_some() => {}
                Some(kind) => {
                    result.stats.unknown_tokens += 1;
                    problems.push(format!("has unrecognized type {}", kind));
                }
                None => problems.push("has no type".to_string()),
            }

            if aspect.orb.as_ref().and_then(loose_f64).is_none() {
                problems.push("has no numeric orb".to_string());
            }

            if !problems.is_empty() {
                result.stats.incomplete_aspects += 1;
                result.add_warning(format!(
                    "Aspect at index {} {}; it will be dropped",
                    idx,
                    problems.join(", ")
                ));
            }
        }
    }

    fn validate_birth_data(raw: &RawChart, result: &mut ValidationResult) {
        match raw.birth_time.as_deref().map(str::trim) {
            None | Some("") => result.add_warning("Missing time of birth".to_string()),
            Some(time) => {
                if crate::preprocessing::sanitizer::parse_birth_time(time).is_none() {
                    result.add_warning(format!("Unreadable time of birth: {}", time));
                }
            }
        }

        if let Some(date) = raw.birth_date.as_deref().map(str::trim) {
            if !date.is_empty() && crate::preprocessing::sanitizer::parse_birth_date(date).is_none() {
                result.add_warning(format!("Unreadable date of birth: {}", date));
            }
        }
    }
}
