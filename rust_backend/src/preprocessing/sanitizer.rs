//! Best-effort repair of validated charts into the typed [`Chart`] model.
//!
//! The sanitizer clamps houses into `1..=12`, wraps degrees modulo 360,
//! coerces retrograde flags, and drops aspects that are structurally
//! incomplete. Each repair is recorded so it can be surfaced with the plan.

use chrono::{NaiveDate, NaiveTime};

use crate::core::domain::{Aspect, AspectType, BirthData, Chart, Planet};
use crate::parsing::json_parser::{loose_bool, loose_f64, RawChart};

/// Outcome of sanitizing a raw chart
#[derive(Debug, Clone)]
pub struct SanitizedChart {
    pub chart: Chart,
    pub repairs: Vec<String>,
}

/// Parse a birth time in `HH:MM:SS`, `HH:MM` or 12-hour `HH:MM AM` form.
pub fn parse_birth_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Parse a birth date in ISO (`YYYY-MM-DD`) or day-first (`DD/MM/YYYY`) form.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Repairs a chart that passed validation.
pub struct ChartSanitizer;

impl ChartSanitizer {
    /// Converts a normalized raw chart into a typed chart.
    ///
    /// Planets lacking a name, sign or numeric house cannot be repaired and are
    /// skipped; validation rejects such charts before they get here.
    ///
    /// # Examples
    ///
    /// ```
    /// use astroplan_rust::parsing::json_parser::parse_chart_json_str;
    /// use astroplan_rust::preprocessing::sanitizer::ChartSanitizer;
    ///
    /// let raw = parse_chart_json_str(
    ///     r#"{"planets": [{"name": "mars", "sign": "aries", "degree": 365.5, "house": 14, "retrograde": "R"}],
    ///         "aspects": [{"bodyA": "mars"}]}"#,
    /// ).unwrap();
    ///
    /// let sanitized = ChartSanitizer::sanitize(&raw);
    /// let mars = &sanitized.chart.planets[0];
    /// assert_eq!(mars.house, 12);
    /// assert!((mars.degree - 5.5).abs() < 1e-9);
    /// assert!(mars.retrograde);
    /// assert!(sanitized.chart.aspects.is_empty());
    /// ```
    pub fn sanitize(raw: &RawChart) -> SanitizedChart {
        let mut repairs = Vec::new();
        let mut planets = Vec::new();

        for raw_planet in raw.planets.as_deref().unwrap_or_default() {
            let (Some(name), Some(sign)) = (raw_planet.name.as_deref(), raw_planet.sign.as_deref())
            else {
                repairs.push("Skipped a planet without name or sign".to_string());
                continue;
            };
            let name = name.trim().to_string();
            let sign = sign.trim().to_string();

            let Some(house_value) = raw_planet.house.as_ref().and_then(loose_f64) else {
                repairs.push(format!("Skipped planet {} without a numeric house", name));
                continue;
            };
            let house = house_value.round().clamp(1.0, 12.0) as u8;
            if (house as f64 - house_value).abs() > f64::EPSILON {
                repairs.push(format!("Clamped house of {} from {} to {}", name, house_value, house));
            }

            let degree = match raw_planet.degree.as_ref().and_then(loose_f64) {
                Some(d) if (0.0..360.0).contains(&d) => d,
                Some(d) => {
                    // rem_euclid rounds tiny negatives up to exactly 360.
                    let wrapped = match d.rem_euclid(360.0) {
                        w if w >= 360.0 => 0.0,
                        w => w,
                    };
                    repairs.push(format!("Wrapped degree of {} from {} to {}", name, d, wrapped));
                    wrapped
                }
                None => {
                    repairs.push(format!("Defaulted missing degree of {} to 0", name));
                    0.0
                }
            };

            let retrograde = raw_planet
                .retrograde
                .as_ref()
                .and_then(loose_bool)
                .unwrap_or(false);

            planets.push(Planet {
                name,
                sign,
                degree,
                house,
                retrograde,
            });
        }

        let mut aspects = Vec::new();
        for (idx, raw_aspect) in raw.aspects.as_deref().unwrap_or_default().iter().enumerate() {
            let body_a = raw_aspect.body_a.as_deref().map(str::trim).unwrap_or_default();
            let body_b = raw_aspect.body_b.as_deref().map(str::trim).unwrap_or_default();
            let kind = raw_aspect.kind.as_deref().and_then(AspectType::from_key);
            let orb = raw_aspect.orb.as_ref().and_then(loose_f64);

            match (kind, orb) {
                (Some(kind), Some(orb)) if !body_a.is_empty() && !body_b.is_empty() && body_a != body_b => {
                    if orb < 0.0 {
                        repairs.push(format!("Took absolute value of negative orb on aspect {}", idx));
                    }
                    aspects.push(Aspect {
                        body_a: body_a.to_string(),
                        body_b: body_b.to_string(),
                        kind,
                        orb: orb.abs(),
                    });
                }
                _ => repairs.push(format!("Dropped incomplete aspect at index {}", idx)),
            }
        }

        let birth = BirthData {
            date: raw.birth_date.as_deref().and_then(parse_birth_date),
            time: raw.birth_time.as_deref().and_then(parse_birth_time),
            place: raw
                .birth_place
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        };

        SanitizedChart {
            chart: Chart {
                planets,
                aspects,
                birth,
            },
            repairs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::json_parser::{RawAspect, RawPlanet};
    use serde_json::json;

    #[test]
    fn test_parse_birth_time_formats() {
        assert_eq!(parse_birth_time("14:35"), NaiveTime::from_hms_opt(14, 35, 0));
        assert_eq!(parse_birth_time("14:35:10"), NaiveTime::from_hms_opt(14, 35, 10));
        assert_eq!(parse_birth_time("02:35 PM"), NaiveTime::from_hms_opt(14, 35, 0));
        assert_eq!(parse_birth_time("unknown"), None);
    }

    #[test]
    fn test_parse_birth_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 3, 21);
        assert_eq!(parse_birth_date("1990-03-21"), expected);
        assert_eq!(parse_birth_date("21/03/1990"), expected);
        assert_eq!(parse_birth_date("March"), None);
    }

    #[test]
    fn test_clean_chart_needs_no_repairs() {
        let raw = RawChart {
            planets: Some(vec![RawPlanet {
                name: Some("sun".into()),
                sign: Some("leo".into()),
                degree: Some(json!(130.5)),
                house: Some(json!(5)),
                retrograde: None,
            }]),
            aspects: Some(vec![]),
            birth_time: Some("10:00".into()),
            ..Default::default()
        };
        let sanitized = ChartSanitizer::sanitize(&raw);
        assert!(sanitized.repairs.is_empty(), "{:?}", sanitized.repairs);
        assert_eq!(sanitized.chart.planets[0].house, 5);
        assert!(!sanitized.chart.planets[0].retrograde);
        assert!(sanitized.chart.has_birth_time());
    }

    #[test]
    fn test_house_clamped_low_and_string_house() {
        let raw = RawChart {
            planets: Some(vec![
                RawPlanet {
                    name: Some("moon".into()),
                    sign: Some("cancer".into()),
                    degree: Some(json!(-30.0)),
                    house: Some(json!(0)),
                    retrograde: Some(json!(1)),
                },
                RawPlanet {
                    name: Some("sun".into()),
                    sign: Some("leo".into()),
                    degree: Some(json!("120")),
                    house: Some(json!("7")),
                    retrograde: None,
                },
            ]),
            aspects: Some(vec![]),
            ..Default::default()
        };
        let sanitized = ChartSanitizer::sanitize(&raw);
        let moon = &sanitized.chart.planets[0];
        assert_eq!(moon.house, 1);
        assert!((moon.degree - 330.0).abs() < 1e-9);
        assert!(moon.retrograde);
        assert_eq!(sanitized.chart.planets[1].house, 7);
        assert_eq!(sanitized.repairs.len(), 2);
    }

    #[test]
    fn test_degree_wraps_into_half_open_range() {
        let raw = RawChart {
            planets: Some(
                [-1e-14, 360.0, 720.5]
                    .iter()
                    .zip(["sun", "moon", "mars"])
                    .map(|(degree, name)| RawPlanet {
                        name: Some(name.into()),
                        sign: Some("aries".into()),
                        degree: Some(json!(degree)),
                        house: Some(json!(1)),
                        retrograde: None,
                    })
                    .collect(),
            ),
            aspects: Some(vec![]),
            ..Default::default()
        };
        let sanitized = ChartSanitizer::sanitize(&raw);
        let degrees: Vec<f64> = sanitized.chart.planets.iter().map(|p| p.degree).collect();
        assert!(degrees.iter().all(|d| (0.0..360.0).contains(d)), "{:?}", degrees);
        assert_eq!(degrees[0], 0.0);
        assert_eq!(degrees[1], 0.0);
        assert!((degrees[2] - 0.5).abs() < 1e-9);
        assert_eq!(sanitized.repairs.len(), 3);
    }

    #[test]
    fn test_aspect_repairs() {
        let raw = RawChart {
            planets: Some(vec![]),
            aspects: Some(vec![
                RawAspect {
                    body_a: Some("moon".into()),
                    body_b: Some("saturn".into()),
                    kind: Some("square".into()),
                    orb: Some(json!(-5.1)),
                },
                RawAspect {
                    body_a: Some("moon".into()),
                    body_b: Some("moon".into()),
                    kind: Some("conjunction".into()),
                    orb: Some(json!(0.0)),
                },
                RawAspect {
                    body_a: Some("moon".into()),
                    body_b: Some("venus".into()),
                    kind: Some("trine".into()),
                    orb: None,
                },
            ]),
            ..Default::default()
        };
        let sanitized = ChartSanitizer::sanitize(&raw);
        assert_eq!(sanitized.chart.aspects.len(), 1);
        assert!((sanitized.chart.aspects[0].orb - 5.1).abs() < 1e-9);
        assert_eq!(sanitized.repairs.len(), 3);
    }
}
