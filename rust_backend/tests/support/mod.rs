//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::json;

use astroplan_rust::catalog::ExerciseCatalog;
use astroplan_rust::parsing::json_parser::{parse_chart_json_str, RawAspect, RawChart, RawPlanet};

pub const CATALOG_JSON: &str = include_str!("../../data/exercise_catalog.json");

pub fn sample_catalog() -> ExerciseCatalog {
    ExerciseCatalog::from_json_str(CATALOG_JSON, "data/exercise_catalog.json").unwrap()
}

pub fn raw_planet(name: &str, sign: &str, degree: f64, house: u8) -> RawPlanet {
    RawPlanet {
        name: Some(name.to_string()),
        sign: Some(sign.to_string()),
        degree: Some(json!(degree)),
        house: Some(json!(house)),
        retrograde: Some(json!(false)),
    }
}

pub fn raw_aspect(a: &str, b: &str, kind: &str, orb: f64) -> RawAspect {
    RawAspect {
        body_a: Some(a.to_string()),
        body_b: Some(b.to_string()),
        kind: Some(kind.to_string()),
        orb: Some(json!(orb)),
    }
}

/// Moon in its fall sign squared by Saturn and Uranus, conjunct Neptune.
pub fn fall_moon_chart() -> RawChart {
    RawChart {
        planets: Some(vec![
            raw_planet("sun", "leo", 130.2, 5),
            raw_planet("moon", "scorpio", 215.0, 9),
            raw_planet("saturn", "aquarius", 305.0, 12),
            raw_planet("uranus", "leo", 125.0, 5),
            raw_planet("neptune", "scorpio", 219.8, 9),
        ]),
        aspects: Some(vec![
            raw_aspect("moon", "saturn", "square", 5.1),
            raw_aspect("moon", "uranus", "square", 4.97),
            raw_aspect("moon", "neptune", "conjunction", 4.84),
        ]),
        birth_time: Some("06:15".to_string()),
        ..Default::default()
    }
}

/// Ten planets, eight aspects and a birth time, with Spanish tokens throughout.
pub const FULL_CHART_JSON: &str = r#"{
    "planets": [
        {"name": "Sol", "sign": "Leo", "degree": 130.2, "house": 5, "retrograde": false},
        {"name": "Luna", "sign": "Cáncer", "degree": 100.0, "house": 4, "retrograde": false},
        {"name": "Mercurio", "sign": "Virgo", "degree": 160.0, "house": 6, "retrograde": "R"},
        {"name": "Venus", "sign": "Libra", "degree": 190.0, "house": 7, "retrograde": false},
        {"name": "Marte", "sign": "Aries", "degree": 10.0, "house": 1, "retrograde": false},
        {"name": "Júpiter", "sign": "Sagitario", "degree": 250.0, "house": 9, "retrograde": false},
        {"name": "Saturno", "sign": "Capricornio", "degree": 280.0, "house": 10, "retrograde": true},
        {"name": "Urano", "sign": "Acuario", "degree": 310.0, "house": 11, "retrograde": false},
        {"name": "Neptuno", "sign": "Piscis", "degree": 340.0, "house": 12, "retrograde": false},
        {"name": "Plutón", "sign": "Escorpio", "degree": 220.0, "house": 8, "retrograde": false}
    ],
    "aspects": [
        {"bodyA": "Luna", "bodyB": "Saturno", "type": "Oposición", "orb": 2.0},
        {"bodyA": "Luna", "bodyB": "Júpiter", "type": "Trígono", "orb": 3.1},
        {"bodyA": "Sol", "bodyB": "Marte", "type": "Trígono", "orb": 2.0},
        {"bodyA": "Venus", "bodyB": "Marte", "type": "Oposición", "orb": 1.0},
        {"bodyA": "Mercurio", "bodyB": "Júpiter", "type": "Cuadratura", "orb": 3.2},
        {"bodyA": "Sol", "bodyB": "Júpiter", "type": "Trígono", "orb": 0.5},
        {"bodyA": "Venus", "bodyB": "Saturno", "type": "Sextil", "orb": 2.4},
        {"bodyA": "Marte", "bodyB": "Plutón", "type": "Quincuncio", "orb": 1.1}
    ],
    "birthDate": "1990-08-23",
    "birthTime": "06:15",
    "birthPlace": "Sevilla"
}"#;

pub fn full_chart() -> RawChart {
    parse_chart_json_str(FULL_CHART_JSON).unwrap()
}

/// [`full_chart`] without its birth time.
pub fn chart_without_birth_time() -> RawChart {
    RawChart {
        birth_time: None,
        ..full_chart()
    }
}
