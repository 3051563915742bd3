use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Raw chart as it arrives from callers: every field optional, tokens possibly
/// localized, numbers possibly encoded as strings.
///
/// Missing arrays are kept as `None` so the validator can tell an absent
/// `planets` key apart from an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChart {
    #[serde(default)]
    pub planets: Option<Vec<RawPlanet>>,
    #[serde(default)]
    pub aspects: Option<Vec<RawAspect>>,
    #[serde(default, alias = "birth_date")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "birth_time")]
    pub birth_time: Option<String>,
    #[serde(default, alias = "birth_place")]
    pub birth_place: Option<String>,
}

/// Raw JSON structure for a planet placement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlanet {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sign: Option<String>,
    #[serde(default)]
    pub degree: Option<Value>,
    #[serde(default)]
    pub house: Option<Value>,
    #[serde(default, alias = "isRetrograde")]
    pub retrograde: Option<Value>,
}

/// Raw JSON structure for an aspect between two bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAspect {
    #[serde(default, rename = "bodyA", alias = "planet1", alias = "body_a")]
    pub body_a: Option<String>,
    #[serde(default, rename = "bodyB", alias = "planet2", alias = "body_b")]
    pub body_b: Option<String>,
    #[serde(default, rename = "type", alias = "aspect")]
    pub kind: Option<String>,
    #[serde(default)]
    pub orb: Option<Value>,
}

/// Reads a number that may have been encoded as a JSON string.
pub fn loose_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Reads a flag that may have been encoded as a number or a word.
///
/// Retrograde markers in the wild include `true`, `1`, `"R"`, `"Rx"` and `"sí"`.
pub fn loose_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "r" | "rx" | "retrograde" | "sí" | "si" | "retrógrado"
            | "retrogrado" => Some(true),
            "false" | "no" | "n" | "0" | "d" | "direct" | "directo" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

/// Parse a chart JSON file into a [`RawChart`]
pub fn parse_chart_json(json_path: &Path) -> Result<RawChart> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))?;

    parse_chart_json_str(&json_content)
        .with_context(|| format!("Failed to parse chart file: {}", json_path.display()))
}

/// Parse a chart from a JSON string.
///
/// Structural type mismatches (for example `planets` being a string) are
/// reported with the JSON path of the offending field. Semantic problems such
/// as a missing `planets` key are left to the validator.
pub fn parse_chart_json_str(json_str: &str) -> Result<RawChart> {
    let deserializer = &mut serde_json::Deserializer::from_str(json_str);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        let path = e.path().to_string();
        anyhow::anyhow!("Chart JSON error at '{}': {}", path, e.into_inner())
    })
}
