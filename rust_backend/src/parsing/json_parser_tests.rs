use super::json_parser::*;
use serde_json::json;
use std::io::Write;

#[test]
fn test_parse_minimal_chart() {
    let json = r#"{
        "planets": [
            {"name": "Luna", "sign": "Escorpio", "degree": 215.3, "house": 9, "retrograde": false}
        ],
        "aspects": [
            {"bodyA": "Luna", "bodyB": "Saturno", "type": "Cuadratura", "orb": 5.1}
        ],
        "birthTime": "14:35"
    }"#;

    let raw = parse_chart_json_str(json).unwrap();
    let planets = raw.planets.unwrap();
    assert_eq!(planets.len(), 1);
    assert_eq!(planets[0].name.as_deref(), Some("Luna"));
    assert_eq!(planets[0].house, Some(json!(9)));

    let aspects = raw.aspects.unwrap();
    assert_eq!(aspects[0].kind.as_deref(), Some("Cuadratura"));
    assert_eq!(raw.birth_time.as_deref(), Some("14:35"));
}

#[test]
fn test_missing_arrays_stay_none() {
    let raw = parse_chart_json_str("{}").unwrap();
    assert!(raw.planets.is_none());
    assert!(raw.aspects.is_none());
}

#[test]
fn test_aspect_aliases() {
    let json = r#"{"planets": [], "aspects": [{"planet1": "sun", "planet2": "moon", "aspect": "trine", "orb": "2,5"}]}"#;
    let raw = parse_chart_json_str(json).unwrap();
    let aspect = &raw.aspects.unwrap()[0];
    assert_eq!(aspect.body_a.as_deref(), Some("sun"));
    assert_eq!(aspect.body_b.as_deref(), Some("moon"));
    assert_eq!(aspect.orb.as_ref().and_then(loose_f64), Some(2.5));
}

#[test]
fn test_type_error_reports_path() {
    let json = r#"{"planets": [{"name": 7}]}"#;
    let err = parse_chart_json_str(json).unwrap_err();
    assert!(err.to_string().contains("planets[0].name"), "{}", err);
}

#[test]
fn test_invalid_json_syntax() {
    assert!(parse_chart_json_str("{not json").is_err());
}

#[test]
fn test_loose_f64() {
    assert_eq!(loose_f64(&json!(12)), Some(12.0));
    assert_eq!(loose_f64(&json!(" 4.5 ")), Some(4.5));
    assert_eq!(loose_f64(&json!("abc")), None);
    assert_eq!(loose_f64(&json!(true)), None);
}

#[test]
fn test_loose_bool() {
    assert_eq!(loose_bool(&json!(true)), Some(true));
    assert_eq!(loose_bool(&json!("R")), Some(true));
    assert_eq!(loose_bool(&json!("Rx")), Some(true));
    assert_eq!(loose_bool(&json!(0)), Some(false));
    assert_eq!(loose_bool(&json!("direct")), Some(false));
    assert_eq!(loose_bool(&json!("maybe")), None);
}

#[test]
fn test_parse_chart_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"planets": [], "aspects": []}}"#).unwrap();

    let raw = parse_chart_json(file.path()).unwrap();
    assert_eq!(raw.planets, Some(vec![]));
}
