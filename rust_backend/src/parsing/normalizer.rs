//! Token normalization for localized chart input.
//!
//! Planet, sign and aspect names arrive in whatever language the upstream
//! calculator used. Each token is folded (trimmed, lowercased, accents
//! stripped, separators collapsed to `_`) and looked up in a fixed dictionary.
//! Tokens that match nothing are returned unchanged so the validator can flag
//! them.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::core::domain::{AspectType, Body, Sign};
use crate::parsing::json_parser::RawChart;

static PLANET_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("sol", "sun"),
        ("soleil", "sun"),
        ("sonne", "sun"),
        ("luna", "moon"),
        ("lua", "moon"),
        ("lune", "moon"),
        ("mond", "moon"),
        ("mercurio", "mercury"),
        ("mercure", "mercury"),
        ("merkur", "mercury"),
        ("venere", "venus"),
        ("marte", "mars"),
        ("jupiter", "jupiter"),
        ("jupyter", "jupiter"),
        ("giove", "jupiter"),
        ("saturno", "saturn"),
        ("saturne", "saturn"),
        ("urano", "uranus"),
        ("neptuno", "neptune"),
        ("netuno", "neptune"),
        ("nettuno", "neptune"),
        ("pluton", "pluto"),
        ("plutao", "pluto"),
        ("plutone", "pluto"),
        ("nodo_norte", "north_node"),
        ("no_norte", "north_node"),
        ("nodo_norte_verdadero", "north_node"),
        ("true_node", "north_node"),
        ("mean_node", "north_node"),
        ("node", "north_node"),
        ("nodo_sur", "south_node"),
        ("no_sul", "south_node"),
        ("quiron", "chiron"),
        ("quirao", "chiron"),
        ("black_moon", "lilith"),
        ("luna_negra", "lilith"),
        ("lua_negra", "lilith"),
        ("asc", "ascendant"),
        ("ac", "ascendant"),
        ("ascendente", "ascendant"),
        ("mc", "midheaven"),
        ("medio_cielo", "midheaven"),
        ("medio_del_cielo", "midheaven"),
        ("meio_do_ceu", "midheaven"),
    ])
});

static SIGN_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("aries", "aries"),
        ("carnero", "aries"),
        ("tauro", "taurus"),
        ("touro", "taurus"),
        ("taureau", "taurus"),
        ("geminis", "gemini"),
        ("gemeos", "gemini"),
        ("gemeaux", "gemini"),
        ("cancer", "cancer"),
        ("cangrejo", "cancer"),
        ("leao", "leo"),
        ("lion", "leo"),
        ("virgem", "virgo"),
        ("vierge", "virgo"),
        ("balanza", "libra"),
        ("balance", "libra"),
        ("escorpio", "scorpio"),
        ("escorpion", "scorpio"),
        ("escorpiao", "scorpio"),
        ("scorpion", "scorpio"),
        ("sagitario", "sagittarius"),
        ("sagittaire", "sagittarius"),
        ("capricornio", "capricorn"),
        ("capricorne", "capricorn"),
        ("acuario", "aquarius"),
        ("aquario", "aquarius"),
        ("verseau", "aquarius"),
        ("piscis", "pisces"),
        ("peixes", "pisces"),
        ("poissons", "pisces"),
    ])
});

static ASPECT_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("conjuncion", "conjunction"),
        ("conjuncao", "conjunction"),
        ("conj", "conjunction"),
        ("oposicion", "opposition"),
        ("oposicao", "opposition"),
        ("opposizione", "opposition"),
        ("trigono", "trine"),
        ("trigone", "trine"),
        ("cuadratura", "square"),
        ("quadratura", "square"),
        ("cuadrado", "square"),
        ("carre", "square"),
        ("sextil", "sextile"),
        ("sestile", "sextile"),
        ("quincuncio", "quincunx"),
        ("quincuncio_inconjunto", "quincunx"),
        ("inconjunto", "quincunx"),
        ("inconjunct", "quincunx"),
    ])
});

/// Folds a token for dictionary lookup.
///
/// # Examples
///
/// ```
/// use astroplan_rust::parsing::normalizer::fold_token;
///
/// assert_eq!(fold_token("  Medio Cielo "), "medio_cielo");
/// assert_eq!(fold_token("Plutón"), "pluton");
/// ```
pub fn fold_token(token: &str) -> String {
    let mut folded = String::with_capacity(token.len());
    let mut pending_separator = false;

    for c in token.trim().chars().flat_map(char::to_lowercase) {
        let c = match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        };

        if c.is_whitespace() || c == '-' || c == '_' {
            pending_separator = !folded.is_empty();
            continue;
        }
        if pending_separator {
            folded.push('_');
            pending_separator = false;
        }
        folded.push(c);
    }

    folded
}

fn lookup(token: &str, is_canonical: impl Fn(&str) -> bool, aliases: &HashMap<&str, &str>) -> String {
    let folded = fold_token(token);
    if is_canonical(&folded) {
        return folded;
    }
    match aliases.get(folded.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => token.to_string(),
    }
}

/// Maps a planet token to its canonical key, or returns it unchanged.
pub fn normalize_planet(token: &str) -> String {
    lookup(token, |k| Body::from_key(k).is_some(), &PLANET_ALIASES)
}

/// Maps a sign token to its canonical key, or returns it unchanged.
pub fn normalize_sign(token: &str) -> String {
    lookup(token, |k| Sign::from_key(k).is_some(), &SIGN_ALIASES)
}

/// Maps an aspect token to its canonical key, or returns it unchanged.
pub fn normalize_aspect(token: &str) -> String {
    lookup(token, |k| AspectType::from_key(k).is_some(), &ASPECT_ALIASES)
}

/// Normalizes every planet, sign and aspect token of a raw chart.
pub fn normalize_chart(mut raw: RawChart) -> RawChart {
    if let Some(planets) = raw.planets.as_mut() {
        for planet in planets.iter_mut() {
            planet.name = planet.name.as_deref().map(normalize_planet);
            planet.sign = planet.sign.as_deref().map(normalize_sign);
        }
    }
    if let Some(aspects) = raw.aspects.as_mut() {
        for aspect in aspects.iter_mut() {
            aspect.body_a = aspect.body_a.as_deref().map(normalize_planet);
            aspect.body_b = aspect.body_b.as_deref().map(normalize_planet);
            aspect.kind = aspect.kind.as_deref().map(normalize_aspect);
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::json_parser::{RawAspect, RawPlanet};

    #[test]
    fn test_localized_planets() {
        assert_eq!(normalize_planet("Luna"), "moon");
        assert_eq!(normalize_planet("SATURNO"), "saturn");
        assert_eq!(normalize_planet("Nodo Norte"), "north_node");
        assert_eq!(normalize_planet("Quirón"), "chiron");
        assert_eq!(normalize_planet("North Node"), "north_node");
    }

    #[test]
    fn test_localized_signs() {
        assert_eq!(normalize_sign("Escorpio"), "scorpio");
        assert_eq!(normalize_sign("Géminis"), "gemini");
        assert_eq!(normalize_sign("Câncer"), "cancer");
        assert_eq!(normalize_sign("Capricorn"), "capricorn");
    }

    #[test]
    fn test_localized_aspects() {
        assert_eq!(normalize_aspect("Conjunción"), "conjunction");
        assert_eq!(normalize_aspect("Trígono"), "trine");
        assert_eq!(normalize_aspect("Quadratura"), "square");
        assert_eq!(normalize_aspect("opposition"), "opposition");
    }

    #[test]
    fn test_unknown_tokens_pass_through_unchanged() {
        assert_eq!(normalize_planet("Vulcano X"), "Vulcano X");
        assert_eq!(normalize_sign("Ophiuchus"), "Ophiuchus");
        assert_eq!(normalize_aspect("Semisextil"), "Semisextil");
    }

    #[test]
    fn test_normalize_chart_rewrites_all_tokens() {
        let raw = RawChart {
            planets: Some(vec![RawPlanet {
                name: Some("Luna".into()),
                sign: Some("Escorpio".into()),
                ..Default::default()
            }]),
            aspects: Some(vec![RawAspect {
                body_a: Some("Luna".into()),
                body_b: Some("Neptuno".into()),
                kind: Some("Conjunción".into()),
                orb: None,
            }]),
            ..Default::default()
        };

        let normalized = normalize_chart(raw);
        let planet = &normalized.planets.as_ref().unwrap()[0];
        assert_eq!(planet.name.as_deref(), Some("moon"));
        assert_eq!(planet.sign.as_deref(), Some("scorpio"));

        let aspect = &normalized.aspects.as_ref().unwrap()[0];
        assert_eq!(aspect.body_b.as_deref(), Some("neptune"));
        assert_eq!(aspect.kind.as_deref(), Some("conjunction"));
    }
}
