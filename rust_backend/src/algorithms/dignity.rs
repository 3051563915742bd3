//! Essential dignities of the ten planets.
//!
//! The table is static: each planet has sign sets for domicile (+2),
//! exaltation (+1), fall (-1) and detriment (-2). Any other pairing is
//! neutral. Lookups are case-sensitive on canonical keys.

use serde::{Deserialize, Serialize};

use crate::core::domain::{Body, Sign};

/// Dignity classification of a planet in a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DignityType {
    Domicile,
    Exaltation,
    Fall,
    Detriment,
    Neutral,
}

impl DignityType {
    /// Strength in `[-2, 2]`.
    pub fn strength(&self) -> i8 {
        match self {
            DignityType::Domicile => 2,
            DignityType::Exaltation => 1,
            DignityType::Neutral => 0,
            DignityType::Fall => -1,
            DignityType::Detriment => -2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DignityType::Domicile => "domicile",
            DignityType::Exaltation => "exaltation",
            DignityType::Fall => "fall",
            DignityType::Detriment => "detriment",
            DignityType::Neutral => "neutral",
        }
    }

    pub fn is_weak(&self) -> bool {
        matches!(self, DignityType::Fall | DignityType::Detriment)
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, DignityType::Domicile | DignityType::Exaltation)
    }

    /// Adjustment applied to a rule severity when the relevant planet holds this dignity.
    pub fn severity_modifier(&self) -> f64 {
        match self {
            DignityType::Detriment => 1.0,
            DignityType::Fall => 0.5,
            DignityType::Domicile => -0.5,
            DignityType::Exaltation => -0.25,
            DignityType::Neutral => 0.0,
        }
    }
}

/// Dignity lookup result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DignityInfo {
    #[serde(rename = "type")]
    pub kind: DignityType,
    pub strength: i8,
    pub description: String,
}

impl DignityInfo {
    fn new(kind: DignityType, planet: &str, sign: &str) -> Self {
        let description = match kind {
            DignityType::Domicile => format!("{} rules {} and acts with full strength", planet, sign),
            DignityType::Exaltation => format!("{} is exalted in {}", planet, sign),
            DignityType::Fall => format!("{} is in fall in {}", planet, sign),
            DignityType::Detriment => format!("{} is in detriment in {}", planet, sign),
            DignityType::Neutral => format!("{} holds no essential dignity in {}", planet, sign),
        };
        Self {
            kind,
            strength: kind.strength(),
            description,
        }
    }

    pub fn neutral(planet: &str, sign: &str) -> Self {
        Self::new(DignityType::Neutral, planet, sign)
    }
}

struct DignityRow {
    domicile: &'static [Sign],
    exaltation: &'static [Sign],
    fall: &'static [Sign],
    detriment: &'static [Sign],
}

fn row(body: Body) -> Option<DignityRow> {
    use Sign::*;
    let row = match body {
        Body::Sun => DignityRow {
            domicile: &[Leo],
            exaltation: &[Aries],
            fall: &[Libra],
            detriment: &[Aquarius],
        },
        Body::Moon => DignityRow {
            domicile: &[Cancer],
            exaltation: &[Taurus],
            fall: &[Scorpio],
            detriment: &[Capricorn],
        },
        Body::Mercury => DignityRow {
            domicile: &[Gemini, Virgo],
            exaltation: &[Virgo],
            fall: &[Pisces],
            detriment: &[Sagittarius, Pisces],
        },
        Body::Venus => DignityRow {
            domicile: &[Taurus, Libra],
            exaltation: &[Pisces],
            fall: &[Virgo],
            detriment: &[Scorpio, Aries],
        },
        Body::Mars => DignityRow {
            domicile: &[Aries, Scorpio],
            exaltation: &[Capricorn],
            fall: &[Cancer],
            detriment: &[Libra, Taurus],
        },
        Body::Jupiter => DignityRow {
            domicile: &[Sagittarius, Pisces],
            exaltation: &[Cancer],
            fall: &[Capricorn],
            detriment: &[Gemini, Virgo],
        },
        Body::Saturn => DignityRow {
            domicile: &[Capricorn, Aquarius],
            exaltation: &[Libra],
            fall: &[Aries],
            detriment: &[Cancer, Leo],
        },
        Body::Uranus => DignityRow {
            domicile: &[Aquarius],
            exaltation: &[Scorpio],
            fall: &[Taurus],
            detriment: &[Leo],
        },
        Body::Neptune => DignityRow {
            domicile: &[Pisces],
            exaltation: &[Cancer],
            fall: &[Capricorn],
            detriment: &[Virgo],
        },
        Body::Pluto => DignityRow {
            domicile: &[Scorpio],
            exaltation: &[Aries],
            fall: &[Libra],
            detriment: &[Taurus],
        },
        _ => return None,
    };
    Some(row)
}

/// Looks up the essential dignity of `planet` in `sign`.
///
/// Sets are checked domicile, exaltation, detriment, fall, so a sign listed
/// twice (Mercury in Virgo, Mercury in Pisces) resolves to the first match.
/// Unknown planets, unknown signs and unmatched pairs are neutral.
///
/// # Examples
///
/// ```
/// use astroplan_rust::algorithms::dignity::{dignity_of, DignityType};
///
/// assert_eq!(dignity_of("moon", "scorpio").kind, DignityType::Fall);
/// assert_eq!(dignity_of("mars", "aries").strength, 2);
/// assert_eq!(dignity_of("chiron", "leo").kind, DignityType::Neutral);
/// ```
pub fn dignity_of(planet: &str, sign: &str) -> DignityInfo {
    let (Some(body), Some(zodiac)) = (Body::from_key(planet), Sign::from_key(sign)) else {
        return DignityInfo::neutral(planet, sign);
    };
    let Some(row) = row(body) else {
        return DignityInfo::neutral(planet, sign);
    };

    let kind = if row.domicile.contains(&zodiac) {
        DignityType::Domicile
    } else if row.exaltation.contains(&zodiac) {
        DignityType::Exaltation
    } else if row.detriment.contains(&zodiac) {
        DignityType::Detriment
    } else if row.fall.contains(&zodiac) {
        DignityType::Fall
    } else {
        DignityType::Neutral
    };

    DignityInfo::new(kind, planet, sign)
}

/// Applies a dignity modifier to a base severity, keeping the result in `1..=3`.
pub fn adjust_severity(base: u8, dignity: DignityType) -> u8 {
    (base as f64 + dignity.severity_modifier()).round().clamp(1.0, 3.0) as u8
}
