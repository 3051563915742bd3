//! Domain models for natal charts: bodies, signs, aspects and their groupings.
//!
//! The types here describe a chart that has already passed normalization and
//! sanitization. Names and signs are stored as canonical lowercase keys so that
//! charts carrying tokens the dictionaries do not know still flow through the
//! pipeline; typed views (`Body`, `Sign`) are obtained on demand.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Celestial bodies and chart points recognized by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    NorthNode,
    SouthNode,
    Chiron,
    Lilith,
    Ascendant,
    Midheaven,
}

impl Body {
    /// Every recognized body, in canonical order.
    pub const ALL: [Body; 16] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::NorthNode,
        Body::SouthNode,
        Body::Chiron,
        Body::Lilith,
        Body::Ascendant,
        Body::Midheaven,
    ];

    /// The ten classical and modern planets a complete chart is expected to carry.
    pub const PLANETS: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Canonical key used throughout the chart model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
            Body::NorthNode => "north_node",
            Body::SouthNode => "south_node",
            Body::Chiron => "chiron",
            Body::Lilith => "lilith",
            Body::Ascendant => "ascendant",
            Body::Midheaven => "midheaven",
        }
    }

    /// Parses a canonical key.
    ///
    /// # Examples
    ///
    /// ```
    /// use astroplan_rust::core::domain::Body;
    ///
    /// assert_eq!(Body::from_key("north_node"), Some(Body::NorthNode));
    /// assert_eq!(Body::from_key("Luna"), None);
    /// ```
    pub fn from_key(key: &str) -> Option<Body> {
        Body::ALL.iter().copied().find(|b| b.as_str() == key)
    }

    /// Returns `true` for the ten planets counted in completeness and element tallies.
    pub fn is_planet(&self) -> bool {
        Body::PLANETS.contains(self)
    }

    /// Returns `true` for chart angles, which never form part of a house concentration.
    pub fn is_angle(&self) -> bool {
        matches!(self, Body::Ascendant | Body::Midheaven)
    }

    pub fn is_personal(&self) -> bool {
        matches!(
            self,
            Body::Sun | Body::Moon | Body::Mercury | Body::Venus | Body::Mars
        )
    }

    /// Slow-moving bodies whose contacts to the Moon add ambivalence to its stress score.
    pub fn is_slow(&self) -> bool {
        matches!(
            self,
            Body::Jupiter | Body::Saturn | Body::Uranus | Body::Neptune | Body::Pluto | Body::Chiron
        )
    }

    /// Bodies whose conjunctions read as tension once the orb widens.
    pub fn is_hard_context(&self) -> bool {
        matches!(
            self,
            Body::Mars | Body::Saturn | Body::Uranus | Body::Pluto | Body::Lilith
        )
    }
}

/// The four elements, declared in canonical tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Earth, Element::Air, Element::Water];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Water => "water",
        }
    }
}

/// The three modalities, declared in canonical tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Cardinal, Modality::Fixed, Modality::Mutable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Cardinal => "cardinal",
            Modality::Fixed => "fixed",
            Modality::Mutable => "mutable",
        }
    }
}

/// Zodiac signs in ecliptic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sign::Aries => "aries",
            Sign::Taurus => "taurus",
            Sign::Gemini => "gemini",
            Sign::Cancer => "cancer",
            Sign::Leo => "leo",
            Sign::Virgo => "virgo",
            Sign::Libra => "libra",
            Sign::Scorpio => "scorpio",
            Sign::Sagittarius => "sagittarius",
            Sign::Capricorn => "capricorn",
            Sign::Aquarius => "aquarius",
            Sign::Pisces => "pisces",
        }
    }

    pub fn from_key(key: &str) -> Option<Sign> {
        Sign::ALL.iter().copied().find(|s| s.as_str() == key)
    }

    /// Element of the sign, following the fire/earth/air/water cycle from Aries.
    ///
    /// # Examples
    ///
    /// ```
    /// use astroplan_rust::core::domain::{Element, Sign};
    ///
    /// assert_eq!(Sign::Scorpio.element(), Element::Water);
    /// assert_eq!(Sign::Capricorn.element(), Element::Earth);
    /// ```
    pub fn element(&self) -> Element {
        Element::ALL[self.index() % 4]
    }

    /// Modality of the sign, following the cardinal/fixed/mutable cycle from Aries.
    pub fn modality(&self) -> Modality {
        Modality::ALL[self.index() % 3]
    }

    /// The unique sign combining an element and a modality.
    pub fn from_parts(element: Element, modality: Modality) -> Sign {
        Sign::ALL
            .iter()
            .copied()
            .find(|s| s.element() == element && s.modality() == modality)
            .unwrap_or(Sign::Aries)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Aspect types understood by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectType {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
    Quincunx,
}

impl AspectType {
    pub const ALL: [AspectType; 6] = [
        AspectType::Conjunction,
        AspectType::Opposition,
        AspectType::Trine,
        AspectType::Square,
        AspectType::Sextile,
        AspectType::Quincunx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectType::Conjunction => "conjunction",
            AspectType::Opposition => "opposition",
            AspectType::Trine => "trine",
            AspectType::Square => "square",
            AspectType::Sextile => "sextile",
            AspectType::Quincunx => "quincunx",
        }
    }

    pub fn from_key(key: &str) -> Option<AspectType> {
        AspectType::ALL.iter().copied().find(|a| a.as_str() == key)
    }
}

/// Tension/harmony classification of a single aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectNature {
    Hard,
    Soft,
    Neutral,
}

/// A body placed in a sign and house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub name: String,
    pub sign: String,
    pub degree: f64,
    pub house: u8,
    pub retrograde: bool,
}

impl Planet {
    /// Typed view of `name`; `None` for tokens the normalizer did not recognize.
    pub fn body(&self) -> Option<Body> {
        Body::from_key(&self.name)
    }

    /// Typed view of `sign`; `None` for tokens the normalizer did not recognize.
    pub fn zodiac(&self) -> Option<Sign> {
        Sign::from_key(&self.sign)
    }
}

/// An angular relationship between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aspect {
    pub body_a: String,
    pub body_b: String,
    #[serde(rename = "type")]
    pub kind: AspectType,
    pub orb: f64,
}

impl Aspect {
    pub fn involves(&self, body: &str) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Returns the body on the other side of the aspect, if `body` takes part in it.
    pub fn other(&self, body: &str) -> Option<&str> {
        if self.body_a == body {
            Some(&self.body_b)
        } else if self.body_b == body {
            Some(&self.body_a)
        } else {
            None
        }
    }
}

/// Birth metadata. Only the presence of `time` influences analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthData {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub place: Option<String>,
}

/// A sanitized natal chart: every planet has a canonical name, a house in
/// `1..=12` and a degree in `[0, 360)`; every aspect has two bodies and a
/// recognized type.
///
/// # Examples
///
/// ```
/// use astroplan_rust::core::domain::{Aspect, AspectType, BirthData, Chart, Planet};
///
/// let chart = Chart {
///     planets: vec![Planet {
///         name: "moon".to_string(),
///         sign: "scorpio".to_string(),
///         degree: 215.0,
///         house: 9,
///         retrograde: false,
///     }],
///     aspects: vec![Aspect {
///         body_a: "moon".to_string(),
///         body_b: "saturn".to_string(),
///         kind: AspectType::Square,
///         orb: 5.1,
///     }],
///     birth: BirthData::default(),
/// };
///
/// assert_eq!(chart.planet("moon").map(|p| p.house), Some(9));
/// assert_eq!(chart.aspects_of("moon").count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub planets: Vec<Planet>,
    pub aspects: Vec<Aspect>,
    #[serde(default)]
    pub birth: BirthData,
}

impl Chart {
    pub fn planet(&self, key: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.name == key)
    }

    pub fn aspects_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Aspect> + 'a {
        self.aspects.iter().filter(move |a| a.involves(key))
    }

    pub fn has_birth_time(&self) -> bool {
        self.birth.time.is_some()
    }
}
