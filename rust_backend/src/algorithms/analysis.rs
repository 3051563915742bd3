use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::dignity::{dignity_of, DignityInfo, DignityType};
use crate::config::AnalysisSettings;
use crate::core::domain::{
    Aspect, AspectNature, AspectType, Body, Chart, Element, Modality, Planet,
};

/// Moon stress before any aspect or dignity contribution.
pub const BASE_MOON_STRESS: f64 = 2.0;

/// Orb beyond which a conjunction to a hard-context body reads as tension.
const WIDE_CONJUNCTION_ORB: f64 = 3.0;

const EXPECTED_PLANETS: f64 = 10.0;
const EXPECTED_ASPECTS: f64 = 8.0;

/// Data-completeness score and the reasons for every deduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Element and modality tallies over the ten planets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dominances {
    pub elements: BTreeMap<Element, usize>,
    pub modalities: BTreeMap<Modality, usize>,
}

/// One aspect as seen from a given body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectSummary {
    pub with: String,
    #[serde(rename = "type")]
    pub kind: AspectType,
    pub orb: f64,
    pub nature: AspectNature,
}

/// Moon stress score with the contributions that built it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonStress {
    pub score: f64,
    pub level: String,
    pub contributions: Vec<String>,
}

/// Per-body analysis block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDetail {
    pub sign: String,
    pub house: u8,
    pub degree: f64,
    pub retrograde: bool,
    pub dignity: DignityInfo,
    pub hard_aspects: usize,
    pub soft_aspects: usize,
    pub aspects: Vec<AspectSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<MoonStress>,
}

/// A planet whose dignity is notably weak or strong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DignityEntry {
    pub planet: String,
    pub sign: String,
    pub dignity: DignityType,
    pub strength: i8,
}

/// A house holding three or more bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stellium {
    pub house: u8,
    pub planets: Vec<String>,
    pub dominant_sign: String,
    pub dominant_element: Option<Element>,
}

/// Everything the rules engine needs to know about a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAnalysis {
    pub confidence: Confidence,
    pub dominances: Dominances,
    pub dominant_element: Element,
    pub secondary_element: Element,
    pub dominant_modality: Modality,
    /// Keyed by canonical body name.
    pub details: BTreeMap<String, PlanetDetail>,
    pub weak_dignities: Vec<DignityEntry>,
    pub strong_dignities: Vec<DignityEntry>,
    pub stellium_houses: Vec<Stellium>,
    pub tensions_count: usize,
    pub harmonies_count: usize,
    pub notes: Vec<String>,
}

impl ChartAnalysis {
    pub fn detail(&self, body: &str) -> Option<&PlanetDetail> {
        self.details.get(body)
    }

    pub fn has_body(&self, body: &str) -> bool {
        self.details.contains_key(body)
    }

    /// Moon stress score, or `0.0` when the chart has no Moon.
    pub fn moon_stress(&self) -> f64 {
        self.detail("moon")
            .and_then(|d| d.stress.as_ref())
            .map(|s| s.score)
            .unwrap_or(0.0)
    }

    pub fn dignity_kind(&self, body: &str) -> DignityType {
        self.detail(body)
            .map(|d| d.dignity.kind)
            .unwrap_or(DignityType::Neutral)
    }
}

/// Classifies an aspect as hard, soft or neutral.
///
/// Conjunctions are context dependent: a wide conjunction (orb above 3°)
/// involving Mars, Saturn, Uranus, Pluto or Lilith is hard, any other
/// conjunction is soft. Quincunxes are neutral.
///
/// # Examples
///
/// ```
/// use astroplan_rust::algorithms::analysis::aspect_nature;
/// use astroplan_rust::core::domain::{Aspect, AspectNature, AspectType};
///
/// let aspect = |other: &str, kind, orb| Aspect {
///     body_a: "moon".into(),
///     body_b: other.into(),
///     kind,
///     orb,
/// };
///
/// assert_eq!(aspect_nature(&aspect("saturn", AspectType::Square, 5.1)), AspectNature::Hard);
/// assert_eq!(aspect_nature(&aspect("neptune", AspectType::Conjunction, 4.84)), AspectNature::Soft);
/// assert_eq!(aspect_nature(&aspect("saturn", AspectType::Conjunction, 4.0)), AspectNature::Hard);
/// assert_eq!(aspect_nature(&aspect("saturn", AspectType::Conjunction, 2.0)), AspectNature::Soft);
/// ```
pub fn aspect_nature(aspect: &Aspect) -> AspectNature {
    match aspect.kind {
        AspectType::Square | AspectType::Opposition => AspectNature::Hard,
        AspectType::Trine | AspectType::Sextile => AspectNature::Soft,
        AspectType::Quincunx => AspectNature::Neutral,
        AspectType::Conjunction => {
            let hard_context = [&aspect.body_a, &aspect.body_b]
                .iter()
                .filter_map(|name| Body::from_key(name))
                .any(|b| b.is_hard_context());
            if hard_context && aspect.orb > WIDE_CONJUNCTION_ORB {
                AspectNature::Hard
            } else {
                AspectNature::Soft
            }
        }
    }
}

/// Qualitative label for a Moon stress score.
pub fn stress_level(score: f64) -> &'static str {
    if score < 4.0 {
        "bajo"
    } else if score < 6.0 {
        "moderado"
    } else if score < 8.0 {
        "alto"
    } else {
        "alto/crítico"
    }
}

/// Chart analyzer
pub struct ChartAnalyzer {
    working_orb: f64,
}

impl ChartAnalyzer {
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            working_orb: settings.working_orb,
        }
    }

    /// Analyze a sanitized chart.
    ///
    /// # Arguments
    /// * `chart` - Chart that went through preprocessing
    ///
    /// # Returns
    /// ChartAnalysis with dominances, per-body details, stelliums and confidence
    pub fn analyze(&self, chart: &Chart) -> ChartAnalysis {
        let mut notes = Vec::new();

        let dominances = tally_dominances(chart);
        let (dominant_element, secondary_element) = rank_elements(&dominances.elements);
        let dominant_modality = Modality::ALL
            .iter()
            .copied()
            .fold(Modality::Cardinal, |best, m| {
                if dominances.modalities[&m] > dominances.modalities[&best] {
                    m
                } else {
                    best
                }
            });
        if dominances.elements.values().all(|&c| c == 0) {
            notes.push("No planet with a recognized sign; element balance defaults to fire".to_string());
        }

        let mut tensions_count = 0;
        let mut harmonies_count = 0;
        for aspect in &chart.aspects {
            match aspect_nature(aspect) {
                AspectNature::Hard => tensions_count += 1,
                AspectNature::Soft => harmonies_count += 1,
                AspectNature::Neutral => {}
            }
        }

        let mut details = BTreeMap::new();
        let mut weak_dignities = Vec::new();
        let mut strong_dignities = Vec::new();

        for planet in &chart.planets {
            let Some(body) = planet.body() else {
                notes.push(format!("Unrecognized body '{}' excluded from analysis", planet.name));
                continue;
            };
            if body.is_angle() {
                continue;
            }

            let dignity = dignity_of(&planet.name, &planet.sign);
            if body.is_planet() {
                let entry = DignityEntry {
                    planet: planet.name.clone(),
                    sign: planet.sign.clone(),
                    dignity: dignity.kind,
                    strength: dignity.strength,
                };
                if dignity.kind.is_weak() {
                    weak_dignities.push(entry);
                } else if dignity.kind.is_strong() {
                    strong_dignities.push(entry);
                }
            }

            let aspects: Vec<AspectSummary> = chart
                .aspects_of(&planet.name)
                .filter_map(|a| {
                    a.other(&planet.name).map(|other| AspectSummary {
                        with: other.to_string(),
                        kind: a.kind,
                        orb: a.orb,
                        nature: aspect_nature(a),
                    })
                })
                .collect();
            let hard_aspects = aspects.iter().filter(|a| a.nature == AspectNature::Hard).count();
            let soft_aspects = aspects.iter().filter(|a| a.nature == AspectNature::Soft).count();

            let stress = (body == Body::Moon).then(|| self.moon_stress(chart, dignity.kind));
            if let Some(stress) = &stress {
                notes.push(format!("Moon stress {:.1} ({})", stress.score, stress.level));
            }

            details.insert(
                planet.name.clone(),
                PlanetDetail {
                    sign: planet.sign.clone(),
                    house: planet.house,
                    degree: planet.degree,
                    retrograde: planet.retrograde,
                    dignity,
                    hard_aspects,
                    soft_aspects,
                    aspects,
                    stress,
                },
            );
        }

        let stellium_houses = detect_stelliums(chart);
        for stellium in &stellium_houses {
            notes.push(format!(
                "Stellium in house {} ({})",
                stellium.house,
                stellium.planets.join(", ")
            ));
        }

        ChartAnalysis {
            confidence: confidence(chart),
            dominances,
            dominant_element,
            secondary_element,
            dominant_modality,
            details,
            weak_dignities,
            strong_dignities,
            stellium_houses,
            tensions_count,
            harmonies_count,
            notes,
        }
    }

    /// Moon stress: base 2.0, +2.5 per square or opposition, +1.5 per hard
    /// conjunction, +0.5 per soft contact to a slow body, each only within the
    /// working orb; then +2 in detriment or +1 in fall, clamped to `[0, 10]`.
    fn moon_stress(&self, chart: &Chart, dignity: DignityType) -> MoonStress {
        let mut score = BASE_MOON_STRESS;
        let mut contributions = vec![format!("base {:.1}", BASE_MOON_STRESS)];

        for aspect in chart.aspects_of("moon") {
            if aspect.orb > self.working_orb {
                continue;
            }
            let Some(other) = aspect.other("moon") else {
                continue;
            };
            let slow = Body::from_key(other).map(|b| b.is_slow()).unwrap_or(false);

            let weight = match (aspect.kind, aspect_nature(aspect)) {
                (AspectType::Square, _) | (AspectType::Opposition, _) => 2.5,
                (AspectType::Conjunction, AspectNature::Hard) => 1.5,
                (_, AspectNature::Soft) if slow => 0.5,
                _ => 0.0,
            };
            if weight > 0.0 {
                score += weight;
                contributions.push(format!(
                    "{} {} (orb {:.2}) +{:.1}",
                    aspect.kind.as_str(),
                    other,
                    aspect.orb,
                    weight
                ));
            }
        }

        let penalty = match dignity {
            DignityType::Detriment => 2.0,
            DignityType::Fall => 1.0,
            _ => 0.0,
        };
        if penalty > 0.0 {
            score += penalty;
            contributions.push(format!("{} +{:.1}", dignity.as_str(), penalty));
        }

        let score = score.clamp(0.0, 10.0);
        MoonStress {
            score,
            level: stress_level(score).to_string(),
            contributions,
        }
    }
}

impl Default for ChartAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

/// Analyze a chart with default settings
pub fn analyze_chart(chart: &Chart) -> ChartAnalysis {
    ChartAnalyzer::default().analyze(chart)
}

fn tally_dominances(chart: &Chart) -> Dominances {
    let mut elements: BTreeMap<Element, usize> = Element::ALL.iter().map(|e| (*e, 0)).collect();
    let mut modalities: BTreeMap<Modality, usize> = Modality::ALL.iter().map(|m| (*m, 0)).collect();

    for planet in &chart.planets {
        if !planet.body().map(|b| b.is_planet()).unwrap_or(false) {
            continue;
        }
        if let Some(sign) = planet.zodiac() {
            *elements.entry(sign.element()).or_insert(0) += 1;
            *modalities.entry(sign.modality()).or_insert(0) += 1;
        }
    }

    Dominances {
        elements,
        modalities,
    }
}

/// Dominant and secondary elements; ties go to the earlier element in
/// fire, earth, air, water order.
fn rank_elements(counts: &BTreeMap<Element, usize>) -> (Element, Element) {
    let best_of = |skip: Option<Element>| {
        Element::ALL
            .iter()
            .copied()
            .filter(|e| Some(*e) != skip)
            .fold(None::<Element>, |best, e| match best {
                Some(b) if counts[&b] >= counts[&e] => Some(b),
                _ => Some(e),
            })
            .unwrap_or(Element::Fire)
    };

    let dominant = best_of(None);
    (dominant, best_of(Some(dominant)))
}

fn detect_stelliums(chart: &Chart) -> Vec<Stellium> {
    let mut by_house: BTreeMap<u8, Vec<&Planet>> = BTreeMap::new();
    for planet in &chart.planets {
        let Some(body) = planet.body() else {
            continue;
        };
        if body.is_angle() {
            continue;
        }
        by_house.entry(planet.house).or_default().push(planet);
    }

    by_house
        .into_iter()
        .filter(|(_, members)| members.len() >= 3)
        .map(|(house, members)| {
            let mut sign_counts: Vec<(&str, usize)> = Vec::new();
            for member in &members {
                match sign_counts.iter_mut().find(|(s, _)| *s == member.sign) {
                    Some((_, count)) => *count += 1,
                    None => sign_counts.push((member.sign.as_str(), 1)),
                }
            }
            let dominant_sign = sign_counts
                .iter()
                .fold(None::<(&str, usize)>, |best, &(s, c)| match best {
                    Some((_, bc)) if bc >= c => best,
                    _ => Some((s, c)),
                })
                .map(|(s, _)| s.to_string())
                .unwrap_or_default();

            let mut element_counts: BTreeMap<Element, usize> = BTreeMap::new();
            for sign in members.iter().filter_map(|m| m.zodiac()) {
                *element_counts.entry(sign.element()).or_insert(0) += 1;
            }
            let dominant_element = Element::ALL
                .iter()
                .copied()
                .filter(|e| element_counts.contains_key(e))
                .fold(None::<Element>, |best, e| match best {
                    Some(b) if element_counts[&b] >= element_counts[&e] => Some(b),
                    _ => Some(e),
                });

            Stellium {
                house,
                planets: members.iter().map(|m| m.name.clone()).collect(),
                dominant_sign,
                dominant_element,
            }
        })
        .collect()
}

/// Weighted completeness: birth time 0.25, planets 0.35, aspects 0.25,
/// Moon aspects 0.15.
fn confidence(chart: &Chart) -> Confidence {
    let mut reasons = Vec::new();

    let birth_time = if chart.has_birth_time() {
        1.0
    } else {
        reasons.push("missing time of birth".to_string());
        0.0
    };

    let present = Body::PLANETS
        .iter()
        .filter(|b| chart.planet(b.as_str()).is_some())
        .count();
    if present < EXPECTED_PLANETS as usize {
        reasons.push(format!("only {} of 10 planets present", present));
    }

    let aspect_count = chart.aspects.len();
    if (aspect_count as f64) < EXPECTED_ASPECTS {
        reasons.push(format!("only {} aspects available", aspect_count));
    }

    let moon_aspects = chart.aspects_of("moon").count();
    if moon_aspects == 0 {
        reasons.push("Moon has no aspects".to_string());
    }

    let score = 0.25 * birth_time
        + 0.35 * (present as f64 / EXPECTED_PLANETS)
        + 0.25 * (aspect_count as f64 / EXPECTED_ASPECTS).min(1.0)
        + if moon_aspects > 0 { 0.15 } else { 0.0 };

    Confidence {
        score: (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0,
        reasons,
    }
}
