//! Heuristic rules engine.
//!
//! A rule is a plain record of an id, a predicate and an evaluator. The engine
//! runs its rules in order; every rule is independent, and a rule whose
//! evaluator fails (returns `Err` or panics) is skipped and reported without
//! affecting the others. When no rule produces an output, a maintenance output
//! is emitted so later stages always have something to work with.

use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::algorithms::analysis::{aspect_nature, ChartAnalysis, PlanetDetail, Stellium};
use crate::algorithms::dignity::{adjust_severity, DignityType};
use crate::core::domain::{AspectNature, Body, Chart, Element};
use crate::error::RuleError;
use crate::logging::PlanLogger;

/// Thematic area a rule signals as needing attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityArea {
    #[serde(rename = "Emotional")]
    Emotional,
    #[serde(rename = "Físico")]
    Physical,
    #[serde(rename = "Mental")]
    Mental,
    #[serde(rename = "Relacional")]
    Relational,
    #[serde(rename = "Energético")]
    Energetic,
    #[serde(rename = "Enraizamiento")]
    Grounding,
    #[serde(rename = "Espiritual")]
    Spiritual,
    #[serde(rename = "Mantenimiento")]
    Maintenance,
}

impl PriorityArea {
    pub fn label(&self) -> &'static str {
        match self {
            PriorityArea::Emotional => "Emotional",
            PriorityArea::Physical => "Físico",
            PriorityArea::Mental => "Mental",
            PriorityArea::Relational => "Relacional",
            PriorityArea::Energetic => "Energético",
            PriorityArea::Grounding => "Enraizamiento",
            PriorityArea::Spiritual => "Espiritual",
            PriorityArea::Maintenance => "Mantenimiento",
        }
    }

    /// Exercise categories that address this area, most relevant first.
    pub fn preferred_categories(&self) -> &'static [&'static str] {
        match self {
            PriorityArea::Emotional => &["journaling", "meditation", "breathwork", "relaxation"],
            PriorityArea::Physical => &["movement", "yoga", "relaxation", "strength"],
            PriorityArea::Mental => &["meditation", "breathwork", "visualization", "journaling"],
            PriorityArea::Relational => &["journaling", "meditation", "movement"],
            PriorityArea::Energetic => &["movement", "cardio", "breathwork", "yoga"],
            PriorityArea::Grounding => &["grounding", "yoga", "movement", "relaxation"],
            PriorityArea::Spiritual => &["meditation", "visualization", "breathwork"],
            PriorityArea::Maintenance => &["breathwork", "meditation", "movement", "journaling"],
        }
    }

    /// Body whose data backs this area, if any.
    pub fn relevant_body(&self) -> Option<&'static str> {
        match self {
            PriorityArea::Emotional => Some("moon"),
            PriorityArea::Mental => Some("mercury"),
            PriorityArea::Relational => Some("venus"),
            PriorityArea::Energetic => Some("mars"),
            PriorityArea::Grounding => Some("saturn"),
            PriorityArea::Spiritual => Some("neptune"),
            PriorityArea::Physical | PriorityArea::Maintenance => None,
        }
    }
}

/// A prioritized, explainable signal emitted by one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutput {
    pub rule_id: String,
    pub priority_area: PriorityArea,
    /// 1 (low) to 3 (high).
    pub severity: u8,
    /// Exercise ids, in order of preference.
    pub suggestions: Vec<String>,
    /// Chart facts that triggered the rule.
    pub indicators: Vec<String>,
    pub rationale: String,
    pub confidence: f64,
}

pub type RulePredicate = fn(&Chart, &ChartAnalysis) -> bool;
pub type RuleEvaluator = fn(&Chart, &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError>;

/// A single rule unit.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub predicate: RulePredicate,
    pub evaluate: RuleEvaluator,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

/// A rule the engine had to skip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRule {
    pub rule_id: String,
    pub reason: String,
}

/// Outcome of one engine run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleReport {
    pub outputs: Vec<RuleOutput>,
    pub skipped: Vec<SkippedRule>,
    pub used_fallback: bool,
}

/// Ordered collection of rules
#[derive(Debug, Clone)]
pub struct RulesEngine {
    rules: Vec<Rule>,
}

impl RulesEngine {
    /// Engine with a custom, ordered rule list. The maintenance fallback still applies.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run every rule in order.
    ///
    /// # Arguments
    /// * `chart` - Sanitized chart
    /// * `analysis` - Analysis of the same chart
    /// * `logger` - Receives one warning per skipped rule
    ///
    /// # Returns
    /// RuleReport whose `outputs` is never empty
    pub fn evaluate(
        &self,
        chart: &Chart,
        analysis: &ChartAnalysis,
        logger: &dyn PlanLogger,
    ) -> RuleReport {
        let mut report = RuleReport::default();

        for rule in &self.rules {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                if (rule.predicate)(chart, analysis) {
                    (rule.evaluate)(chart, analysis)
                } else {
                    Ok(None)
                }
            }));

            match outcome {
                Ok(Ok(Some(output))) => report.outputs.push(output),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    logger.warn(&format!("Rule {} skipped: {}", rule.id, e));
                    report.skipped.push(SkippedRule {
                        rule_id: rule.id.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    logger.warn(&format!("Rule {} skipped: evaluator panicked", rule.id));
                    report.skipped.push(SkippedRule {
                        rule_id: rule.id.to_string(),
                        reason: "evaluator panicked".to_string(),
                    });
                }
            }
        }

        if report.outputs.is_empty() {
            report.outputs.push(maintenance_output(analysis));
            report.used_fallback = true;
        }

        logger.debug(&format!(
            "Rules engine: {} outputs, {} skipped, fallback={}",
            report.outputs.len(),
            report.skipped.len(),
            report.used_fallback
        ));
        report
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::with_rules(builtin_rules())
    }
}

/// Built-in rules, in evaluation order.
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "moon_stress",
            predicate: |_, a| a.has_body("moon") && a.moon_stress() >= 4.0,
            evaluate: moon_stress,
        },
        Rule {
            id: "mercury_pressure",
            predicate: |_, a| {
                a.detail("mercury").is_some_and(|d| {
                    d.hard_aspects >= 2
                        || (d.retrograde && d.hard_aspects >= 1)
                        || d.dignity.kind.is_weak()
                })
            },
            evaluate: mercury_pressure,
        },
        Rule {
            id: "venus_relational",
            predicate: |_, a| {
                a.detail("venus").is_some_and(|d| {
                    d.hard_aspects >= 2 || (d.hard_aspects >= 1 && d.dignity.kind.is_weak())
                })
            },
            evaluate: venus_relational,
        },
        Rule {
            id: "mars_energy",
            predicate: |_, a| {
                a.detail("mars").is_some_and(|d| {
                    d.hard_aspects >= 2 || d.dignity.kind.is_weak() || d.house == 1
                })
            },
            evaluate: mars_energy,
        },
        Rule {
            id: "saturn_structure",
            predicate: |_, a| {
                !saturn_personal_contacts(a).is_empty()
                    || a.weak_dignities.len() >= 3
                    || missing_elements(a).contains(&Element::Earth)
            },
            evaluate: saturn_structure,
        },
        Rule {
            id: "element_imbalance",
            predicate: |_, a| !missing_elements(a).is_empty() || dominant_count(a) >= 5,
            evaluate: element_imbalance,
        },
        Rule {
            id: "stellium_focus",
            predicate: |_, a| !a.stellium_houses.is_empty(),
            evaluate: stellium_focus,
        },
        Rule {
            id: "tension_load",
            predicate: |_, a| {
                a.tensions_count >= 5 || (a.tensions_count >= 3 && a.tensions_count > a.harmonies_count * 2)
            },
            evaluate: tension_load,
        },
        Rule {
            id: "neptune_spiritual",
            predicate: |_, a| {
                a.detail("neptune").is_some_and(|d| {
                    personal_contacts(d).len() >= 2 || matches!(d.house, 9 | 12)
                })
            },
            evaluate: neptune_spiritual,
        },
    ]
}

/// Baseline output used when no rule fires.
pub fn maintenance_output(analysis: &ChartAnalysis) -> RuleOutput {
    let mut indicators = vec!["No chart factor crossed a rule threshold".to_string()];
    if analysis.has_body("moon") {
        indicators.push(format!("Moon stress {:.1}", analysis.moon_stress()));
    }
    indicators.push(format!(
        "{} tensions against {} harmonies",
        analysis.tensions_count, analysis.harmonies_count
    ));

    RuleOutput {
        rule_id: "maintenance".to_string(),
        priority_area: PriorityArea::Maintenance,
        severity: 1,
        suggestions: ids(&[
            "breath-coherent",
            "meditation-body-scan",
            "movement-stretch",
            "journal-gratitude",
        ]),
        indicators,
        rationale: "Balanced chart: keep a gentle, regular practice".to_string(),
        confidence: 0.6,
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => String::new(),
    }
}

fn hard_contact_indicators(body: &str, detail: &PlanetDetail) -> Vec<String> {
    detail
        .aspects
        .iter()
        .filter(|a| a.nature == AspectNature::Hard)
        .map(|a| format!("{} {} {} (orb {:.2})", title(body), a.kind.as_str(), title(&a.with), a.orb))
        .collect()
}

fn dignity_indicator(body: &str, detail: &PlanetDetail) -> Option<String> {
    (detail.dignity.kind != DignityType::Neutral)
        .then(|| format!("{} in {} ({})", title(body), detail.sign, detail.dignity.kind.as_str()))
}

fn base_from_count(count: usize) -> u8 {
    match count {
        0 | 1 => 1,
        2 => 2,
        _ => 3,
    }
}

fn personal_contacts(detail: &PlanetDetail) -> Vec<&str> {
    detail
        .aspects
        .iter()
        .filter(|a| Body::from_key(&a.with).is_some_and(|b| b.is_personal()))
        .map(|a| a.with.as_str())
        .collect()
}

fn saturn_personal_contacts(analysis: &ChartAnalysis) -> Vec<String> {
    analysis
        .detail("saturn")
        .map(|d| {
            d.aspects
                .iter()
                .filter(|a| a.nature == AspectNature::Hard)
                .filter(|a| Body::from_key(&a.with).is_some_and(|b| b.is_personal()))
                .map(|a| format!("Saturn {} {} (orb {:.2})", a.kind.as_str(), title(&a.with), a.orb))
                .collect()
        })
        .unwrap_or_default()
}

fn tallied_planets(analysis: &ChartAnalysis) -> usize {
    analysis.dominances.elements.values().sum()
}

fn missing_elements(analysis: &ChartAnalysis) -> Vec<Element> {
    if tallied_planets(analysis) < 7 {
        return Vec::new();
    }
    Element::ALL
        .iter()
        .copied()
        .filter(|e| analysis.dominances.elements.get(e) == Some(&0))
        .collect()
}

fn dominant_count(analysis: &ChartAnalysis) -> usize {
    analysis
        .dominances
        .elements
        .get(&analysis.dominant_element)
        .copied()
        .unwrap_or(0)
}

/// Exercises that bring in an element.
fn element_suggestions(element: Element) -> Vec<String> {
    match element {
        Element::Fire => ids(&["movement-dance", "yoga-sun-salutation", "cardio-brisk-walk"]),
        Element::Earth => ids(&["grounding-barefoot-walk", "yoga-tree", "relaxation-pmr"]),
        Element::Air => ids(&["breath-box", "breath-coherent", "visualization-inner-sanctuary"]),
        Element::Water => ids(&["yoga-yin", "relaxation-warm-bath", "meditation-loving-kindness"]),
    }
}

/// Element that tempers an excess of `element`.
fn balancing_element(element: Element) -> Element {
    match element {
        Element::Fire => Element::Water,
        Element::Earth => Element::Air,
        Element::Air => Element::Earth,
        Element::Water => Element::Fire,
    }
}

fn moon_stress(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let detail = analysis
        .detail("moon")
        .ok_or_else(|| RuleError::MissingData("moon".to_string()))?;
    let stress = detail
        .stress
        .as_ref()
        .ok_or_else(|| RuleError::MissingData("Moon stress was not computed".to_string()))?;

    let base = if stress.score >= 8.0 {
        3
    } else if stress.score >= 6.0 {
        2
    } else {
        1
    };

    let mut indicators = vec![format!("Moon stress {:.1} ({})", stress.score, stress.level)];
    indicators.extend(hard_contact_indicators("moon", detail));
    indicators.extend(dignity_indicator("moon", detail));

    Ok(Some(RuleOutput {
        rule_id: "moon_stress".to_string(),
        priority_area: PriorityArea::Emotional,
        severity: adjust_severity(base, detail.dignity.kind),
        suggestions: ids(&[
            "breath-478",
            "journal-emotional",
            "meditation-body-scan",
            "relaxation-pmr",
        ]),
        indicators,
        rationale: "Emotional load is high: favor calming, containing practices".to_string(),
        confidence: (0.6 + 0.1 * detail.hard_aspects.min(3) as f64).min(0.9),
    }))
}

fn mercury_pressure(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let Some(detail) = analysis.detail("mercury") else {
        return Ok(None);
    };

    let mut indicators = hard_contact_indicators("mercury", detail);
    if detail.retrograde {
        indicators.push("Mercury retrograde".to_string());
    }
    indicators.extend(dignity_indicator("mercury", detail));

    Ok(Some(RuleOutput {
        rule_id: "mercury_pressure".to_string(),
        priority_area: PriorityArea::Mental,
        severity: adjust_severity(base_from_count(detail.hard_aspects), detail.dignity.kind),
        suggestions: ids(&[
            "breath-box",
            "meditation-mantra",
            "journal-morning-pages",
            "visualization-future-self",
        ]),
        rationale: "Mental overactivity: practices that slow and order thought".to_string(),
        confidence: 0.55 + 0.1 * indicators.len().min(3) as f64,
        indicators,
    }))
}

fn venus_relational(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let Some(detail) = analysis.detail("venus") else {
        return Ok(None);
    };

    let mut indicators = hard_contact_indicators("venus", detail);
    indicators.extend(dignity_indicator("venus", detail));

    Ok(Some(RuleOutput {
        rule_id: "venus_relational".to_string(),
        priority_area: PriorityArea::Relational,
        severity: adjust_severity(base_from_count(detail.hard_aspects), detail.dignity.kind),
        suggestions: ids(&["meditation-loving-kindness", "journal-gratitude", "movement-dance"]),
        rationale: "Relational friction: open the heart and soften judgment".to_string(),
        confidence: 0.55 + 0.1 * indicators.len().min(3) as f64,
        indicators,
    }))
}

fn mars_energy(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let Some(detail) = analysis.detail("mars") else {
        return Ok(None);
    };

    let mut indicators = hard_contact_indicators("mars", detail);
    indicators.extend(dignity_indicator("mars", detail));
    if detail.house == 1 {
        indicators.push("Mars in the first house".to_string());
    }

    Ok(Some(RuleOutput {
        rule_id: "mars_energy".to_string(),
        priority_area: PriorityArea::Energetic,
        severity: adjust_severity(base_from_count(detail.hard_aspects), detail.dignity.kind),
        suggestions: ids(&[
            "movement-shaking",
            "cardio-brisk-walk",
            "yoga-sun-salutation",
            "strength-bodyweight",
        ]),
        rationale: "Surplus or blocked drive: channel it through the body".to_string(),
        confidence: 0.55 + 0.1 * indicators.len().min(3) as f64,
        indicators,
    }))
}

fn saturn_structure(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let mut indicators = saturn_personal_contacts(analysis);
    if analysis.weak_dignities.len() >= 3 {
        indicators.push(format!(
            "{} planets in weak dignity",
            analysis.weak_dignities.len()
        ));
    }
    if missing_elements(analysis).contains(&Element::Earth) {
        indicators.push("No planets in earth signs".to_string());
    }
    if indicators.is_empty() {
        return Err(RuleError::Inconsistent(
            "structure predicate held but no indicator was found".to_string(),
        ));
    }

    let dignity = analysis.dignity_kind("saturn");
    Ok(Some(RuleOutput {
        rule_id: "saturn_structure".to_string(),
        priority_area: PriorityArea::Grounding,
        severity: adjust_severity(base_from_count(indicators.len()), dignity),
        suggestions: ids(&[
            "grounding-barefoot-walk",
            "grounding-5-4-3-2-1",
            "yoga-tree",
            "grounding-root-visualization",
        ]),
        rationale: "Pressure without footing: build stability and routine".to_string(),
        confidence: 0.6 + 0.1 * indicators.len().min(3) as f64,
        indicators,
    }))
}

fn element_imbalance(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let missing = missing_elements(analysis);
    let dominant = dominant_count(analysis);

    let mut indicators: Vec<String> = missing
        .iter()
        .map(|e| format!("No planets in {} signs", e.as_str()))
        .collect();
    if dominant >= 5 {
        indicators.push(format!(
            "{} dominates with {} planets",
            analysis.dominant_element.as_str(),
            dominant
        ));
    }

    let mut suggestions: Vec<String> = missing.iter().flat_map(|e| element_suggestions(*e)).collect();
    if dominant >= 5 {
        for id in element_suggestions(balancing_element(analysis.dominant_element)) {
            if !suggestions.contains(&id) {
                suggestions.push(id);
            }
        }
    }

    let base = (1 + missing.len() + usize::from(dominant >= 6)).min(3) as u8;
    Ok(Some(RuleOutput {
        rule_id: "element_imbalance".to_string(),
        priority_area: PriorityArea::Physical,
        severity: base,
        suggestions,
        rationale: "Elemental imbalance: bring in the missing qualities".to_string(),
        confidence: if tallied_planets(analysis) >= 10 { 0.8 } else { 0.65 },
        indicators,
    }))
}

fn stellium_focus(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let Some(main) = analysis
        .stellium_houses
        .iter()
        .fold(None, |best: Option<&Stellium>, s| match best {
            Some(b) if b.planets.len() >= s.planets.len() => Some(b),
            _ => Some(s),
        })
    else {
        return Ok(None);
    };

    let area = match main.dominant_element {
        Some(Element::Fire) => PriorityArea::Energetic,
        Some(Element::Earth) => PriorityArea::Grounding,
        Some(Element::Air) => PriorityArea::Mental,
        Some(Element::Water) => PriorityArea::Emotional,
        None => PriorityArea::Physical,
    };
    let suggestions = main
        .dominant_element
        .map(|e| element_suggestions(balancing_element(e)))
        .unwrap_or_else(|| ids(&["movement-stretch", "breath-coherent"]));

    let indicators: Vec<String> = analysis
        .stellium_houses
        .iter()
        .map(|s| format!("Stellium in house {}: {}", s.house, s.planets.join(", ")))
        .collect();

    let mut severity = if main.planets.len() >= 4 { 2 } else { 1 };
    if analysis.stellium_houses.len() > 1 {
        severity += 1;
    }

    Ok(Some(RuleOutput {
        rule_id: "stellium_focus".to_string(),
        priority_area: area,
        severity: severity.min(3),
        suggestions,
        indicators,
        rationale: format!(
            "Energy concentrated in house {}: spread it with balancing practices",
            main.house
        ),
        confidence: 0.7,
    }))
}

fn tension_load(chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let mut hard: Vec<_> = chart
        .aspects
        .iter()
        .filter(|a| aspect_nature(a) == AspectNature::Hard)
        .collect();
    if hard.len() != analysis.tensions_count {
        return Err(RuleError::Inconsistent(format!(
            "analysis counts {} tensions but the chart has {}",
            analysis.tensions_count,
            hard.len()
        )));
    }
    hard.sort_by(|a, b| a.orb.total_cmp(&b.orb));

    let mut indicators = vec![format!(
        "{} hard aspects against {} soft",
        analysis.tensions_count, analysis.harmonies_count
    )];
    indicators.extend(hard.iter().take(3).map(|a| {
        format!(
            "{} {} {} (orb {:.2})",
            title(&a.body_a),
            a.kind.as_str(),
            title(&a.body_b),
            a.orb
        )
    }));

    let severity = match analysis.tensions_count {
        t if t >= 8 => 3,
        t if t >= 5 => 2,
        _ => 1,
    };

    Ok(Some(RuleOutput {
        rule_id: "tension_load".to_string(),
        priority_area: PriorityArea::Physical,
        severity,
        suggestions: ids(&["relaxation-pmr", "movement-stretch", "yoga-yin", "breath-coherent"]),
        indicators,
        rationale: "Accumulated tension: release it from the body first".to_string(),
        confidence: 0.65 + (analysis.tensions_count as f64 * 0.02).min(0.25),
    }))
}

fn neptune_spiritual(_chart: &Chart, analysis: &ChartAnalysis) -> Result<Option<RuleOutput>, RuleError> {
    let Some(detail) = analysis.detail("neptune") else {
        return Ok(None);
    };

    let contacts = personal_contacts(detail);
    let mut indicators: Vec<String> = contacts
        .iter()
        .map(|c| format!("Neptune in contact with {}", title(c)))
        .collect();
    if matches!(detail.house, 9 | 12) {
        indicators.push(format!("Neptune in house {}", detail.house));
    }

    Ok(Some(RuleOutput {
        rule_id: "neptune_spiritual".to_string(),
        priority_area: PriorityArea::Spiritual,
        severity: if contacts.len() >= 3 { 2 } else { 1 },
        suggestions: ids(&[
            "meditation-candle",
            "visualization-inner-sanctuary",
            "meditation-mantra",
        ]),
        rationale: "Sensitivity to the subtle: give it a contemplative channel".to_string(),
        confidence: 0.6,
        indicators,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::analysis::analyze_chart;
    use crate::core::domain::{Aspect, AspectType, BirthData, Planet};
    use crate::logging::testing::RecordingLogger;
    use crate::logging::NoopLogger;
    use log::Level;

    fn planet(name: &str, sign: &str, house: u8) -> Planet {
        Planet {
            name: name.into(),
            sign: sign.into(),
            degree: 0.0,
            house,
            retrograde: false,
        }
    }

    fn square(a: &str, b: &str, orb: f64) -> Aspect {
        Aspect {
            body_a: a.into(),
            body_b: b.into(),
            kind: AspectType::Square,
            orb,
        }
    }

    fn stressed_chart() -> Chart {
        Chart {
            planets: vec![
                planet("moon", "scorpio", 9),
                planet("saturn", "aquarius", 12),
                planet("uranus", "leo", 3),
                planet("neptune", "scorpio", 9),
            ],
            aspects: vec![
                square("moon", "saturn", 5.1),
                square("moon", "uranus", 4.97),
                Aspect {
                    body_a: "moon".into(),
                    body_b: "neptune".into(),
                    kind: AspectType::Conjunction,
                    orb: 4.84,
                },
            ],
            birth: BirthData::default(),
        }
    }

    #[test]
    fn test_moon_stress_rule_fires_with_indicators() {
        let chart = stressed_chart();
        let analysis = analyze_chart(&chart);
        let report = RulesEngine::default().evaluate(&chart, &analysis, &NoopLogger);

        let moon = report
            .outputs
            .iter()
            .find(|o| o.rule_id == "moon_stress")
            .unwrap();
        assert_eq!(moon.priority_area, PriorityArea::Emotional);
        assert_eq!(moon.severity, 3);
        assert!(moon.indicators.iter().any(|i| i.contains("Moon square Saturn")));
        assert!(moon.indicators.iter().any(|i| i.contains("fall")));
        assert!(!report.used_fallback);
    }

    #[test]
    fn test_fallback_when_nothing_fires() {
        let chart = Chart {
            planets: vec![planet("sun", "leo", 5)],
            ..Default::default()
        };
        let analysis = analyze_chart(&chart);
        let report = RulesEngine::default().evaluate(&chart, &analysis, &NoopLogger);

        assert!(report.used_fallback);
        assert_eq!(report.outputs.len(), 1);
        assert_eq!(report.outputs[0].priority_area, PriorityArea::Maintenance);
        assert_eq!(report.outputs[0].severity, 1);
        assert!(!report.outputs[0].indicators.is_empty());
    }

    #[test]
    fn test_failing_rules_are_isolated() {
        let rules = vec![
            Rule {
                id: "always_err",
                predicate: |_, _| true,
                evaluate: |_, _| Err(RuleError::MissingData("nothing".into())),
            },
            Rule {
                id: "always_panics",
                predicate: |_, _| true,
                evaluate: |_, _| panic!("boom"),
            },
            Rule {
                id: "moon_stress",
                predicate: |_, a| a.has_body("moon"),
                evaluate: moon_stress,
            },
        ];
        let chart = stressed_chart();
        let analysis = analyze_chart(&chart);
        let logger = RecordingLogger::default();
        let report = RulesEngine::with_rules(rules).evaluate(&chart, &analysis, &logger);

        assert_eq!(report.outputs.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].rule_id, "always_err");
        assert_eq!(report.skipped[1].reason, "evaluator panicked");
        assert_eq!(logger.messages_at(Level::Warn).len(), 2);
    }

    #[test]
    fn test_tension_rule_detects_inconsistent_analysis() {
        let chart = stressed_chart();
        let mut analysis = analyze_chart(&chart);
        analysis.tensions_count = 9;
        assert!(matches!(
            tension_load(&chart, &analysis),
            Err(RuleError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_priority_area_labels_serialize() {
        let json = serde_json::to_string(&PriorityArea::Grounding).unwrap();
        assert_eq!(json, "\"Enraizamiento\"");
        assert_eq!(PriorityArea::Physical.label(), "Físico");
    }

    #[test]
    fn test_every_builtin_output_has_indicators() {
        let mut chart = stressed_chart();
        chart.planets.push(planet("mercury", "pisces", 12));
        chart.planets.push(planet("mars", "cancer", 1));
        chart.aspects.push(square("mars", "saturn", 1.0));
        chart.aspects.push(square("mars", "pluto", 2.0));
        let analysis = analyze_chart(&chart);
        let report = RulesEngine::default().evaluate(&chart, &analysis, &NoopLogger);

        assert!(report.outputs.len() >= 3);
        for output in &report.outputs {
            assert!(!output.indicators.is_empty(), "{}", output.rule_id);
            assert!((1..=3).contains(&output.severity));
            assert!((0.0..=1.0).contains(&output.confidence));
        }
    }
}
