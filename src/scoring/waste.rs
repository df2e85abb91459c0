use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::clamp01;
use crate::config::AnalysisConfig;
use crate::element::{Element, ElementKind};
use crate::error::AnalysisError;
use crate::scoring::pipeline::ClickPrediction;
use crate::scoring::attention::noise_intensity;

/// Feature weights for the wasted-attention score. Tunable via config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteWeights {
    pub prominence: f64,
    pub proximity: f64,
    pub intent_overlap: f64,
    pub noise: f64,
}

impl Default for WasteWeights {
    fn default() -> Self {
        Self {
            prominence: 0.30,
            proximity: 0.20,
            intent_overlap: 0.30,
            noise: 0.20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteThresholds {
    pub low_risk: f64,
    pub high_risk: f64,
}

impl Default for WasteThresholds {
    fn default() -> Self {
        Self {
            low_risk: 0.25,
            high_risk: 0.55,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteClass {
    CompetingCta,
    NavigationalNoise,
    Decorative,
    LowRisk,
}

impl WasteClass {
    pub fn label(self) -> &'static str {
        match self {
            WasteClass::CompetingCta => "competing-cta",
            WasteClass::NavigationalNoise => "navigational-noise",
            WasteClass::Decorative => "decorative",
            WasteClass::LowRisk => "low-risk",
        }
    }
}

/// Contributing factor breakdown, each component in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteFactors {
    pub prominence: f64,
    pub proximity: f64,
    pub intent_overlap: f64,
    pub noise: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteScore {
    pub element_id: String,
    pub score: f64,
    pub classification: WasteClass,
    pub factors: WasteFactors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteAnalysis {
    /// Count of elements scored above the low-risk threshold.
    pub total_wasted_elements: usize,
    /// Mean score over that subset; 0 when the subset is empty.
    pub average_wasted_score: f64,
    /// Scores above the high-risk threshold, descending.
    pub high_risk_elements: Vec<WasteScore>,
    /// Every scored non-primary element, in canonical order.
    pub scores: Vec<WasteScore>,
}

/// Scores how strongly non-primary elements siphon attention from the
/// primary call-to-action. Pure and deterministic given its inputs.
#[derive(Debug, Clone)]
pub struct WasteScorer {
    weights: WasteWeights,
    thresholds: WasteThresholds,
}

impl WasteScorer {
    pub fn new(weights: WasteWeights, thresholds: WasteThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn analyze(
        &self,
        elements: &[Element],
        primary: &Element,
        predictions: &[ClickPrediction],
    ) -> Result<WasteAnalysis, AnalysisError> {
        if !elements.iter().any(|element| element.id == primary.id) {
            return Err(AnalysisError::validation(
                "primary CTA is not part of the element set",
            ));
        }

        let shares: HashMap<&str, f64> = predictions
            .iter()
            .map(|prediction| (prediction.element_id.as_str(), prediction.click_share))
            .collect();
        let primary_share = shares.get(primary.id.as_str()).copied().unwrap_or(0.0);

        let mut scores = Vec::new();
        for element in elements {
            if element.id == primary.id || !element.is_clickable() {
                continue;
            }
            let share = shares.get(element.id.as_str()).copied().unwrap_or(0.0);
            scores.push(self.score_element(element, primary, share, primary_share));
        }

        let wasted: Vec<&WasteScore> = scores
            .iter()
            .filter(|score| score.score > self.thresholds.low_risk)
            .collect();
        let total_wasted_elements = wasted.len();
        let average_wasted_score = if wasted.is_empty() {
            0.0
        } else {
            wasted.iter().map(|score| score.score).sum::<f64>() / wasted.len() as f64
        };

        let mut high_risk_elements: Vec<WasteScore> = scores
            .iter()
            .filter(|score| score.score > self.thresholds.high_risk)
            .cloned()
            .collect();
        high_risk_elements.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(WasteAnalysis {
            total_wasted_elements,
            average_wasted_score,
            high_risk_elements,
            scores,
        })
    }

    fn score_element(
        &self,
        element: &Element,
        primary: &Element,
        click_share: f64,
        primary_share: f64,
    ) -> WasteScore {
        let factors = WasteFactors {
            prominence: prominence_factor(element, primary, click_share, primary_share),
            proximity: proximity_factor(element, primary),
            intent_overlap: intent_overlap(&element.text, &primary.text),
            noise: noise_intensity(element),
        };

        let weighted = [
            (self.weights.prominence * factors.prominence, Facet::Prominence),
            (self.weights.proximity * factors.proximity, Facet::Proximity),
            (self.weights.intent_overlap * factors.intent_overlap, Facet::Intent),
            (self.weights.noise * factors.noise, Facet::Noise),
        ];
        let score = clamp01(weighted.iter().map(|(value, _)| value).sum());

        let classification = if score <= self.thresholds.low_risk {
            WasteClass::LowRisk
        } else if element.kind() == ElementKind::NavigationLink {
            WasteClass::NavigationalNoise
        } else {
            match dominant_facet(&weighted) {
                Facet::Prominence | Facet::Intent => WasteClass::CompetingCta,
                Facet::Proximity => WasteClass::NavigationalNoise,
                Facet::Noise => WasteClass::Decorative,
            }
        };

        WasteScore {
            element_id: element.id.clone(),
            score,
            classification,
            factors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    Prominence,
    Proximity,
    Intent,
    Noise,
}

fn dominant_facet(weighted: &[(f64, Facet); 4]) -> Facet {
    let mut best = weighted[0];
    for candidate in &weighted[1..] {
        if candidate.0 > best.0 {
            best = *candidate;
        }
    }
    best.1
}

/// Visual mass relative to the primary CTA: area ratio, predicted click
/// share ratio, styling and fold bonuses.
fn prominence_factor(
    element: &Element,
    primary: &Element,
    click_share: f64,
    primary_share: f64,
) -> f64 {
    let primary_area = primary.geometry.area().max(1.0);
    let relative_area = clamp01(element.geometry.area() / primary_area / 2.0);
    let relative_clicks = if primary_share > 0.0 {
        clamp01(click_share / primary_share)
    } else {
        0.0
    };

    let mut bonus = 0.0;
    if element.button_styled {
        bonus += 0.3;
    }
    if element.above_fold {
        bonus += 0.2;
    }

    clamp01(0.45 * relative_area + 0.35 * relative_clicks + bonus * 0.4)
}

/// Exponential falloff over center distance; nearby elements leak the most
/// attention.
fn proximity_factor(element: &Element, primary: &Element) -> f64 {
    let distance = element.geometry.center_distance(&primary.geometry);
    let scale = (primary.geometry.height.max(primary.geometry.width) * 6.0).max(300.0);
    clamp01((-distance / scale).exp())
}

/// Token overlap between two labels, plus a boost when both read as
/// call-to-action verbs. Near-duplicate CTAs dilute focus the most.
fn intent_overlap(text: &str, primary_text: &str) -> f64 {
    let left = token_set(text);
    let right = token_set(primary_text);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.iter().filter(|token| right.contains(*token)).count();
    let union = left.len() + right.len() - shared;
    let jaccard = if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    };

    let cta_verbs = [
        "get", "start", "try", "buy", "sign", "download", "subscribe", "book", "request", "join",
    ];
    let left_cta = cta_verbs.iter().any(|verb| text.to_lowercase().contains(verb));
    let right_cta = cta_verbs
        .iter()
        .any(|verb| primary_text.to_lowercase().contains(verb));
    let verb_boost = if left_cta && right_cta { 0.35 } else { 0.0 };

    clamp01(jaccard + verb_boost)
}

fn token_set(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() > 1)
        .map(|token| token.to_string())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

/// Score every non-primary interactive element for wasted attention.
pub fn analyze_wasted_clicks(
    elements: &[Element],
    primary: &Element,
    predictions: &[ClickPrediction],
    config: &AnalysisConfig,
) -> Result<WasteAnalysis, AnalysisError> {
    WasteScorer::new(config.waste.clone(), config.waste_thresholds.clone())
        .analyze(elements, primary, predictions)
}
