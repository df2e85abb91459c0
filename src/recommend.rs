use serde::{Deserialize, Serialize};

use crate::context::{DeviceType, PageContext};
use crate::error::AnalysisError;
use crate::scoring::pipeline::ClickForecast;
use crate::scoring::waste::{WasteAnalysis, WasteClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    QuickWins,
    FormFixes,
    StructuralChanges,
}

impl RecommendationCategory {
    pub fn label(self) -> &'static str {
        match self {
            RecommendationCategory::QuickWins => "quick wins",
            RecommendationCategory::FormFixes => "form fixes",
            RecommendationCategory::StructuralChanges => "structural changes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub effort: Tier,
    pub impact: Tier,
    pub priority: Tier,
    pub confidence: Tier,
    /// Element ids proposed for removal; the high-risk subset exactly.
    pub remove_elements: Vec<String>,
    pub estimated_improvement_pct: f64,
    pub projected_rate: f64,
}

/// Single-recommendation mode: one highest-impact change, naming the
/// high-risk elements for removal.
///
/// A resolvable primary CTA is a hard precondition; everything else
/// degrades to defaults.
pub fn generate_recommendation(
    waste: &WasteAnalysis,
    primary_cta_text: &str,
    baseline_rate: f64,
    is_form_related: bool,
    device: DeviceType,
) -> Result<Recommendation, AnalysisError> {
    if primary_cta_text.trim().is_empty() {
        return Err(AnalysisError::validation(
            "no primary call-to-action could be resolved for this page",
        ));
    }

    let remove_elements: Vec<String> = waste
        .high_risk_elements
        .iter()
        .map(|score| score.element_id.clone())
        .collect();

    let estimated_improvement_pct = estimate_improvement(waste);
    let projected_rate = baseline_rate * (1.0 + estimated_improvement_pct / 100.0);

    let effort = removal_effort(waste);
    let impact = improvement_impact(estimated_improvement_pct);
    let priority = combined_priority(impact, effort);
    let confidence = aggregation_confidence(waste);

    let rate_noun = if is_form_related {
        "conversion rate"
    } else {
        "click-through rate"
    };
    let device_clause = match device {
        DeviceType::Mobile => " Competing targets cost the most on mobile viewports.",
        _ => "",
    };
    let description = if remove_elements.is_empty() {
        format!(
            "No element rises to high-risk attention waste around \"{}\". Keep the layout focused; projected {} stays near {:.2}.{}",
            primary_cta_text, rate_noun, projected_rate, device_clause
        )
    } else {
        format!(
            "Remove or demote {} element(s) competing with \"{}\" to recover wasted attention. Projected {} improves roughly {:.1}% to {:.2}.{}",
            remove_elements.len(),
            primary_cta_text,
            rate_noun,
            estimated_improvement_pct,
            projected_rate,
            device_clause
        )
    };

    Ok(Recommendation {
        category: RecommendationCategory::QuickWins,
        title: format!("Focus attention on \"{}\"", primary_cta_text),
        description,
        effort,
        impact,
        priority,
        confidence,
        remove_elements,
        estimated_improvement_pct,
        projected_rate,
    })
}

/// Grouped mode: quick wins, form fixes and structural changes ranked by
/// priority, then impact.
pub fn build_recommendations(
    waste: &WasteAnalysis,
    forecast: &ClickForecast,
    context: &PageContext,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let decorative: Vec<String> = waste
        .high_risk_elements
        .iter()
        .filter(|score| score.classification == WasteClass::Decorative)
        .map(|score| score.element_id.clone())
        .collect();
    if !decorative.is_empty() {
        recommendations.push(Recommendation {
            category: RecommendationCategory::QuickWins,
            title: "Remove distracting media and overlays".to_string(),
            description: format!(
                "{} decorative or autoplaying element(s) pull attention without advancing the visitor. Removing them is low-effort and immediately recovers focus.",
                decorative.len()
            ),
            effort: Tier::Low,
            impact: Tier::Medium,
            priority: Tier::High,
            confidence: aggregation_confidence(waste),
            remove_elements: decorative,
            estimated_improvement_pct: estimate_improvement(waste) * 0.4,
            projected_rate: 0.0,
        });
    }

    let competing: Vec<String> = waste
        .scores
        .iter()
        .filter(|score| score.classification == WasteClass::CompetingCta)
        .map(|score| score.element_id.clone())
        .collect();
    if !competing.is_empty() {
        recommendations.push(Recommendation {
            category: RecommendationCategory::QuickWins,
            title: "Demote competing calls-to-action".to_string(),
            description: format!(
                "{} element(s) repeat or rival the primary call-to-action. Restyle them as secondary actions so one path dominates.",
                competing.len()
            ),
            effort: Tier::Low,
            impact: Tier::High,
            priority: Tier::High,
            confidence: aggregation_confidence(waste),
            remove_elements: competing,
            estimated_improvement_pct: estimate_improvement(waste) * 0.6,
            projected_rate: 0.0,
        });
    }

    if context.form_related {
        if let Some(projection) = forecast
            .primary_prediction()
            .and_then(|prediction| prediction.form.as_ref())
        {
            let bottleneck = projection
                .bottleneck_field
                .clone()
                .map(|field| format!(" Start with the highest-friction field ({}).", field))
                .unwrap_or_default();
            recommendations.push(Recommendation {
                category: RecommendationCategory::FormFixes,
                title: "Reduce form friction".to_string(),
                description: format!(
                    "Predicted completion is {:.0}%. Cut or defer optional fields.{}",
                    projection.completion_rate * 100.0,
                    bottleneck
                ),
                effort: Tier::Medium,
                impact: if projection.completion_rate < 0.35 {
                    Tier::High
                } else {
                    Tier::Medium
                },
                priority: Tier::High,
                confidence: aggregation_confidence(waste),
                remove_elements: Vec::new(),
                estimated_improvement_pct: (0.6 - projection.completion_rate).max(0.0) * 50.0,
                projected_rate: 0.0,
            });
        }
    }

    let navigational = waste
        .scores
        .iter()
        .filter(|score| score.classification == WasteClass::NavigationalNoise)
        .count();
    if navigational >= 3 {
        recommendations.push(Recommendation {
            category: RecommendationCategory::StructuralChanges,
            title: "Simplify page navigation".to_string(),
            description: format!(
                "{} navigational element(s) leak attention away from the conversion path. Collapse the menu or strip it from this landing page entirely.",
                navigational
            ),
            effort: Tier::High,
            impact: Tier::Medium,
            priority: Tier::Medium,
            confidence: aggregation_confidence(waste),
            remove_elements: Vec::new(),
            estimated_improvement_pct: estimate_improvement(waste) * 0.3,
            projected_rate: 0.0,
        });
    }

    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.impact.cmp(&a.impact))
    });
    recommendations
}

/// Each high-risk element is assumed to hand back a slice of its siphoned
/// attention to the primary CTA when removed.
fn estimate_improvement(waste: &WasteAnalysis) -> f64 {
    let from_high_risk: f64 = waste
        .high_risk_elements
        .iter()
        .map(|score| score.score * 12.0)
        .sum();
    if from_high_risk > 0.0 {
        return from_high_risk.min(45.0);
    }
    (waste.average_wasted_score * 8.0).min(15.0)
}

fn removal_effort(waste: &WasteAnalysis) -> Tier {
    let count = waste.high_risk_elements.len();
    let mut effort = match count {
        0..=2 => Tier::Low,
        3..=5 => Tier::Medium,
        _ => Tier::High,
    };
    let touches_navigation = waste
        .high_risk_elements
        .iter()
        .any(|score| score.classification == WasteClass::NavigationalNoise);
    if touches_navigation && effort == Tier::Low {
        effort = Tier::Medium;
    }
    effort
}

fn improvement_impact(improvement_pct: f64) -> Tier {
    if improvement_pct >= 20.0 {
        Tier::High
    } else if improvement_pct >= 8.0 {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn combined_priority(impact: Tier, effort: Tier) -> Tier {
    match (impact, effort) {
        (Tier::High, Tier::Low) | (Tier::High, Tier::Medium) => Tier::High,
        (Tier::High, Tier::High) | (Tier::Medium, _) => Tier::Medium,
        (Tier::Low, _) => Tier::Low,
    }
}

fn aggregation_confidence(waste: &WasteAnalysis) -> Tier {
    if waste.average_wasted_score >= 0.6 {
        Tier::High
    } else if waste.average_wasted_score >= 0.4 {
        Tier::Medium
    } else {
        Tier::Low
    }
}
