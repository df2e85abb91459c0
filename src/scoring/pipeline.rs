use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::config::AnalysisConfig;
use crate::context::{
    BusinessType, CompetitionTier, Industry, NetworkTier, PageContext, QualityTier,
    ResolvedVertical, TimeOfDay, TrafficSource,
};
use crate::element::{Element, ElementDetail, ElementKind, FieldDetails};
use crate::error::AnalysisError;
use crate::scoring::AttentionScorer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

/// Post-click projection for form-associated elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormProjection {
    pub completion_rate: f64,
    pub projected_leads: f64,
    pub bottleneck_field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickPrediction {
    pub element_id: String,
    /// Percent of impressions that click this element.
    pub ctr: f64,
    /// Always `ctr / 100`.
    pub ctr_decimal: f64,
    pub estimated_clicks: f64,
    /// Percent of all predicted clicks landing on this element.
    pub click_share: f64,
    pub wasted_clicks: f64,
    pub wasted_spend: f64,
    pub confidence: ConfidenceTier,
    pub risk_factors: Vec<String>,
    pub form: Option<FormProjection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMeta {
    pub industry: Industry,
    pub business_type: BusinessType,
    pub industry_detected: bool,
    pub business_detected: bool,
    pub assumed_impressions: f64,
    pub assumed_cpc: f64,
    pub page_ctr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickForecast {
    pub predictions: Vec<ClickPrediction>,
    /// Id of the element selected as primary call-to-action.
    pub primary_cta: Option<String>,
    pub metadata: ForecastMeta,
    pub warnings: Vec<String>,
}

impl ClickForecast {
    pub fn primary_prediction(&self) -> Option<&ClickPrediction> {
        let id = self.primary_cta.as_deref()?;
        self.predictions
            .iter()
            .find(|prediction| prediction.element_id == id)
    }
}

/// Per-element click model over the normalized element set.
#[derive(Debug, Clone)]
pub struct ClickModel {
    attention: AttentionScorer,
    assumed_impressions: f64,
    min_page_ctr: f64,
    max_page_ctr: f64,
    cpc_override: Option<f64>,
}

impl ClickModel {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            attention: AttentionScorer::new(config.attention.clone()),
            assumed_impressions: config.economics.assumed_impressions,
            min_page_ctr: config.economics.min_page_ctr,
            max_page_ctr: config.economics.max_page_ctr,
            cpc_override: config.economics.cpc_override,
        }
    }

    pub fn predict(
        &self,
        elements: &[Element],
        context: &PageContext,
    ) -> Result<ClickForecast, AnalysisError> {
        let vertical = context.resolve_vertical();
        let mut warnings = Vec::new();
        if vertical.industry_detected {
            warnings.push("industry not supplied; auto-detected from page content".to_string());
        }
        if vertical.business_detected {
            warnings
                .push("business type not supplied; auto-detected from page content".to_string());
        }

        let assumed_cpc = self
            .cpc_override
            .unwrap_or_else(|| context.assumed_cpc(vertical.industry));
        let page_ctr = self.page_ctr(context, vertical.industry);
        let metadata = ForecastMeta {
            industry: vertical.industry,
            business_type: vertical.business_type,
            industry_detected: vertical.industry_detected,
            business_detected: vertical.business_detected,
            assumed_impressions: self.assumed_impressions,
            assumed_cpc,
            page_ctr,
        };

        if elements.is_empty() {
            warnings.push("no elements supplied; nothing to predict".to_string());
            return Ok(ClickForecast {
                predictions: Vec::new(),
                primary_cta: None,
                metadata,
                warnings,
            });
        }

        let attention: Vec<f64> = elements
            .iter()
            .map(|element| self.attention.weight(element, context))
            .collect();
        let total_attention: f64 = attention.iter().sum();
        if total_attention <= 0.0 {
            warnings.push("no clickable elements captured any attention".to_string());
        }

        let confidence = confidence_tier(context, &vertical);
        let page_risks = page_risk_factors(context, &vertical);
        let total_clicks = self.assumed_impressions * page_ctr / 100.0;

        let mut predictions: Vec<ClickPrediction> = Vec::with_capacity(elements.len());
        for (element, weight) in elements.iter().zip(attention.iter()) {
            let share = if total_attention > 0.0 {
                weight / total_attention
            } else {
                0.0
            };
            let ctr = page_ctr * share;
            let estimated_clicks = total_clicks * share;

            let mut risk_factors = page_risks.clone();
            if element.autoplay {
                risk_factors.push("autoplay-media".to_string());
            }
            if element.sticky {
                risk_factors.push("sticky-overlay".to_string());
            }

            predictions.push(ClickPrediction {
                element_id: element.id.clone(),
                ctr,
                ctr_decimal: ctr / 100.0,
                estimated_clicks,
                click_share: share * 100.0,
                wasted_clicks: 0.0,
                wasted_spend: 0.0,
                confidence,
                risk_factors,
                form: form_projection(element, elements, estimated_clicks),
            });
        }

        let primary = select_primary(&predictions);

        for (idx, prediction) in predictions.iter_mut().enumerate() {
            if Some(idx) == primary {
                continue;
            }
            let alignment = conversion_alignment(elements[idx].kind());
            prediction.wasted_clicks = prediction.estimated_clicks * (1.0 - alignment);
            prediction.wasted_spend = prediction.wasted_clicks * assumed_cpc;
        }

        Ok(ClickForecast {
            primary_cta: primary.map(|idx| predictions[idx].element_id.clone()),
            predictions,
            metadata,
            warnings,
        })
    }

    fn page_ctr(&self, context: &PageContext, industry: Industry) -> f64 {
        let mut ctr = industry.base_ctr() * context.traffic_source.ctr_multiplier();

        if let Some(load_time) = context.load_time {
            if load_time > 3.0 {
                ctr *= (1.0 - 0.05 * (load_time - 3.0)).max(0.6);
            }
        }
        ctr *= 0.7 + 0.3 * context.message_match_clamped();
        ctr *= 0.85 + 0.3 * context.brand_recognition_clamped();
        if context.trust_badges {
            ctr *= 1.05;
        }
        if context.testimonials {
            ctr *= 1.03;
        }
        if !context.ssl {
            ctr *= 0.9;
        }
        if context.competitor_presence {
            ctr *= 0.95;
        }
        ctr *= match context.time_of_day {
            TimeOfDay::Morning => 1.02,
            TimeOfDay::Afternoon => 1.0,
            TimeOfDay::Evening => 1.05,
            TimeOfDay::Night => 0.92,
        };
        ctr *= match context.quality {
            QualityTier::Premium => 1.05,
            QualityTier::Standard => 1.0,
            QualityTier::Budget => 0.92,
        };
        ctr *= 1.1 - 0.2 * clamp01(context.complexity);

        ctr.clamp(self.min_page_ctr, self.max_page_ctr)
    }
}

/// Index of the prediction with the strictly largest estimated clicks.
///
/// First-match-wins over the canonical element order: later equal values
/// never displace an earlier one. An unordered scan would make the choice
/// nondeterministic, so this is an explicit loop rather than a fold.
fn select_primary(predictions: &[ClickPrediction]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, prediction) in predictions.iter().enumerate() {
        match best {
            None => best = Some(idx),
            Some(current)
                if prediction.estimated_clicks > predictions[current].estimated_clicks =>
            {
                best = Some(idx)
            }
            _ => {}
        }
    }
    best
}

/// How much a click on a non-primary element still advances the visitor
/// toward the conversion action.
fn conversion_alignment(kind: ElementKind) -> f64 {
    match kind {
        ElementKind::Button => 0.3,
        ElementKind::Link => 0.15,
        ElementKind::Form => 0.5,
        ElementKind::FormField => 0.6,
        ElementKind::NavigationLink => 0.0,
        ElementKind::GenericClickable => 0.1,
    }
}

fn confidence_tier(context: &PageContext, vertical: &ResolvedVertical) -> ConfidenceTier {
    let mut defaulted = 0usize;
    if vertical.industry_detected {
        defaulted += 1;
    }
    if vertical.business_detected {
        defaulted += 1;
    }
    if context.traffic_source == TrafficSource::Unknown {
        defaulted += 1;
    }
    if context.load_time.is_none() {
        defaulted += 1;
    }

    match defaulted {
        0 => ConfidenceTier::High,
        1 | 2 => ConfidenceTier::Medium,
        _ => ConfidenceTier::Low,
    }
}

fn page_risk_factors(context: &PageContext, vertical: &ResolvedVertical) -> Vec<String> {
    let mut factors = Vec::new();
    if context.load_time.map(|load| load > 3.0).unwrap_or(false) {
        factors.push("slow-page-load".to_string());
    }
    if context.network == NetworkTier::Slow {
        factors.push("slow-network-audience".to_string());
    }
    if context.message_match_clamped() < 0.5 {
        factors.push("weak-message-match".to_string());
    }
    if vertical.industry_detected {
        factors.push("industry-auto-detected".to_string());
    }
    if context.competition == CompetitionTier::High {
        factors.push("high-competition".to_string());
    }
    if context.brand_recognition_clamped() < 0.3 {
        factors.push("low-brand-recognition".to_string());
    }
    if clamp01(context.complexity) > 0.7 {
        factors.push("heavy-page-complexity".to_string());
    }
    factors
}

/// Completion model for form-associated elements. Friction accumulates per
/// field; the worst field is the bottleneck.
fn form_projection(
    element: &Element,
    elements: &[Element],
    estimated_clicks: f64,
) -> Option<FormProjection> {
    let form_associated = match &element.detail {
        ElementDetail::Form { .. } => true,
        ElementDetail::Button { form_action } => form_action.is_some(),
        _ => false,
    };
    if !form_associated {
        return None;
    }

    let fields: Vec<&Element> = elements
        .iter()
        .filter(|candidate| candidate.kind() == ElementKind::FormField)
        .collect();
    let field_count = match &element.detail {
        ElementDetail::Form { field_count, .. } if *field_count > 0 => *field_count,
        _ => fields.len(),
    };

    let mut bottleneck: Option<(&Element, f64)> = None;
    let mut total_friction = 0.0;
    for field in &fields {
        let friction = field.field_details().map(field_friction).unwrap_or(0.0);
        total_friction += friction;
        match bottleneck {
            None => bottleneck = Some((field, friction)),
            Some((_, worst)) if friction > worst => bottleneck = Some((field, friction)),
            _ => {}
        }
    }
    let avg_friction = if fields.is_empty() {
        0.3
    } else {
        total_friction / fields.len() as f64
    };

    let completion_rate =
        (0.55 - 0.03 * field_count as f64 - 0.25 * avg_friction).clamp(0.05, 0.75);

    Some(FormProjection {
        completion_rate,
        projected_leads: estimated_clicks * completion_rate,
        bottleneck_field: bottleneck.map(|(field, _)| field.id.clone()),
    })
}

fn field_friction(details: &FieldDetails) -> f64 {
    let mut friction = match details.input_type.as_str() {
        "tel" | "phone" => 0.5,
        "textarea" | "message" => 0.35,
        "email" => 0.25,
        "select" | "select-one" => 0.2,
        "checkbox" | "radio" => 0.1,
        _ => 0.2,
    };
    if details.required {
        friction += 0.15;
    }
    if details.placeholder.is_none() {
        friction += 0.1;
    }
    if details.pattern.is_some() {
        friction += 0.1;
    }
    if details.autocomplete.is_none() {
        friction += 0.05;
    }
    clamp01(friction)
}

/// Predict per-element click performance for a normalized element set.
pub fn predict_clicks(
    elements: &[Element],
    context: &PageContext,
    config: &AnalysisConfig,
) -> Result<ClickForecast, AnalysisError> {
    ClickModel::new(config).predict(elements, context)
}
