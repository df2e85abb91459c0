pub mod steps;

use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::config::FunnelConfig;

pub use steps::{derive_step_factors, predict_step_from_captures, FunnelPrediction, StepCapture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Warmth {
    Cold,
    Warm,
    Hot,
}

impl Warmth {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "cold" => Some(Warmth::Cold),
            "warm" => Some(Warmth::Warm),
            "hot" => Some(Warmth::Hot),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Warmth::Cold => "cold",
            Warmth::Warm => "warm",
            Warmth::Hot => "hot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMode {
    Multiplicative,
    Logit,
}

impl CombinationMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "multiplicative" | "product" => Some(CombinationMode::Multiplicative),
            "logit" | "log_odds" | "log-odds" => Some(CombinationMode::Logit),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CombinationMode::Multiplicative => "multiplicative",
            CombinationMode::Logit => "logit",
        }
    }
}

/// One qualitative implementation factor for a funnel step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostClickFactor {
    pub name: String,
    /// How well the page currently implements this factor, [0, 1].
    pub score: f64,
    /// Ceiling multiplicative contribution when fully realized.
    pub max_lift: f64,
    pub note: Option<String>,
}

impl PostClickFactor {
    pub fn new(name: impl Into<String>, score: f64, max_lift: f64) -> Self {
        Self {
            name: name.into(),
            score: clamp01(score),
            max_lift: max_lift.max(0.0),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// score 0 contributes nothing (1.0); score 1 contributes the full lift.
    pub fn multiplier(&self) -> f64 {
        1.0 + clamp01(self.score) * self.max_lift.max(0.0)
    }

    /// Unrealized lift still on the table.
    pub fn opportunity(&self) -> f64 {
        (1.0 - clamp01(self.score)) * self.max_lift.max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostClickStep {
    pub name: String,
    /// Conversion rate this step achieves on cold traffic, [0, 1].
    pub cold_base_rate: f64,
    pub warmth: Warmth,
    pub upper_cap: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostClickPrediction {
    pub predicted_rate: f64,
    pub warmth_multiplier: f64,
    pub factor_multiplier: f64,
    pub capped: bool,
    pub confidence: f64,
    pub factors: Vec<PostClickFactor>,
}

/// Product of per-factor multipliers; the empty list is the identity 1.0.
pub fn combine_factor_multipliers(factors: &[PostClickFactor], _mode: CombinationMode) -> f64 {
    factors
        .iter()
        .map(PostClickFactor::multiplier)
        .product::<f64>()
}

const LOGIT_EPSILON: f64 = 1e-6;

/// Predict the step conversion rate from its factors and audience warmth.
pub fn predict_step_rate(
    step: &PostClickStep,
    mode: CombinationMode,
    factors: &[PostClickFactor],
    config: &FunnelConfig,
) -> PostClickPrediction {
    let warmth_multiplier = config.warmth_multiplier(step.warmth);
    let factor_multiplier = combine_factor_multipliers(factors, mode);
    let base = clamp01(step.cold_base_rate);

    let raw = match mode {
        CombinationMode::Multiplicative => base * warmth_multiplier * factor_multiplier,
        // Shift the warmth-adjusted rate in log-odds space instead of
        // multiplying probabilities directly; large lifts compress as the
        // rate approaches 1.0 and the result stays inside [0, 1].
        CombinationMode::Logit => {
            let p0 = (base * warmth_multiplier).clamp(LOGIT_EPSILON, 1.0 - LOGIT_EPSILON);
            let odds = p0 / (1.0 - p0) * factor_multiplier.powf(config.logit_gain);
            odds / (1.0 + odds)
        }
    };

    let mut rate = clamp01(raw);
    let mut capped = false;
    let mut at_cap = false;
    if let Some(cap) = step.upper_cap {
        let cap = clamp01(cap);
        if rate > cap {
            rate = cap;
            capped = true;
        }
        at_cap = rate >= cap;
    }

    PostClickPrediction {
        predicted_rate: rate,
        warmth_multiplier,
        factor_multiplier,
        capped,
        confidence: prediction_confidence(factors, at_cap, step.warmth),
        factors: factors.to_vec(),
    }
}

/// Base 0.7, raised by well-implemented factors, penalized at the cap and
/// for cold traffic. Clamped to [0.3, 1.0].
fn prediction_confidence(factors: &[PostClickFactor], at_cap: bool, warmth: Warmth) -> f64 {
    let mut confidence = 0.7;
    if !factors.is_empty() {
        let strong = factors.iter().filter(|factor| factor.score > 0.7).count();
        confidence += 0.2 * (strong as f64 / factors.len() as f64);
    }
    if at_cap {
        confidence -= 0.15;
    }
    match warmth {
        Warmth::Warm => confidence += 0.05,
        Warmth::Cold => confidence -= 0.10,
        Warmth::Hot => {}
    }
    confidence.clamp(0.3, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorPriority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorRecommendation {
    pub factor: String,
    pub opportunity: f64,
    pub priority: FactorPriority,
    pub advice: String,
}

/// Rank factors by unrealized lift and emit up to three recommendations.
pub fn derive_factor_recommendations(factors: &[PostClickFactor]) -> Vec<FactorRecommendation> {
    let mut ranked: Vec<&PostClickFactor> = factors.iter().collect();
    ranked.sort_by(|a, b| {
        b.opportunity()
            .partial_cmp(&a.opportunity())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
        .into_iter()
        .filter(|factor| factor.opportunity() > 0.05)
        .take(3)
        .map(|factor| {
            let opportunity = factor.opportunity();
            let priority = if opportunity > high_priority_threshold(&factor.name) {
                FactorPriority::High
            } else {
                FactorPriority::Medium
            };
            FactorRecommendation {
                factor: factor.name.clone(),
                opportunity,
                priority,
                advice: factor_advice(&factor.name),
            }
        })
        .collect()
}

fn high_priority_threshold(name: &str) -> f64 {
    match name {
        "message_match" => 0.15,
        "form_friction" => 0.20,
        "cta_clarity" => 0.12,
        _ => 0.15,
    }
}

fn factor_advice(name: &str) -> String {
    match name {
        "message_match" => {
            "Carry the previous step's promise through word-for-word in the headline.".to_string()
        }
        "form_friction" => {
            "Cut optional fields; defer everything not needed to create the lead.".to_string()
        }
        "page_speed" => {
            "Get the step under a two-second load; compress media and defer scripts.".to_string()
        }
        "mobile_optimization" => {
            "Rework the layout for thumb reach and a single-column flow.".to_string()
        }
        "cta_clarity" => {
            "Keep one visually dominant call-to-action and demote the rest.".to_string()
        }
        "trust_signals" => {
            "Surface badges, testimonials or guarantees next to the commitment point.".to_string()
        }
        "commitment_momentum" => {
            "Acknowledge the step the visitor just took and keep the momentum going.".to_string()
        }
        other => format!("Improve the {} implementation on this step.", other),
    }
}
