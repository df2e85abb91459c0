use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::config::FunnelConfig;
use crate::funnel::{
    predict_step_rate, CombinationMode, PostClickFactor, PostClickPrediction, PostClickStep,
};

/// Lightweight capture of one funnel step's page, used to derive factor
/// scores by comparing consecutive steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepCapture {
    pub url: String,
    pub headline: String,
    pub cta_text: String,
    pub cta_count: usize,
    pub form_field_count: usize,
    pub required_field_count: usize,
    pub load_time: Option<f64>,
    pub mobile_optimized: bool,
    pub trust_badges: bool,
    pub testimonials: bool,
    pub body_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelPrediction {
    pub step: PostClickPrediction,
    /// Rate through both captured steps when chained with an upstream rate.
    pub end_to_end_rate: Option<f64>,
}

/// Derive factor scores from comparative heuristics between two consecutive
/// step captures, in place of externally supplied factors.
pub fn derive_step_factors(first: &StepCapture, second: &StepCapture) -> Vec<PostClickFactor> {
    vec![
        message_match_factor(first, second),
        form_friction_factor(second),
        page_speed_factor(second),
        mobile_factor(second),
        cta_clarity_factor(second),
        trust_factor(second),
        momentum_factor(first),
    ]
}

/// Predict the second step's conversion rate from the two captures.
pub fn predict_step_from_captures(
    step: &PostClickStep,
    first: &StepCapture,
    second: &StepCapture,
    mode: CombinationMode,
    config: &FunnelConfig,
    upstream_rate: Option<f64>,
) -> FunnelPrediction {
    let factors = derive_step_factors(first, second);
    let prediction = predict_step_rate(step, mode, &factors, config);
    let end_to_end_rate = upstream_rate.map(|rate| clamp01(rate) * prediction.predicted_rate);
    FunnelPrediction {
        step: prediction,
        end_to_end_rate,
    }
}

/// How consistently the promise made on step one carries into step two.
fn message_match_factor(first: &StepCapture, second: &StepCapture) -> PostClickFactor {
    let promise = format!("{} {}", first.headline, first.cta_text);
    let landing = format!("{} {}", second.headline, second.body_text);
    let overlap = token_overlap(&promise, &landing);
    PostClickFactor::new("message_match", clamp01(0.2 + overlap), 0.35)
        .with_note("headline/CTA continuity between the two steps")
}

fn form_friction_factor(second: &StepCapture) -> PostClickFactor {
    let fields = second.form_field_count as f64;
    let mut score = clamp01(1.0 - fields / 12.0);
    if second.form_field_count > 0 {
        let required_ratio =
            second.required_field_count as f64 / second.form_field_count as f64;
        score = clamp01(score - 0.2 * required_ratio);
    }
    PostClickFactor::new("form_friction", score, 0.40)
        .with_note("field count and required-field burden on the step")
}

fn page_speed_factor(second: &StepCapture) -> PostClickFactor {
    let score = match second.load_time {
        Some(load) if load <= 2.0 => 1.0,
        Some(load) => clamp01((8.0 - load) / 6.0),
        None => 0.5,
    };
    PostClickFactor::new("page_speed", score, 0.25).with_note("measured step load time")
}

fn mobile_factor(second: &StepCapture) -> PostClickFactor {
    let score = if second.mobile_optimized { 0.9 } else { 0.3 };
    PostClickFactor::new("mobile_optimization", score, 0.20)
        .with_note("mobile layout quality of the step")
}

fn cta_clarity_factor(second: &StepCapture) -> PostClickFactor {
    let mut score = match second.cta_count {
        0 => 0.2,
        1 => 0.9,
        2 => 0.6,
        _ => 0.3,
    };
    let words = second.cta_text.split_whitespace().count();
    if words > 0 && words <= 4 {
        score = clamp01(score + 0.1);
    }
    PostClickFactor::new("cta_clarity", score, 0.30)
        .with_note("single dominant call-to-action versus competing ones")
}

fn trust_factor(second: &StepCapture) -> PostClickFactor {
    let mut score = 0.2;
    if second.trust_badges {
        score += 0.4;
    }
    if second.testimonials {
        score += 0.4;
    }
    PostClickFactor::new("trust_signals", score, 0.15)
        .with_note("badges and testimonials present on the step")
}

/// Commitment carried over from the first step: explicit action verbs in
/// its CTA indicate the visitor already self-selected.
fn momentum_factor(first: &StepCapture) -> PostClickFactor {
    let commitment_verbs = ["start", "get", "sign", "request", "book", "join", "claim"];
    let cta = first.cta_text.to_lowercase();
    let committed = commitment_verbs.iter().any(|verb| cta.contains(verb));
    let score = if committed { 0.75 } else { 0.4 };
    PostClickFactor::new("commitment_momentum", score, 0.20)
        .with_note("commitment signalled by the first step's call-to-action")
}

fn token_overlap(left: &str, right: &str) -> f64 {
    let left_tokens = tokens(left);
    let right_tokens = tokens(right);
    if left_tokens.is_empty() {
        return 0.0;
    }
    let shared = left_tokens
        .iter()
        .filter(|token| right_tokens.contains(*token))
        .count();
    shared as f64 / left_tokens.len() as f64
}

fn tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() > 2)
        .map(|token| token.to_string())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}
