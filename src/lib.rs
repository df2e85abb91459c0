pub mod calibration;
pub mod config;
pub mod context;
pub mod element;
pub mod error;
pub mod funnel;
pub mod normalize;
pub mod recommend;
pub mod scoring;

use serde::{Deserialize, Serialize};

pub use crate::config::AnalysisConfig;
pub use crate::context::PageContext;
pub use crate::element::{Element, ElementDetail, ElementKind, FieldDetails, Geometry};
pub use crate::error::AnalysisError;
pub use crate::normalize::{dedup_elements, normalize_elements, RawElement};
pub use crate::recommend::{build_recommendations, generate_recommendation, Recommendation};
pub use crate::scoring::{
    analyze_wasted_clicks, predict_clicks, ClickForecast, ClickPrediction, ConfidenceTier,
    WasteAnalysis, WasteScore,
};

/// Full pipeline result for one captured page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub forecast: ClickForecast,
    pub waste: Option<WasteAnalysis>,
    pub recommendation: Option<Recommendation>,
    pub grouped_recommendations: Vec<Recommendation>,
}

/// Run the whole pipeline: click prediction, wasted-attention scoring and
/// recommendation synthesis. Waste and recommendations are skipped (not
/// failed) when no primary CTA emerges, e.g. on an empty element set.
pub fn analyze_page(
    elements: &[Element],
    context: &PageContext,
    config: &AnalysisConfig,
) -> Result<PageAnalysis, AnalysisError> {
    let forecast = predict_clicks(elements, context, config)?;

    let Some(primary_id) = forecast.primary_cta.clone() else {
        return Ok(PageAnalysis {
            forecast,
            waste: None,
            recommendation: None,
            grouped_recommendations: Vec::new(),
        });
    };
    let primary = elements
        .iter()
        .find(|element| element.id == primary_id)
        .ok_or_else(|| AnalysisError::validation("primary CTA id missing from element set"))?;

    let waste = analyze_wasted_clicks(elements, primary, &forecast.predictions, config)?;

    let baseline = forecast
        .primary_prediction()
        .map(|prediction| match &prediction.form {
            Some(projection) => prediction.ctr_decimal * projection.completion_rate,
            None => prediction.ctr_decimal,
        })
        .unwrap_or(0.0);
    let recommendation = generate_recommendation(
        &waste,
        &primary.text,
        baseline,
        context.form_related,
        context.device,
    )?;
    let grouped_recommendations = build_recommendations(&waste, &forecast, context);

    Ok(PageAnalysis {
        forecast,
        waste: Some(waste),
        recommendation: Some(recommendation),
        grouped_recommendations,
    })
}

pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub(crate) fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
