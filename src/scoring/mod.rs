pub mod attention;
pub mod pipeline;
pub mod waste;

pub use attention::{AttentionScorer, AttentionWeights};
pub use pipeline::{
    predict_clicks, ClickForecast, ClickModel, ClickPrediction, ConfidenceTier, ForecastMeta,
    FormProjection,
};
pub use waste::{
    analyze_wasted_clicks, WasteAnalysis, WasteClass, WasteFactors, WasteScore, WasteScorer,
    WasteThresholds, WasteWeights,
};
