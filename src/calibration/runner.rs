use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::context::PageContext;
use crate::normalize::{normalize_elements, RawElement};
use crate::scoring::predict_clicks;

/// One captured page with observed per-element click counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub page_url: String,
    pub context: PageContext,
    pub elements: Vec<RawElement>,
    pub observed: Vec<ObservedClicks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedClicks {
    pub element_id: String,
    pub clicks: u64,
}

impl CalibrationSample {
    /// Observed click share per element id; empty when no clicks were seen.
    pub fn observed_shares(&self) -> HashMap<String, f64> {
        let total: u64 = self.observed.iter().map(|entry| entry.clicks).sum();
        if total == 0 {
            return HashMap::new();
        }
        self.observed
            .iter()
            .map(|entry| {
                (
                    entry.element_id.clone(),
                    entry.clicks as f64 / total as f64,
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalibrationMetrics {
    pub share_correlation: f64,
    pub share_mae: f64,
    pub pairwise_ranking_accuracy: f64,
    pub element_count: usize,
    pub sample_count: usize,
}

pub struct CalibrationRunner {
    pub samples: Vec<CalibrationSample>,
}

impl CalibrationRunner {
    pub fn new(samples: Vec<CalibrationSample>) -> Self {
        Self { samples }
    }

    pub fn compute_metrics(&self, config: &AnalysisConfig) -> CalibrationMetrics {
        if self.samples.is_empty() {
            return CalibrationMetrics::default();
        }

        let mut pairs: Vec<(f64, f64)> = Vec::new();
        for sample in &self.samples {
            let elements = normalize_elements(&sample.elements, sample.context.fold_offset);
            let Ok(forecast) = predict_clicks(&elements, &sample.context, config) else {
                continue;
            };
            let observed = sample.observed_shares();
            for prediction in &forecast.predictions {
                if let Some(actual) = observed.get(&prediction.element_id) {
                    pairs.push((prediction.click_share / 100.0, *actual));
                }
            }
        }

        let (predicted, actual): (Vec<f64>, Vec<f64>) = pairs.iter().cloned().unzip();
        let errors: Vec<f64> = pairs
            .iter()
            .map(|(predicted, actual)| (predicted - actual).abs())
            .collect();

        CalibrationMetrics {
            share_correlation: correlation(&pairs),
            share_mae: mean(&errors),
            pairwise_ranking_accuracy: pairwise_accuracy(&predicted, &actual),
            element_count: pairs.len(),
            sample_count: self.samples.len(),
        }
    }
}

fn correlation(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().cloned().unzip();
    let mean_x = mean(&xs);
    let mean_y = mean(&ys);

    let mut numerator = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x <= 0.0 || denom_y <= 0.0 {
        return 0.0;
    }

    numerator / (denom_x.sqrt() * denom_y.sqrt())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn pairwise_accuracy(predicted: &[f64], actual: &[f64]) -> f64 {
    let mut correct = 0usize;
    let mut total = 0usize;

    for i in 0..predicted.len() {
        for j in (i + 1)..predicted.len() {
            let pred_order = predicted[i].partial_cmp(&predicted[j]);
            let actual_order = actual[i].partial_cmp(&actual[j]);
            if let (Some(pred), Some(act)) = (pred_order, actual_order) {
                if pred == act {
                    correct += 1;
                }
                total += 1;
            }
        }
    }

    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}
