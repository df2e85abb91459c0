use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::calibration::runner::CalibrationSample;
use crate::config::AnalysisConfig;
use crate::normalize::normalize_elements;
use crate::scoring::{predict_clicks, AttentionWeights};

/// Seeded random-restart search over the attention weights, minimizing the
/// click-share RMSE against observed samples.
pub struct WeightTuner {
    pub calibration_data: Vec<CalibrationSample>,
}

impl WeightTuner {
    pub fn new(calibration_data: Vec<CalibrationSample>) -> Self {
        Self { calibration_data }
    }

    pub fn tune(&self, initial_weights: AttentionWeights, config: &AnalysisConfig) -> AttentionWeights {
        let mut rng = StdRng::seed_from_u64(42);
        let mut best = initial_weights.clone();
        let mut best_score = objective(&best, &self.calibration_data, config);

        let iterations = 200;
        let step = 0.2;

        for _ in 0..iterations {
            let candidate = perturb_weights(&best, &mut rng, step);
            let score = objective(&candidate, &self.calibration_data, config);
            if score < best_score {
                best = candidate;
                best_score = score;
            }
        }

        best
    }
}

fn objective(weights: &AttentionWeights, data: &[CalibrationSample], config: &AnalysisConfig) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut config = config.clone();
    config.attention = weights.clone();

    let mut total_error = 0.0;
    let mut count = 0usize;
    for sample in data {
        let elements = normalize_elements(&sample.elements, sample.context.fold_offset);
        let Ok(forecast) = predict_clicks(&elements, &sample.context, &config) else {
            continue;
        };
        let observed = sample.observed_shares();
        for prediction in &forecast.predictions {
            if let Some(actual) = observed.get(&prediction.element_id) {
                total_error += (prediction.click_share / 100.0 - actual).powi(2);
                count += 1;
            }
        }
    }

    if count == 0 {
        return 0.0;
    }
    (total_error / count as f64).sqrt()
}

fn perturb_weights(weights: &AttentionWeights, rng: &mut StdRng, scale: f64) -> AttentionWeights {
    let mut adjust = |value: f64| -> f64 { value * (1.0 + rng.gen_range(-scale..scale)) };

    AttentionWeights {
        size: adjust(weights.size),
        above_fold: adjust(weights.above_fold),
        button_styling: adjust(weights.button_styling),
        contrast: adjust(weights.contrast),
        position: adjust(weights.position),
        nav_penalty: adjust(weights.nav_penalty),
        noise_bonus: adjust(weights.noise_bonus),
    }
}
