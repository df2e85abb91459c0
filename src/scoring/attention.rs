use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::context::PageContext;
use crate::element::{Element, ElementKind};

/// Feature weights for the visual-attention model. Tunable via config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionWeights {
    pub size: f64,
    pub above_fold: f64,
    pub button_styling: f64,
    pub contrast: f64,
    pub position: f64,
    pub nav_penalty: f64,
    pub noise_bonus: f64,
}

impl Default for AttentionWeights {
    fn default() -> Self {
        Self {
            size: 1.0,
            above_fold: 0.9,
            button_styling: 0.8,
            contrast: 0.4,
            position: 0.6,
            nav_penalty: 0.45,
            noise_bonus: 0.5,
        }
    }
}

/// Scores how much of the page's visual attention an element captures.
///
/// Pure given (element, context); the resulting weights are relative and
/// only meaningful as shares of the per-page total.
#[derive(Debug, Clone)]
pub struct AttentionScorer {
    weights: AttentionWeights,
}

impl AttentionScorer {
    pub fn new(weights: AttentionWeights) -> Self {
        Self { weights }
    }

    pub fn weight(&self, element: &Element, context: &PageContext) -> f64 {
        if !element.is_clickable() {
            return 0.0;
        }

        let viewport_area = (context.viewport_width * context.viewport_height).max(1.0);
        let size_score = clamp01(((element.geometry.area() / viewport_area) * 25.0).sqrt());
        let fold_score = if element.above_fold { 1.0 } else { 0.25 };
        let styled_score = if element.button_styled { 1.0 } else { 0.0 };
        let contrast_score = clamp01(element.z_hint / 10.0);
        let position_score =
            (-(element.distance_from_top.max(0.0)) / context.fold_offset.max(1.0)).exp();

        let mut weight = self.weights.size * size_score
            + self.weights.above_fold * fold_score
            + self.weights.button_styling * styled_score
            + self.weights.contrast * contrast_score
            + self.weights.position * position_score;

        if element.kind() == ElementKind::NavigationLink {
            weight *= 1.0 - clamp01(self.weights.nav_penalty);
        }

        let noise = noise_intensity(element);
        if noise > 0.0 {
            weight += self.weights.noise_bonus * noise;
        }

        weight.max(0.0)
    }
}

/// Autoplay media and sticky overlays pull attention even when decorative.
pub fn noise_intensity(element: &Element) -> f64 {
    let mut intensity = 0.0;
    if element.autoplay {
        intensity += 0.4;
    }
    if element.sticky {
        intensity += 0.3;
    }
    if element.high_visual_noise {
        intensity += 0.2;
    }
    if element.decorative {
        intensity += 0.1;
    }
    clamp01(intensity)
}
