use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::funnel::{CombinationMode, Warmth};
use crate::scoring::{AttentionWeights, WasteThresholds, WasteWeights};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsConfig {
    /// Impressions assumed for one analysis when the caller supplies none.
    pub assumed_impressions: f64,
    pub min_page_ctr: f64,
    pub max_page_ctr: f64,
    /// Overrides the industry/competition CPC table when set.
    pub cpc_override: Option<f64>,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            assumed_impressions: 1000.0,
            min_page_ctr: 0.2,
            max_page_ctr: 20.0,
            cpc_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelConfig {
    pub mode: String,
    pub warmth_cold: f64,
    pub warmth_warm: f64,
    pub warmth_hot: f64,
    pub logit_gain: f64,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            mode: "multiplicative".to_string(),
            warmth_cold: 1.0,
            warmth_warm: 2.45,
            warmth_hot: 3.2,
            logit_gain: 1.0,
        }
    }
}

impl FunnelConfig {
    pub fn to_mode(&self) -> CombinationMode {
        CombinationMode::from_str(&self.mode).unwrap_or(CombinationMode::Multiplicative)
    }

    pub fn warmth_multiplier(&self, warmth: Warmth) -> f64 {
        match warmth {
            Warmth::Cold => self.warmth_cold,
            Warmth::Warm => self.warmth_warm,
            Warmth::Hot => self.warmth_hot,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub attention: AttentionWeights,
    pub waste: WasteWeights,
    pub waste_thresholds: WasteThresholds,
    pub funnel: FunnelConfig,
    pub economics: EconomicsConfig,
}

impl AnalysisConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AnalysisConfig::default()
            }
        } else {
            AnalysisConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(impressions) = env::var("ASSUMED_IMPRESSIONS") {
            if let Ok(value) = impressions.parse::<f64>() {
                self.economics.assumed_impressions = value;
            }
        }
        if let Ok(cpc) = env::var("ASSUMED_CPC") {
            if let Ok(value) = cpc.parse::<f64>() {
                self.economics.cpc_override = Some(value);
            }
        }
        if let Ok(threshold) = env::var("WASTE_LOW_RISK") {
            if let Ok(value) = threshold.parse::<f64>() {
                self.waste_thresholds.low_risk = value;
            }
        }
        if let Ok(threshold) = env::var("WASTE_HIGH_RISK") {
            if let Ok(value) = threshold.parse::<f64>() {
                self.waste_thresholds.high_risk = value;
            }
        }
        if let Ok(mode) = env::var("FUNNEL_MODE") {
            if !mode.trim().is_empty() {
                self.funnel.mode = mode;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("SCORING_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/scoring.toml")))
}
