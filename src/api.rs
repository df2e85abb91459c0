use serde::{Deserialize, Serialize};

use cro_signals::context::{
    BusinessType, CompetitionTier, DeviceType, GeoTier, Industry, NetworkTier, PageContext,
    QualityTier, Season, TimeOfDay, TrafficSource,
};
use cro_signals::funnel::{
    CombinationMode, FactorRecommendation, PostClickFactor, PostClickPrediction, PostClickStep,
    StepCapture, Warmth,
};
use cro_signals::{AnalysisError, PageAnalysis, RawElement};

/// Loosely typed page context as posted by callers; decoded into the typed
/// shape before anything touches the core.
#[derive(Debug, Default, Deserialize)]
pub struct ApiPageContext {
    pub url: Option<String>,
    pub title: Option<String>,
    pub device: Option<String>,
    pub traffic_source: Option<String>,
    pub industry: Option<String>,
    pub business_type: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
    pub day_of_week: Option<String>,
    pub season: Option<Season>,
    pub competitor_presence: Option<bool>,
    pub brand_recognition: Option<f64>,
    pub load_time: Option<f64>,
    pub message_match: Option<f64>,
    pub ssl: Option<bool>,
    pub trust_badges: Option<bool>,
    pub testimonials: Option<bool>,
    pub complexity: Option<f64>,
    pub viewport_width: Option<f64>,
    pub viewport_height: Option<f64>,
    pub fold_offset: Option<f64>,
    pub network: Option<NetworkTier>,
    pub geo: Option<GeoTier>,
    pub competition: Option<CompetitionTier>,
    pub quality: Option<QualityTier>,
    pub form_related: Option<bool>,
    pub form_field_count: Option<usize>,
    pub page_text: Option<String>,
}

impl ApiPageContext {
    pub fn into_context(self) -> Result<PageContext, AnalysisError> {
        let mut context = PageContext::default();

        if let Some(url) = self.url {
            context.url = url;
        }
        if let Some(title) = self.title {
            context.title = title;
        }
        if let Some(device) = self.device.as_deref() {
            context.device = DeviceType::from_str(device)
                .ok_or_else(|| AnalysisError::decode(format!("invalid device type: {}", device)))?;
        }
        if let Some(source) = self.traffic_source.as_deref() {
            context.traffic_source = TrafficSource::from_str(source).ok_or_else(|| {
                AnalysisError::decode(format!("invalid traffic source: {}", source))
            })?;
        }
        if let Some(industry) = self.industry.as_deref() {
            context.industry = Some(Industry::from_str(industry).ok_or_else(|| {
                AnalysisError::decode(format!("invalid industry: {}", industry))
            })?);
        }
        if let Some(business) = self.business_type.as_deref() {
            context.business_type = Some(BusinessType::from_str(business).ok_or_else(|| {
                AnalysisError::decode(format!("invalid business type: {}", business))
            })?);
        }
        if let Some(value) = self.time_of_day {
            context.time_of_day = value;
        }
        context.day_of_week = self.day_of_week;
        if let Some(value) = self.season {
            context.season = value;
        }
        if let Some(value) = self.competitor_presence {
            context.competitor_presence = value;
        }
        if let Some(value) = self.brand_recognition {
            context.brand_recognition = value;
        }
        context.load_time = self.load_time;
        if let Some(value) = self.message_match {
            context.message_match = value;
        }
        if let Some(value) = self.ssl {
            context.ssl = value;
        }
        if let Some(value) = self.trust_badges {
            context.trust_badges = value;
        }
        if let Some(value) = self.testimonials {
            context.testimonials = value;
        }
        if let Some(value) = self.complexity {
            context.complexity = value;
        }
        if let Some(value) = self.viewport_width {
            if value <= 0.0 {
                return Err(AnalysisError::decode("viewport width must be positive"));
            }
            context.viewport_width = value;
        }
        if let Some(value) = self.viewport_height {
            if value <= 0.0 {
                return Err(AnalysisError::decode("viewport height must be positive"));
            }
            context.viewport_height = value;
            context.fold_offset = value;
        }
        if let Some(value) = self.fold_offset {
            context.fold_offset = value;
        }
        if let Some(value) = self.network {
            context.network = value;
        }
        if let Some(value) = self.geo {
            context.geo = value;
        }
        if let Some(value) = self.competition {
            context.competition = value;
        }
        if let Some(value) = self.quality {
            context.quality = value;
        }
        if let Some(value) = self.form_related {
            context.form_related = value;
        }
        if let Some(value) = self.form_field_count {
            context.form_field_count = value;
        }
        if let Some(value) = self.page_text {
            context.page_text = value;
        }

        Ok(context)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    #[serde(default)]
    pub page: ApiPageContext,
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

#[derive(Debug, Serialize)]
pub struct ApiAnalyzeResponse {
    pub url: String,
    pub primary_cta: Option<String>,
    #[serde(flatten)]
    pub analysis: PageAnalysis,
}

impl ApiAnalyzeResponse {
    pub fn from_analysis(url: String, analysis: PageAnalysis) -> Self {
        Self {
            url,
            primary_cta: analysis.forecast.primary_cta.clone(),
            analysis,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiStep {
    pub name: Option<String>,
    pub cold_base_rate: Option<f64>,
    pub warmth: Option<String>,
    pub upper_cap: Option<f64>,
}

impl ApiStep {
    pub fn into_step(self) -> Result<PostClickStep, AnalysisError> {
        let cold_base_rate = self
            .cold_base_rate
            .ok_or_else(|| AnalysisError::validation("cold_base_rate is required"))?;
        if !(0.0..=1.0).contains(&cold_base_rate) {
            return Err(AnalysisError::decode("cold_base_rate must be within [0, 1]"));
        }
        let warmth = match self.warmth.as_deref() {
            Some(value) => Warmth::from_str(value)
                .ok_or_else(|| AnalysisError::decode(format!("invalid warmth: {}", value)))?,
            None => Warmth::Cold,
        };
        Ok(PostClickStep {
            name: self.name.unwrap_or_else(|| "step".to_string()),
            cold_base_rate,
            warmth,
            upper_cap: self.upper_cap,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiFactor {
    pub name: String,
    pub score: Option<f64>,
    pub max_lift: Option<f64>,
    pub note: Option<String>,
}

impl ApiFactor {
    pub fn into_factor(self) -> Result<PostClickFactor, AnalysisError> {
        let score = self
            .score
            .ok_or_else(|| AnalysisError::decode(format!("factor {} missing score", self.name)))?;
        let max_lift = self.max_lift.ok_or_else(|| {
            AnalysisError::decode(format!("factor {} missing max_lift", self.name))
        })?;
        if max_lift < 0.0 {
            return Err(AnalysisError::decode(format!(
                "factor {} max_lift must be non-negative",
                self.name
            )));
        }
        let mut factor = PostClickFactor::new(self.name, score, max_lift);
        factor.note = self.note;
        Ok(factor)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiFunnelRequest {
    pub step: ApiStep,
    pub mode: Option<String>,
    #[serde(default)]
    pub factors: Vec<ApiFactor>,
}

impl ApiFunnelRequest {
    pub fn into_parts(
        self,
    ) -> Result<(PostClickStep, CombinationMode, Vec<PostClickFactor>), AnalysisError> {
        let step = self.step.into_step()?;
        let mode = match self.mode.as_deref() {
            Some(value) => CombinationMode::from_str(value)
                .ok_or_else(|| AnalysisError::decode(format!("invalid mode: {}", value)))?,
            None => CombinationMode::Multiplicative,
        };
        let factors = self
            .factors
            .into_iter()
            .map(ApiFactor::into_factor)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((step, mode, factors))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiFunnelResponse {
    pub mode: String,
    pub prediction: PostClickPrediction,
    pub recommendations: Vec<FactorRecommendation>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStepsRequest {
    pub step: ApiStep,
    pub first: StepCapture,
    pub second: StepCapture,
    pub mode: Option<String>,
    pub upstream_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ApiStepsResponse {
    pub mode: String,
    pub prediction: PostClickPrediction,
    pub end_to_end_rate: Option<f64>,
    pub recommendations: Vec<FactorRecommendation>,
}
