use serde::{Deserialize, Serialize};

use crate::clamp01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "desktop" => Some(DeviceType::Desktop),
            "mobile" | "phone" => Some(DeviceType::Mobile),
            "tablet" => Some(DeviceType::Tablet),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficSource {
    PaidSearch,
    Organic,
    Social,
    Email,
    Direct,
    Display,
    Unknown,
}

impl TrafficSource {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "paid_search" | "paid" | "ppc" | "sem" => Some(TrafficSource::PaidSearch),
            "organic" | "seo" => Some(TrafficSource::Organic),
            "social" => Some(TrafficSource::Social),
            "email" => Some(TrafficSource::Email),
            "direct" => Some(TrafficSource::Direct),
            "display" | "banner" => Some(TrafficSource::Display),
            _ => None,
        }
    }

    /// Relative click-through multiplier versus paid search traffic.
    pub fn ctr_multiplier(self) -> f64 {
        match self {
            TrafficSource::PaidSearch => 1.0,
            TrafficSource::Organic => 1.15,
            TrafficSource::Social => 0.75,
            TrafficSource::Email => 1.3,
            TrafficSource::Direct => 1.1,
            TrafficSource::Display => 0.5,
            TrafficSource::Unknown => 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Saas,
    Ecommerce,
    Finance,
    Healthcare,
    Education,
    RealEstate,
    Legal,
    Other,
}

impl Industry {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "saas" | "software" | "tech" => Some(Industry::Saas),
            "ecommerce" | "e-commerce" | "retail" => Some(Industry::Ecommerce),
            "finance" | "fintech" | "banking" | "insurance" => Some(Industry::Finance),
            "healthcare" | "health" | "medical" => Some(Industry::Healthcare),
            "education" | "edtech" => Some(Industry::Education),
            "real_estate" | "realestate" | "property" => Some(Industry::RealEstate),
            "legal" | "law" => Some(Industry::Legal),
            "other" => Some(Industry::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Industry::Saas => "saas",
            Industry::Ecommerce => "ecommerce",
            Industry::Finance => "finance",
            Industry::Healthcare => "healthcare",
            Industry::Education => "education",
            Industry::RealEstate => "real_estate",
            Industry::Legal => "legal",
            Industry::Other => "other",
        }
    }

    /// Baseline page click-through rate, percent of impressions.
    pub fn base_ctr(self) -> f64 {
        match self {
            Industry::Saas => 3.2,
            Industry::Ecommerce => 2.7,
            Industry::Finance => 2.5,
            Industry::Healthcare => 3.3,
            Industry::Education => 3.8,
            Industry::RealEstate => 3.7,
            Industry::Legal => 2.9,
            Industry::Other => 3.0,
        }
    }

    /// Assumed cost-per-click in USD before competition scaling.
    pub fn base_cpc(self) -> f64 {
        match self {
            Industry::Saas => 3.50,
            Industry::Ecommerce => 1.16,
            Industry::Finance => 3.77,
            Industry::Healthcare => 2.62,
            Industry::Education => 2.40,
            Industry::RealEstate => 2.37,
            Industry::Legal => 6.75,
            Industry::Other => 2.00,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Industry::Saas => &["saas", "software", "platform", "api", "integration", "free trial", "dashboard"],
            Industry::Ecommerce => &["cart", "checkout", "shipping", "add to cart", "shop", "sale", "product"],
            Industry::Finance => &["loan", "credit", "invest", "bank", "insurance", "mortgage", "rates"],
            Industry::Healthcare => &["patient", "clinic", "doctor", "health", "treatment", "appointment"],
            Industry::Education => &["course", "learn", "enroll", "student", "curriculum", "certificate"],
            Industry::RealEstate => &["property", "listing", "realtor", "home", "mortgage", "square feet"],
            Industry::Legal => &["attorney", "lawyer", "legal", "consultation", "case", "firm"],
            Industry::Other => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    LeadGen,
    Ecommerce,
    Saas,
    Content,
}

impl BusinessType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "lead_gen" | "leadgen" | "lead-gen" | "leads" => Some(BusinessType::LeadGen),
            "ecommerce" | "e-commerce" => Some(BusinessType::Ecommerce),
            "saas" => Some(BusinessType::Saas),
            "content" | "media" | "publisher" => Some(BusinessType::Content),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessType::LeadGen => "lead_gen",
            BusinessType::Ecommerce => "ecommerce",
            BusinessType::Saas => "saas",
            BusinessType::Content => "content",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            BusinessType::LeadGen => &["get a quote", "contact us", "request demo", "free consultation", "sign up"],
            BusinessType::Ecommerce => &["add to cart", "buy now", "checkout", "free shipping"],
            BusinessType::Saas => &["start free trial", "pricing", "features", "integrations"],
            BusinessType::Content => &["read more", "subscribe", "newsletter", "latest posts"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionTier {
    Low,
    #[default]
    Medium,
    High,
}

impl CompetitionTier {
    pub fn cpc_multiplier(self) -> f64 {
        match self {
            CompetitionTier::Low => 0.8,
            CompetitionTier::Medium => 1.0,
            CompetitionTier::High => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkTier {
    Fast,
    #[default]
    Average,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTier {
    #[default]
    Domestic,
    International,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Premium,
    #[default]
    Standard,
    Budget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    #[default]
    Afternoon,
    Evening,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    #[default]
    Summer,
    Autumn,
    Winter,
}

/// Page and business context for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub device: DeviceType,
    pub traffic_source: TrafficSource,
    pub industry: Option<Industry>,
    pub business_type: Option<BusinessType>,
    pub time_of_day: TimeOfDay,
    pub day_of_week: Option<String>,
    pub season: Season,
    pub competitor_presence: bool,
    pub brand_recognition: f64,
    pub load_time: Option<f64>,
    pub message_match: f64,
    pub ssl: bool,
    pub trust_badges: bool,
    pub testimonials: bool,
    pub complexity: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub fold_offset: f64,
    pub network: NetworkTier,
    pub geo: GeoTier,
    pub competition: CompetitionTier,
    pub quality: QualityTier,
    pub form_related: bool,
    pub form_field_count: usize,
    pub page_text: String,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            device: DeviceType::Desktop,
            traffic_source: TrafficSource::Unknown,
            industry: None,
            business_type: None,
            time_of_day: TimeOfDay::default(),
            day_of_week: None,
            season: Season::default(),
            competitor_presence: false,
            brand_recognition: 0.5,
            load_time: None,
            message_match: 0.7,
            ssl: true,
            trust_badges: false,
            testimonials: false,
            complexity: 0.5,
            viewport_width: 1440.0,
            viewport_height: 900.0,
            fold_offset: 900.0,
            network: NetworkTier::default(),
            geo: GeoTier::default(),
            competition: CompetitionTier::default(),
            quality: QualityTier::default(),
            form_related: false,
            form_field_count: 0,
            page_text: String::new(),
        }
    }
}

/// Industry/business type actually used by the models, with flags recording
/// whether each was auto-detected rather than supplied.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedVertical {
    pub industry: Industry,
    pub business_type: BusinessType,
    pub industry_detected: bool,
    pub business_detected: bool,
}

impl PageContext {
    pub fn resolve_vertical(&self) -> ResolvedVertical {
        let (industry, industry_detected) = match self.industry {
            Some(industry) => (industry, false),
            None => (
                detect_industry(&self.detection_text()).unwrap_or(Industry::Other),
                true,
            ),
        };
        let (business_type, business_detected) = match self.business_type {
            Some(business) => (business, false),
            None => (
                detect_business_type(&self.detection_text()).unwrap_or(BusinessType::LeadGen),
                true,
            ),
        };
        ResolvedVertical {
            industry,
            business_type,
            industry_detected,
            business_detected,
        }
    }

    pub fn assumed_cpc(&self, industry: Industry) -> f64 {
        industry.base_cpc() * self.competition.cpc_multiplier()
    }

    pub fn brand_recognition_clamped(&self) -> f64 {
        clamp01(self.brand_recognition)
    }

    pub fn message_match_clamped(&self) -> f64 {
        clamp01(self.message_match)
    }

    fn detection_text(&self) -> String {
        let mut text = String::with_capacity(
            self.url.len() + self.title.len() + self.page_text.len() + 2,
        );
        text.push_str(&self.url.to_lowercase());
        text.push(' ');
        text.push_str(&self.title.to_lowercase());
        text.push(' ');
        text.push_str(&self.page_text.to_lowercase());
        text
    }
}

/// Keyword-list scoring over lowercased page text; highest hit count wins,
/// ties keep the first industry in declaration order.
pub fn detect_industry(text: &str) -> Option<Industry> {
    let candidates = [
        Industry::Saas,
        Industry::Ecommerce,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Education,
        Industry::RealEstate,
        Industry::Legal,
    ];

    let mut best: Option<(Industry, usize)> = None;
    for industry in candidates {
        let hits = keyword_hits(text, industry.keywords());
        if hits == 0 {
            continue;
        }
        match best {
            None => best = Some((industry, hits)),
            Some((_, best_hits)) if hits > best_hits => best = Some((industry, hits)),
            _ => {}
        }
    }
    best.map(|(industry, _)| industry)
}

pub fn detect_business_type(text: &str) -> Option<BusinessType> {
    let candidates = [
        BusinessType::Ecommerce,
        BusinessType::Saas,
        BusinessType::LeadGen,
        BusinessType::Content,
    ];

    let mut best: Option<(BusinessType, usize)> = None;
    for business in candidates {
        let hits = keyword_hits(text, business.keywords());
        if hits == 0 {
            continue;
        }
        match best {
            None => best = Some((business, hits)),
            Some((_, best_hits)) if hits > best_hits => best = Some((business, hits)),
            _ => {}
        }
    }
    best.map(|(business, _)| business)
}

fn keyword_hits(text: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .map(|keyword| text.matches(keyword).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_ecommerce_from_cart_language() {
        let text = "add to cart free shipping checkout today";
        assert_eq!(detect_industry(text), Some(Industry::Ecommerce));
        assert_eq!(detect_business_type(text), Some(BusinessType::Ecommerce));
    }

    #[test]
    fn resolve_vertical_flags_auto_detection() {
        let mut context = PageContext::default();
        context.page_text = "start free trial of our software platform".to_string();
        let resolved = context.resolve_vertical();
        assert!(resolved.industry_detected);
        assert_eq!(resolved.industry, Industry::Saas);

        context.industry = Some(Industry::Legal);
        let resolved = context.resolve_vertical();
        assert!(!resolved.industry_detected);
        assert_eq!(resolved.industry, Industry::Legal);
    }

    #[test]
    fn detection_falls_back_to_none_without_signal() {
        assert_eq!(detect_industry("lorem ipsum dolor"), None);
    }
}
