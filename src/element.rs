use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Geometry with non-positive extent cannot be rendered and is treated
    /// as malformed at the normalization boundary.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.x.is_finite() && self.y.is_finite()
    }

    pub fn center_distance(&self, other: &Geometry) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Button,
    Link,
    Form,
    FormField,
    NavigationLink,
    GenericClickable,
}

impl ElementKind {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "button" | "cta" | "submit" => Some(ElementKind::Button),
            "link" | "anchor" | "a" => Some(ElementKind::Link),
            "form" => Some(ElementKind::Form),
            "form_field" | "field" | "input" | "select" | "textarea" => {
                Some(ElementKind::FormField)
            }
            "navigation_link" | "nav" | "nav_link" | "menu" => Some(ElementKind::NavigationLink),
            "generic_clickable" | "clickable" | "generic" => Some(ElementKind::GenericClickable),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Link => "link",
            ElementKind::Form => "form",
            ElementKind::FormField => "form field",
            ElementKind::NavigationLink => "navigation link",
            ElementKind::GenericClickable => "clickable",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDetails {
    pub input_type: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub autocomplete: Option<String>,
}

/// Variant payloads for the element sum type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementDetail {
    Button { form_action: Option<String> },
    Link { href: Option<String> },
    Form { field_count: usize, has_submit: bool },
    FormField(FieldDetails),
    NavigationLink,
    GenericClickable,
}

impl ElementDetail {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementDetail::Button { .. } => ElementKind::Button,
            ElementDetail::Link { .. } => ElementKind::Link,
            ElementDetail::Form { .. } => ElementKind::Form,
            ElementDetail::FormField(_) => ElementKind::FormField,
            ElementDetail::NavigationLink => ElementKind::NavigationLink,
            ElementDetail::GenericClickable => ElementKind::GenericClickable,
        }
    }
}

/// One canonical interactive page element.
///
/// Identifiers are unique within a single analysis; elements never outlive
/// the pipeline invocation that created them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub text: String,
    pub tag: String,
    pub geometry: Geometry,
    pub visible: bool,
    pub above_fold: bool,
    pub interactive: bool,
    pub distance_from_top: f64,
    pub button_styled: bool,
    pub z_hint: f64,
    pub autoplay: bool,
    pub sticky: bool,
    pub high_visual_noise: bool,
    pub decorative: bool,
    pub detail: ElementDetail,
}

impl Element {
    /// Factory used by the normalizer and tests; flags default to a plain
    /// visible in-flow element.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        tag: impl Into<String>,
        geometry: Geometry,
        detail: ElementDetail,
    ) -> Self {
        let distance_from_top = geometry.y;
        Self {
            id: id.into(),
            text: text.into(),
            tag: tag.into(),
            geometry,
            visible: true,
            above_fold: true,
            interactive: true,
            distance_from_top,
            button_styled: false,
            z_hint: 0.0,
            autoplay: false,
            sticky: false,
            high_visual_noise: false,
            decorative: false,
            detail,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.detail.kind()
    }

    pub fn is_clickable(&self) -> bool {
        self.visible && self.interactive
    }

    pub fn field_details(&self) -> Option<&FieldDetails> {
        match &self.detail {
            ElementDetail::FormField(details) => Some(details),
            _ => None,
        }
    }

    pub fn has_noise_flags(&self) -> bool {
        self.autoplay || self.sticky || self.high_visual_noise || self.decorative
    }
}
