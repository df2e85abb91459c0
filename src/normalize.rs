use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::element::{Element, ElementDetail, ElementKind, FieldDetails, Geometry};
use crate::stable_hash64;

/// Loosely typed element record as captured upstream. Everything is optional;
/// the normalizer decides what survives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawElement {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub tag: Option<String>,
    pub text: Option<String>,
    pub text_content: Option<String>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
    pub href: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub visible: Option<bool>,
    pub above_fold: Option<bool>,
    pub interactive: Option<bool>,
    pub distance_from_top: Option<f64>,
    pub button_styled: Option<bool>,
    pub z_index: Option<f64>,
    pub autoplay: Option<bool>,
    pub sticky: Option<bool>,
    pub high_visual_noise: Option<bool>,
    pub decorative: Option<bool>,
    pub input_type: Option<String>,
    pub required: Option<bool>,
    pub pattern: Option<String>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub autocomplete: Option<String>,
    pub form_action: Option<String>,
    pub field_count: Option<usize>,
    pub has_submit: Option<bool>,
}

const POSITION_GRID: f64 = 50.0;

/// Canonicalize raw capture records into the uniform element set.
///
/// Records with unknown kind or malformed geometry are skipped, never fail
/// the batch. Form fields are deduplicated; the result order follows the
/// input order and is the canonical element ordering for the rest of the
/// pipeline.
pub fn normalize_elements(raw: &[RawElement], fold_offset: f64) -> Vec<Element> {
    let mut used_ids: HashSet<String> = HashSet::new();
    let mut elements = Vec::with_capacity(raw.len());

    for record in raw {
        let Some(kind) = record.kind.as_deref().and_then(ElementKind::from_str) else {
            continue;
        };
        let geometry = Geometry::new(
            record.x.unwrap_or(0.0),
            record.y.unwrap_or(0.0),
            record.width.unwrap_or(0.0),
            record.height.unwrap_or(0.0),
        );
        if !geometry.is_valid() {
            continue;
        }

        let text = resolve_text(record, kind);
        if text.trim().is_empty() {
            continue;
        }

        let detail = build_detail(record, kind);
        let id = unique_id(record, kind, &text, &geometry, &mut used_ids);
        let distance_from_top = record.distance_from_top.unwrap_or(geometry.y);

        let mut element = Element::new(id, text, default_tag(record, kind), geometry, detail);
        element.visible = record.visible.unwrap_or(true);
        element.above_fold = record
            .above_fold
            .unwrap_or(distance_from_top < fold_offset);
        let default_interactive = match kind {
            ElementKind::Form => record.has_submit.unwrap_or(true),
            _ => true,
        };
        element.interactive = record.interactive.unwrap_or(default_interactive);
        element.distance_from_top = distance_from_top;
        element.button_styled = record
            .button_styled
            .unwrap_or(kind == ElementKind::Button);
        element.z_hint = record.z_index.unwrap_or(0.0);
        element.autoplay = record.autoplay.unwrap_or(false);
        element.sticky = record.sticky.unwrap_or(false);
        element.high_visual_noise = record.high_visual_noise.unwrap_or(false);
        element.decorative = record.decorative.unwrap_or(false);

        elements.push(element);
    }

    dedup_elements(elements)
}

/// Drop duplicate form fields.
///
/// A field is a duplicate when it matches either key already seen:
/// (normalized name, input type, position on a 50px grid), or
/// (normalized name, input type) alone. Running this twice is a no-op.
pub fn dedup_elements(elements: Vec<Element>) -> Vec<Element> {
    let mut seen_positioned: HashSet<String> = HashSet::new();
    let mut seen_named: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(elements.len());

    for element in elements {
        if let Some(details) = element.field_details() {
            let name = normalize_name(&element.text);
            let grid_x = snap_to_grid(element.geometry.x);
            let grid_y = snap_to_grid(element.geometry.y);
            let positioned = format!("{}|{}|{}|{}", name, details.input_type, grid_x, grid_y);
            let named = format!("{}|{}", name, details.input_type);

            if seen_positioned.contains(&positioned) || seen_named.contains(&named) {
                continue;
            }
            seen_positioned.insert(positioned);
            seen_named.insert(named);
        }
        kept.push(element);
    }

    kept
}

fn snap_to_grid(value: f64) -> i64 {
    ((value / POSITION_GRID).round() * POSITION_GRID) as i64
}

fn normalize_name(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn resolve_text(record: &RawElement, kind: ElementKind) -> String {
    if let Some(text) = non_empty(record.text.as_deref()) {
        return text.to_string();
    }
    if kind == ElementKind::FormField {
        if let Some(label) = field_label(record) {
            return label.to_string();
        }
    }
    if let Some(text) = non_empty(record.text_content.as_deref()) {
        return text.to_string();
    }
    if let Some(placeholder) = non_empty(record.placeholder.as_deref()) {
        return placeholder.to_string();
    }
    if let Some(name) = non_empty(record.name.as_deref()) {
        return name.to_string();
    }
    if let Some(segment) = record.href.as_deref().and_then(last_path_segment) {
        return segment.to_string();
    }
    format!("{} element", kind.label())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn last_path_segment(href: &str) -> Option<&str> {
    let path = href
        .trim_end_matches('/')
        .split(['?', '#'])
        .next()
        .unwrap_or("");
    let segment = path.rsplit('/').next()?.trim();
    if segment.is_empty() || segment.starts_with("http") {
        return None;
    }
    Some(segment)
}

/// Common field names/placeholders mapped to human-readable labels.
fn field_label(record: &RawElement) -> Option<&'static str> {
    let mut haystack = String::new();
    if let Some(name) = record.name.as_deref() {
        haystack.push_str(&name.to_lowercase());
    }
    haystack.push(' ');
    if let Some(placeholder) = record.placeholder.as_deref() {
        haystack.push_str(&placeholder.to_lowercase());
    }

    let patterns: [(&[&str], &str); 9] = [
        (&["first_name", "firstname", "first name", "fname"], "First name"),
        (&["last_name", "lastname", "last name", "lname", "surname"], "Last name"),
        (&["email", "e-mail"], "Email"),
        (&["phone", "mobile", "tel"], "Phone number"),
        (&["company", "organization", "organisation"], "Company"),
        (&["country"], "Country"),
        (&["message", "comments", "inquiry", "enquiry"], "Message"),
        (&["job_title", "jobtitle", "job title", "role"], "Job title"),
        (&["consent", "gdpr", "opt_in", "opt-in", "agree"], "Consent"),
    ];

    for (needles, label) in patterns {
        if needles.iter().any(|needle| haystack.contains(needle)) {
            return Some(label);
        }
    }
    None
}

fn build_detail(record: &RawElement, kind: ElementKind) -> ElementDetail {
    match kind {
        ElementKind::Button => ElementDetail::Button {
            form_action: record.form_action.clone(),
        },
        ElementKind::Link => ElementDetail::Link {
            href: record.href.clone(),
        },
        ElementKind::Form => ElementDetail::Form {
            field_count: record.field_count.unwrap_or(0),
            has_submit: record.has_submit.unwrap_or(true),
        },
        ElementKind::FormField => ElementDetail::FormField(FieldDetails {
            input_type: record
                .input_type
                .clone()
                .unwrap_or_else(|| "text".to_string()),
            required: record.required.unwrap_or(false),
            placeholder: record.placeholder.clone(),
            pattern: record.pattern.clone(),
            min_length: record.min_length,
            max_length: record.max_length,
            autocomplete: record.autocomplete.clone(),
        }),
        ElementKind::NavigationLink => ElementDetail::NavigationLink,
        ElementKind::GenericClickable => ElementDetail::GenericClickable,
    }
}

fn default_tag(record: &RawElement, kind: ElementKind) -> String {
    if let Some(tag) = non_empty(record.tag.as_deref()) {
        return tag.to_lowercase();
    }
    match kind {
        ElementKind::Button => "button",
        ElementKind::Link | ElementKind::NavigationLink => "a",
        ElementKind::Form => "form",
        ElementKind::FormField => "input",
        ElementKind::GenericClickable => "div",
    }
    .to_string()
}

fn unique_id(
    record: &RawElement,
    kind: ElementKind,
    text: &str,
    geometry: &Geometry,
    used: &mut HashSet<String>,
) -> String {
    let base = match non_empty(record.id.as_deref()) {
        Some(id) => id.to_string(),
        None => {
            let payload = format!(
                "{}:{}:{}:{}",
                kind.label(),
                text,
                snap_to_grid(geometry.x),
                snap_to_grid(geometry.y)
            );
            format!("el_{:x}", stable_hash64(&payload))
        }
    };

    if used.insert(base.clone()) {
        return base;
    }
    let mut counter = 2usize;
    loop {
        let candidate = format!("{}_{}", base, counter);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
