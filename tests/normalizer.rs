use cro_signals::{dedup_elements, normalize_elements, ElementKind, RawElement};

fn raw_field(name: &str, input_type: &str, x: f64, y: f64) -> RawElement {
    RawElement {
        kind: Some("form_field".to_string()),
        name: Some(name.to_string()),
        input_type: Some(input_type.to_string()),
        x: Some(x),
        y: Some(y),
        width: Some(280.0),
        height: Some(40.0),
        ..RawElement::default()
    }
}

fn raw_button(text: &str, x: f64, y: f64) -> RawElement {
    RawElement {
        kind: Some("button".to_string()),
        text: Some(text.to_string()),
        x: Some(x),
        y: Some(y),
        width: Some(180.0),
        height: Some(48.0),
        ..RawElement::default()
    }
}

#[test]
fn nearby_duplicate_fields_collapse() {
    let raw = vec![
        raw_field("email", "email", 100.0, 200.0),
        raw_field("email", "email", 104.0, 203.0),
    ];

    let elements = normalize_elements(&raw, 900.0);

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].kind(), ElementKind::FormField);
}

#[test]
fn dedup_is_idempotent() {
    let raw = vec![
        raw_field("email", "email", 100.0, 200.0),
        raw_field("email", "email", 104.0, 203.0),
        raw_field("phone", "tel", 100.0, 300.0),
        raw_button("Get started", 100.0, 400.0),
    ];

    let elements = normalize_elements(&raw, 900.0);
    let len = elements.len();
    let again = dedup_elements(elements.clone());

    assert_eq!(again.len(), len);
    for (left, right) in elements.iter().zip(again.iter()) {
        assert_eq!(left.id, right.id);
    }
}

#[test]
fn same_name_and_type_dedup_ignores_distance() {
    let raw = vec![
        raw_field("email", "email", 100.0, 200.0),
        raw_field("email", "email", 700.0, 2400.0),
    ];

    let elements = normalize_elements(&raw, 900.0);
    assert_eq!(elements.len(), 1);
}

#[test]
fn malformed_geometry_is_skipped_without_failing_the_batch() {
    let mut broken = raw_button("Broken", 10.0, 10.0);
    broken.width = Some(0.0);
    let raw = vec![broken, raw_button("Fine", 10.0, 100.0)];

    let elements = normalize_elements(&raw, 900.0);

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].text, "Fine");
}

#[test]
fn unknown_kind_is_skipped() {
    let mut odd = raw_button("Widget", 10.0, 10.0);
    odd.kind = Some("hologram".to_string());
    let elements = normalize_elements(&[odd], 900.0);
    assert!(elements.is_empty());
}

#[test]
fn text_falls_back_to_href_segment() {
    let raw = RawElement {
        kind: Some("link".to_string()),
        href: Some("https://example.com/pricing/enterprise?ref=nav".to_string()),
        x: Some(10.0),
        y: Some(10.0),
        width: Some(100.0),
        height: Some(20.0),
        ..RawElement::default()
    };

    let elements = normalize_elements(&[raw], 900.0);
    assert_eq!(elements[0].text, "enterprise");
}

#[test]
fn text_falls_back_to_generic_label() {
    let raw = RawElement {
        kind: Some("generic_clickable".to_string()),
        x: Some(10.0),
        y: Some(10.0),
        width: Some(100.0),
        height: Some(20.0),
        ..RawElement::default()
    };

    let elements = normalize_elements(&[raw], 900.0);
    assert_eq!(elements[0].text, "clickable element");
}

#[test]
fn field_names_map_to_readable_labels() {
    let raw = vec![
        raw_field("first_name", "text", 0.0, 0.0),
        raw_field("work_email", "email", 0.0, 60.0),
        raw_field("job_title", "text", 0.0, 120.0),
    ];

    let elements = normalize_elements(&raw, 900.0);
    let labels: Vec<&str> = elements.iter().map(|e| e.text.as_str()).collect();

    assert_eq!(labels, vec!["First name", "Email", "Job title"]);
}

#[test]
fn above_fold_derived_from_fold_offset() {
    let raw = vec![raw_button("Top", 10.0, 100.0), raw_button("Deep", 10.0, 2500.0)];
    let elements = normalize_elements(&raw, 900.0);

    assert!(elements[0].above_fold);
    assert!(!elements[1].above_fold);
}

#[test]
fn missing_ids_are_derived_and_unique() {
    let raw = vec![raw_button("Go", 0.0, 0.0), raw_button("Go", 600.0, 0.0)];
    let elements = normalize_elements(&raw, 900.0);

    assert_eq!(elements.len(), 2);
    assert_ne!(elements[0].id, elements[1].id);
    assert!(elements[0].id.starts_with("el_"));
}
