use cro_signals::context::{BusinessType, DeviceType, Industry, PageContext, TrafficSource};
use cro_signals::element::{Element, ElementDetail, FieldDetails, Geometry};
use cro_signals::{analyze_page, predict_clicks, AnalysisConfig, ConfidenceTier};

fn button(id: &str, text: &str, y: f64) -> Element {
    let mut element = Element::new(
        id,
        text,
        "button",
        Geometry::new(100.0, y, 200.0, 50.0),
        ElementDetail::Button { form_action: None },
    );
    element.button_styled = true;
    element
}

fn nav_link(id: &str, text: &str, x: f64) -> Element {
    Element::new(
        id,
        text,
        "a",
        Geometry::new(x, 20.0, 80.0, 24.0),
        ElementDetail::NavigationLink,
    )
}

fn explicit_context() -> PageContext {
    let mut context = PageContext::default();
    context.industry = Some(Industry::Saas);
    context.business_type = Some(BusinessType::Saas);
    context.traffic_source = TrafficSource::PaidSearch;
    context.load_time = Some(2.0);
    context
}

#[test]
fn primary_selection_is_tie_stable() {
    let elements = vec![button("a", "Get started", 300.0), button("b", "Get started", 300.0)];
    let config = AnalysisConfig::default();
    let context = explicit_context();

    for _ in 0..10 {
        let forecast = predict_clicks(&elements, &context, &config).unwrap();
        assert_eq!(forecast.primary_cta.as_deref(), Some("a"));
    }
}

#[test]
fn ctr_decimal_matches_percentage() {
    let elements = vec![button("a", "Get started", 300.0), nav_link("n1", "Pricing", 10.0)];
    let forecast = predict_clicks(&elements, &explicit_context(), &AnalysisConfig::default()).unwrap();

    for prediction in &forecast.predictions {
        assert!((prediction.ctr_decimal - prediction.ctr / 100.0).abs() < 1e-12);
    }

    let share_total: f64 = forecast
        .predictions
        .iter()
        .map(|prediction| prediction.click_share)
        .sum();
    assert!((share_total - 100.0).abs() < 1e-6);
}

#[test]
fn primary_has_no_wasted_clicks_and_nav_wastes_everything() {
    let elements = vec![button("a", "Get started", 300.0), nav_link("n1", "Pricing", 10.0)];
    let forecast = predict_clicks(&elements, &explicit_context(), &AnalysisConfig::default()).unwrap();

    let primary = forecast.primary_prediction().unwrap();
    assert_eq!(primary.element_id, "a");
    assert_eq!(primary.wasted_clicks, 0.0);

    let nav = forecast
        .predictions
        .iter()
        .find(|prediction| prediction.element_id == "n1")
        .unwrap();
    assert!(nav.estimated_clicks > 0.0);
    assert!((nav.wasted_clicks - nav.estimated_clicks).abs() < 1e-9);
    assert!(nav.wasted_spend > 0.0);
}

#[test]
fn empty_element_set_yields_empty_forecast() {
    let forecast = predict_clicks(&[], &explicit_context(), &AnalysisConfig::default()).unwrap();

    assert!(forecast.predictions.is_empty());
    assert!(forecast.primary_cta.is_none());
    assert!(forecast
        .warnings
        .iter()
        .any(|warning| warning.contains("no elements")));
}

#[test]
fn confidence_degrades_with_defaulted_context() {
    let elements = vec![button("a", "Get started", 300.0)];
    let config = AnalysisConfig::default();

    let explicit = predict_clicks(&elements, &explicit_context(), &config).unwrap();
    assert_eq!(explicit.predictions[0].confidence, ConfidenceTier::High);

    let defaulted = predict_clicks(&elements, &PageContext::default(), &config).unwrap();
    assert_eq!(defaulted.predictions[0].confidence, ConfidenceTier::Low);
    assert!(defaulted.metadata.industry_detected);
    assert!(defaulted
        .warnings
        .iter()
        .any(|warning| warning.contains("auto-detected")));
}

#[test]
fn form_projection_identifies_bottleneck_field() {
    let mut form_button = button("submit", "Request a demo", 600.0);
    form_button.detail = ElementDetail::Button {
        form_action: Some("/leads".to_string()),
    };

    let email = Element::new(
        "f_email",
        "Email",
        "input",
        Geometry::new(100.0, 400.0, 280.0, 40.0),
        ElementDetail::FormField(FieldDetails {
            input_type: "email".to_string(),
            required: true,
            placeholder: Some("you@company.com".to_string()),
            autocomplete: Some("email".to_string()),
            ..FieldDetails::default()
        }),
    );
    let phone = Element::new(
        "f_phone",
        "Phone number",
        "input",
        Geometry::new(100.0, 460.0, 280.0, 40.0),
        ElementDetail::FormField(FieldDetails {
            input_type: "tel".to_string(),
            required: true,
            ..FieldDetails::default()
        }),
    );

    let elements = vec![form_button, email, phone];
    let forecast = predict_clicks(&elements, &explicit_context(), &AnalysisConfig::default()).unwrap();

    let submit = forecast
        .predictions
        .iter()
        .find(|prediction| prediction.element_id == "submit")
        .unwrap();
    let projection = submit.form.as_ref().unwrap();

    assert!(projection.completion_rate > 0.0 && projection.completion_rate < 1.0);
    assert_eq!(projection.bottleneck_field.as_deref(), Some("f_phone"));
    assert!(projection.projected_leads <= submit.estimated_clicks);
}

#[test]
fn slow_pages_depress_the_ctr_prior() {
    let elements = vec![button("a", "Get started", 300.0)];
    let config = AnalysisConfig::default();

    let mut fast = explicit_context();
    fast.load_time = Some(1.5);
    let mut slow = explicit_context();
    slow.load_time = Some(7.0);

    let fast_forecast = predict_clicks(&elements, &fast, &config).unwrap();
    let slow_forecast = predict_clicks(&elements, &slow, &config).unwrap();

    assert!(slow_forecast.metadata.page_ctr < fast_forecast.metadata.page_ctr);
    assert!(slow_forecast.predictions[0]
        .risk_factors
        .iter()
        .any(|factor| factor == "slow-page-load"));
}

#[test]
fn full_pipeline_succeeds_on_defaulted_vertical() {
    let elements = vec![
        button("a", "Get started", 300.0),
        button("b", "Get started now", 500.0),
        nav_link("n1", "Pricing", 10.0),
        nav_link("n2", "Docs", 100.0),
    ];
    let mut context = PageContext::default();
    context.device = DeviceType::Mobile;

    let analysis = analyze_page(&elements, &context, &AnalysisConfig::default()).unwrap();

    assert!(analysis.forecast.primary_cta.is_some());
    let recommendation = analysis.recommendation.expect("recommendation");
    assert!(!recommendation.title.is_empty());
    let waste = analysis.waste.expect("waste analysis");
    assert!(waste.total_wasted_elements >= waste.high_risk_elements.len());
}
