use cro_signals::context::DeviceType;
use cro_signals::element::{Element, ElementDetail, Geometry};
use cro_signals::scoring::waste::WasteClass;
use cro_signals::scoring::{analyze_wasted_clicks, ClickPrediction, ConfidenceTier};
use cro_signals::{generate_recommendation, AnalysisConfig, AnalysisError};

fn prediction(id: &str, share: f64) -> ClickPrediction {
    ClickPrediction {
        element_id: id.to_string(),
        ctr: share * 3.0 / 100.0,
        ctr_decimal: share * 3.0 / 10000.0,
        estimated_clicks: share,
        click_share: share,
        wasted_clicks: 0.0,
        wasted_spend: 0.0,
        confidence: ConfidenceTier::Medium,
        risk_factors: Vec::new(),
        form: None,
    }
}

fn primary_button() -> Element {
    let mut element = Element::new(
        "primary",
        "Get started",
        "button",
        Geometry::new(100.0, 300.0, 200.0, 50.0),
        ElementDetail::Button { form_action: None },
    );
    element.button_styled = true;
    element
}

fn rival_button() -> Element {
    let mut element = Element::new(
        "rival",
        "Get started free",
        "button",
        Geometry::new(500.0, 320.0, 200.0, 50.0),
        ElementDetail::Button { form_action: None },
    );
    element.button_styled = true;
    element
}

fn sticky_video() -> Element {
    let mut element = Element::new(
        "video",
        "Watch our story",
        "video",
        Geometry::new(700.0, 200.0, 150.0, 100.0),
        ElementDetail::GenericClickable,
    );
    element.autoplay = true;
    element.sticky = true;
    element.high_visual_noise = true;
    element.decorative = true;
    element
}

fn nav(id: &str, text: &str, x: f64) -> Element {
    Element::new(
        id,
        text,
        "a",
        Geometry::new(x, 280.0, 180.0, 40.0),
        ElementDetail::NavigationLink,
    )
}

#[test]
fn primary_is_never_scored() {
    let elements = vec![primary_button(), rival_button(), sticky_video()];
    let predictions = vec![prediction("primary", 40.0), prediction("rival", 25.0), prediction("video", 15.0)];

    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    assert!(analysis.scores.iter().all(|score| score.element_id != "primary"));
    assert!(analysis
        .high_risk_elements
        .iter()
        .all(|score| score.element_id != "primary"));
}

#[test]
fn wasted_count_bounds_high_risk_count() {
    let elements = vec![primary_button(), rival_button(), sticky_video(), nav("n1", "Blog", 60.0)];
    let predictions = vec![
        prediction("primary", 40.0),
        prediction("rival", 25.0),
        prediction("video", 15.0),
        prediction("n1", 5.0),
    ];

    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    assert!(analysis.total_wasted_elements >= analysis.high_risk_elements.len());
    if analysis.total_wasted_elements > 0 {
        assert!(analysis.average_wasted_score > 0.0);
    }
}

#[test]
fn near_duplicate_cta_classifies_as_competing() {
    let elements = vec![primary_button(), rival_button()];
    let predictions = vec![prediction("primary", 45.0), prediction("rival", 30.0)];

    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    let rival = analysis
        .scores
        .iter()
        .find(|score| score.element_id == "rival")
        .unwrap();
    assert_eq!(rival.classification, WasteClass::CompetingCta);
    assert!(rival.score > 0.55, "score was {}", rival.score);
    assert!(rival.factors.intent_overlap > 0.5);
}

#[test]
fn noisy_media_classifies_as_decorative() {
    let elements = vec![primary_button(), sticky_video()];
    let predictions = vec![prediction("primary", 45.0), prediction("video", 12.0)];

    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    let video = analysis
        .scores
        .iter()
        .find(|score| score.element_id == "video")
        .unwrap();
    assert_eq!(video.classification, WasteClass::Decorative);
    assert!(video.factors.noise > 0.8);
}

#[test]
fn scored_nav_links_classify_as_navigational_noise() {
    let elements = vec![primary_button(), nav("n1", "Pricing", 320.0)];
    let predictions = vec![prediction("primary", 45.0), prediction("n1", 18.0)];

    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    let link = analysis
        .scores
        .iter()
        .find(|score| score.element_id == "n1")
        .unwrap();
    assert!(link.score > 0.25, "score was {}", link.score);
    assert_eq!(link.classification, WasteClass::NavigationalNoise);
}

#[test]
fn analysis_is_deterministic() {
    let elements = vec![primary_button(), rival_button(), sticky_video(), nav("n1", "Blog", 60.0)];
    let predictions = vec![
        prediction("primary", 40.0),
        prediction("rival", 25.0),
        prediction("video", 15.0),
        prediction("n1", 5.0),
    ];
    let config = AnalysisConfig::default();

    let first = analyze_wasted_clicks(&elements, &elements[0], &predictions, &config).unwrap();
    let second = analyze_wasted_clicks(&elements, &elements[0], &predictions, &config).unwrap();

    assert_eq!(first.total_wasted_elements, second.total_wasted_elements);
    assert_eq!(first.high_risk_elements.len(), second.high_risk_elements.len());
    for (a, b) in first.scores.iter().zip(second.scores.iter()) {
        assert_eq!(a.element_id, b.element_id);
        assert_eq!(a.score, b.score);
        assert_eq!(a.classification, b.classification);
    }
}

#[test]
fn high_risk_elements_sorted_descending() {
    let elements = vec![primary_button(), rival_button(), sticky_video(), nav("n1", "Get started", 320.0)];
    let predictions = vec![
        prediction("primary", 40.0),
        prediction("rival", 30.0),
        prediction("video", 20.0),
        prediction("n1", 10.0),
    ];

    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    for pair in analysis.high_risk_elements.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn missing_primary_is_a_validation_error() {
    let elements = vec![rival_button()];
    let predictions = vec![prediction("rival", 30.0)];
    let outsider = primary_button();

    let result = analyze_wasted_clicks(
        &elements,
        &outsider,
        &predictions,
        &AnalysisConfig::default(),
    );

    assert!(matches!(result, Err(AnalysisError::Validation(_))));
}

#[test]
fn recommendation_requires_a_primary_cta() {
    let elements = vec![primary_button(), rival_button()];
    let predictions = vec![prediction("primary", 45.0), prediction("rival", 30.0)];
    let analysis = analyze_wasted_clicks(
        &elements,
        &elements[0],
        &predictions,
        &AnalysisConfig::default(),
    )
    .unwrap();

    let missing = generate_recommendation(&analysis, "", 0.032, false, DeviceType::Desktop);
    assert!(matches!(missing, Err(AnalysisError::Validation(_))));

    let ok = generate_recommendation(&analysis, "Get started", 0.032, false, DeviceType::Desktop)
        .unwrap();
    assert_eq!(ok.remove_elements.len(), analysis.high_risk_elements.len());
    assert!(ok.projected_rate >= 0.032);
}
