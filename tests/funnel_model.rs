use cro_signals::config::FunnelConfig;
use cro_signals::funnel::{
    combine_factor_multipliers, derive_factor_recommendations, derive_step_factors,
    predict_step_from_captures, predict_step_rate, CombinationMode, FactorPriority,
    PostClickFactor, PostClickStep, StepCapture, Warmth,
};

fn factor(score: f64, max_lift: f64) -> PostClickFactor {
    PostClickFactor::new("factor", score, max_lift)
}

fn reference_factors() -> Vec<PostClickFactor> {
    vec![factor(0.8, 0.4), factor(0.6, 0.7), factor(0.9, 0.1)]
}

fn warm_step() -> PostClickStep {
    PostClickStep {
        name: "signup".to_string(),
        cold_base_rate: 0.10,
        warmth: Warmth::Warm,
        upper_cap: Some(0.65),
    }
}

#[test]
fn factor_multiplier_is_exact_at_the_endpoints() {
    assert_eq!(factor(0.0, 1.0).multiplier(), 1.0);
    assert_eq!(factor(1.0, 0.5).multiplier(), 1.5);
}

#[test]
fn factor_multiplier_is_monotone_in_score() {
    let mut previous = 0.0;
    for step in 0..=10 {
        let score = step as f64 / 10.0;
        let multiplier = factor(score, 0.6).multiplier();
        assert!(multiplier >= previous);
        previous = multiplier;
    }
}

#[test]
fn empty_factor_list_is_the_identity() {
    let combined = combine_factor_multipliers(&[], CombinationMode::Multiplicative);
    assert_eq!(combined, 1.0);
}

#[test]
fn reference_factors_combine_to_about_two() {
    let combined =
        combine_factor_multipliers(&reference_factors(), CombinationMode::Multiplicative);
    assert!((combined - 2.043).abs() < 0.005, "combined was {}", combined);
}

#[test]
fn zero_and_full_scores_combine_exactly() {
    let factors = vec![factor(0.0, 1.0), factor(1.0, 0.5)];
    let combined = combine_factor_multipliers(&factors, CombinationMode::Multiplicative);
    assert!((combined - 1.5).abs() < 1e-12);
}

#[test]
fn warm_step_with_reference_factors_lands_near_half() {
    let prediction = predict_step_rate(
        &warm_step(),
        CombinationMode::Multiplicative,
        &reference_factors(),
        &FunnelConfig::default(),
    );

    assert!(
        prediction.predicted_rate >= 0.45 && prediction.predicted_rate <= 0.60,
        "rate was {}",
        prediction.predicted_rate
    );
    assert!(!prediction.capped);
    assert!((prediction.warmth_multiplier - 2.45).abs() < 1e-9);
}

#[test]
fn warmth_multipliers_are_ordered() {
    let config = FunnelConfig::default();
    assert_eq!(config.warmth_multiplier(Warmth::Cold), 1.0);
    assert!(config.warmth_multiplier(Warmth::Hot) > config.warmth_multiplier(Warmth::Warm));
    assert!(config.warmth_multiplier(Warmth::Warm) > config.warmth_multiplier(Warmth::Cold));
}

#[test]
fn logit_mode_matches_multiplicative_for_one_small_lift() {
    let step = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: 0.05,
        warmth: Warmth::Cold,
        upper_cap: None,
    };
    let factors = vec![factor(1.0, 0.01)];
    let config = FunnelConfig::default();

    let multiplicative =
        predict_step_rate(&step, CombinationMode::Multiplicative, &factors, &config);
    let logit = predict_step_rate(&step, CombinationMode::Logit, &factors, &config);

    assert!(
        (multiplicative.predicted_rate - logit.predicted_rate).abs() < 5e-4,
        "multiplicative {} vs logit {}",
        multiplicative.predicted_rate,
        logit.predicted_rate
    );
}

#[test]
fn logit_mode_stays_bounded_under_extreme_lift() {
    let step = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: 0.5,
        warmth: Warmth::Hot,
        upper_cap: None,
    };
    let factors = vec![factor(1.0, 50.0), factor(1.0, 10.0)];

    let prediction = predict_step_rate(
        &step,
        CombinationMode::Logit,
        &factors,
        &FunnelConfig::default(),
    );

    assert!(prediction.predicted_rate > 0.0);
    assert!(prediction.predicted_rate < 1.0);
}

#[test]
fn cap_clamps_and_flags_the_prediction() {
    let step = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: 0.30,
        warmth: Warmth::Hot,
        upper_cap: Some(0.40),
    };

    let prediction = predict_step_rate(
        &step,
        CombinationMode::Multiplicative,
        &reference_factors(),
        &FunnelConfig::default(),
    );

    assert_eq!(prediction.predicted_rate, 0.40);
    assert!(prediction.capped);
}

#[test]
fn confidence_rewards_strong_factors_and_penalizes_cold_capped_steps() {
    let config = FunnelConfig::default();

    let strong = vec![factor(0.8, 0.2), factor(0.9, 0.2), factor(0.95, 0.2)];
    let uncapped = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: 0.10,
        warmth: Warmth::Warm,
        upper_cap: None,
    };
    let prediction = predict_step_rate(&uncapped, CombinationMode::Multiplicative, &strong, &config);
    assert!((prediction.confidence - 0.95).abs() < 1e-9);

    let capped = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: 0.50,
        warmth: Warmth::Cold,
        upper_cap: Some(0.20),
    };
    let weak = vec![factor(0.2, 0.5)];
    let prediction = predict_step_rate(&capped, CombinationMode::Multiplicative, &weak, &config);
    assert!((prediction.confidence - 0.45).abs() < 1e-9);
}

#[test]
fn confidence_never_leaves_its_band() {
    let config = FunnelConfig::default();
    let step = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: 0.9,
        warmth: Warmth::Cold,
        upper_cap: Some(0.05),
    };
    let prediction = predict_step_rate(&step, CombinationMode::Multiplicative, &[], &config);
    assert!(prediction.confidence >= 0.3);
    assert!(prediction.confidence <= 1.0);
}

#[test]
fn recommendations_rank_by_opportunity_and_respect_thresholds() {
    let factors = vec![
        PostClickFactor::new("message_match", 0.4, 0.35),
        PostClickFactor::new("form_friction", 0.9, 0.40),
        PostClickFactor::new("cta_clarity", 0.7, 0.30),
        PostClickFactor::new("page_speed", 0.5, 0.25),
    ];

    let recommendations = derive_factor_recommendations(&factors);

    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0].factor, "message_match");
    assert_eq!(recommendations[0].priority, FactorPriority::High);
    assert_eq!(recommendations[1].factor, "page_speed");
    assert_eq!(recommendations[1].priority, FactorPriority::Medium);
    assert_eq!(recommendations[2].factor, "cta_clarity");
    assert_eq!(recommendations[2].priority, FactorPriority::Medium);
}

#[test]
fn tiny_opportunities_are_dropped() {
    let factors = vec![PostClickFactor::new("trust_signals", 0.9, 0.15)];
    let recommendations = derive_factor_recommendations(&factors);
    assert!(recommendations.is_empty());
}

fn landing_capture() -> StepCapture {
    StepCapture {
        url: "https://example.com/demo".to_string(),
        headline: "Book a personalized demo".to_string(),
        cta_text: "Book my demo".to_string(),
        cta_count: 1,
        ..StepCapture::default()
    }
}

fn form_capture() -> StepCapture {
    StepCapture {
        url: "https://example.com/demo/form".to_string(),
        headline: "Book your personalized demo".to_string(),
        cta_text: "Confirm booking".to_string(),
        cta_count: 1,
        form_field_count: 4,
        required_field_count: 2,
        load_time: Some(1.8),
        mobile_optimized: true,
        trust_badges: true,
        testimonials: false,
        body_text: "Pick a time for your demo and we will confirm by email".to_string(),
    }
}

#[test]
fn derived_factors_cover_the_comparative_heuristics() {
    let factors = derive_step_factors(&landing_capture(), &form_capture());
    let names: Vec<&str> = factors.iter().map(|factor| factor.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "message_match",
            "form_friction",
            "page_speed",
            "mobile_optimization",
            "cta_clarity",
            "trust_signals",
            "commitment_momentum",
        ]
    );
    for factor in &factors {
        assert!(factor.score >= 0.0 && factor.score <= 1.0);
        assert!(factor.max_lift >= 0.0);
    }
}

#[test]
fn matched_messaging_scores_higher_than_a_mismatch() {
    let first = landing_capture();
    let matched = derive_step_factors(&first, &form_capture());

    let mut mismatch_page = form_capture();
    mismatch_page.headline = "Quarterly compliance webinar".to_string();
    mismatch_page.body_text = "Download the archived recording".to_string();
    let mismatched = derive_step_factors(&first, &mismatch_page);

    let matched_score = matched[0].score;
    let mismatched_score = mismatched[0].score;
    assert!(matched_score > mismatched_score);
}

#[test]
fn two_step_prediction_chains_an_upstream_rate() {
    let step = PostClickStep {
        name: "form".to_string(),
        cold_base_rate: 0.15,
        warmth: Warmth::Warm,
        upper_cap: Some(0.8),
    };

    let funnel = predict_step_from_captures(
        &step,
        &landing_capture(),
        &form_capture(),
        CombinationMode::Multiplicative,
        &FunnelConfig::default(),
        Some(0.04),
    );

    let end_to_end = funnel.end_to_end_rate.expect("chained rate");
    assert!((end_to_end - 0.04 * funnel.step.predicted_rate).abs() < 1e-12);
    assert_eq!(funnel.step.factors.len(), 7);
}
