mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use api::{ApiAnalyzeRequest, ApiFactor};
use cro_signals::funnel::{
    derive_factor_recommendations, predict_step_rate, PostClickStep, Warmth,
};
use cro_signals::{
    analyze_page, format_float, format_number, format_percent, normalize_elements, AnalysisConfig,
};

#[derive(Parser)]
#[command(name = "cro-signals", about = "Conversion signal engine for captured web pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    Funnel(FunnelArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// Path to a capture JSON file; reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct FunnelArgs {
    #[arg(long, default_value_t = 0.10)]
    base_rate: f64,
    #[arg(long, default_value = "cold")]
    warmth: String,
    #[arg(long)]
    cap: Option<f64>,
    #[arg(long)]
    mode: Option<String>,
    /// Path to a JSON array of factors: [{"name", "score", "max_lift"}].
    #[arg(long)]
    factors: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Funnel(args) => run_funnel(args),
        Command::Serve(args) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .init();
            let (config, _) = AnalysisConfig::load(args.config.clone())?;
            server::serve(args, config).await
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let payload = read_input(args.input.as_deref())?;
    let request: ApiAnalyzeRequest =
        serde_json::from_str(&payload).map_err(|err| format!("invalid capture JSON: {}", err))?;
    let context = request
        .page
        .into_context()
        .map_err(|err| err.to_string())?;
    let elements = normalize_elements(&request.elements, context.fold_offset);
    let (config, _) = AnalysisConfig::load(args.config)?;

    let analysis = analyze_page(&elements, &context, &config).map_err(|err| err.to_string())?;
    let labels: HashMap<&str, &str> = elements
        .iter()
        .map(|element| (element.id.as_str(), element.text.as_str()))
        .collect();

    let meta = &analysis.forecast.metadata;
    println!(
        "Page CTR prior: {}% ({} industry{}, {} impressions assumed)",
        format_float(meta.page_ctr, 2),
        meta.industry.label(),
        if meta.industry_detected {
            " [auto-detected]"
        } else {
            ""
        },
        format_number(meta.assumed_impressions)
    );

    match analysis.forecast.primary_cta.as_deref() {
        Some(primary) => println!(
            "Primary CTA: \"{}\" ({})",
            labels.get(primary).copied().unwrap_or(primary),
            primary
        ),
        None => println!("Primary CTA: none resolved"),
    }

    if args.details {
        println!("\nPredictions:");
        for prediction in &analysis.forecast.predictions {
            println!(
                "  {} | ctr {}% | clicks {} | share {}% | wasted {} (${})",
                labels
                    .get(prediction.element_id.as_str())
                    .copied()
                    .unwrap_or(prediction.element_id.as_str()),
                format_float(prediction.ctr, 2),
                format_number(prediction.estimated_clicks),
                format_float(prediction.click_share, 1),
                format_number(prediction.wasted_clicks),
                format_float(prediction.wasted_spend, 2)
            );
        }
    }

    if let Some(waste) = &analysis.waste {
        println!(
            "\nWasted attention: {} element(s) above threshold | average score {}",
            waste.total_wasted_elements,
            format_float(waste.average_wasted_score, 2)
        );
        for score in &waste.high_risk_elements {
            println!(
                "  [{}] {} ({})",
                score.classification.label(),
                labels
                    .get(score.element_id.as_str())
                    .copied()
                    .unwrap_or(score.element_id.as_str()),
                format_float(score.score, 2)
            );
        }
    }

    if let Some(recommendation) = &analysis.recommendation {
        println!("\nRecommendation: {}", recommendation.title);
        println!("  {}", recommendation.description);
        println!(
            "  effort {} | impact {} | priority {} | confidence {}",
            recommendation.effort.label(),
            recommendation.impact.label(),
            recommendation.priority.label(),
            recommendation.confidence.label()
        );
    }

    for warning in &analysis.forecast.warnings {
        println!("Warning: {}", warning);
    }

    Ok(())
}

fn run_funnel(args: FunnelArgs) -> Result<(), String> {
    let (config, _) = AnalysisConfig::load(args.config.clone())?;
    let warmth = Warmth::from_str(&args.warmth)
        .ok_or_else(|| format!("invalid warmth (cold|warm|hot): {}", args.warmth))?;
    let mode = match args.mode.as_deref() {
        Some(value) => cro_signals::funnel::CombinationMode::from_str(value)
            .ok_or_else(|| format!("invalid mode (multiplicative|logit): {}", value))?,
        None => config.funnel.to_mode(),
    };

    let factors = match args.factors {
        Some(path) => {
            let payload = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read factors: {}", err))?;
            let raw: Vec<ApiFactor> = serde_json::from_str(&payload)
                .map_err(|err| format!("invalid factors JSON: {}", err))?;
            raw.into_iter()
                .map(|factor| factor.into_factor().map_err(|err| err.to_string()))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => {
            println!("Warning: no factors supplied; combined multiplier is 1.0");
            Vec::new()
        }
    };

    let step = PostClickStep {
        name: "step".to_string(),
        cold_base_rate: args.base_rate,
        warmth,
        upper_cap: args.cap,
    };
    let prediction = predict_step_rate(&step, mode, &factors, &config.funnel);

    println!(
        "Predicted rate: {} ({} mode{})",
        format_percent(prediction.predicted_rate),
        mode.label(),
        if prediction.capped { ", capped" } else { "" }
    );
    println!(
        "Warmth multiplier: {}x | factor multiplier: {}x | confidence {}",
        format_float(prediction.warmth_multiplier, 2),
        format_float(prediction.factor_multiplier, 3),
        format_float(prediction.confidence, 2)
    );

    let recommendations = derive_factor_recommendations(&factors);
    if !recommendations.is_empty() {
        println!("\nBiggest opportunities:");
        for recommendation in recommendations {
            println!(
                "- [{}] {}: {} (opportunity {})",
                match recommendation.priority {
                    cro_signals::funnel::FactorPriority::High => "high",
                    cro_signals::funnel::FactorPriority::Medium => "medium",
                },
                recommendation.factor,
                recommendation.advice,
                format_float(recommendation.opportunity, 2)
            );
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    if let Some(path) = path {
        return std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read input: {}", err));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    if buffer.trim().is_empty() {
        return Err("missing capture JSON: pass --input or pipe stdin".to_string());
    }
    Ok(buffer)
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
