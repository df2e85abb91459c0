use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{
    ApiAnalyzeRequest, ApiAnalyzeResponse, ApiFunnelRequest, ApiFunnelResponse, ApiStepsRequest,
    ApiStepsResponse,
};
use cro_signals::funnel::{
    derive_factor_recommendations, predict_step_from_captures, predict_step_rate, CombinationMode,
};
use cro_signals::{analyze_page, normalize_elements, predict_clicks, AnalysisConfig, AnalysisError};

#[derive(Clone)]
struct AppState {
    config: Arc<AnalysisConfig>,
}

pub async fn serve(args: crate::ServeArgs, config: AnalysisConfig) -> Result<(), String> {
    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/funnel", post(funnel_handler))
        .route("/api/funnel/steps", post(steps_handler))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    tracing::info!(%addr, "listening");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

fn error_response(err: AnalysisError) -> (StatusCode, String) {
    match err {
        AnalysisError::Decode(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        AnalysisError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    }
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<ApiAnalyzeResponse>, (StatusCode, String)> {
    let context = request.page.into_context().map_err(error_response)?;
    let elements = normalize_elements(&request.elements, context.fold_offset);
    tracing::debug!(elements = elements.len(), url = %context.url, "analyzing page");

    let analysis = analyze_page(&elements, &context, &state.config).map_err(error_response)?;
    Ok(Json(ApiAnalyzeResponse::from_analysis(
        context.url.clone(),
        analysis,
    )))
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<cro_signals::ClickForecast>, (StatusCode, String)> {
    let context = request.page.into_context().map_err(error_response)?;
    let elements = normalize_elements(&request.elements, context.fold_offset);
    let forecast = predict_clicks(&elements, &context, &state.config).map_err(error_response)?;
    Ok(Json(forecast))
}

async fn funnel_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiFunnelRequest>,
) -> Result<Json<ApiFunnelResponse>, (StatusCode, String)> {
    let (step, mode, factors) = request.into_parts().map_err(error_response)?;
    let prediction = predict_step_rate(&step, mode, &factors, &state.config.funnel);
    let recommendations = derive_factor_recommendations(&factors);
    Ok(Json(ApiFunnelResponse {
        mode: mode.label().to_string(),
        prediction,
        recommendations,
    }))
}

async fn steps_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiStepsRequest>,
) -> Result<Json<ApiStepsResponse>, (StatusCode, String)> {
    let step = request.step.into_step().map_err(error_response)?;
    let mode = match request.mode.as_deref() {
        Some(value) => CombinationMode::from_str(value).ok_or_else(|| {
            error_response(AnalysisError::decode(format!("invalid mode: {}", value)))
        })?,
        None => state.config.funnel.to_mode(),
    };
    let funnel = predict_step_from_captures(
        &step,
        &request.first,
        &request.second,
        mode,
        &state.config.funnel,
        request.upstream_rate,
    );
    let recommendations = derive_factor_recommendations(&funnel.step.factors);
    Ok(Json(ApiStepsResponse {
        mode: mode.label().to_string(),
        prediction: funnel.step,
        end_to_end_rate: funnel.end_to_end_rate,
        recommendations,
    }))
}
