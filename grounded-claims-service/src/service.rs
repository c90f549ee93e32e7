use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, info};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    error::{ApiError, ConfigError},
    facts::ContextFactStore,
    fnol::{FnolValidationResult, validate_fnol},
    models::{GroundedRequest, GroundedResponse},
    pipeline::GroundedPipeline,
    tools::{Calculators, ClaimData, FraudAssessment, ReserveResult},
};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: GroundedPipeline,
    pub calculators: Arc<Calculators>,
}

pub fn create_app(config: &ServiceConfig) -> Result<Router, ConfigError> {
    let app_state = create_app_state(config)?;
    Ok(build_router(app_state))
}

fn create_app_state(config: &ServiceConfig) -> Result<AppState, ConfigError> {
    let tables = Arc::new(config.load_tables()?);
    let calculators = Arc::new(Calculators::new(tables));
    let pipeline = GroundedPipeline::new(
        calculators.clone(),
        Arc::new(ContextFactStore),
        config.fact_store_timeout,
    );

    Ok(AppState {
        pipeline,
        calculators,
    })
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/grounded/query", post(grounded_query))
        .route("/grounded/reserve", post(calculate_reserve))
        .route("/grounded/fraud", post(assess_fraud))
        .route("/grounded/fnol/validate", post(check_fnol))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tag every request with a correlation id and run it inside a span
async fn correlation_id_middleware(mut request: Request<axum::body::Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request
            .headers_mut()
            .insert(CORRELATION_ID_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Grounded Claims Reasoning Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Fact-grounded claim reasoning with deterministic reserve, fraud and coverage calculations",
        "endpoints": {
            "POST /grounded/query": "Answer a claim question from graph facts and calculation tools",
            "POST /grounded/reserve": "Run the reserve calculator directly",
            "POST /grounded/fraud": "Run the fraud scorer directly",
            "POST /grounded/fnol/validate": "Check a first notice of loss for completeness",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn grounded_query(
    State(state): State<AppState>,
    Json(request): Json<GroundedRequest>,
) -> Result<(StatusCode, Json<GroundedResponse>), ApiError> {
    info!(
        query_length = request.user_query.len(),
        tools = ?request.required_tools,
        "Processing grounded query"
    );

    let response = state.pipeline.process(request).await?;
    let status = if response.validation_errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((status, Json(response)))
}

async fn calculate_reserve(
    State(state): State<AppState>,
    Json(claim): Json<ClaimData>,
) -> Json<ReserveResult> {
    info!(loss_type = %claim.loss_type, "Calculating reserve");
    Json(state.calculators.reserve.calculate(&claim))
}

async fn assess_fraud(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<FraudAssessment>, ApiError> {
    let indicators = expect_object(body, "fraud indicators")?;
    let assessment = state.calculators.fraud.assess(&indicators);
    info!(
        risk_score = assessment.risk_score,
        risk_level = %assessment.risk_level,
        "Assessed fraud risk"
    );
    Ok(Json(assessment))
}

async fn check_fnol(Json(body): Json<Value>) -> Result<Json<FnolValidationResult>, ApiError> {
    let claim = expect_object(body, "claim")?;
    let result = validate_fnol(&claim);
    info!(
        completeness = result.completeness,
        is_complete = result.is_complete,
        "Validated FNOL submission"
    );
    Ok(Json(result))
}

fn expect_object(body: Value, what: &str) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(format!("{what} must be a JSON object"))),
    }
}
