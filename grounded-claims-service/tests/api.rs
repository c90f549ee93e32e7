use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use grounded_claims_service::{ServiceConfig, create_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    create_app(&ServiceConfig::default()).unwrap()
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_healthy() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-correlation-id"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["POST /grounded/query"].is_string());
}

#[tokio::test]
async fn grounded_query_returns_cited_answer() {
    let (status, body) = post(
        app(),
        "/grounded/query",
        json!({
            "userQuery": "What reserve should we hold for this collision?",
            "graphContext": {
                "claim": { "id": "C-77", "claimType": "Collision", "claimAmount": 8000 }
            },
            "requiredTools": ["SPARQL_SELECT", "RESERVE_CALC"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validationErrors"], json!([]));
    assert_eq!(body["followUpNeeded"], json!(false));
    assert!(body.get("followUpQuestion").is_none());
    assert!(body["processingTime"].is_u64());

    let facts = body["factsUsed"].as_array().unwrap();
    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0]["iri"], "autoins:claim_C-77#claimType");
    assert_eq!(facts[0]["property"], "autoins:claimType");
    assert_eq!(facts[0]["source"], "SPARQL_SELECT");

    let calcs = body["calculationsPerformed"].as_array().unwrap();
    assert_eq!(calcs.len(), 1);
    assert_eq!(calcs[0]["type"], "RESERVE_CALC");
    assert_eq!(calcs[0]["result"]["baseReserve"], json!(4000.0));
    assert_eq!(calcs[0]["result"]["reserveBand"], "£2k-5k");

    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("(IRI: autoins:claim_C-77#claimType)"));
    assert!(answer.contains("**Analysis:**"));
}

#[tokio::test]
async fn invalid_request_is_unprocessable_with_full_body() {
    let (status, body) = post(
        app(),
        "/grounded/query",
        json!({
            "userQuery": "",
            "graphContext": {},
            "requiredTools": ["GUESS"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let codes: Vec<&str> = body["validationErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["MISSING_USER_QUERY", "INVALID_TOOL"]);
    assert_eq!(body["factsUsed"], json!([]));
    assert_eq!(body["calculationsPerformed"], json!([]));
    assert_eq!(body["confidenceLevel"], json!(0.0));
}

#[tokio::test]
async fn null_fields_reach_the_validator() {
    let (status, body) = post(
        app(),
        "/grounded/query",
        json!({
            "userQuery": null,
            "graphContext": null,
            "requiredTools": null
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let codes: Vec<&str> = body["validationErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["MISSING_USER_QUERY", "MISSING_REQUIRED_TOOLS"]);
    assert_eq!(
        body["answer"],
        "Request validation failed. Please correct the errors and try again."
    );
}

#[tokio::test]
async fn non_string_tool_entry_is_an_invalid_tool() {
    let (status, body) = post(
        app(),
        "/grounded/query",
        json!({
            "userQuery": "Estimate the reserve",
            "requiredTools": ["RESERVE_CALC", 7]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["validationErrors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], "INVALID_TOOL");
    assert!(errors[0]["message"].as_str().unwrap().starts_with("Tool '7' is not available"));
    assert_eq!(body["calculationsPerformed"], json!([]));
}

#[tokio::test]
async fn malformed_json_is_rejected_by_the_decoder() {
    let request = Request::builder()
        .method("POST")
        .uri("/grounded/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"userQuery\": "))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn reserve_endpoint_runs_calculator_directly() {
    let (status, body) = post(
        app(),
        "/grounded/reserve",
        json!({
            "lossType": "Theft",
            "vehicleACV": 30000,
            "hasFraudSignals": true
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseReserve"], json!(12000.0));
    assert_eq!(body["reserveBand"], "£10k-25k");
    assert!(
        body["breakdown"]
            .as_str()
            .unwrap()
            .starts_with("Base Reserve: £12000.00 + Fraud Risk: £1200.00")
    );
}

#[tokio::test]
async fn fraud_endpoint_scores_indicators() {
    let (status, body) = post(
        app(),
        "/grounded/fraud",
        json!({ "late_reporting": true, "multiple_recent_claims": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["riskLevel"], "MEDIUM");
    assert!((body["riskScore"].as_f64().unwrap() - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn fraud_endpoint_rejects_non_object_body() {
    let (status, body) = post(app(), "/grounded/fraud", json!([true])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("JSON object"));
}

#[tokio::test]
async fn fnol_endpoint_reports_completeness() {
    let (status, body) = post(
        app(),
        "/grounded/fnol/validate",
        json!({
            "claimType": "Collision",
            "claimDate": "2024-05-02",
            "incidentDate": "2024-05-01"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isComplete"], json!(false));
    assert_eq!(body["completeness"], json!(50.0));
    assert_eq!(
        body["missingFields"],
        json!(["hasIncident", "relatesToPolicy", "claimDescription"])
    );
}
