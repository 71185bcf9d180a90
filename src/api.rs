//! HTTP surface for the fuzzy model server.
//!
//! The router exposes:
//!
//! - `GET /healthcheck`, `GET /liveliness` – fixed payloads, independent of the model.
//! - `GET /readiness` – `{"status":"ready"}` once a model is installed, 503 otherwise.
//! - `GET /version` – build identifier from `BUILD_VERSION`.
//! - `GET /predict` – wash-time or lesson-difficulty prediction, depending on the loaded
//!   artifact. Invalid parameters produce a 422 with one entry per offending parameter;
//!   inference failures produce a 500.
//! - `GET /metrics` – prediction counters.
//! - `GET /openapi.json` – OpenAPI document for the loaded variant.

use crate::inference::{
    DifficultyMemberships, PredictionError, QueryParams, WashTimeInputs, format_wash_time,
};
use crate::metrics::{MetricsSnapshot, PredictionMetrics};
use crate::model::{ModelHandle, ModelState, ReadinessError, ServingModel};
use crate::openapi;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Write-once model handle.
    pub model: ModelHandle,
    /// Identifier reported by `/version`.
    pub build_version: Arc<str>,
    /// Prediction counters.
    pub metrics: Arc<PredictionMetrics>,
}

impl AppState {
    /// Build state around a model handle and build identifier.
    pub fn new(model: ModelHandle, build_version: impl Into<Arc<str>>) -> Self {
        Self {
            model,
            build_version: build_version.into(),
            metrics: Arc::new(PredictionMetrics::new()),
        }
    }
}

/// Build the HTTP router exposing health, version and prediction endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/liveliness", get(liveliness))
        .route("/readiness", get(readiness))
        .route("/version", get(version))
        .route("/predict", get(predict))
        .route("/metrics", get(get_metrics))
        .route("/openapi.json", get(get_openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Fixed status payload shared by the health endpoints.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

/// Checks if the server is healthy.
async fn healthcheck() -> Json<StatusResponse> {
    Json(StatusResponse { status: "healthy" })
}

/// Checks if the process is running and accepting connections.
async fn liveliness() -> Json<StatusResponse> {
    Json(StatusResponse { status: "alive" })
}

/// Checks whether a model is installed and predictions can be served.
async fn readiness(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    state.model.check_ready()?;
    Ok(Json(StatusResponse { status: "ready" }))
}

#[derive(Serialize)]
struct VersionResponse {
    version: String,
}

async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.build_version.to_string(),
    })
}

#[derive(Serialize)]
struct WashTimeResponse {
    wash_time: String,
}

#[derive(Serialize)]
struct LessonDifficultyResponse {
    lesson_difficulty: f64,
    fuzzy_membership_degrees: DifficultyMemberships,
}

/// Run a prediction against whichever model variant is loaded.
///
/// Parameters are validated before any simulation state is created; every call evaluates a
/// fresh simulation so concurrent requests never share inputs or outputs.
async fn predict(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let model = match state.model.state() {
        ModelState::Loaded(model) => model,
        ModelState::NotLoaded => return Err(ReadinessError::NotLoaded.into()),
    };
    let params = QueryParams(&raw);

    let outcome = match &model.serving {
        ServingModel::WashTime(wash) => WashTimeInputs::from_query(params)
            .and_then(|inputs| wash.predict(inputs))
            .map(|wash_time| {
                Json(WashTimeResponse {
                    wash_time: format_wash_time(wash_time),
                })
                .into_response()
            }),
        ServingModel::LessonDifficulty(lesson) => lesson
            .resolve_inputs(params)
            .and_then(|inputs| lesson.predict(inputs))
            .map(|prediction| {
                let rounded = prediction.rounded();
                Json(LessonDifficultyResponse {
                    lesson_difficulty: rounded.difficulty,
                    fuzzy_membership_degrees: rounded.memberships,
                })
                .into_response()
            }),
    };

    match &outcome {
        Ok(_) => state.metrics.record_success(),
        Err(err) if err.is_client_error() => state.metrics.record_rejection(),
        Err(_) => state.metrics.record_failure(),
    }
    outcome.map_err(AppError::from)
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn get_openapi(State(state): State<AppState>) -> Json<serde_json::Value> {
    let kind = match state.model.state() {
        ModelState::Loaded(model) => Some(model.serving.kind()),
        ModelState::NotLoaded => None,
    };
    Json(openapi::document(kind))
}

enum AppError {
    NotReady(ReadinessError),
    Prediction(PredictionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotReady(err) => {
                tracing::warn!(error = %err, "Service not ready");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": err.to_string() })),
                )
                    .into_response()
            }
            Self::Prediction(PredictionError::InvalidParameters(issues)) => {
                let detail: Vec<_> = issues
                    .iter()
                    .map(|issue| {
                        json!({
                            "loc": ["query", issue.parameter],
                            "msg": issue.message(),
                            "type": issue.code(),
                            "input": issue.input,
                        })
                    })
                    .collect();
                tracing::info!(issues = issues.len(), "Rejected prediction request");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": detail })),
                )
                    .into_response()
            }
            Self::Prediction(err @ PredictionError::Computation(_)) => {
                tracing::error!(error = %err, "Prediction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ReadinessError> for AppError {
    fn from(inner: ReadinessError) -> Self {
        Self::NotReady(inner)
    }
}

impl From<PredictionError> for AppError {
    fn from(inner: PredictionError) -> Self {
        Self::Prediction(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppState, create_router};
    use crate::fuzzy::{Antecedent, Consequent, Rule};
    use crate::model::{ModelHandle, ServingModel, parse_model};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::path::Path;
    use tokio::task::JoinSet;
    use tower::ServiceExt;

    const WASH_MODEL: &[u8] = include_bytes!("../data/model.json");
    const LESSON_MODEL: &[u8] = include_bytes!("../data/lesson_model.json");

    fn state_with(bytes: &[u8]) -> AppState {
        let model = parse_model(bytes, Path::new("test-model.json")).expect("model parses");
        AppState::new(ModelHandle::loaded(model), "1.0.0-dev")
    }

    async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = create_router(state.clone())
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json body");
        (status, json)
    }

    /// Answers for `uris` sent one at a time, then all at once, both in request order.
    async fn sequential_and_concurrent(
        state: &AppState,
        uris: &[String],
    ) -> (Vec<(StatusCode, Value)>, Vec<(StatusCode, Value)>) {
        let mut sequential = Vec::with_capacity(uris.len());
        for uri in uris {
            sequential.push(get(state, uri).await);
        }

        let mut tasks = JoinSet::new();
        for (index, uri) in uris.iter().cloned().enumerate() {
            let state = state.clone();
            tasks.spawn(async move { (index, get(&state, &uri).await) });
        }
        let mut concurrent = vec![None; uris.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, response) = joined.expect("request task");
            concurrent[index] = Some(response);
        }
        let concurrent = concurrent
            .into_iter()
            .map(|response| response.expect("every request answered"))
            .collect();
        (sequential, concurrent)
    }

    async fn requests_counted(state: &AppState) -> u64 {
        let (_, metrics) = get(state, "/metrics").await;
        let counter = |key: &str| metrics[key].as_u64().expect("counter");
        counter("predictions_served")
            + counter("prediction_failures")
            + counter("rejected_requests")
    }

    #[tokio::test]
    async fn health_endpoints_ignore_model_state() {
        let empty = AppState::new(ModelHandle::new(), "x");
        for state in [empty, state_with(WASH_MODEL)] {
            let (status, body) = get(&state, "/healthcheck").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, serde_json::json!({ "status": "healthy" }));

            let (status, body) = get(&state, "/liveliness").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, serde_json::json!({ "status": "alive" }));
        }
    }

    #[tokio::test]
    async fn readiness_tracks_model_installation() {
        let handle = ModelHandle::new();
        let state = AppState::new(handle.clone(), "1.0.0-dev");

        let (status, body) = get(&state, "/readiness").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Model not loaded");

        let model = parse_model(WASH_MODEL, Path::new("model.json")).expect("model");
        handle.install(model).expect("install");
        let (status, body) = get(&state, "/readiness").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn version_reports_configured_build() {
        let state = AppState::new(ModelHandle::new(), "2024.10.3+abc123");
        let (status, body) = get(&state, "/version").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "version": "2024.10.3+abc123" }));
    }

    #[tokio::test]
    async fn predict_without_model_is_unavailable() {
        let state = AppState::new(ModelHandle::new(), "1.0.0-dev");
        let uri = "/predict?soil_level=200&load_size=10&water_temperature=50";
        let (status, body) = get(&state, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Model not loaded");
    }

    #[tokio::test]
    async fn wash_prediction_is_deterministic() {
        let state = state_with(WASH_MODEL);
        let uri = "/predict?soil_level=200&load_size=10&water_temperature=50";
        let (status, first) = get(&state, uri).await;
        assert_eq!(status, StatusCode::OK);
        let wash_time = first["wash_time"].as_str().expect("string output");
        let value: f64 = wash_time.parse().expect("numeric string");
        assert!(value > 0.0 && value < 120.0, "{value}");

        for _ in 0..3 {
            let (_, again) = get(&state, uri).await;
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn wash_prediction_missing_parameter_is_422() {
        let state = state_with(WASH_MODEL);
        let (status, body) = get(&state, "/predict?soil_level=200&load_size=10").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_array().expect("detail list");
        assert_eq!(detail.len(), 1);
        assert_eq!(
            detail[0]["loc"],
            serde_json::json!(["query", "water_temperature"])
        );
        assert_eq!(detail[0]["type"], "missing");

        let uri = "/predict?soil_level=dirty&load_size=10&water_temperature=50";
        let (status, body) = get(&state, uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["type"], "float_parsing");
        assert_eq!(body["detail"][0]["input"], "dirty");
    }

    #[tokio::test]
    async fn computation_failures_surface_as_500() {
        let mut model = parse_model(WASH_MODEL, Path::new("model.json")).expect("model");
        let ServingModel::WashTime(wash) = &model.serving else {
            panic!("expected wash model");
        };
        let mut system = wash.system().clone();
        system.rules = vec![Rule {
            antecedent: Antecedent::Is {
                variable: "soil_level".into(),
                term: "high".into(),
            },
            consequents: vec![Consequent {
                variable: "wash_time".into(),
                term: "long".into(),
            }],
            weight: 1.0,
        }];
        model.serving =
            ServingModel::WashTime(crate::inference::WashTimeModel::new(system).expect("model"));
        let state = AppState::new(ModelHandle::loaded(model), "1.0.0-dev");

        let uri = "/predict?soil_level=0&load_size=10&water_temperature=50";
        let (status, body) = get(&state, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().expect("detail");
        assert!(detail.contains("wash_time"), "{detail}");

        let (_, metrics) = get(&state, "/metrics").await;
        assert_eq!(metrics["prediction_failures"], 1);
        assert_eq!(metrics["predictions_served"], 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_wash_predictions_match_sequential_answers() {
        let state = state_with(WASH_MODEL);
        let uris: Vec<String> = (0..32_usize)
            .map(|i| {
                let soil_level = if i % 8 == 7 {
                    "dirty".to_string()
                } else {
                    ((i * 37) % 1001).to_string()
                };
                format!(
                    "/predict?soil_level={soil_level}&load_size={}&water_temperature={}",
                    (i % 9) as f64 * 2.5,
                    (i * 13) % 101
                )
            })
            .collect();

        let (sequential, concurrent) = sequential_and_concurrent(&state, &uris).await;
        assert_eq!(concurrent.len(), 32);
        for (index, (expected, actual)) in sequential.iter().zip(&concurrent).enumerate() {
            assert_eq!(actual.0, expected.0, "status of {}", uris[index]);
            assert_eq!(actual.1, expected.1, "body of {}", uris[index]);
        }
        let count = |wanted: StatusCode| concurrent.iter().filter(|r| r.0 == wanted).count();
        assert!(count(StatusCode::OK) > 0);
        assert_eq!(count(StatusCode::UNPROCESSABLE_ENTITY), 4);
        assert_eq!(requests_counted(&state).await, 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lesson_predictions_are_bit_identical() {
        const LEVELS: [&str; 5] = ["beginner", "intermediate", "expert", "7.3", "wizard"];
        const ACCURACIES: [&str; 5] = ["low", "medium", "high", "64", "91.5"];
        let state = state_with(LESSON_MODEL);
        let uris: Vec<String> = (0..32_usize)
            .map(|i| {
                format!(
                    "/predict?user_level_parameter={}&accuracy_parameter={}",
                    LEVELS[i % LEVELS.len()],
                    ACCURACIES[(i / LEVELS.len()) % ACCURACIES.len()]
                )
            })
            .collect();
        let bits = |body: &Value| -> Vec<u64> {
            let degrees = &body["fuzzy_membership_degrees"];
            let values = [
                &body["lesson_difficulty"],
                &degrees["easy"],
                &degrees["moderate"],
                &degrees["hard"],
            ];
            values
                .iter()
                .filter_map(|value| value.as_f64())
                .map(f64::to_bits)
                .collect()
        };

        let (sequential, concurrent) = sequential_and_concurrent(&state, &uris).await;
        assert_eq!(concurrent.len(), 32);
        let mut served = 0;
        for (index, (expected, actual)) in sequential.iter().zip(&concurrent).enumerate() {
            assert_eq!(actual.0, expected.0, "status of {}", uris[index]);
            assert_eq!(actual.1, expected.1, "body of {}", uris[index]);
            if actual.0 == StatusCode::OK {
                assert_eq!(bits(&actual.1).len(), 4);
                assert_eq!(bits(&actual.1), bits(&expected.1), "{}", uris[index]);
                served += 1;
            }
        }
        assert!(served > 0);
        assert_eq!(requests_counted(&state).await, 64);
    }

    #[tokio::test]
    async fn lesson_prediction_accepts_terms_and_numbers() {
        let state = state_with(LESSON_MODEL);
        let (status, by_term) = get(
            &state,
            "/predict?user_level_parameter=expert&accuracy_parameter=high",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, by_number) = get(
            &state,
            "/predict?user_level_parameter=10&accuracy_parameter=100",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_term, by_number);

        let degrees = by_term["fuzzy_membership_degrees"]
            .as_object()
            .expect("degrees object");
        assert_eq!(degrees.len(), 3);
        for key in ["easy", "moderate", "hard"] {
            let degree = degrees[key].as_f64().expect("number");
            assert!((0.0..=1.0).contains(&degree), "{key}={degree}");
        }
        assert!(by_term["lesson_difficulty"].as_f64().expect("number") > 5.0);
    }

    #[tokio::test]
    async fn lesson_prediction_rejects_unknown_terms() {
        let state = state_with(LESSON_MODEL);
        let (status, body) = get(
            &state,
            "/predict?user_level_parameter=wizard&accuracy_parameter=high",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["type"], "unknown_term");
        assert_eq!(
            body["detail"][0]["loc"],
            serde_json::json!(["query", "user_level_parameter"])
        );
        let message = body["detail"][0]["msg"].as_str().expect("message");
        assert!(message.contains("beginner, intermediate, expert"), "{message}");

        let (status, _) = get(&state, "/predict?user_level_parameter=expert").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, metrics) = get(&state, "/metrics").await;
        assert_eq!(metrics["rejected_requests"], 2);
    }

    #[tokio::test]
    async fn openapi_describes_loaded_variant() {
        let state = state_with(LESSON_MODEL);
        let (status, body) = get(&state, "/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["paths"]["/predict"]["get"]["parameters"][1]["name"],
            "accuracy_parameter"
        );
    }
}
