//! OpenAPI 3.0 description of the HTTP surface.

use crate::inference::{lesson, wash};
use crate::model::ModelKind;
use serde_json::{Value, json};

/// OpenAPI document for the server; `/predict` is described for the given model variant and
/// omitted when no model is loaded.
pub fn document(kind: Option<ModelKind>) -> Value {
    let mut paths = json!({
        "/healthcheck": status_path("Healthcheck", "Checks if the server is healthy", "healthy"),
        "/liveliness": status_path(
            "Liveliness",
            "Checks if the server is currently accepting requests",
            "alive"
        ),
        "/readiness": {
            "get": {
                "summary": "Readiness",
                "description": "Checks if the server is ready to accept requests",
                "operationId": "readiness",
                "responses": {
                    "200": json_response("Model loaded", status_schema()),
                    "503": json_response("Model not loaded", detail_schema())
                }
            }
        },
        "/version": {
            "get": {
                "summary": "Version",
                "description": "Returns the version of the application",
                "operationId": "version",
                "responses": {
                    "200": json_response("Build identifier", json!({
                        "type": "object",
                        "required": ["version"],
                        "properties": { "version": { "type": "string", "example": "1.0.0-dev" } }
                    }))
                }
            }
        },
        "/metrics": {
            "get": {
                "summary": "Metrics",
                "description": "Prediction counters since startup",
                "operationId": "metrics",
                "responses": {
                    "200": json_response("Counter snapshot", json!({
                        "type": "object",
                        "properties": {
                            "predictions_served": { "type": "integer" },
                            "prediction_failures": { "type": "integer" },
                            "rejected_requests": { "type": "integer" }
                        }
                    }))
                }
            }
        }
    });

    if let (Some(kind), Some(map)) = (kind, paths.as_object_mut()) {
        map.insert("/predict".to_string(), predict_path(kind));
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "fuzzyserve",
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION")
        },
        "paths": paths,
        "components": {
            "schemas": {
                "StatusResponse": {
                    "type": "object",
                    "required": ["status"],
                    "properties": { "status": { "type": "string" } }
                },
                "DetailResponse": {
                    "type": "object",
                    "required": ["detail"],
                    "properties": { "detail": { "type": "string" } }
                },
                "ValidationError": {
                    "type": "object",
                    "required": ["loc", "msg", "type"],
                    "properties": {
                        "loc": { "type": "array", "items": { "type": "string" } },
                        "msg": { "type": "string" },
                        "type": { "type": "string" }
                    }
                },
                "HTTPValidationError": {
                    "type": "object",
                    "properties": {
                        "detail": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/ValidationError" }
                        }
                    }
                }
            }
        }
    })
}

fn status_path(summary: &str, description: &str, status: &str) -> Value {
    json!({
        "get": {
            "summary": summary,
            "description": description,
            "operationId": summary.to_lowercase(),
            "responses": {
                "200": json_response("Fixed status payload", json!({
                    "allOf": [status_schema()],
                    "example": { "status": status }
                }))
            }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn status_schema() -> Value {
    schema_ref("StatusResponse")
}

fn detail_schema() -> Value {
    schema_ref("DetailResponse")
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn query_parameter(name: &str, description: &str, schema: Value) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": true,
        "description": description,
        "schema": schema
    })
}

fn predict_path(kind: ModelKind) -> Value {
    let (description, parameters, success) = match kind {
        ModelKind::WashTime => (
            "Predict the wash time based on the soil level, load size, and water temperature",
            vec![
                query_parameter(
                    wash::SOIL_LEVEL,
                    "Soil level in parts per million",
                    json!({ "type": "number" }),
                ),
                query_parameter(
                    wash::LOAD_SIZE,
                    "Load size in kilograms",
                    json!({ "type": "number" }),
                ),
                query_parameter(
                    wash::WATER_TEMPERATURE,
                    "Water temperature in degrees Celsius",
                    json!({ "type": "number" }),
                ),
            ],
            json!({
                "type": "object",
                "required": [wash::WASH_TIME],
                "properties": { (wash::WASH_TIME): { "type": "string", "example": "43.5" } }
            }),
        ),
        ModelKind::LessonDifficulty => (
            "Predict the lesson difficulty from learner level and accuracy (numbers or terms)",
            vec![
                query_parameter(
                    lesson::USER_LEVEL_PARAMETER,
                    "User level as a number or a term such as 'expert'",
                    json!({ "type": "string" }),
                ),
                query_parameter(
                    lesson::ACCURACY_PARAMETER,
                    "Accuracy as a number or a term such as 'high'",
                    json!({ "type": "string" }),
                ),
            ],
            json!({
                "type": "object",
                "required": [lesson::LESSON_DIFFICULTY, "fuzzy_membership_degrees"],
                "properties": {
                    (lesson::LESSON_DIFFICULTY): { "type": "number" },
                    "fuzzy_membership_degrees": {
                        "type": "object",
                        "properties": {
                            "easy": { "type": "number" },
                            "moderate": { "type": "number" },
                            "hard": { "type": "number" }
                        }
                    }
                }
            }),
        ),
    };

    json!({
        "get": {
            "summary": "Predict",
            "description": description,
            "operationId": "predict",
            "parameters": parameters,
            "responses": {
                "200": json_response("Prediction", success),
                "422": json_response("Validation Error", schema_ref("HTTPValidationError")),
                "500": json_response("Inference failed", detail_schema()),
                "503": json_response("Model not loaded", detail_schema())
            }
        }
    })
}
