//! Dream submission and retrieval routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::api::server::AppState;
use crate::error::DreamError;
use crate::model::{DreamSubmission, MeaningLine};

/// JSON body for `POST /api/dreams`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub dream_text: String,
    #[serde(default)]
    pub retry: bool,
    #[serde(default)]
    pub previous_lines: Vec<MeaningLine>,
}

/// Query parameters for `GET /api/dreams`.
#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub sid: Option<String>,
}

/// POST /api/dreams — submit a dream, get back `{ "sid": … }`.
pub async fn submit_dream(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitBody>,
) -> (StatusCode, Json<Value>) {
    let submission = DreamSubmission {
        dream_text: body.dream_text,
        retry: body.retry,
        previous_lines: body.previous_lines,
    };

    match state.workflow.submit(submission).await {
        Ok(sid) => (StatusCode::OK, Json(json!({ "sid": sid }))),
        Err(err) => error_response(err),
    }
}

/// GET /api/dreams?sid=… — fetch a stored session payload.
pub async fn fetch_dream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FetchQuery>,
) -> (StatusCode, Json<Value>) {
    let sid = query.sid.unwrap_or_default();

    match state.workflow.fetch(&sid).await {
        Ok(record) => {
            let body = serde_json::to_value(&record)
                .unwrap_or_else(|_| json!({ "error": "encode failed" }));
            (StatusCode::OK, Json(body))
        }
        Err(err) => error_response(err),
    }
}

/// Map every workflow failure to exactly one status and JSON body.
///
/// Malformed generation output carries the offending payload for diagnosis;
/// operational failures carry a message but never credentials.
fn error_response(err: DreamError) -> (StatusCode, Json<Value>) {
    match err {
        DreamError::DreamTooShort | DreamError::MissingSessionId => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() })))
        }
        DreamError::SessionNotFound => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() })))
        }
        DreamError::MalformedOutput { ref raw } => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": err.to_string(), "raw": raw })),
        ),
        DreamError::UnexpectedShape { ref value } => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": err.to_string(), "raw": value })),
        ),
        DreamError::Provider(_) | DreamError::StoreUnavailable(_) | DreamError::Config(_) => {
            error!(error = %err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short_maps_to_400() {
        let (status, Json(body)) = error_response(DreamError::DreamTooShort);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("too short"));
    }

    #[test]
    fn test_missing_sid_maps_to_400() {
        let (status, Json(body)) = error_response(DreamError::MissingSessionId);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing sid");
    }

    #[test]
    fn test_not_found_maps_to_404_with_conflated_message() {
        let (status, Json(body)) = error_response(DreamError::SessionNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found or expired");
    }

    #[test]
    fn test_malformed_output_maps_to_502_with_raw_payload() {
        let (status, Json(body)) = error_response(DreamError::MalformedOutput {
            raw: "not json at all".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["raw"], "not json at all");
    }

    #[test]
    fn test_unexpected_shape_maps_to_502_with_parsed_payload() {
        let (status, Json(body)) = error_response(DreamError::UnexpectedShape {
            value: json!({ "lines": [] }),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["raw"]["lines"].is_array());
    }

    #[test]
    fn test_store_unavailable_maps_to_500() {
        let (status, _) = error_response(DreamError::StoreUnavailable("down".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_provider_failure_maps_to_500() {
        let (status, _) = error_response(DreamError::Provider("timeout".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_submit_body_defaults() {
        let body: SubmitBody = serde_json::from_str(r#"{"dream_text": "x"}"#).unwrap();
        assert!(!body.retry);
        assert!(body.previous_lines.is_empty());
    }
}
