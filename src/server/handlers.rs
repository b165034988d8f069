use super::types::{AnalyzeRequest, AnalyzeResponse, ErrorResponse};
use crate::{Error, analyzer::EmotionAnalyzer};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::{any::Any, sync::Arc};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

pub const MISSING_IMAGE_MESSAGE: &str = "画像データが必要です";
pub const MISSING_API_KEY_MESSAGE: &str = "APIキーが設定されていません";
pub const SERVER_ERROR_MESSAGE: &str = "サーバーエラーが発生しました";

pub type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<EmotionAnalyzer>,
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    async move {
        info!("Request received");

        let image_data = match payload {
            Ok(Json(AnalyzeRequest {
                image_data: Some(image_data),
            })) if !image_data.is_empty() => image_data,
            Ok(_) => {
                warn!("No imageData in request");
                return Err(error_response(&Error::MissingImage));
            }
            Err(JsonRejection::BytesRejection(rejection)) => {
                // Body could not be read (e.g. over the size limit); the image may well be present.
                warn!("Failed to read request body: {}", rejection.body_text());
                return Err(body_read_error(rejection.status(), rejection.body_text()));
            }
            Err(rejection) => {
                warn!("Unreadable request body: {}", rejection.body_text());
                let (status, Json(body)) = error_response(&Error::MissingImage);
                return Err((status, Json(body.with_details(rejection.body_text()))));
            }
        };

        match state.analyzer.analyze(&image_data).await {
            Ok(emotion) => Ok(Json(AnalyzeResponse { emotion })),
            Err(e) => {
                error!("Failed to analyze image: {}", e);
                Err(error_response(&e))
            }
        }
    }
    .instrument(info_span!("analyze", %request_id))
    .await
}

pub async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method Not Allowed")),
    )
}

/// Maps an analysis failure onto the JSON error body the client sees.
pub fn error_response(err: &Error) -> ApiError {
    let body = match err {
        Error::MissingImage => ErrorResponse::new(MISSING_IMAGE_MESSAGE),
        Error::MissingApiKey { .. } => {
            ErrorResponse::new(MISSING_API_KEY_MESSAGE).with_details(err.to_string())
        }
        Error::Upstream {
            provider,
            status,
            body,
        } => ErrorResponse {
            error: format!("{} APIエラー", provider),
            details: Some(body.clone()),
            message: None,
            status: Some(status.as_u16()),
        },
        other => ErrorResponse::new(SERVER_ERROR_MESSAGE).with_message(other.to_string()),
    };

    (err.status_code(), Json(body))
}

fn body_read_error(status: StatusCode, message: String) -> ApiError {
    let error = status.canonical_reason().unwrap_or(SERVER_ERROR_MESSAGE);
    (status, Json(ErrorResponse::new(error).with_message(message)))
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    error!("Caught panic: {}", message);
    error_response(&Error::internal(message)).into_response()
}
