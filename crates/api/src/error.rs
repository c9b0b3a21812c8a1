//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orchestrator::PurchaseError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Purchase workflow error.
    Purchase(PurchaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => error_response(
                StatusCode::BAD_REQUEST,
                "validation",
                &msg,
                serde_json::Map::new(),
            ),
            ApiError::Purchase(err) => purchase_error_to_response(err),
        }
    }
}

fn purchase_error_to_response(err: PurchaseError) -> Response {
    let category = err.category();
    let mut extra = serde_json::Map::new();

    let status = match &err {
        PurchaseError::Validation(_) | PurchaseError::UnsupportedClub(_) => {
            StatusCode::BAD_REQUEST
        }
        PurchaseError::Provisioning(_) => StatusCode::BAD_GATEWAY,
        PurchaseError::Declined { .. } => StatusCode::PAYMENT_REQUIRED,
        PurchaseError::Gateway(inner) => {
            if category == "validation" {
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!(error = %inner, "gateway failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        PurchaseError::PostingInconsistency {
            transaction_id,
            result_code,
            sql_error,
            isam_error,
        } => {
            // Surface the raw diagnostics so ops can reconcile the charge.
            extra.insert("transaction_id".into(), transaction_id.as_str().into());
            extra.insert("result_code".into(), (*result_code).into());
            extra.insert(
                "sql_error".into(),
                sql_error.as_deref().map(Into::into).unwrap_or(serde_json::Value::Null),
            );
            extra.insert(
                "isam_error".into(),
                isam_error.map(Into::into).unwrap_or(serde_json::Value::Null),
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    error_response(status, category, &err.to_string(), extra)
}

fn error_response(
    status: StatusCode,
    category: &str,
    message: &str,
    extra: serde_json::Map<String, serde_json::Value>,
) -> Response {
    let mut body = serde_json::Map::new();
    body.insert("success".into(), false.into());
    body.insert("error".into(), category.into());
    body.insert("message".into(), message.into());
    body.extend(extra);
    (status, axum::Json(serde_json::Value::Object(body))).into_response()
}

impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        ApiError::Purchase(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ClubId;

    #[test]
    fn status_codes_follow_the_error_category() {
        let cases: Vec<(PurchaseError, StatusCode)> = vec![
            (
                PurchaseError::Validation("missing email".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PurchaseError::UnsupportedClub(ClubId::new(999)),
                StatusCode::BAD_REQUEST,
            ),
            (
                PurchaseError::Provisioning("sequence failed".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                PurchaseError::Declined {
                    processor: "cardlink",
                    message: "Do not honor".to_string(),
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                PurchaseError::PostingInconsistency {
                    transaction_id: "T1".to_string(),
                    result_code: 1,
                    sql_error: None,
                    isam_error: None,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::Purchase(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
