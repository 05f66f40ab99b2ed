use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::database::repository::Page;

/// Wrapper for API responses that adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, status_code: StatusCode::OK, meta: None }
    }

    pub fn created(data: T) -> Self {
        Self { data, status_code: StatusCode::CREATED, meta: None }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Listing envelope with pagination metadata
    pub fn paginated(page: Page<T>) -> Self {
        let meta = json!({
            "total": page.total,
            "limit": page.limit,
            "offset": page.offset,
        });
        Self {
            data: page.items,
            status_code: StatusCode::OK,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "data": data_value
        });
        if let Some(meta) = self.meta {
            envelope["meta"] = meta;
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Handler result: success envelope or ApiError
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
