use axum::http::Uri;
use logkeep_core::AppError;

use crate::error::ApiError;

pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError(AppError::NotFound(format!("no route for {}", uri.path())))
}
