//! Business route groups whose services live outside this server.
//!
//! They sit behind the same READY gate as the implemented routes, so a
//! client sees `503 APP_NOT_READY` during setup and `501` afterwards.

use std::sync::Arc;

use axum::http::Uri;
use axum::routing::any;
use axum::Router;

use crate::error::{ApiError, ErrorCode};
use crate::AppContext;

/// Route prefixes answered with 501.
pub const UNIMPLEMENTED_PREFIXES: &[&str] = &[
    "/products",
    "/supplier",
    "/customer",
    "/transactions",
    "/inventory",
    "/reports",
];

pub fn router() -> Router<Arc<AppContext>> {
    UNIMPLEMENTED_PREFIXES
        .iter()
        .fold(Router::new(), |router, prefix| {
            router
                .route(prefix, any(not_implemented))
                .route(&format!("{prefix}/{{*rest}}"), any(not_implemented))
        })
}

async fn not_implemented(uri: Uri) -> ApiError {
    ApiError::new(
        ErrorCode::NotImplemented,
        format!("{} is not implemented by this server", uri.path()),
    )
}
