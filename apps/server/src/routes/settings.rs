//! Shop settings recorded by the setup wizard.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::AppContext;
use shopkeep_core::ShopInfo;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/settings", get(get_settings))
}

/// `GET /settings`: the persisted shop profile.
async fn get_settings(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<ShopInfo>> {
    ctx.store()
        .read()
        .await
        .shop_info
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Shop settings", "shop"))
}
