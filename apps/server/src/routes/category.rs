//! Category routes: the representative entity service behind the READY gate.
//!
//! Every handler calls `ensure_ready()` before touching the connection, so a
//! request that arrives after a dropped connection triggers one shared
//! reconnect attempt instead of failing outright.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::error::ApiResult;
use crate::AppContext;
use shopkeep_core::validation::validate_new_category;
use shopkeep_core::{Category, NewCategory};

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/category", get(list_categories).post(create_category))
}

/// `GET /category`
async fn list_categories(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<Vec<Category>>> {
    ctx.db().ensure_ready().await?;
    let categories = ctx.db().connection()?.categories().list().await?;
    Ok(Json(categories))
}

/// `POST /category`
async fn create_category(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(category) = payload?;
    validate_new_category(&category)?;

    ctx.db().ensure_ready().await?;
    let created = ctx.db().connection()?.categories().create(&category).await?;

    info!(id = %created.id, name = %created.name, "Category created");
    Ok((StatusCode::CREATED, Json(created)))
}
