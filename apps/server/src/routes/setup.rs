//! # Setup Wizard Routes
//!
//! Public routes that take a fresh install to READY.
//!
//! ```text
//! POST /setup/database ──► configure_and_initialize ──► READY / ERROR
//!        │
//!        ▼
//! POST /setup/shop     ──► shopInfo persisted
//!        │
//!        ▼
//! POST /setup/admin    ──► users row (role admin)
//!        │
//!        ▼
//! POST /setup/complete ──► isSetupComplete (only if all three done)
//! ```
//!
//! Every mutating step answers with the resulting [`ProgressResponse`].

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::routes::users::{create_initial_admin, AdminCreated};
use crate::AppContext;
use shopkeep_core::validation::validate_shop_info;
use shopkeep_core::{AdminAccount, AppStatus, DatabaseConfig, SetupProgress, SetupStatus, ShopInfo};
use shopkeep_db::DbError;

/// The four completion flags plus the current application state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    #[serde(flatten)]
    pub progress: SetupProgress,
    pub app_state: AppStatus,
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/setup/status", get(status))
        .route("/setup/progress", get(progress))
        .route("/setup/database", post(configure_database))
        .route("/setup/shop", post(configure_shop))
        .route("/setup/admin", post(create_admin))
        .route("/setup/complete", post(complete))
}

async fn current_progress(ctx: &AppContext) -> ProgressResponse {
    let setup = ctx.store().read().await;
    ProgressResponse {
        progress: SetupProgress::from(&setup),
        app_state: ctx.state().state(),
    }
}

/// `GET /setup/status`
async fn status(State(ctx): State<Arc<AppContext>>) -> Json<SetupStatus> {
    let setup = ctx.store().read().await;
    Json(SetupStatus::from(&setup))
}

/// `GET /setup/progress`
async fn progress(State(ctx): State<Arc<AppContext>>) -> Json<ProgressResponse> {
    Json(current_progress(&ctx).await)
}

/// `POST /setup/database`
///
/// Validates, connects, migrates and persists. On a connection failure the
/// application moves to ERROR and the previous configuration stays on disk.
async fn configure_database(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<DatabaseConfig>, JsonRejection>,
) -> ApiResult<Json<ProgressResponse>> {
    let Json(config) = payload?;

    ctx.db().configure_and_initialize(config).await?;

    Ok(Json(current_progress(&ctx).await))
}

/// `POST /setup/shop`
async fn configure_shop(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<ShopInfo>, JsonRejection>,
) -> ApiResult<Json<ProgressResponse>> {
    let Json(shop) = payload?;
    validate_shop_info(&shop)?;

    let name = shop.name.clone();
    ctx.store()
        .update(|setup| {
            setup.record_shop(shop);
            Ok(())
        })
        .await?;

    info!(shop = %name, "Shop configured");
    Ok(Json(current_progress(&ctx).await))
}

/// `POST /setup/admin`
async fn create_admin(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<AdminAccount>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminCreated>)> {
    let Json(account) = payload?;
    let created = create_initial_admin(&ctx, account).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /setup/complete`
///
/// Fails with SETUP_INCOMPLETE, naming the missing steps, and writes
/// nothing unless database, shop and admin are all done.
async fn complete(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<ProgressResponse>> {
    ctx.store()
        .update(|setup| setup.mark_complete().map_err(DbError::from))
        .await?;

    info!("Setup complete");
    Ok(Json(current_progress(&ctx).await))
}
