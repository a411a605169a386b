//! Health check endpoint.
//!
//! Always answers 200 so load balancers can tell "process up" apart from
//! "database configured"; the body carries the details.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::AppContext;
use shopkeep_core::AppStatus;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when READY with a responsive, fully migrated database,
    /// `degraded` otherwise
    pub status: &'static str,
    pub app_state: AppStatus,
    pub database: bool,
    /// `null` without a live connection
    pub migrations: Option<MigrationReport>,
    pub server_time: String,
}

/// Embedded vs applied schema migrations.
#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub applied: usize,
    pub total: usize,
}

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    let database = ctx.db().health_check().await;
    let app_state = ctx.state().state();
    let migrations = ctx
        .db()
        .migration_status()
        .await
        .map(|(total, applied)| MigrationReport { applied, total });

    let up_to_date = migrations
        .as_ref()
        .is_some_and(|m| m.applied == m.total);

    let status = if app_state.is_ready() && database && up_to_date {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        app_state,
        database,
        migrations,
        server_time: Utc::now().to_rfc3339(),
    })
}
