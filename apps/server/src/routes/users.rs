//! Initial admin account.
//!
//! Shared by `POST /setup/admin` (public wizard step) and `POST /users/admin`
//! (gated READY or SETUP_REQUIRED, or any state while no admin exists). Only
//! one admin can be created this way.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::password::hash_password_blocking;
use crate::AppContext;
use shopkeep_core::validation::validate_admin_account;
use shopkeep_core::{AdminAccount, CoreError, SetupStep};
use shopkeep_db::{NewUser, ROLE_ADMIN};

/// Response body for a created admin. Never contains the password.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreated {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: &'static str,
}

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/users/admin", post(create_admin))
}

/// `POST /users/admin`
async fn create_admin(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<AdminAccount>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminCreated>)> {
    let Json(account) = payload?;
    let created = create_initial_admin(&ctx, account).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Creates the first admin account and records the admin step.
///
/// ## Steps
/// 1. Validate username, email and password
/// 2. Require a configured database, then `ensure_ready()`
/// 3. Refuse if an admin already exists (409)
/// 4. Hash the password with Argon2 and insert the `users` row
/// 5. Set `isAdminUserCreated`
pub async fn create_initial_admin(
    ctx: &AppContext,
    account: AdminAccount,
) -> ApiResult<AdminCreated> {
    validate_admin_account(&account)?;

    if ctx.store().read().await.database().is_none() {
        return Err(CoreError::SetupIncomplete {
            missing: vec![SetupStep::Database],
        }
        .into());
    }

    ctx.db().ensure_ready().await?;

    let _guard = ctx.admin_lock().lock().await;
    let users = ctx.db().connection()?.users();

    if users.admin_exists().await? {
        return Err(ApiError::conflict("An admin account already exists"));
    }

    let new_user = NewUser {
        username: account.username.trim().to_string(),
        email: account.email.trim().to_string(),
        password_hash: hash_password_blocking(account.password).await?,
        full_name: account
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        role: ROLE_ADMIN,
    };

    let id = users.create(&new_user).await?;

    ctx.store()
        .update(|setup| {
            setup.record_admin_created();
            Ok(())
        })
        .await?;

    info!(id = %id, username = %new_user.username, "Initial admin account created");

    Ok(AdminCreated {
        id,
        username: new_user.username,
        email: new_user.email,
        role: ROLE_ADMIN,
    })
}
