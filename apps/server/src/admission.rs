//! # Admission Layer
//!
//! Applies [`shopkeep_core::admit`] to every request of a router.
//!
//! ```text
//! admission::gated(
//!     Router::new().route("/category", get(list).post(create)),
//!     ctx,
//!     Admission::READY,
//! )
//!
//! request ──► admission_gate ──┬── admitted ──► handler
//!                              └── denied   ──► 503 APP_NOT_READY
//! ```
//!
//! The gates only read: they never open connections and never change the
//! state.
//!
//! First-run routes use [`first_run_gate`], which also admits in any state
//! while the setup document records no admin account. The handler then
//! makes the final decision against the database.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;
use shopkeep_core::{admit, Admission};

/// Middleware state: the shared context plus the states this router accepts.
pub type GateState = (Arc<AppContext>, Admission);

/// Rejects the request unless the current state is in `admission`.
pub async fn admission_gate(
    State((ctx, admission)): State<GateState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let status = ctx.state().state();

    if let Err(e) = admit(&status, admission) {
        debug!(path = %request.uri().path(), state = %status, "Request not admitted");
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

/// Like [`admission_gate`], but lets the request through in any state while
/// no admin account exists.
pub async fn first_run_gate(
    State((ctx, admission)): State<GateState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let status = ctx.state().state();

    if let Err(e) = admit(&status, admission) {
        if ctx.store().read().await.is_admin_user_created {
            debug!(path = %request.uri().path(), state = %status, "Request not admitted");
            return Err(e.into());
        }
        debug!(path = %request.uri().path(), state = %status, "No admin yet; admitting first-run request");
    }

    Ok(next.run(request).await)
}

/// Puts every route of `router` behind the gate.
pub fn gated(
    router: Router<Arc<AppContext>>,
    ctx: Arc<AppContext>,
    admission: Admission,
) -> Router<Arc<AppContext>> {
    router.layer(middleware::from_fn_with_state(
        (ctx, admission),
        admission_gate,
    ))
}

/// Puts every route of `router` behind [`first_run_gate`].
pub fn gated_first_run(
    router: Router<Arc<AppContext>>,
    ctx: Arc<AppContext>,
    admission: Admission,
) -> Router<Arc<AppContext>> {
    router.layer(middleware::from_fn_with_state(
        (ctx, admission),
        first_run_gate,
    ))
}
