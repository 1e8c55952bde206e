use crate::api::api_error::APIError;
use crate::api::model::{TenantRequest, TenantResult};
use crate::api::server::AppState;
use crate::error::Error;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/register", post(register))
        .route("/deregister", post(deregister))
        .route("/tenants/:id", get(tenant))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<TenantRequest>, APIError>,
) -> Result<Json<TenantResult>, APIError> {
    payload.validate()?;
    let cid = state.certifier.register_tenant(&payload.id).await?;
    Ok(Json(TenantResult {
        id: payload.id,
        cid: Some(cid),
    }))
}

async fn deregister(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<TenantRequest>, APIError>,
) -> Result<Json<TenantResult>, APIError> {
    payload.validate()?;
    state.certifier.deregister_tenant(&payload.id).await?;
    Ok(Json(TenantResult {
        id: payload.id,
        cid: None,
    }))
}

async fn tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TenantResult>, APIError> {
    match state.certifier.tenant_cid(&id).await {
        Some(cid) => Ok(Json(TenantResult { id, cid: Some(cid) })),
        None => {
            tracing::debug!("lookup for unknown ID \"{id}\"");
            Err(Error::TenantNotFound(id).into())
        }
    }
}
