//! HTTP routes.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use switchboard_domain::{Connection, ConnectionId, TenantId};
use uuid::Uuid;

use crate::app::App;
use crate::use_cases::connection::{
    ConnectionError, ConnectionUpdateData, UpdatedConnection, ERR_NO_CONNECTION_FOUND,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/tenants/{tenant_id}/connections", get(list_connections))
        .route(
            "/api/tenants/{tenant_id}/connections/{connection_id}",
            get(get_connection).put(update_connection),
        )
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Connections
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConnectionResponse {
    pub connection: Connection,
    pub demoted: Option<Connection>,
}

impl From<UpdatedConnection> for UpdateConnectionResponse {
    fn from(result: UpdatedConnection) -> Self {
        Self {
            connection: result.updated,
            demoted: result.demoted,
        }
    }
}

/// A connection id that is not a UUID cannot name a stored connection.
fn connection_path(
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<(TenantId, ConnectionId), ApiError> {
    let Path((tenant_id, connection_id)) =
        path.map_err(|_| ApiError::NotFound(ERR_NO_CONNECTION_FOUND))?;
    Ok((
        TenantId::from_uuid(tenant_id),
        ConnectionId::from_uuid(connection_id),
    ))
}

async fn list_connections(
    State(app): State<Arc<App>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<Connection>>, ApiError> {
    let Path(tenant_id) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let connections = app
        .use_cases
        .connection
        .queries
        .list(TenantId::from_uuid(tenant_id))
        .await?;
    Ok(Json(connections))
}

async fn get_connection(
    State(app): State<Arc<App>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<Connection>, ApiError> {
    let (tenant_id, connection_id) = connection_path(path)?;
    let connection = app
        .use_cases
        .connection
        .queries
        .get(tenant_id, connection_id)
        .await?;
    Ok(Json(connection))
}

async fn update_connection(
    State(app): State<Arc<App>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    body: Result<Json<ConnectionUpdateData>, JsonRejection>,
) -> Result<Json<UpdateConnectionResponse>, ApiError> {
    let (tenant_id, connection_id) = connection_path(path)?;
    let Json(data) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let result = app
        .use_cases
        .connection
        .update
        .execute(data, connection_id, tenant_id)
        .await?;
    Ok(Json(result.into()))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(code) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: code })).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: &msg })).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "Internal error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<ConnectionError> for ApiError {
    fn from(e: ConnectionError) -> Self {
        match e {
            ConnectionError::Validation(v) => ApiError::BadRequest(v.to_string()),
            ConnectionError::NotFound(_) => ApiError::NotFound(ERR_NO_CONNECTION_FOUND),
            ConnectionError::Repo(r) => ApiError::Internal(r.to_string()),
        }
    }
}
