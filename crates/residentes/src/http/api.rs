//! JSON API under `/residentes`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::debug;

use super::{
    create_resident, delete_resident, fetch_resident, log_server_error, update_resident, AppState,
};
use crate::error::{Error, ErrorKind};
use crate::resident::{Resident, ResidentInput};
use crate::validation::ValidationErrors;

pub(crate) const NOT_FOUND_DETAIL: &str = "Residente no encontrado";
pub(crate) const SERVER_ERROR_DETAIL: &str = "Error interno del servidor";
pub(crate) const DELETED_MESSAGE: &str = "Residente eliminado exitosamente";

/// Routes of the JSON API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/residentes",
            get(list_handler).post(create_handler),
        )
        .route(
            "/residentes/:id",
            get(show_handler).put(update_handler).delete(delete_handler),
        )
}

/// Map an error to a JSON response.
///
/// Storage and unexpected failures are logged here and answered with a
/// generic message.
#[must_use]
pub fn render_error(err: &Error) -> Response {
    match err.kind() {
        ErrorKind::Validation => {
            let detail = err
                .validation_errors()
                .map_or_else(|| json!([]), |errors| json!(errors));
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": detail})),
            )
                .into_response()
        }
        ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": NOT_FOUND_DETAIL})),
        )
            .into_response(),
        ErrorKind::Storage | ErrorKind::Unexpected => {
            log_server_error(err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": SERVER_ERROR_DETAIL})),
            )
                .into_response()
        }
    }
}

/// An [`Error`] rendered as JSON.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        render_error(&self.0)
    }
}

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Decode a JSON body, turning a malformed body into a field error.
fn body(payload: Result<Json<ResidentInput>, JsonRejection>) -> Result<ResidentInput, ApiError> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        ApiError(Error::Validation(ValidationErrors::single(
            "body",
            format!("Cuerpo JSON inválido: {}", rejection.body_text()),
        )))
    })
}

async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<Resident>>, ApiError> {
    let residents = state.store().list().await?;
    debug!(count = residents.len(), "Listed residents");
    Ok(Json(residents))
}

async fn show_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Resident>, ApiError> {
    Ok(Json(fetch_resident(&state, id).await?))
}

async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResidentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Resident>), ApiError> {
    let input = body(payload)?;
    let resident = create_resident(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(resident)))
}

async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ResidentInput>, JsonRejection>,
) -> Result<Json<Resident>, ApiError> {
    let input = body(payload)?;
    Ok(Json(update_resident(&state, id, &input).await?))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    delete_resident(&state, id).await?;
    Ok(Json(json!({"message": DELETED_MESSAGE})))
}
