//! HTML pages: listing, create and edit forms, delete action.
//!
//! Successful writes redirect to the listing with `303 See Other`. A form
//! that fails validation is rendered again with the submitted values and a
//! `422` status.

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use super::templates::{self, FormMode};
use super::{
    create_resident, delete_resident, fetch_resident, log_server_error, update_resident, AppState,
};
use crate::error::{Error, ErrorKind};
use crate::resident::ResidentInput;
use crate::validation::ValidationErrors;

const NOT_FOUND_TITLE: &str = "No encontrado";
const SERVER_ERROR_TITLE: &str = "Error";

/// Routes of the HTML interface.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/residentes/nuevo", get(new_form_handler).post(create_handler))
        .route(
            "/residentes/:id/editar",
            get(edit_form_handler).post(update_handler),
        )
        .route("/residentes/:id/eliminar", post(delete_handler))
}

/// Map an error to an HTML error page.
///
/// Validation errors are normally handled by re-rendering the form; this is
/// the fallback when no form context is available.
#[must_use]
pub fn render_error(err: &Error) -> Response {
    match err.kind() {
        ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Html(templates::error_page(
                NOT_FOUND_TITLE,
                super::api::NOT_FOUND_DETAIL,
            )),
        )
            .into_response(),
        ErrorKind::Validation => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(templates::error_page("Datos inválidos", &err.to_string())),
        )
            .into_response(),
        ErrorKind::Storage | ErrorKind::Unexpected => {
            log_server_error(err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::error_page(
                    SERVER_ERROR_TITLE,
                    super::api::SERVER_ERROR_DETAIL,
                )),
            )
                .into_response()
        }
    }
}

/// An [`Error`] rendered as an HTML page.
#[derive(Debug)]
pub struct PageError(pub Error);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        render_error(&self.0)
    }
}

impl<E: Into<Error>> From<E> for PageError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Fallback for unknown paths.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(templates::error_page(
            NOT_FOUND_TITLE,
            "La página solicitada no existe",
        )),
    )
        .into_response()
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let residents = state.store().list().await?;
    Ok(Html(templates::index_page(&residents)))
}

async fn new_form_handler() -> Html<String> {
    Html(templates::form_page(
        FormMode::Create,
        &ResidentInput::default(),
        None,
    ))
}

async fn edit_form_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let resident = fetch_resident(&state, id).await?;
    Ok(Html(templates::form_page(
        FormMode::Edit(id),
        &ResidentInput::from(&resident),
        None,
    )))
}

fn invalid_form(mode: FormMode, input: &ResidentInput, errors: &ValidationErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(templates::form_page(mode, input, Some(errors))),
    )
        .into_response()
}

/// Run a write and turn its outcome into a redirect or a re-rendered form.
fn finish<T>(mode: FormMode, input: &ResidentInput, outcome: crate::Result<T>) -> Response {
    match outcome {
        Ok(_) => Redirect::to("/").into_response(),
        Err(Error::Validation(errors)) => invalid_form(mode, input, &errors),
        Err(err) => render_error(&err),
    }
}

fn form_body(
    mode: FormMode,
    payload: Result<Form<ResidentInput>, FormRejection>,
) -> Result<ResidentInput, Response> {
    payload.map(|Form(input)| input).map_err(|rejection| {
        let errors = ValidationErrors::single(
            "body",
            format!("Formulario inválido: {}", rejection.body_text()),
        );
        invalid_form(mode, &ResidentInput::default(), &errors)
    })
}

async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Form<ResidentInput>, FormRejection>,
) -> Response {
    let mode = FormMode::Create;
    let input = match form_body(mode, payload) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let outcome = create_resident(&state, &input).await;
    finish(mode, &input, outcome)
}

async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Form<ResidentInput>, FormRejection>,
) -> Response {
    let mode = FormMode::Edit(id);
    let input = match form_body(mode, payload) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let outcome = update_resident(&state, id, &input).await;
    finish(mode, &input, outcome)
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, PageError> {
    delete_resident(&state, id).await?;
    Ok(Redirect::to("/"))
}
