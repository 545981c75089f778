//! HTTP surface: a JSON API and server-rendered pages over the same store.
//!
//! Both adapters call the operations in this module, which run the validator
//! before touching storage and turn `None`/`false` results into
//! [`Error::NotFound`]. Each adapter then maps errors to responses with its
//! own `render_error`.

pub mod api;
pub mod pages;
mod templates;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use futures::FutureExt;
use serde_json::{json, Value};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, error, info};

use crate::config::CorsConfig;
use crate::error::{Error, Result};
use crate::resident::{Resident, ResidentInput};
use crate::storage::ResidentStore;
use crate::validation::validate_resident;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<dyn ResidentStore>,
    clock: fn() -> NaiveDate,
    cors_origins: Vec<HeaderValue>,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl AppState {
    /// State backed by `store`, using the local calendar date as "today".
    /// Cross-origin requests are refused until origins are added with
    /// [`AppState::with_cors_origins`].
    #[must_use]
    pub fn new(store: Arc<dyn ResidentStore>) -> Self {
        Self {
            store,
            clock: local_today,
            cors_origins: Vec::new(),
        }
    }

    /// Allow browser frontends served from `origins` to call the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] for a wildcard or malformed origin.
    pub fn with_cors_origins(mut self, cors: &CorsConfig) -> Result<Self> {
        self.cors_origins = cors.header_values()?;
        Ok(self)
    }

    /// Replace the date source used for birth date checks.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// The reference date for validation.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &dyn ResidentStore {
        self.store.as_ref()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origins.clone());
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::routes())
        .merge(pages::routes())
        .fallback(pages::not_found_handler)
        .layer(middleware::from_fn(catch_panic))
        .layer(cors)
        .with_state(state)
}

/// Credentialed CORS for an explicit origin list. Methods and headers mirror
/// the preflight request, since wildcards are not allowed with credentials.
fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Liveness plus a storage round trip.
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store().ping().await {
        Ok(status) => {
            debug!(residents = status.residents, "Health check passed");
            (StatusCode::OK, Json(json!({"status": "ok"})))
        }
        Err(err) => {
            log_server_error(&err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable"})),
            )
        }
    }
}

/// Whether the client prefers an HTML response.
pub(crate) fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

/// Turn a panicking handler into a 500 instead of a dropped connection.
async fn catch_panic(request: Request, next: Next) -> Response {
    let html = wants_html(request.headers());
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let err = Error::internal(format!("handler for {path} panicked: {detail}"));
            if html {
                pages::render_error(&err)
            } else {
                api::render_error(&err)
            }
        }
    }
}

// === Operations shared by both adapters ===

pub(crate) async fn fetch_resident(state: &AppState, id: i64) -> Result<Resident> {
    state
        .store()
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found(id))
}

pub(crate) async fn create_resident(state: &AppState, input: &ResidentInput) -> Result<Resident> {
    let resident = validate_resident(input, state.today())?;
    let id = state.store().insert(resident.clone()).await?;
    info!(id, "Created resident");

    // Read back what storage holds; fall back to the payload if the row
    // vanished in between.
    Ok(state
        .store()
        .get(id)
        .await?
        .unwrap_or_else(|| resident.into_resident(id)))
}

pub(crate) async fn update_resident(
    state: &AppState,
    id: i64,
    input: &ResidentInput,
) -> Result<Resident> {
    let resident = validate_resident(input, state.today())?;
    if !state.store().update(id, resident.clone()).await? {
        return Err(Error::not_found(id));
    }
    info!(id, "Updated resident");

    Ok(state
        .store()
        .get(id)
        .await?
        .unwrap_or_else(|| resident.into_resident(id)))
}

pub(crate) async fn delete_resident(state: &AppState, id: i64) -> Result<()> {
    if state.store().delete(id).await? {
        info!(id, "Deleted resident");
        Ok(())
    } else {
        Err(Error::not_found(id))
    }
}

/// Log a failure that will be reported to the client without details.
pub(crate) fn log_server_error(err: &Error) {
    error!(error = %err, kind = ?err.kind(), "Request failed");
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::ErrorKind;
    use crate::resident::NewResident;
    use crate::storage::tests::create_test_repository;
    use crate::storage::StorageStatus;

    pub(crate) fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    /// A store whose every call fails like an unreachable database.
    #[derive(Debug)]
    pub(crate) struct BrokenStore;

    fn unavailable() -> Error {
        Error::DatabaseQuery(rusqlite::Error::InvalidQuery)
    }

    #[async_trait]
    impl ResidentStore for BrokenStore {
        async fn list(&self) -> Result<Vec<Resident>> {
            Err(unavailable())
        }
        async fn get(&self, _id: i64) -> Result<Option<Resident>> {
            Err(unavailable())
        }
        async fn insert(&self, _resident: NewResident) -> Result<i64> {
            Err(unavailable())
        }
        async fn update(&self, _id: i64, _resident: NewResident) -> Result<bool> {
            Err(unavailable())
        }
        async fn delete(&self, _id: i64) -> Result<bool> {
            Err(unavailable())
        }
        async fn ping(&self) -> Result<StorageStatus> {
            Err(unavailable())
        }
    }

    pub(crate) fn valid_input() -> ResidentInput {
        ResidentInput {
            first_name: Some("  josé pérez  ".to_string()),
            last_name: Some("garcía".to_string()),
            birth_date: Some("1990-01-31".to_string()),
            passport: Some(" ab-123456 ".to_string()),
            email: Some("jose@example.com".to_string()),
            phone: Some("123-456-7890".to_string()),
            marital_status: Some("soltero".to_string()),
            ..Default::default()
        }
    }

    fn state_with_repository() -> (tempfile::TempDir, AppState) {
        let (dir, repo) = create_test_repository();
        let state = AppState::new(Arc::new(repo)).with_clock(fixed_today);
        (dir, state)
    }

    #[test]
    fn test_clock_override() {
        let state = AppState::new(Arc::new(BrokenStore)).with_clock(fixed_today);
        assert_eq!(state.today(), fixed_today());
    }

    #[test]
    fn test_cors_origins_from_config() {
        let state = AppState::new(Arc::new(BrokenStore))
            .with_cors_origins(&CorsConfig::default())
            .unwrap();
        assert_eq!(state.cors_origins.len(), 3);

        let wildcard = CorsConfig {
            origins: vec!["*".to_string()],
        };
        let err = AppState::new(Arc::new(BrokenStore))
            .with_cors_origins(&wildcard)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_wants_html() {
        let mut headers = HeaderMap::new();
        assert!(!wants_html(&headers));
        headers.insert(header::ACCEPT, "text/html,application/xhtml+xml".parse().unwrap());
        assert!(wants_html(&headers));
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(!wants_html(&headers));
    }

    #[tokio::test]
    async fn test_create_then_fetch_returns_normalized_fields() {
        let (_dir, state) = state_with_repository();

        let created = create_resident(&state, &valid_input()).await.unwrap();
        let expected = validate_resident(&valid_input(), fixed_today())
            .unwrap()
            .into_resident(created.id);

        assert_eq!(created, expected);
        assert_eq!(fetch_resident(&state, created.id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_create_with_invalid_input_stores_nothing() {
        let (_dir, state) = state_with_repository();
        let mut input = valid_input();
        input.phone = Some("123".to_string());

        let err = create_resident(&state, &input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(state.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let state = AppState::new(Arc::new(BrokenStore)).with_clock(fixed_today);

        let err = create_resident(&state, &ResidentInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = create_resident(&state, &valid_input()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_update_missing_resident_is_not_found() {
        let (_dir, state) = state_with_repository();

        let err = update_resident(&state, 77, &valid_input()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(state.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let (_dir, state) = state_with_repository();
        let created = create_resident(&state, &valid_input()).await.unwrap();

        let mut input = valid_input();
        input.first_name = Some("maría".to_string());
        let updated = update_resident(&state, created.id, &input).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name, "María");
    }

    #[tokio::test]
    async fn test_delete_missing_resident_is_not_found() {
        let (_dir, state) = state_with_repository();
        let created = create_resident(&state, &valid_input()).await.unwrap();

        delete_resident(&state, created.id).await.unwrap();
        assert!(delete_resident(&state, created.id)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(fetch_resident(&state, created.id)
            .await
            .unwrap_err()
            .is_not_found());
    }
}
