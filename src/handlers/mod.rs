//! HTTP handlers module
//!
//! Thin glue between the HTTP surface and the service layer: extract the
//! caller identity and language, delegate to a service, map errors to the
//! response envelope. No business rules live here.

pub mod events;
pub mod profile;
pub mod registrations;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::database::{self, DatabasePool};
use crate::i18n::{I18n, TranslationParams};
use crate::services::ServiceFactory;
use crate::utils::errors::GatherBuddyError;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub i18n: I18n,
    pub pool: DatabasePool,
}

pub type SharedState = Arc<AppState>;

/// Build the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/events", get(events::list_events).post(events::create_event))
        .route(
            "/api/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/api/events/:id/registrations",
            post(registrations::register).delete(registrations::unregister),
        )
        .route(
            "/api/events/:id/registrations.csv",
            get(registrations::export_csv),
        )
        .route("/api/profile", put(profile::upsert_profile))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service health endpoint
async fn health(State(state): State<SharedState>) -> Response {
    match database::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
                .into_response()
        }
    }
}

/// Error envelope returned to API callers: a stable reason code plus a
/// message localized for the caller's language
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn from_error(i18n: &I18n, language: &str, error: GatherBuddyError) -> Self {
        if !error.is_rejection() {
            error!(error = %error, severity = %error.severity(), "Request failed");
        }

        let (status, key, params) = match &error {
            GatherBuddyError::Unauthenticated(_) => {
                (StatusCode::UNAUTHORIZED, "errors.unauthenticated", None)
            }
            GatherBuddyError::PermissionDenied(_) => {
                (StatusCode::FORBIDDEN, "errors.permission_denied", None)
            }
            GatherBuddyError::EventNotFound { .. } => {
                (StatusCode::NOT_FOUND, "errors.event_not_found", None)
            }
            GatherBuddyError::AlreadyRegistered { .. } => {
                (StatusCode::CONFLICT, "errors.already_registered", None)
            }
            GatherBuddyError::CapacityExceeded {
                spots_left,
                party_size,
            } => {
                let mut params = TranslationParams::new();
                params.insert("spots_left".to_string(), spots_left.to_string());
                params.insert("party_size".to_string(), party_size.to_string());
                let key = if *spots_left > 0 {
                    "errors.capacity_partial"
                } else {
                    "errors.capacity_full"
                };
                (StatusCode::CONFLICT, key, Some(params))
            }
            GatherBuddyError::NoSelection => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "errors.no_selection",
                None,
            ),
            GatherBuddyError::InsufficientQuantity { required, selected } => {
                let mut params = TranslationParams::new();
                params.insert("required".to_string(), required.to_string());
                params.insert("selected".to_string(), selected.to_string());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "errors.insufficient_quantity",
                    Some(params),
                )
            }
            GatherBuddyError::ItemOvercommitted { remaining, .. } => {
                let mut params = TranslationParams::new();
                params.insert("remaining".to_string(), remaining.to_string());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "errors.item_overcommitted",
                    Some(params),
                )
            }
            GatherBuddyError::InvalidInput(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "errors.invalid_input",
                None,
            ),
            GatherBuddyError::ClaimPersistFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "errors.claim_persist_failed",
                None,
            ),
            GatherBuddyError::ServiceUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "errors.internal",
                None,
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal", None),
        };

        Self {
            status,
            code: error.reason_code(),
            message: i18n.t(key, language, params.as_ref()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}

/// Resolve the caller's language from the Accept-Language header
pub(crate) fn request_language(i18n: &I18n, headers: &HeaderMap) -> String {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    i18n.detect_language(accept_language)
}

/// Extract the Authorization header value, if any
pub(crate) fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
