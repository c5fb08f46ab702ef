//! Registration and export handlers

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use super::{authorization_header, request_language, ApiError, SharedState};
use crate::models::registration::{RegisterRequest, Registration};

/// POST /api/events/:id/registrations
pub async fn register(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let user = state
        .services
        .auth_service
        .authenticate(authorization_header(&headers))
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    let registration = state
        .services
        .registration_service
        .register(&user, event_id, &request)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok((StatusCode::CREATED, Json(registration)))
}

/// DELETE /api/events/:id/registrations
///
/// Idempotent: cancelling a registration that does not exist still
/// returns success.
pub async fn unregister(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let user = state
        .services
        .auth_service
        .authenticate(authorization_header(&headers))
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    state
        .services
        .registration_service
        .unregister(&user, event_id)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/events/:id/registrations.csv
pub async fn export_csv(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let user = state
        .services
        .auth_service
        .authenticate(authorization_header(&headers))
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    let csv = state
        .services
        .export_service
        .event_registrations_csv(&user, event_id)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"registrations.csv\"",
            ),
        ],
        csv,
    )
        .into_response();

    Ok(response)
}
