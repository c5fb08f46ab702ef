//! Profile handlers

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{authorization_header, request_language, ApiError, SharedState};
use crate::models::profile::{Profile, UpsertProfileRequest};

/// PUT /api/profile
pub async fn upsert_profile(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let user = state
        .services
        .auth_service
        .authenticate(authorization_header(&headers))
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    // The token email wins over a client-supplied one
    let email = user.email.clone().or(request.email);

    let profile = state
        .services
        .registration_service
        .upsert_profile(&user, request.full_name.as_deref(), email.as_deref())
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok(Json(profile))
}
