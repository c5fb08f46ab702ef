//! Event management handlers

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{authorization_header, request_language, ApiError, SharedState};
use crate::models::event::{CreateEventRequest, Event, EventDetail, UpdateEventRequest};

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub limit: Option<i64>,
}

/// GET /api/events
pub async fn list_events(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let events = state
        .services
        .event_service
        .list_upcoming(query.limit)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok(Json(events))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventDetail>, ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let detail = state
        .services
        .event_service
        .get_event_detail(event_id)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok(Json(detail))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDetail>), ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let user = state
        .services
        .auth_service
        .authenticate(authorization_header(&headers))
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    let detail = state
        .services
        .event_service
        .create_event(&user, &request)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/events/:id
pub async fn update_event(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventDetail>, ApiError> {
    let lang = request_language(&state.i18n, &headers);

    let user = state
        .services
        .auth_service
        .authenticate(authorization_header(&headers))
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    let detail = state
        .services
        .event_service
        .update_event(&user, event_id, &request)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok(Json(detail))
}

/// DELETE /api/events/:id
pub async fn delete_event(
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
        .event_service
        .delete_event(&user, event_id)
        .await
        .map_err(|e| ApiError::from_error(&state.i18n, &lang, e))?;

    Ok(StatusCode::NO_CONTENT)
}
