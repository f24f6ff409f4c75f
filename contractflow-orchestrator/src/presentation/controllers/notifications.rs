//! Notification inbox API controllers

use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

use contractflow_core::domain::notification::NotificationId;

use crate::presentation::controllers::AppState;
use crate::presentation::errors::map_notification_error;
use crate::presentation::extractors::Actor;
use crate::presentation::models::{
    MarkAllReadResponse, NotificationListQuery, NotificationResponse, UnreadCountResponse,
};

const DEFAULT_NOTIFICATION_LIMIT: u32 = 50;

/// GET /api/v1/notifications - The caller's notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = Vec<NotificationResponse>),
        (status = 401, description = "Missing or unknown X-User-Id")
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<NotificationResponse>>, Response> {
    let notifications = state
        .services
        .notifications
        .list(
            &actor.id(),
            query.unread_only,
            query.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT),
        )
        .await
        .map_err(map_notification_error)?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/notifications/unread-count
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse)
    ),
    tag = "notifications"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<UnreadCountResponse>, Response> {
    let unread = state
        .services
        .notifications
        .unread_count(&actor.id())
        .await
        .map_err(map_notification_error)?;

    Ok(Json(UnreadCountResponse { unread }))
}

/// POST /api/v1/notifications/{id}/read - Mark one notification read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification read", body = NotificationResponse),
        (status = 403, description = "Notification belongs to another user"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, Response> {
    let notification = state
        .services
        .notifications
        .mark_read(&NotificationId::new(id), &actor.id())
        .await
        .map_err(map_notification_error)?;

    Ok(Json(notification.into()))
}

/// POST /api/v1/notifications/read-all - Mark every notification read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Notifications marked", body = MarkAllReadResponse)
    ),
    tag = "notifications"
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<MarkAllReadResponse>, Response> {
    let marked = state
        .services
        .notifications
        .mark_all_read(&actor.id())
        .await
        .map_err(map_notification_error)?;

    Ok(Json(MarkAllReadResponse { marked }))
}
