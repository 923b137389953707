use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::notifications as notification_db;
use crate::lifecycle::LifecycleError;

/// GET /api/notifications — the caller's notifications, newest first.
/// The client polls this and derives the unread badge from `is_read`.
pub async fn get_notifications(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LifecycleError> {
    let notifications = notification_db::get_for_recipient(db.get_ref(), user.0.id).await?;

    Ok(HttpResponse::Ok().json(notifications))
}

/// PUT /api/notifications/mark-read — mark all of the caller's
/// notifications as read. Idempotent.
pub async fn mark_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LifecycleError> {
    let updated = notification_db::mark_all_read(db.get_ref(), user.0.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}
