use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::notifications;

/// Append a notification for a recipient.
pub async fn insert_notification(
    db: &DatabaseConnection,
    recipient_id: Uuid,
    message: String,
) -> Result<notifications::Model, DbErr> {
    let new_notification = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_id: Set(recipient_id),
        message: Set(message),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    new_notification.insert(db).await
}

/// All notifications for a recipient, newest first. The client derives the
/// unread badge from `is_read`.
pub async fn get_for_recipient(
    db: &DatabaseConnection,
    recipient_id: Uuid,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::RecipientId.eq(recipient_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .all(db)
        .await
}

/// Mark every notification for a recipient as read. Idempotent; returns the
/// number of rows that actually flipped.
pub async fn mark_all_read(db: &DatabaseConnection, recipient_id: Uuid) -> Result<u64, DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::RecipientId.eq(recipient_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
