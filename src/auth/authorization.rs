use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::gigs as gig_db;
use crate::lifecycle::LifecycleError;
use crate::models::gigs;

/// Resolve a gig and verify the caller owns it.
///
/// Used by owner-only views (the received-bids listing); the lifecycle
/// engine repeats the check itself for state transitions.
pub async fn verify_gig_owner(
    db: &DatabaseConnection,
    gig_id: Uuid,
    user_id: Uuid,
) -> Result<gigs::Model, LifecycleError> {
    match gig_db::get_gig_by_id(db, gig_id).await? {
        Some(gig) if gig.owner_id == user_id => Ok(gig),
        Some(_) => Err(LifecycleError::Forbidden(
            "You do not own this gig".to_string(),
        )),
        None => Err(LifecycleError::NotFound(format!("Gig {gig_id} not found"))),
    }
}
