use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus};
use crate::models::{gigs, users};

/// Insert a new bid (always starts `pending`).
pub async fn insert_bid(
    db: &DatabaseConnection,
    gig_id: Uuid,
    bidder_id: Uuid,
    amount: f64,
    message: String,
) -> Result<bids::Model, DbErr> {
    let new_bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(gig_id),
        bidder_id: Set(bidder_id),
        amount: Set(amount),
        message: Set(message),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
    };

    new_bid.insert(db).await
}

/// Fetch a single bid by ID.
pub async fn get_bid_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(db).await
}

/// All bids on a gig in submission order (createdAt, then id as the
/// deterministic tie-break), each with its bidder row.
pub async fn get_bids_for_gig(
    db: &DatabaseConnection,
    gig_id: Uuid,
) -> Result<Vec<(bids::Model, Option<users::Model>)>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .order_by_asc(bids::Column::CreatedAt)
        .order_by_asc(bids::Column::Id)
        .find_also_related(users::Entity)
        .all(db)
        .await
}

/// All bids placed by a freelancer, newest first, each with its gig row.
pub async fn get_bids_by_bidder(
    db: &DatabaseConnection,
    bidder_id: Uuid,
) -> Result<Vec<(bids::Model, Option<gigs::Model>)>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::BidderId.eq(bidder_id))
        .order_by_desc(bids::Column::CreatedAt)
        .find_also_related(gigs::Entity)
        .all(db)
        .await
}

/// Whether a bidder already has a proposal on a gig.
pub async fn bid_exists_for_gig_and_bidder(
    db: &DatabaseConnection,
    gig_id: Uuid,
    bidder_id: Uuid,
) -> Result<bool, DbErr> {
    let count = bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::BidderId.eq(bidder_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Number of bids on a gig (shown next to the owner's postings).
pub async fn count_bids_for_gig(db: &DatabaseConnection, gig_id: Uuid) -> Result<u64, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .count(db)
        .await
}

/// Flip a bid to `hired`. Only ever called inside the hire transaction,
/// after the gig-level compare-and-swap has succeeded.
pub async fn mark_hired<C: ConnectionTrait>(conn: &C, bid_id: Uuid) -> Result<(), DbErr> {
    bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Hired))
        .filter(bids::Column::Id.eq(bid_id))
        .exec(conn)
        .await?;

    Ok(())
}
