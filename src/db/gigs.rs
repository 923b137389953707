use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::gigs::{self, CreateGig, GigStatus, UpdateGig};

/// Insert a new gig. Every gig starts life `open`.
pub async fn insert_gig(
    db: &DatabaseConnection,
    input: CreateGig,
    owner_id: Uuid,
) -> Result<gigs::Model, DbErr> {
    let new_gig = gigs::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        title: Set(input.title),
        description: Set(input.description),
        budget: Set(input.budget),
        status: Set(GigStatus::Open),
        assigned_to: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    new_gig.insert(db).await
}

/// Fetch a single gig by ID.
pub async fn get_gig_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).one(db).await
}

/// Fetch a gig together with its owner row.
pub async fn get_gig_with_owner(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<(gigs::Model, Option<crate::models::users::Model>)>, DbErr> {
    gigs::Entity::find_by_id(id)
        .find_also_related(crate::models::users::Entity)
        .one(db)
        .await
}

/// Fetch all gigs still accepting bids, newest first.
pub async fn get_open_gigs(db: &DatabaseConnection) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .order_by_desc(gigs::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch all gigs posted by an owner, newest first.
pub async fn get_gigs_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::OwnerId.eq(owner_id))
        .order_by_desc(gigs::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch all gigs a freelancer has been hired for.
pub async fn get_gigs_assigned_to(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::AssignedTo.eq(user_id))
        .order_by_desc(gigs::Column::CreatedAt)
        .all(db)
        .await
}

/// Compare-and-swap a gig from `open` to `assigned`.
///
/// The WHERE clause on status is the atomicity guarantee: of two racing
/// hires, only one sees a row flip. Returns whether this call won.
pub async fn try_assign<C: ConnectionTrait>(
    conn: &C,
    gig_id: Uuid,
    bidder_id: Uuid,
) -> Result<bool, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(GigStatus::Assigned))
        .col_expr(gigs::Column::AssignedTo, Expr::value(bidder_id))
        .filter(gigs::Column::Id.eq(gig_id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Apply an edit to a gig's terms. Precondition checks (owner, still open,
/// valid values) belong to the lifecycle engine, not here.
pub async fn update_gig_terms(
    db: &DatabaseConnection,
    gig: gigs::Model,
    input: UpdateGig,
) -> Result<gigs::Model, DbErr> {
    let mut active: gigs::ActiveModel = gig.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(budget) = input.budget {
        active.budget = Set(budget);
    }

    active.update(db).await
}
