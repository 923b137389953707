use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::gigs::GigStatus;
use super::users::UserSummary;

/// Bid status stored as a lowercase string in the database.
///
/// There is no `rejected` state: once some other bid on the gig is hired,
/// the remaining bids stay `Pending` but can never be hired because the gig
/// has left `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BidStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "hired")]
    Hired,
}

/// SeaORM entity for the `bids` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub gig_id: Uuid,
    pub bidder_id: Uuid,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gigs::Entity",
        from = "Column::GigId",
        to = "super::gigs::Column::Id"
    )]
    Gig,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BidderId",
        to = "super::users::Column::Id"
    )]
    Bidder,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bidder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for POST /api/bids.
/// The bidder identity comes from the JWT, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBid {
    pub gig_id: Uuid,
    pub amount: f64,
    pub message: String,
}

/// Owner's view of a proposal on their gig.
#[derive(Debug, Clone, Serialize)]
pub struct BidWithBidder {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub amount: f64,
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
    pub bidder: Option<UserSummary>,
}

impl BidWithBidder {
    pub fn from_pair(bid: Model, bidder: Option<super::users::Model>) -> Self {
        Self {
            id: bid.id,
            gig_id: bid.gig_id,
            amount: bid.amount,
            message: bid.message,
            status: bid.status,
            created_at: bid.created_at,
            bidder: bidder.map(UserSummary::from),
        }
    }
}

/// Compact gig reference embedded in a bidder's "my proposals" view.
#[derive(Debug, Clone, Serialize)]
pub struct GigSummary {
    pub id: Uuid,
    pub title: String,
    pub budget: f64,
    pub status: GigStatus,
}

impl From<super::gigs::Model> for GigSummary {
    fn from(g: super::gigs::Model) -> Self {
        Self {
            id: g.id,
            title: g.title,
            budget: g.budget,
            status: g.status,
        }
    }
}

/// Bidder's view of one of their own proposals.
#[derive(Debug, Clone, Serialize)]
pub struct BidWithGig {
    pub id: Uuid,
    pub amount: f64,
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
    pub gig: Option<GigSummary>,
}

impl BidWithGig {
    pub fn from_pair(bid: Model, gig: Option<super::gigs::Model>) -> Self {
        Self {
            id: bid.id,
            amount: bid.amount,
            message: bid.message,
            status: bid.status,
            created_at: bid.created_at,
            gig: gig.map(GigSummary::from),
        }
    }
}
