use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::lifecycle::LifecycleError;
use crate::models::bids::BidStatus;
use crate::models::gigs::GigStatus;

#[derive(Debug, Serialize)]
pub struct FreelancerStats {
    pub active_gigs: u64,
    pub proposals_sent: u64,
    pub pending_bids: u64,
    pub gigs_won: u64,
    pub total_earned: f64,
}

#[derive(Debug, Serialize)]
pub struct ClientStats {
    pub posted_gigs: u64,
    pub open_gigs: u64,
    pub assigned_gigs: u64,
    pub total_committed: f64,
}

/// GET /api/dashboard/freelancer — aggregate view of the caller's bidding
/// activity.
pub async fn freelancer_stats(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LifecycleError> {
    let bids = bid_db::get_bids_by_bidder(db.get_ref(), user.0.id).await?;
    let assigned = gig_db::get_gigs_assigned_to(db.get_ref(), user.0.id).await?;

    let mut pending_bids = 0u64;
    let mut gigs_won = 0u64;
    let mut total_earned = 0.0f64;
    for (bid, _gig) in &bids {
        match bid.status {
            BidStatus::Pending => pending_bids += 1,
            BidStatus::Hired => {
                gigs_won += 1;
                total_earned += bid.amount;
            }
        }
    }

    let stats = FreelancerStats {
        active_gigs: assigned.len() as u64,
        proposals_sent: bids.len() as u64,
        pending_bids,
        gigs_won,
        total_earned,
    };

    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/dashboard/client — aggregate view of the caller's postings.
pub async fn client_stats(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LifecycleError> {
    let gigs = gig_db::get_gigs_by_owner(db.get_ref(), user.0.id).await?;

    let mut open_gigs = 0u64;
    let mut assigned_gigs = 0u64;
    let mut total_committed = 0.0f64;
    for gig in &gigs {
        match gig.status {
            GigStatus::Open => open_gigs += 1,
            GigStatus::Assigned => {
                assigned_gigs += 1;
                total_committed += gig.budget;
            }
        }
    }

    let stats = ClientStats {
        posted_gigs: gigs.len() as u64,
        open_gigs,
        assigned_gigs,
        total_committed,
    };

    Ok(HttpResponse::Ok().json(stats))
}
