use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authorization::verify_gig_owner;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{RedisCache, keys};
use crate::db::bids as bid_db;
use crate::lifecycle::{LifecycleEngine, LifecycleError};
use crate::models::bids::{BidWithBidder, BidWithGig, CreateBid};

/// POST /api/bids — a freelancer submits a proposal on an open gig.
///
/// The bidder identity comes from the JWT; all preconditions (gig open,
/// not the owner, no duplicate, valid input) live in the lifecycle engine.
pub async fn create_bid(
    user: AuthenticatedUser,
    engine: web::Data<Arc<LifecycleEngine>>,
    body: web::Json<CreateBid>,
) -> Result<HttpResponse, LifecycleError> {
    let input = body.into_inner();
    let bid = engine
        .submit_bid(input.gig_id, &user.0, input.amount, &input.message)
        .await?;

    Ok(HttpResponse::Created().json(bid))
}

/// GET /api/bids/my-bids — the caller's proposals, newest first, each with
/// a summary of the gig it targets.
pub async fn get_my_bids(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LifecycleError> {
    let rows = bid_db::get_bids_by_bidder(db.get_ref(), user.0.id).await?;

    let response: Vec<BidWithGig> = rows
        .into_iter()
        .map(|(bid, gig)| BidWithGig::from_pair(bid, gig))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/bids/has-bid/{gig_id} — whether the caller already has a
/// proposal on this gig; the client uses it to gate the bid form.
pub async fn has_bid(
    user: AuthenticatedUser,
    engine: web::Data<Arc<LifecycleEngine>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LifecycleError> {
    let gig_id = path.into_inner();
    let has_bid = engine.has_bid_on_gig(gig_id, user.0.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "has_bid": has_bid })))
}

/// GET /api/bids/{gig_id} — all proposals on a gig, in submission order.
/// Owner-only view.
pub async fn get_bids_for_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LifecycleError> {
    let gig_id = path.into_inner();
    verify_gig_owner(db.get_ref(), gig_id, user.0.id).await?;

    let rows = bid_db::get_bids_for_gig(db.get_ref(), gig_id).await?;

    let response: Vec<BidWithBidder> = rows
        .into_iter()
        .map(|(bid, bidder)| BidWithBidder::from_pair(bid, bidder))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/bids/{bid_id}/hire — the gig owner hires one pending bid.
/// Returns the gig in its assigned state.
pub async fn hire_bid(
    user: AuthenticatedUser,
    engine: web::Data<Arc<LifecycleEngine>>,
    cache: web::Data<Arc<RedisCache>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LifecycleError> {
    let bid_id = path.into_inner();
    let gig = engine.hire_bid(bid_id, &user.0).await?;

    // The gig just left the open listing and its detail view changed.
    let _ = cache.delete(&keys::gig(&gig.id.to_string())).await;
    let _ = cache.delete(&keys::open_gigs()).await;

    Ok(HttpResponse::Ok().json(gig))
}
