use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{RedisCache, keys};
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::db::users as user_db;
use crate::lifecycle::{LifecycleEngine, LifecycleError};
use crate::models::gigs::{self, CreateGig, GigDetail, GigListQuery, OwnedGig, UpdateGig};
use crate::models::users::UserSummary;

/// GET /api/gigs — list gigs that are still accepting bids.
///
/// The optional `?search=` filter is a presentation concern: it narrows the
/// cached listing by case-insensitive substring over title + description
/// and is never persisted.
pub async fn get_gigs(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<Arc<RedisCache>>,
    query: web::Query<GigListQuery>,
) -> Result<HttpResponse, LifecycleError> {
    let cache_key = keys::open_gigs();

    let open_gigs: Vec<gigs::Model> = match cache.get(&cache_key).await {
        Ok(Some(cached)) => cached,
        Ok(None) => {
            let fresh = gig_db::get_open_gigs(db.get_ref()).await?;
            let _ = cache.set(&cache_key, &fresh, Some(300)).await;
            fresh
        }
        Err(e) => {
            tracing::warn!("Cache error: {e}");
            gig_db::get_open_gigs(db.get_ref()).await?
        }
    };

    let needle = query
        .search
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let matching: Vec<gigs::Model> = if needle.is_empty() {
        open_gigs
    } else {
        open_gigs
            .into_iter()
            .filter(|g| {
                format!("{} {}", g.title, g.description)
                    .to_lowercase()
                    .contains(&needle)
            })
            .collect()
    };

    Ok(HttpResponse::Ok().json(matching))
}

/// GET /api/gigs/{id} — gig detail with owner and assignee resolved.
pub async fn get_gig(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<Arc<RedisCache>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, LifecycleError> {
    let id = path.into_inner();
    let cache_key = keys::gig(&id.to_string());

    match cache.get::<serde_json::Value>(&cache_key).await {
        Ok(Some(cached)) => return Ok(HttpResponse::Ok().json(cached)),
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache error: {e}"),
    }

    let (gig, owner) = gig_db::get_gig_with_owner(db.get_ref(), id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(format!("Gig {id} not found")))?;

    let assigned_to = match gig.assigned_to {
        Some(user_id) => user_db::get_user_by_id(db.get_ref(), user_id)
            .await?
            .map(UserSummary::from),
        None => None,
    };

    let detail = GigDetail {
        id: gig.id,
        title: gig.title,
        description: gig.description,
        budget: gig.budget,
        status: gig.status,
        created_at: gig.created_at,
        owner: owner.map(UserSummary::from),
        assigned_to,
    };

    let _ = cache.set(&cache_key, &detail, Some(600)).await;

    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/gigs — post a new gig owned by the caller.
pub async fn create_gig(
    user: AuthenticatedUser,
    engine: web::Data<Arc<LifecycleEngine>>,
    cache: web::Data<Arc<RedisCache>>,
    body: web::Json<CreateGig>,
) -> Result<HttpResponse, LifecycleError> {
    let gig = engine.create_gig(&user.0, body.into_inner()).await?;

    let _ = cache.delete(&keys::open_gigs()).await;

    Ok(HttpResponse::Created().json(gig))
}

/// PUT /api/gigs/{id} — edit a gig's terms while it is still open.
pub async fn update_gig(
    user: AuthenticatedUser,
    engine: web::Data<Arc<LifecycleEngine>>,
    cache: web::Data<Arc<RedisCache>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGig>,
) -> Result<HttpResponse, LifecycleError> {
    let id = path.into_inner();
    let updated = engine.update_gig(id, &user.0, body.into_inner()).await?;

    let _ = cache.delete(&keys::gig(&id.to_string())).await;
    let _ = cache.delete(&keys::open_gigs()).await;

    Ok(HttpResponse::Ok().json(updated))
}

/// GET /api/gigs/my-gigs — the caller's postings, each with its proposal
/// count and the hired freelancer once assigned.
pub async fn get_my_gigs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, LifecycleError> {
    let owned = gig_db::get_gigs_by_owner(db.get_ref(), user.0.id).await?;

    let mut response: Vec<OwnedGig> = Vec::with_capacity(owned.len());
    for gig in owned {
        let bid_count = bid_db::count_bids_for_gig(db.get_ref(), gig.id).await?;

        let assigned_to = match gig.assigned_to {
            Some(user_id) => user_db::get_user_by_id(db.get_ref(), user_id)
                .await?
                .map(UserSummary::from),
            None => None,
        };

        response.push(OwnedGig {
            id: gig.id,
            title: gig.title,
            description: gig.description,
            budget: gig.budget,
            status: gig.status,
            created_at: gig.created_at,
            assigned_to,
            bid_count,
        });
    }

    Ok(HttpResponse::Ok().json(response))
}
