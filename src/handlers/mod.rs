pub mod auth;
pub mod bids;
pub mod dashboard;
pub mod gigs;
pub mod notifications;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── Gig routes (all protected — require valid JWT) ──
    // "/my-gigs" must be registered before "/{id}" or the path segment
    // would be parsed as a UUID.
    cfg.service(
        web::scope("/gigs")
            .route("", web::get().to(gigs::get_gigs))
            .route("", web::post().to(gigs::create_gig))
            .route("/my-gigs", web::get().to(gigs::get_my_gigs))
            .route("/{id}", web::get().to(gigs::get_gig))
            .route("/{id}", web::put().to(gigs::update_gig)),
    );

    // ── Bid routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/bids")
            .route("", web::post().to(bids::create_bid))
            .route("/my-bids", web::get().to(bids::get_my_bids))
            .route("/has-bid/{gig_id}", web::get().to(bids::has_bid))
            .route("/{bid_id}/hire", web::patch().to(bids::hire_bid))
            .route("/{gig_id}", web::get().to(bids::get_bids_for_gig)),
    );

    // ── Notification routes (polled by the client) ──
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::get_notifications))
            .route("/mark-read", web::put().to(notifications::mark_read)),
    );

    // ── Dashboard stats ──
    cfg.service(
        web::scope("/dashboard")
            .route("/freelancer", web::get().to(dashboard::freelancer_stats))
            .route("/client", web::get().to(dashboard::client_stats)),
    );
}
