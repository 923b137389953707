///! Integration tests for the gig/bid lifecycle engine.
///!
///! Each test runs against a fresh in-memory SQLite database with the real
///! migrations applied, so the unique index and foreign keys are live.
///!
///! Run with: `cargo test --test lifecycle_test`
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use std::time::Duration;
use uuid::Uuid;

use gigboard_backend::db::{bids as bid_db, notifications as notification_db};
use gigboard_backend::lifecycle::{LifecycleEngine, LifecycleError};
use gigboard_backend::models::bids::{self, BidStatus};
use gigboard_backend::models::gigs::{self, CreateGig, GigStatus, UpdateGig};
use gigboard_backend::models::users;

/// Fresh in-memory database with the full schema.
///
/// A single pooled connection keeps every query on the same SQLite
/// in-memory instance.
async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

async fn seed_user(db: &DatabaseConnection, name: &str) -> users::Model {
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}@example.com", name.to_lowercase())),
        display_name: Set(Some(name.to_string())),
        avatar_url: Set(None),
        auth_provider: Set("supabase".to_string()),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert test user")
}

async fn post_gig(engine: &LifecycleEngine, owner: &users::Model, budget: f64) -> gigs::Model {
    engine
        .create_gig(
            owner,
            CreateGig {
                title: "Build a React landing page".to_string(),
                description: "Responsive, dark mode, deployed to Vercel".to_string(),
                budget,
            },
        )
        .await
        .expect("Failed to create gig")
}

async fn hired_bid_count(db: &DatabaseConnection, gig_id: Uuid) -> u64 {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::Status.eq(BidStatus::Hired))
        .count(db)
        .await
        .expect("Failed to count hired bids")
}

// ── Scenario walkthroughs ──

#[tokio::test]
async fn scenario_a_submitted_bid_shows_up_pending() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    engine
        .submit_bid(gig.id, &bob, 400.0, "I can ship this in a week")
        .await
        .expect("Bid should be accepted");

    let bids = bid_db::get_bids_for_gig(&db, gig.id).await.unwrap();
    assert_eq!(bids.len(), 1);
    let (bid, bidder) = &bids[0];
    assert_eq!(bid.status, BidStatus::Pending);
    assert_eq!(bid.bidder_id, bob.id);
    assert_eq!(bid.amount, 400.0);
    assert_eq!(bidder.as_ref().unwrap().id, bob.id);

    // The gig itself is untouched by a submission.
    let gig = gigs::Entity::find_by_id(gig.id).one(&db).await.unwrap().unwrap();
    assert_eq!(gig.status, GigStatus::Open);
    assert!(gig.assigned_to.is_none());

    // The owner was told about the new bid.
    let owner_notifications = notification_db::get_for_recipient(&db, alice.id).await.unwrap();
    assert_eq!(owner_notifications.len(), 1);
    assert!(owner_notifications[0].message.contains("Bob"));
    assert!(!owner_notifications[0].is_read);
}

#[tokio::test]
async fn scenario_b_hire_assigns_gig_and_notifies_winner() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bid = engine
        .submit_bid(gig.id, &bob, 400.0, "I can ship this in a week")
        .await
        .unwrap();

    let assigned = engine.hire_bid(bid.id, &alice).await.expect("Hire should succeed");

    assert_eq!(assigned.status, GigStatus::Assigned);
    assert_eq!(assigned.assigned_to, Some(bob.id));

    let bid = bids::Entity::find_by_id(bid.id).one(&db).await.unwrap().unwrap();
    assert_eq!(bid.status, BidStatus::Hired);

    let bob_notifications = notification_db::get_for_recipient(&db, bob.id).await.unwrap();
    assert_eq!(bob_notifications.len(), 1);
    assert!(bob_notifications[0].message.contains("hired"));
}

#[tokio::test]
async fn scenario_c_assigned_gig_rejects_new_bids() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bid = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    engine.hire_bid(bid.id, &alice).await.unwrap();

    let err = engine
        .submit_bid(gig.id, &carol, 350.0, "Cheaper and faster")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(_)));
}

#[tokio::test]
async fn scenario_d_state_is_checked_before_duplicates() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bid = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    engine.hire_bid(bid.id, &alice).await.unwrap();

    // Bob already has a (hired) bid here, but the gig being assigned wins:
    // the duplicate check is never reached.
    let err = engine
        .submit_bid(gig.id, &bob, 300.0, "Second thoughts")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(_)));
}

// ── Precondition failures ──

#[tokio::test]
async fn submitting_on_a_missing_gig_is_not_found() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let bob = seed_user(&db, "Bob").await;

    let err = engine
        .submit_bid(Uuid::new_v4(), &bob, 100.0, "Hello?")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn owners_cannot_bid_on_their_own_gig() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let err = engine
        .submit_bid(gig.id, &alice, 400.0, "I'll do it myself")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));

    let bids = bid_db::get_bids_for_gig(&db, gig.id).await.unwrap();
    assert!(bids.is_empty());
}

#[tokio::test]
async fn second_bid_by_same_bidder_conflicts() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    engine.submit_bid(gig.id, &bob, 400.0, "First offer").await.unwrap();

    let err = engine
        .submit_bid(gig.id, &bob, 350.0, "Actually, cheaper")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict(_)));

    let bids = bid_db::get_bids_for_gig(&db, gig.id).await.unwrap();
    assert_eq!(bids.len(), 1);
}

#[tokio::test]
async fn bid_input_is_validated_after_state_checks() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;

    let err = engine.submit_bid(gig.id, &bob, 0.0, "Free!").await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));

    let err = engine.submit_bid(gig.id, &bob, -50.0, "Pay me?").await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));

    let err = engine.submit_bid(gig.id, &bob, 100.0, "   ").await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));
}

#[tokio::test]
async fn gig_creation_is_validated() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;

    let err = engine
        .create_gig(
            &alice,
            CreateGig {
                title: "  ".to_string(),
                description: "Something".to_string(),
                budget: 100.0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));

    let err = engine
        .create_gig(
            &alice,
            CreateGig {
                title: "Logo design".to_string(),
                description: "Vector logo".to_string(),
                budget: -1.0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));

    // Zero is a legal budget.
    let gig = engine
        .create_gig(
            &alice,
            CreateGig {
                title: "Logo design".to_string(),
                description: "Vector logo".to_string(),
                budget: 0.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(gig.status, GigStatus::Open);
}

#[tokio::test]
async fn hiring_a_missing_bid_is_not_found() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;

    let err = engine.hire_bid(Uuid::new_v4(), &alice).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn only_the_owner_can_hire() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bid = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();

    // Neither a bystander nor the bidder themselves can hire.
    let err = engine.hire_bid(bid.id, &carol).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
    let err = engine.hire_bid(bid.id, &bob).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));

    let gig = gigs::Entity::find_by_id(gig.id).one(&db).await.unwrap().unwrap();
    assert_eq!(gig.status, GigStatus::Open);
}

// ── Invariants ──

#[tokio::test]
async fn at_most_one_bid_is_ever_hired() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;
    let dave = seed_user(&db, "Dave").await;

    let gig = post_gig(&engine, &alice, 1000.0).await;
    engine.submit_bid(gig.id, &bob, 900.0, "Quality work").await.unwrap();
    let carols = engine.submit_bid(gig.id, &carol, 800.0, "Fast work").await.unwrap();
    engine.submit_bid(gig.id, &dave, 700.0, "Cheap work").await.unwrap();

    engine.hire_bid(carols.id, &alice).await.unwrap();

    assert_eq!(hired_bid_count(&db, gig.id).await, 1);

    // Losing bids stay pending; there is no rejected state.
    let bids = bid_db::get_bids_for_gig(&db, gig.id).await.unwrap();
    assert_eq!(bids.len(), 3);
    for (bid, _) in &bids {
        if bid.id == carols.id {
            assert_eq!(bid.status, BidStatus::Hired);
        } else {
            assert_eq!(bid.status, BidStatus::Pending);
        }
    }

    let gig = gigs::Entity::find_by_id(gig.id).one(&db).await.unwrap().unwrap();
    assert_eq!(gig.status, GigStatus::Assigned);
    assert_eq!(gig.assigned_to, Some(carol.id));
}

#[tokio::test]
async fn double_hire_fails_and_leaves_state_unchanged() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bid = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();

    engine.hire_bid(bid.id, &alice).await.unwrap();
    let err = engine.hire_bid(bid.id, &alice).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(_)));

    let gig = gigs::Entity::find_by_id(gig.id).one(&db).await.unwrap().unwrap();
    assert_eq!(gig.status, GigStatus::Assigned);
    assert_eq!(gig.assigned_to, Some(bob.id));
    assert_eq!(hired_bid_count(&db, gig.id).await, 1);

    // The failed retry emits nothing new.
    let bob_notifications = notification_db::get_for_recipient(&db, bob.id).await.unwrap();
    assert_eq!(bob_notifications.len(), 1);
}

#[tokio::test]
async fn hiring_a_pending_bid_on_an_assigned_gig_fails() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bobs = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    let carols = engine.submit_bid(gig.id, &carol, 450.0, "Or me").await.unwrap();

    engine.hire_bid(bobs.id, &alice).await.unwrap();

    // Carol's bid is still pending but permanently unhireable.
    let err = engine.hire_bid(carols.id, &alice).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(_)));
    assert_eq!(hired_bid_count(&db, gig.id).await, 1);
}

#[tokio::test]
async fn bids_list_in_submission_order() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    engine.submit_bid(gig.id, &bob, 400.0, "First").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    engine.submit_bid(gig.id, &carol, 450.0, "Second").await.unwrap();

    let bids = bid_db::get_bids_for_gig(&db, gig.id).await.unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0].0.bidder_id, bob.id);
    assert_eq!(bids[1].0.bidder_id, carol.id);
}

#[tokio::test]
async fn has_bid_on_gig_reflects_submissions() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    assert!(!engine.has_bid_on_gig(gig.id, bob.id).await.unwrap());

    engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    assert!(engine.has_bid_on_gig(gig.id, bob.id).await.unwrap());
    assert!(!engine.has_bid_on_gig(gig.id, alice.id).await.unwrap());
}

// ── Gig term edits ──

#[tokio::test]
async fn owners_can_edit_terms_only_while_open() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;

    let updated = engine
        .update_gig(
            gig.id,
            &alice,
            UpdateGig {
                title: None,
                description: None,
                budget: Some(650.0),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.budget, 650.0);

    // A non-owner cannot edit at all.
    let err = engine
        .update_gig(
            gig.id,
            &bob,
            UpdateGig {
                title: Some("Hijacked".to_string()),
                description: None,
                budget: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));

    // After assignment the terms are frozen even for the owner.
    let bid = engine.submit_bid(gig.id, &bob, 600.0, "Deal").await.unwrap();
    engine.hire_bid(bid.id, &alice).await.unwrap();

    let err = engine
        .update_gig(
            gig.id,
            &alice,
            UpdateGig {
                title: None,
                description: None,
                budget: Some(100.0),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(_)));
}

// ── Notifications ──

#[tokio::test]
async fn losing_bidders_are_not_notified() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bobs = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    engine.submit_bid(gig.id, &carol, 450.0, "Or me").await.unwrap();

    engine.hire_bid(bobs.id, &alice).await.unwrap();

    // Owner saw one notification per bid; the winner heard about the hire;
    // the loser heard nothing.
    assert_eq!(notification_db::get_for_recipient(&db, alice.id).await.unwrap().len(), 2);
    assert_eq!(notification_db::get_for_recipient(&db, bob.id).await.unwrap().len(), 1);
    assert!(notification_db::get_for_recipient(&db, carol.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_all_read_is_idempotent() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    engine.submit_bid(gig.id, &carol, 450.0, "Or me").await.unwrap();

    assert_eq!(notification_db::mark_all_read(&db, alice.id).await.unwrap(), 2);
    assert_eq!(notification_db::mark_all_read(&db, alice.id).await.unwrap(), 0);

    let notifications = notification_db::get_for_recipient(&db, alice.id).await.unwrap();
    assert!(notifications.iter().all(|n| n.is_read));
}

// ── Races ──

#[tokio::test]
async fn concurrent_hires_pick_exactly_one_winner() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;
    let carol = seed_user(&db, "Carol").await;

    let gig = post_gig(&engine, &alice, 500.0).await;
    let bobs = engine.submit_bid(gig.id, &bob, 400.0, "Pick me").await.unwrap();
    let carols = engine.submit_bid(gig.id, &carol, 450.0, "Or me").await.unwrap();

    let (first, second) = tokio::join!(
        engine.hire_bid(bobs.id, &alice),
        engine.hire_bid(carols.id, &alice),
    );

    let successes = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1);
    for result in [first, second] {
        if let Err(err) = result {
            assert!(matches!(err, LifecycleError::InvalidState(_)));
        }
    }

    assert_eq!(hired_bid_count(&db, gig.id).await, 1);
    let gig = gigs::Entity::find_by_id(gig.id).one(&db).await.unwrap().unwrap();
    assert_eq!(gig.status, GigStatus::Assigned);
}

#[tokio::test]
async fn concurrent_duplicate_submissions_admit_one_bid() {
    let db = setup_db().await;
    let engine = LifecycleEngine::new(db.clone());
    let alice = seed_user(&db, "Alice").await;
    let bob = seed_user(&db, "Bob").await;

    let gig = post_gig(&engine, &alice, 500.0).await;

    let (first, second) = tokio::join!(
        engine.submit_bid(gig.id, &bob, 400.0, "Pick me"),
        engine.submit_bid(gig.id, &bob, 380.0, "Pick me, cheaper"),
    );

    let successes = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1);
    for result in [first, second] {
        if let Err(err) = result {
            assert!(matches!(err, LifecycleError::Conflict(_)));
        }
    }

    let bids = bid_db::get_bids_for_gig(&db, gig.id).await.unwrap();
    assert_eq!(bids.len(), 1);
}
