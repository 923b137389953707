use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::db::{bids as bid_db, gigs as gig_db, notifications as notification_db};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::locks::GigLocks;
use crate::models::bids::{self, BidStatus};
use crate::models::gigs::{self, CreateGig, GigStatus, UpdateGig};
use crate::models::users;

/// The lifecycle core.
///
/// Owns every cross-entity rule of the gig/bid state machine:
/// which transitions are legal, in what order preconditions are checked,
/// and which notifications each transition emits. All writes touching a
/// gig's record-set go through that gig's lock, so check-then-write
/// sequences are atomic with respect to each other.
pub struct LifecycleEngine {
    db: DatabaseConnection,
    locks: GigLocks,
}

impl LifecycleEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            locks: GigLocks::new(),
        }
    }

    /// Create a gig owned by `owner`. New gigs always start `open`.
    pub async fn create_gig(
        &self,
        owner: &users::Model,
        input: CreateGig,
    ) -> Result<gigs::Model, LifecycleError> {
        validate_title(&input.title)?;
        validate_description(&input.description)?;
        validate_budget(input.budget)?;

        Ok(gig_db::insert_gig(&self.db, input, owner.id).await?)
    }

    /// Edit a gig's terms. Only the owner may edit, and only while the gig
    /// is still open — once assigned, title/description/budget are frozen.
    pub async fn update_gig(
        &self,
        gig_id: Uuid,
        acting: &users::Model,
        input: UpdateGig,
    ) -> Result<gigs::Model, LifecycleError> {
        let _guard = self.locks.acquire(gig_id).await;

        let gig = gig_db::get_gig_by_id(&self.db, gig_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("Gig {gig_id} not found")))?;

        if gig.owner_id != acting.id {
            return Err(LifecycleError::Forbidden(
                "Only the gig owner can edit this gig".to_string(),
            ));
        }

        if gig.status != GigStatus::Open {
            return Err(LifecycleError::InvalidState(
                "This gig has been assigned and its terms can no longer change".to_string(),
            ));
        }

        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(description) = &input.description {
            validate_description(description)?;
        }
        if let Some(budget) = input.budget {
            validate_budget(budget)?;
        }

        Ok(gig_db::update_gig_terms(&self.db, gig, input).await?)
    }

    /// Submit a proposal on an open gig.
    ///
    /// Preconditions are checked in a fixed order: existence, gig status,
    /// ownership, duplicates, then input validation. A duplicate bidder on
    /// an already-assigned gig therefore sees `InvalidState`, not
    /// `Conflict`.
    pub async fn submit_bid(
        &self,
        gig_id: Uuid,
        bidder: &users::Model,
        amount: f64,
        message: &str,
    ) -> Result<bids::Model, LifecycleError> {
        let _guard = self.locks.acquire(gig_id).await;

        let gig = gig_db::get_gig_by_id(&self.db, gig_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("Gig {gig_id} not found")))?;

        if gig.status != GigStatus::Open {
            return Err(LifecycleError::InvalidState(
                "This gig is no longer accepting bids".to_string(),
            ));
        }

        if gig.owner_id == bidder.id {
            return Err(LifecycleError::Forbidden(
                "You cannot bid on your own gig".to_string(),
            ));
        }

        if bid_db::bid_exists_for_gig_and_bidder(&self.db, gig_id, bidder.id).await? {
            return Err(LifecycleError::Conflict(
                "You have already placed a bid on this gig".to_string(),
            ));
        }

        if !(amount.is_finite() && amount > 0.0) {
            return Err(LifecycleError::Validation(
                "Bid amount must be a positive number".to_string(),
            ));
        }
        if message.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "Proposal message is required".to_string(),
            ));
        }

        let bid = bid_db::insert_bid(&self.db, gig_id, bidder.id, amount, message.to_string())
            .await?;

        self.notify(
            gig.owner_id,
            format!(
                "{} placed a ${:.2} bid on your gig \"{}\"",
                display_name(bidder),
                bid.amount,
                gig.title
            ),
        )
        .await;

        Ok(bid)
    }

    /// Hire one pending bid: flips the bid to `hired` and the gig to
    /// `assigned` as a single transaction.
    ///
    /// The other pending bids on the gig are left untouched; they become
    /// permanently unhireable because the gig has left `open` and this
    /// method's status precondition rejects any further hire.
    pub async fn hire_bid(
        &self,
        bid_id: Uuid,
        acting: &users::Model,
    ) -> Result<gigs::Model, LifecycleError> {
        let bid = bid_db::get_bid_by_id(&self.db, bid_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("Bid {bid_id} not found")))?;

        let _guard = self.locks.acquire(bid.gig_id).await;

        let gig = match gig_db::get_gig_by_id(&self.db, bid.gig_id).await? {
            Some(gig) if gig.owner_id == acting.id => gig,
            _ => {
                return Err(LifecycleError::Forbidden(
                    "Only the gig owner can hire a bid".to_string(),
                ));
            }
        };

        if gig.status != GigStatus::Open {
            return Err(LifecycleError::InvalidState(
                "This gig has already been assigned".to_string(),
            ));
        }

        if bid.status != BidStatus::Pending {
            return Err(LifecycleError::InvalidState(
                "Only pending bids can be hired".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(LifecycleError::Database)?;

        if !gig_db::try_assign(&txn, gig.id, bid.bidder_id).await? {
            return Err(LifecycleError::InvalidState(
                "This gig has already been assigned".to_string(),
            ));
        }
        bid_db::mark_hired(&txn, bid.id).await?;

        txn.commit().await.map_err(LifecycleError::Database)?;

        self.notify(
            bid.bidder_id,
            format!("You were hired for \"{}\"!", gig.title),
        )
        .await;

        let assigned = gig_db::get_gig_by_id(&self.db, gig.id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("Gig {} not found", gig.id)))?;

        Ok(assigned)
    }

    /// Whether `user_id` already has a proposal on `gig_id`. Pure read; the
    /// client uses it to gate the bid form.
    pub async fn has_bid_on_gig(
        &self,
        gig_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, LifecycleError> {
        Ok(bid_db::bid_exists_for_gig_and_bidder(&self.db, gig_id, user_id).await?)
    }

    /// Record a notification for `recipient`. Fire-and-forget: a failed
    /// write is logged and swallowed so the triggering transition still
    /// succeeds.
    async fn notify(&self, recipient: Uuid, message: String) {
        if let Err(e) = notification_db::insert_notification(&self.db, recipient, message).await {
            tracing::warn!("Failed to record notification for {recipient}: {e}");
        }
    }
}

fn display_name(user: &users::Model) -> &str {
    user.display_name.as_deref().unwrap_or("A freelancer")
}

fn validate_title(title: &str) -> Result<(), LifecycleError> {
    if title.trim().is_empty() {
        return Err(LifecycleError::Validation("Title is required".to_string()));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), LifecycleError> {
    if description.trim().is_empty() {
        return Err(LifecycleError::Validation(
            "Description is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_budget(budget: f64) -> Result<(), LifecycleError> {
    if !(budget.is_finite() && budget >= 0.0) {
        return Err(LifecycleError::Validation(
            "Budget must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
