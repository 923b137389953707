use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Gigs {
    Table,
    OwnerId,
    Status,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    GigId,
    BidderId,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    RecipientId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One proposal per bidder per gig; the lifecycle engine checks this
        // before inserting, the index is the last line of defense.
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_gig_bidder_unique")
                    .table(Bids::Table)
                    .col(Bids::GigId)
                    .col(Bids::BidderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on bids.gig_id for fetching bids by gig
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_gig_id")
                    .table(Bids::Table)
                    .col(Bids::GigId)
                    .to_owned(),
            )
            .await?;

        // Index on bids.bidder_id for the "my proposals" view
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_bidder_id")
                    .table(Bids::Table)
                    .col(Bids::BidderId)
                    .to_owned(),
            )
            .await?;

        // Index on gigs.owner_id for fetching gigs by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_owner_id")
                    .table(Gigs::Table)
                    .col(Gigs::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index on gigs.status for the open-gigs listing
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_status")
                    .table(Gigs::Table)
                    .col(Gigs::Status)
                    .to_owned(),
            )
            .await?;

        // Index on notifications.recipient_id for the polling endpoint
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_recipient_id")
                    .table(Notifications::Table)
                    .col(Notifications::RecipientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_bids_gig_bidder_unique").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bids_gig_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_bids_bidder_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_gigs_owner_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_gigs_status").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_notifications_recipient_id")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
