pub mod bids;
pub mod gigs;
pub mod notifications;
pub mod users;
