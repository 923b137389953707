pub mod auth;
pub mod cache;
pub mod db;
pub mod handlers;
pub mod lifecycle;
pub mod models;

pub use db::create_pool;
pub use lifecycle::{LifecycleEngine, LifecycleError};
