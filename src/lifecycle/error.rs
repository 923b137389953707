use actix_web::{HttpResponse, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;

/// Failure taxonomy for lifecycle operations.
///
/// Every precondition violation maps to exactly one variant; the engine
/// never silently no-ops. All variants except `Database` are user-visible
/// and safe to retry once the precondition is corrected.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A referenced gig or bid does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The actor lacks the required relationship (not the owner, or is the
    /// owner where a bidder is required).
    #[error("{0}")]
    Forbidden(String),

    /// The action is illegal for the entity's current status.
    #[error("{0}")]
    InvalidState(String),

    /// The bidder already has a proposal on this gig.
    #[error("{0}")]
    Conflict(String),

    /// Malformed input: empty required field, non-positive amount,
    /// negative budget.
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl actix_web::ResponseError for LifecycleError {
    fn status_code(&self) -> StatusCode {
        match self {
            LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
            LifecycleError::Forbidden(_) => StatusCode::FORBIDDEN,
            LifecycleError::InvalidState(_) => StatusCode::BAD_REQUEST,
            LifecycleError::Conflict(_) => StatusCode::CONFLICT,
            LifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
            LifecycleError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
