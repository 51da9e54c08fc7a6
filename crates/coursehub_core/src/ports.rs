//! crates/coursehub_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the database, the judge HTTP APIs and the client's storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Course;
use crate::payload::JudgeProfile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Upstream service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CourseCatalogService: Send + Sync {
    /// Lists every published course in a category, in the source's natural order.
    async fn list_courses(&self, category_id: &str) -> PortResult<Vec<Course>>;
}

#[async_trait]
pub trait JudgeProfileService: Send + Sync {
    /// Short label used in logs and responses, e.g. "primary".
    fn name(&self) -> &str;

    /// Fetches the public profile statistics for a judge username.
    async fn fetch_profile(&self, username: &str) -> PortResult<JudgeProfile>;
}

/// Remembers which judge username a user has linked, across sessions.
#[async_trait]
pub trait LinkedAccountStore: Send + Sync {
    async fn get_linked_username(&self, user_id: Uuid) -> PortResult<Option<String>>;

    async fn set_linked_username(&self, user_id: Uuid, username: &str) -> PortResult<()>;

    async fn remove_linked_username(&self, user_id: Uuid) -> PortResult<()>;
}
