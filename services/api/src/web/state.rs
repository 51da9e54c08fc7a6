//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::loader::ProgressLoader;
use coursehub_core::ports::{CourseCatalogService, LinkedAccountStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CourseCatalogService>,
    pub accounts: Arc<dyn LinkedAccountStore>,
    pub progress_loader: Arc<ProgressLoader>,
}
