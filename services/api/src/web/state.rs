//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use pitchdeck_core::ports::{AssistantService, BlobStore, ProjectStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Every external dependency sits behind a port trait, so tests can swap in
/// in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn ProjectStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub assistant: Arc<dyn AssistantService>,
    pub config: Arc<Config>,
}
