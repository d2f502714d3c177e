// Route exports
pub mod candidates;
pub mod jobs;
pub mod matches;

use actix_web::web;
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::MatchPipeline;
use crate::services::{ProfileExtractor, ProfileStore};

/// Application state shared across all handlers.
///
/// The store handle is constructed once at process start and passed in,
/// so tests can substitute an in-memory implementation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub pipeline: Arc<MatchPipeline>,
    pub extractor: Option<Arc<ProfileExtractor>>,
    pub matching: MatchingSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(jobs::configure)
            .configure(candidates::configure),
    );
}
