use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::services::{DocumentRenderer, ImageHost, LlmClient, Mailer, MilestonePlanner};

/// Shared handles passed to every action and handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub planner: MilestonePlanner,
    pub image_host: ImageHost,
    pub mailer: Mailer,
    pub documents: DocumentRenderer,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            planner: MilestonePlanner::new(LlmClient::from_config(&config)),
            image_host: ImageHost::from_config(&config),
            mailer: Mailer::from_config(&config),
            documents: DocumentRenderer::new(&config.document_dir),
            config: Arc::new(config),
            db,
        }
    }
}
