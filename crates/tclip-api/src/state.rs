//! Application state.

use std::sync::Arc;

use tclip_media::{ClipFetcher, CompilationBuilder, FetcherConfig, MediaError};
use tclip_pipeline::Pipeline;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Resolves the fetch tool once, up front; a missing tool fails startup
    /// rather than the first request.
    pub fn new(config: ApiConfig) -> Result<Self, MediaError> {
        let fetcher_config = FetcherConfig::from_env()?;
        let pipeline = Pipeline::new(
            ClipFetcher::new(fetcher_config),
            CompilationBuilder::new(),
            config.output_root.clone(),
        );

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }
}
