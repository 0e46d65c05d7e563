use std::sync::Arc;

use crate::{
    config::{Config, PipelineConfig},
    data::{DatasetSource, FileDatasetSource, SessionCache},
    error::{AppError, AppResult},
    models::Insights,
    services::{pipeline, PosterIndex, PosterResolver},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub source: Arc<dyn DatasetSource>,
    pub cache: SessionCache<Insights>,
    pub posters: PosterResolver,
    pub pipeline: PipelineConfig,
}

impl AppState {
    pub fn new(
        source: Arc<dyn DatasetSource>,
        posters: PosterResolver,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                source,
                cache: SessionCache::new(),
                posters,
                pipeline,
            }),
        }
    }

    /// State reading the CSV files named in the configuration
    pub fn from_config(config: &Config) -> Self {
        let source = FileDatasetSource::new(&config.catalog_path, &config.ratings_path);
        Self::new(
            Arc::new(source),
            PosterResolver::new(config.poster_dir.as_deref()),
            config.pipeline(),
        )
    }

    /// Current insights, recomputed only when the input files changed
    ///
    /// File IO and the pipeline run on the blocking pool.
    pub async fn insights(&self) -> AppResult<Arc<Insights>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            pipeline::load_insights(inner.source.as_ref(), &inner.cache, &inner.pipeline)
        })
        .await
        .map_err(|e| AppError::Internal(format!("insights task failed: {}", e)))?
    }

    /// Snapshot of the poster directory, listed on the blocking pool
    pub async fn poster_index(&self) -> AppResult<PosterIndex> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.posters.index())
            .await
            .map_err(|e| AppError::Internal(format!("poster index task failed: {}", e)))
    }
}
