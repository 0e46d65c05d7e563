use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Provider of the raw catalog and ratings bytes
#[cfg_attr(test, mockall::automock)]
pub trait DatasetSource: Send + Sync {
    fn read_catalog(&self) -> AppResult<Vec<u8>>;

    fn read_ratings(&self) -> AppResult<Vec<u8>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Reads both datasets from local CSV files on every call
#[derive(Debug, Clone)]
pub struct FileDatasetSource {
    catalog_path: PathBuf,
    ratings_path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(catalog_path: impl Into<PathBuf>, ratings_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            ratings_path: ratings_path.into(),
        }
    }

    fn read(path: &Path) -> AppResult<Vec<u8>> {
        std::fs::read(path).map_err(|source| AppError::MissingInputFile {
            path: path.display().to_string(),
            source,
        })
    }
}

impl DatasetSource for FileDatasetSource {
    fn read_catalog(&self) -> AppResult<Vec<u8>> {
        Self::read(&self.catalog_path)
    }

    fn read_ratings(&self) -> AppResult<Vec<u8>> {
        Self::read(&self.ratings_path)
    }

    fn describe(&self) -> String {
        format!(
            "catalog={} ratings={}",
            self.catalog_path.display(),
            self.ratings_path.display()
        )
    }
}
