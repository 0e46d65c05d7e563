pub mod cache;
pub mod loader;
pub mod source;

pub use cache::{CacheKey, SessionCache};
pub use loader::{parse_catalog, parse_ratings};
pub use source::{DatasetSource, FileDatasetSource};

#[cfg(test)]
pub use source::MockDatasetSource;
