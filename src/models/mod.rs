pub mod catalog;
pub mod insights;
pub mod rating;

pub use catalog::{CatalogItem, CatalogRow, CategoryField};
pub use insights::{Candidate, CategoryStat, Favorites, Insights, SummaryStats};
pub use rating::{MergedRecord, RatingRow, UserRating};
