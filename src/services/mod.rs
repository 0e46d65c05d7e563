pub mod aggregator;
pub mod exploder;
pub mod matcher;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod posters;
pub mod recommender;
pub mod summary;

pub use pipeline::{build_insights, load_insights};
pub use posters::{Poster, PosterIndex, PosterResolver};
