use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::services::normalizer::normalize_loose;

/// Where the poster for a title can be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Poster {
    Local { path: String },
    Remote { url: String },
    Missing,
}

/// Locates posters in an optional local directory, falling back to the
/// catalog image URL
#[derive(Debug, Clone, Default)]
pub struct PosterResolver {
    dir: Option<PathBuf>,
}

impl PosterResolver {
    pub fn new(dir: Option<impl Into<PathBuf>>) -> Self {
        Self {
            dir: dir.map(Into::into),
        }
    }

    /// Lists the poster directory once and keys its files by simplified stem
    ///
    /// Performs blocking filesystem IO. When two files share a stem the first
    /// in path order wins.
    pub fn index(&self) -> PosterIndex {
        let mut by_stem = HashMap::new();
        let Some(dir) = self.dir.as_deref() else {
            return PosterIndex { by_stem };
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Poster directory is not readable");
                return PosterIndex { by_stem };
            }
        };

        // read_dir order is platform dependent
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            if let Some(key) = stem_key(&path).filter(|k| !k.is_empty()) {
                by_stem.entry(key).or_insert(path);
            }
        }

        tracing::debug!(dir = %dir.display(), posters = by_stem.len(), "Indexed poster directory");
        PosterIndex { by_stem }
    }
}

/// In-memory snapshot of the poster directory
#[derive(Debug, Clone, Default)]
pub struct PosterIndex {
    by_stem: HashMap<String, PathBuf>,
}

impl PosterIndex {
    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }

    pub fn resolve(&self, title: &str, img_url: Option<&str>) -> Poster {
        let local = Some(normalize_loose(title))
            .filter(|target| !target.is_empty())
            .and_then(|target| self.by_stem.get(&target));
        if let Some(path) = local {
            return Poster::Local {
                path: path.display().to_string(),
            };
        }

        match img_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Poster::Remote {
                url: url.to_string(),
            },
            None => Poster::Missing,
        }
    }
}

/// File stem with underscores and hyphens read as spaces, then simplified
fn stem_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(normalize_loose(&stem.replace(['_', '-'], " ")))
}
