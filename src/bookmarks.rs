use std::path::{Path, PathBuf};

use crate::media::{MovieId, MovieSummary};

const BOOKMARKS_FILE: &str = "bookmarks.json";

#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    #[error("bookmark file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("bookmark file is not a JSON id list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Saved movie identifiers, unique and in insertion order, mirrored to a
/// JSON array on disk after every change.
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    ids: Vec<MovieId>,
    path: Option<PathBuf>,
}

impl BookmarkStore {
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("moviescout").join(BOOKMARKS_FILE))
    }

    /// Loads the saved snapshot; a missing or unreadable file yields an empty set.
    pub fn load(path: Option<PathBuf>) -> Self {
        let ids = match path.as_deref().map(read_snapshot) {
            Some(Ok(ids)) => ids,
            Some(Err(BookmarkError::Io(e))) if e.kind() == std::io::ErrorKind::NotFound => {
                Vec::new()
            }
            Some(Err(e)) => {
                tracing::warn!("ignoring saved bookmarks: {}", e);
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut store = Self { ids: Vec::new(), path };
        for id in ids {
            if !store.contains(id) {
                store.ids.push(id);
            }
        }
        store
    }

    #[cfg(test)]
    pub fn ids(&self) -> &[MovieId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.ids.contains(&id)
    }

    /// Adds `id` if absent, removes it if present, then persists the full
    /// set. Returns whether `id` is bookmarked afterwards.
    pub fn toggle(&mut self, id: MovieId) -> bool {
        let bookmarked = match self.ids.iter().position(|saved| *saved == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id);
                true
            }
        };

        if let Err(e) = self.persist() {
            tracing::warn!("failed to save bookmarks: {}", e);
        }
        bookmarked
    }

    /// The bookmarked subset of `movies`, in their original order.
    pub fn filter<'a>(&self, movies: &'a [MovieSummary]) -> Vec<&'a MovieSummary> {
        movies.iter().filter(|m| self.contains(m.id)).collect()
    }

    fn persist(&self) -> Result<(), BookmarkError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&self.ids)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<Vec<MovieId>, BookmarkError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
