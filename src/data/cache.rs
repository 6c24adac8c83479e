use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{LoadError, load_file};
use super::model::CrossingDataset;

// ---------------------------------------------------------------------------
// DatasetCache – one loaded table per session, keyed by path
// ---------------------------------------------------------------------------

/// Owns the session's loaded dataset. The file is read on first request; later
/// requests for the same path hand back the same shared instance. Asking for a
/// different path replaces the entry.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(PathBuf, Arc<CrossingDataset>)>,
}

impl DatasetCache {
    /// Return the dataset for `path`, reading it only if it is not already
    /// the cached one. A failed load leaves the current entry untouched.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<CrossingDataset>, LoadError> {
        if let Some((cached_path, dataset)) = &self.entry {
            if cached_path == path {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load_file(path)?);
        self.entry = Some((path.to_path_buf(), Arc::clone(&dataset)));
        Ok(dataset)
    }

    pub fn path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|(p, _)| p.as_path())
    }
}
