//! Service descriptions stored as markdown under `<content_dir>/services/<slug>.md`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, instrument};

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Archivo no encontrado: {0}")]
    NotFound(String),

    #[error("Error interno del servidor: {0}")]
    Read(#[from] io::Error),
}

impl ContentError {
    /// HTTP-style classification: 404 for a missing service, 500 for anything else.
    pub fn status_code(&self) -> u16 {
        match self {
            ContentError::NotFound(_) => 404,
            ContentError::Read(_) => 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceContentStore {
    root: PathBuf,
}

impl ServiceContentStore {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: content_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Slugs are single path components; anything that could escape `services/` is not found.
    fn path_for(&self, slug: &str) -> Option<PathBuf> {
        let invalid = slug.is_empty()
            || slug.contains('/')
            || slug.contains('\\')
            || slug.contains("..");
        if invalid {
            return None;
        }
        Some(self.root.join("services").join(format!("{}.md", slug)))
    }

    #[instrument(skip(self))]
    pub fn load(&self, slug: &str) -> Result<String, ContentError> {
        let path = self
            .path_for(slug)
            .ok_or_else(|| ContentError::NotFound(slug.to_string()))?;

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ContentError::NotFound(slug.to_string()))
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error loading markdown file");
                Err(ContentError::Read(e))
            }
        }
    }
}
