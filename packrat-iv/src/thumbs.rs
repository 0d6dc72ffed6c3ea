//! Thumbnail image storage
//!
//! Directory-backed blob store for item thumbnails. Files are stored under
//! `<root>/thumbnails/<uuid>` with no extension; the content type is
//! sniffed from the bytes on upload (images only) and again when serving.
//! Deletion is best-effort: a file already gone is not an error.

use packrat_common::{Error, Result};
use std::path::PathBuf;
use uuid::Uuid;

/// Content types accepted for upload
const ACCEPTED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Resolve a thumbnail reference to its fetchable URL
pub fn public_url(id: Uuid) -> String {
    format!("/thumbnails/{}", id)
}

/// Directory-backed thumbnail store
#[derive(Clone)]
pub struct ThumbnailStore {
    dir: PathBuf,
}

impl ThumbnailStore {
    /// Open the store, creating the directory if needed
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }

    /// Validate and store uploaded image bytes, returning the new reference
    pub fn save(&self, bytes: &[u8]) -> Result<Uuid> {
        let mime = infer::get(bytes).map(|kind| kind.mime_type());
        match mime {
            Some(mime) if ACCEPTED_TYPES.contains(&mime) => {}
            _ => {
                return Err(Error::InvalidInput(
                    "Thumbnail must be a PNG, JPEG, GIF or WebP image".to_string(),
                ))
            }
        }

        let id = Uuid::new_v4();
        std::fs::write(self.path_for(id), bytes)?;
        Ok(id)
    }

    /// Load thumbnail bytes and their sniffed content type
    pub fn load(&self, id: Uuid) -> Result<Option<(Vec<u8>, &'static str)>> {
        match std::fs::read(self.path_for(id)) {
            Ok(bytes) => {
                let mime = infer::get(&bytes)
                    .map(|kind| kind.mime_type())
                    .unwrap_or("application/octet-stream");
                Ok(Some((bytes, mime)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored thumbnail; a missing file is not an error
    pub fn remove(&self, id: Uuid) -> Result<()> {
        match std::fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
