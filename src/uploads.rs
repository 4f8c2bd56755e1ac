//! Cover image upload storage.
//!
//! Files land in a server-managed directory under a generated name; the
//! client-supplied filename is never used, so it cannot influence the
//! storage path. The recorded reference is a relative path under the
//! public mount prefix and is served statically by the router.

use crate::error::{AppError, Result};
use image::ImageFormat;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Public URL prefix covers are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Filesystem store for uploaded cover images.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store image bytes under a collision-resistant generated name.
    ///
    /// The extension comes from sniffing the content against the accepted
    /// image formats, never from the upload. Returns the public reference
    /// (`/uploads/<name>`) to record on the book.
    pub fn store_cover(&self, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(AppError::Upload("Empty file".to_string()));
        }

        let ext = detect_extension(data)?;

        let mut buf = [0u8; 4];
        rand::rng().fill_bytes(&mut buf);
        let suffix = u32::from_le_bytes(buf) % 1_000_000_000;

        let name = format!(
            "{}-{:09}.{}",
            chrono::Utc::now().timestamp_millis(),
            suffix,
            ext
        );

        let path = self.dir.join(&name);
        std::fs::write(&path, data)?;

        tracing::debug!(file = %name, bytes = data.len(), "Stored cover upload");
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }
}

/// Sniff the image format and map it to a file extension.
///
/// Only the allow-listed image formats are accepted; everything else is
/// rejected before touching the filesystem.
fn detect_extension(data: &[u8]) -> Result<&'static str> {
    let format = image::guess_format(data)
        .map_err(|_| AppError::Upload("File is not a recognized image".to_string()))?;

    match format {
        ImageFormat::Png => Ok("png"),
        ImageFormat::Jpeg => Ok("jpg"),
        ImageFormat::Gif => Ok("gif"),
        ImageFormat::WebP => Ok("webp"),
        other => Err(AppError::Upload(format!(
            "Unsupported image type: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PNG magic bytes, enough for format sniffing.
    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    #[test]
    fn store_generates_name_inside_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path()).unwrap();

        let reference = store.store_cover(PNG_BYTES).unwrap();
        let name = reference.strip_prefix("/uploads/").unwrap();

        assert!(name.ends_with(".png"));
        assert!(!name.contains('/'));
        assert!(tmp.path().join(name).is_file());
    }

    #[test]
    fn store_rejects_non_image_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path()).unwrap();

        assert!(matches!(
            store.store_cover(b"#!/bin/sh\nrm -rf /\n"),
            Err(AppError::Upload(_))
        ));
        assert!(matches!(store.store_cover(b""), Err(AppError::Upload(_))));

        // Nothing written
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn store_names_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path()).unwrap();

        let a = store.store_cover(PNG_BYTES).unwrap();
        let b = store.store_cover(PNG_BYTES).unwrap();
        assert_ne!(a, b);
    }
}
