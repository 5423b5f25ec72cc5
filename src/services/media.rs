use anyhow::Context;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::error::{ApiError, Result};

const IMAGE_DIR: &str = "images";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Filesystem store for uploaded advert images.
///
/// Files live under `root`; the database keeps paths relative to it and
/// clients receive `base_url` + relative path.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(root: PathBuf, base_url: &str) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Stores an uploaded image and returns its relative path.
    pub async fn save_image(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String> {
        let extension = image_extension(file_name, content_type)?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded image is empty".to_string()));
        }

        let relative = format!("{}/{}.{}", IMAGE_DIR, Uuid::new_v4(), extension);
        let dir = self.root.join(IMAGE_DIR);

        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create media directory {}", dir.display()))?;

        let target = self.root.join(&relative);
        tokio::fs::write(&target, bytes)
            .await
            .with_context(|| format!("Failed to write image {}", target.display()))?;

        tracing::info!(path = %relative, bytes = bytes.len(), "Stored image");

        Ok(relative)
    }

    /// Removes a stored file. Failures are logged, never returned: the
    /// database row is the source of truth and a stray file is harmless.
    pub async fn remove(&self, path: &str) {
        if !is_safe_relative(path) {
            tracing::warn!(path = %path, "Refusing to remove media path outside the media root");
            return;
        }

        let target = self.root.join(path);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => tracing::debug!(path = %path, "Removed image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path, "Image already gone")
            }
            Err(e) => tracing::warn!(path = %path, error = %e, "Failed to remove image"),
        }
    }

    pub async fn remove_all(&self, paths: &[String]) {
        for path in paths {
            self.remove(path).await;
        }
    }
}

/// Picks the stored extension from the uploaded file name. A declared
/// content type must be an image type.
pub fn image_extension(file_name: Option<&str>, content_type: Option<&str>) -> Result<String> {
    if let Some(content_type) = content_type {
        if !content_type.starts_with("image/") {
            return Err(ApiError::UnsupportedMediaType(format!(
                "Expected an image upload, got content type '{}'",
                content_type
            )));
        }
    }

    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest("Uploaded image must have a file name with an extension".to_string()))?;

    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "Unsupported image extension '{}'. Allowed: {}",
            extension,
            IMAGE_EXTENSIONS.join(", ")
        )));
    }

    Ok(extension)
}

fn is_safe_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
