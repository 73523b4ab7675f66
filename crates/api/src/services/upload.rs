//! Product image storage.
//!
//! Accepts one image per request, rejects non-image content types, writes
//! the file under the configured uploads directory with a collision-resistant
//! name, and yields the public URL the catalog stores as `image_url`. Files
//! are served back by the static `/uploads` route.

use std::path::Path;

use axum::body::Bytes;
use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::config::ApiConfig;

/// Longest extension carried over from the uploaded file name.
const MAX_EXTENSION_LEN: usize = 8;

/// An image file extracted from a multipart request.
#[derive(Debug)]
pub struct ImageUpload {
    /// Client-provided file name, used only for its extension.
    pub file_name: Option<String>,
    /// Declared content type.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Bytes,
}

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The declared content type is not an image type.
    #[error("only image uploads are allowed")]
    NotAnImage,

    /// Writing the file failed.
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Store an uploaded image and return its public URL.
///
/// # Errors
///
/// Returns [`UploadError::NotAnImage`] for non-image content types and
/// [`UploadError::Io`] if the file cannot be written.
pub async fn store_image(config: &ApiConfig, upload: &ImageUpload) -> Result<String, UploadError> {
    if !is_image(&upload.content_type) {
        return Err(UploadError::NotAnImage);
    }

    let file_name = unique_file_name(upload.file_name.as_deref());

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    tokio::fs::write(config.uploads_dir.join(&file_name), &upload.bytes).await?;

    Ok(format!(
        "{}/uploads/{file_name}",
        config.base_url.trim_end_matches('/')
    ))
}

/// Whether a declared content type is an image type.
#[must_use]
pub fn is_image(content_type: &str) -> bool {
    content_type
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Build a stored file name: `image-{timestamp}-{random}` plus the sanitized
/// extension of the original name, if any.
fn unique_file_name(original: Option<&str>) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let base = format!("image-{}-{suffix:09}", Utc::now().timestamp_millis());

    match sanitized_extension(original) {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

/// The original file's extension, lowercased, if it is short and purely
/// alphanumeric. Anything else is dropped rather than echoed into a path.
fn sanitized_extension(original: Option<&str>) -> Option<String> {
    let ext = Path::new(original?).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_content_types() {
        assert!(is_image("image/png"));
        assert!(is_image("image/jpeg"));
        assert!(is_image("IMAGE/GIF"));
        assert!(!is_image("application/pdf"));
        assert!(!is_image("text/html"));
        assert!(!is_image(""));
    }

    #[test]
    fn test_extension_is_sanitized() {
        assert_eq!(
            sanitized_extension(Some("photo.PNG")),
            Some("png".to_owned())
        );
        assert_eq!(sanitized_extension(Some("no-extension")), None);
        assert_eq!(sanitized_extension(Some("weird.p/n\\g")), None);
        assert_eq!(sanitized_extension(Some("long.verylongext")), None);
        assert_eq!(sanitized_extension(None), None);
    }

    #[test]
    fn test_unique_file_name_shape() {
        let name = unique_file_name(Some("cat.jpg"));
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".jpg"));
        assert_ne!(unique_file_name(None), unique_file_name(None));
    }
}
