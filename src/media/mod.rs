//! Blob storage for dish images.

pub mod local;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalImageStore;

/// Route prefix under which stored images are served
pub const MEDIA_ROUTE: &str = "/media";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("The submitted file is empty.")]
    Empty,

    #[error("Ensure this file is no larger than {limit} bytes.")]
    TooLarge { limit: usize },

    #[error("Upload a valid image. Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File extension taken from the file name, falling back to the MIME type
    pub fn extension(&self) -> Result<&'static str, ImageStoreError> {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let from_mime = self
            .content_type
            .as_deref()
            .and_then(|mime| mime.strip_prefix("image/"))
            .map(str::to_ascii_lowercase);

        let candidate = from_name.or(from_mime).unwrap_or_default();
        ALLOWED_EXTENSIONS
            .iter()
            .find(|ext| **ext == candidate)
            .copied()
            .ok_or(ImageStoreError::UnsupportedType(candidate))
    }
}

/// A stored image read back for serving
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the blob and return an opaque reference to it
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageStoreError>;

    /// Release a blob; removing a missing blob is not an error
    async fn remove(&self, reference: &str) -> Result<(), ImageStoreError>;

    async fn load(&self, reference: &str) -> Result<Option<StoredImage>, ImageStoreError>;

    /// Public URL path for a reference
    fn url(&self, reference: &str) -> String {
        format!("{}/{}", MEDIA_ROUTE, reference)
    }
}

pub fn content_type_for(reference: &str) -> &'static str {
    match reference.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
