use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use super::{content_type_for, ImageStore, ImageStoreError, ImageUpload, StoredImage};

const DISH_IMAGE_DIR: &str = "dishes";

/// Stores images as files under a root directory
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a reference to a path inside the root, refusing traversal
    fn resolve(&self, reference: &str) -> Result<PathBuf, ImageStoreError> {
        let relative = Path::new(reference);
        let plain = !reference.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(ImageStoreError::InvalidReference(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageStoreError> {
        if upload.bytes.is_empty() {
            return Err(ImageStoreError::Empty);
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(ImageStoreError::TooLarge { limit: self.max_bytes });
        }
        let extension = upload.extension()?;

        let folder = self.root.join(DISH_IMAGE_DIR);
        fs::create_dir_all(&folder).await?;

        let file_name = format!("{}.{}", Uuid::new_v4().simple(), extension);
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(folder.join(&file_name))
            .await?;
        file.write_all(&upload.bytes).await?;
        file.flush().await?;

        let reference = format!("{}/{}", DISH_IMAGE_DIR, file_name);
        debug!("Stored image {} ({} bytes)", reference, upload.bytes.len());
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), ImageStoreError> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed image {}", reference);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, reference: &str) -> Result<Option<StoredImage>, ImageStoreError> {
        let path = self.resolve(reference)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(StoredImage {
                content_type: content_type_for(reference),
                bytes,
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(max_bytes: usize) -> LocalImageStore {
        let root = std::env::temp_dir().join(format!("menu-api-media-{}", Uuid::new_v4().simple()));
        LocalImageStore::new(root, max_bytes)
    }

    fn png(bytes: Vec<u8>) -> ImageUpload {
        ImageUpload {
            file_name: Some("dish.png".into()),
            content_type: Some("image/png".into()),
            bytes,
        }
    }

    #[tokio::test]
    async fn stores_loads_and_removes() {
        let store = temp_store(1024);
        let reference = store.store(png(vec![0x89, b'P', b'N', b'G'])).await.unwrap();
        assert!(reference.starts_with("dishes/") && reference.ends_with(".png"));

        let loaded = store.load(&reference).await.unwrap().unwrap();
        assert_eq!(loaded.content_type, "image/png");
        assert_eq!(loaded.bytes, vec![0x89, b'P', b'N', b'G']);

        store.remove(&reference).await.unwrap();
        assert!(store.load(&reference).await.unwrap().is_none());
        // Second removal is a no-op
        store.remove(&reference).await.unwrap();

        let _ = fs::remove_dir_all(store.root()).await;
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_uploads() {
        let store = temp_store(4);
        assert!(matches!(store.store(png(vec![])).await, Err(ImageStoreError::Empty)));
        assert!(matches!(
            store.store(png(vec![0; 5])).await,
            Err(ImageStoreError::TooLarge { limit: 4 })
        ));
    }

    #[tokio::test]
    async fn refuses_references_outside_root() {
        let store = temp_store(4);
        for bad in ["../etc/passwd", "/etc/passwd", "", "dishes/../../x"] {
            assert!(matches!(
                store.load(bad).await,
                Err(ImageStoreError::InvalidReference(_))
            ));
        }
    }
}
