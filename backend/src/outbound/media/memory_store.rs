//! Image store keeping uploads in process memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageKind, ImagePayload, ImageRef};

/// [`ImageStore`] for tests and throwaway servers. Clones share contents.
#[derive(Clone, Default)]
pub struct InMemoryImageStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `image` is currently stored.
    pub fn contains(&self, image: &ImageRef) -> bool {
        self.lock().contains_key(image.as_str())
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store(
        &self,
        kind: ImageKind,
        payload: &ImagePayload,
    ) -> Result<ImageRef, ImageStoreError> {
        let reference = format!(
            "{}/{}.{}",
            kind.directory(),
            Uuid::new_v4(),
            payload.format().extension()
        );
        self.lock()
            .insert(reference.clone(), payload.bytes().to_vec());
        Ok(ImageRef::new(reference))
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStoreError> {
        self.lock().remove(image.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageFormat;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn stores_and_removes_images() {
        let store = InMemoryImageStore::new();
        let payload = ImagePayload::new(ImageFormat::Png, b"png".to_vec()).expect("payload");
        let image = store
            .store(ImageKind::Avatar, &payload)
            .await
            .expect("stored");
        assert!(image.as_str().starts_with("avatars/"));
        assert!(image.as_str().ends_with(".png"));
        assert!(store.contains(&image));

        store.remove(&image).await.expect("removed");
        assert!(store.is_empty());
        store.remove(&image).await.expect("missing files are ignored");
    }
}
