//! Filesystem image store scoped to the media root with `cap_std`.
//!
//! Files live at `{media_root}/{recipes|avatars}/{uuid}.{ext}`. The store
//! holds a directory capability, so references can never escape the root.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageKind, ImagePayload, ImageRef};

const KINDS: [ImageKind; 2] = [ImageKind::Recipe, ImageKind::Avatar];

/// [`ImageStore`] writing into a capability-scoped media directory.
#[derive(Clone)]
pub struct CapStdImageStore {
    root: Arc<Dir>,
}

impl CapStdImageStore {
    /// Open (creating when absent) the media root and its subdirectories.
    pub fn open(media_root: impl AsRef<Path>) -> io::Result<Self> {
        let media_root = media_root.as_ref();
        Dir::create_ambient_dir_all(media_root, ambient_authority())?;
        let root = Dir::open_ambient_dir(media_root, ambient_authority())?;
        for kind in KINDS {
            root.create_dir_all(kind.directory())?;
        }
        Ok(Self {
            root: Arc::new(root),
        })
    }

    fn io_error(err: impl std::fmt::Display) -> ImageStoreError {
        ImageStoreError::io(err.to_string())
    }
}

/// Accept only `{kind}/{file}` references with a plain file name.
fn validate_reference(image: &ImageRef) -> Result<(), ImageStoreError> {
    let valid = image
        .as_str()
        .split_once('/')
        .is_some_and(|(dir, file)| {
            KINDS.iter().any(|kind| kind.directory() == dir)
                && !file.is_empty()
                && !file.starts_with('.')
                && !file.contains(['/', '\\'])
        });
    if valid {
        Ok(())
    } else {
        Err(ImageStoreError::invalid_reference(image.as_str()))
    }
}

#[async_trait]
impl ImageStore for CapStdImageStore {
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
        let root = Arc::clone(&self.root);
        let path = reference.clone();
        let bytes = payload.bytes().to_vec();
        tokio::task::spawn_blocking(move || root.write(path, bytes))
            .await
            .map_err(Self::io_error)?
            .map_err(Self::io_error)?;
        debug!(image = %reference, "image stored");
        Ok(ImageRef::new(reference))
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStoreError> {
        validate_reference(image)?;
        let root = Arc::clone(&self.root);
        let path = image.as_str().to_owned();
        let outcome = tokio::task::spawn_blocking(move || root.remove_file(path))
            .await
            .map_err(Self::io_error)?;
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ImageFormat;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store() -> (TempDir, CapStdImageStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = CapStdImageStore::open(dir.path().join("media")).expect("open store");
        (dir, store)
    }

    #[rstest]
    #[tokio::test]
    async fn stores_and_removes_files() {
        let (dir, store) = store();
        let payload = ImagePayload::new(ImageFormat::Jpeg, vec![0xff, 0xd8]).expect("payload");

        let image = store
            .store(ImageKind::Recipe, &payload)
            .await
            .expect("stored");
        assert!(image.as_str().starts_with("recipes/"));
        assert!(image.as_str().ends_with(".jpg"));
        let on_disk = dir.path().join("media").join(image.as_str());
        assert_eq!(std::fs::read(&on_disk).expect("read back"), vec![0xff, 0xd8]);

        store.remove(&image).await.expect("removed");
        assert!(!on_disk.exists());
        store.remove(&image).await.expect("second removal is a no-op");
    }

    #[rstest]
    #[case("../secret.png")]
    #[case("recipes/../../etc/passwd")]
    #[case("other/file.png")]
    #[case("recipes/")]
    #[tokio::test]
    async fn rejects_references_outside_the_store(#[case] reference: &str) {
        let (_dir, store) = store();
        let err = store
            .remove(&ImageRef::new(reference))
            .await
            .expect_err("invalid reference");
        assert!(matches!(err, ImageStoreError::InvalidReference { .. }));
    }
}
