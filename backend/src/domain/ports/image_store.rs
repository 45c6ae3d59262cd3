//! Port for persisting uploaded image bytes.

use async_trait::async_trait;

use crate::domain::{ImageKind, ImagePayload, ImageRef};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Writing or deleting the file failed.
        Io { message: String } => "image store I/O failed: {message}",
        /// The reference does not point inside the store.
        InvalidReference { reference: String } => "invalid image reference {reference}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the payload under a fresh name and return its reference.
    async fn store(
        &self,
        kind: ImageKind,
        payload: &ImagePayload,
    ) -> Result<ImageRef, ImageStoreError>;

    /// Delete a stored image. Missing files are not an error.
    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStoreError>;
}
