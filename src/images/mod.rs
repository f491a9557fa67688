pub mod remote;

#[cfg(test)]
pub mod memory;

pub use remote::RemoteImageStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ImageRef, UploadFile};

/// External image host boundary.
///
/// `upload` must complete before any database write that embeds the
/// returned [`ImageRef`]; deletion is issued whenever the owning record
/// drops the reference.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload a binary payload under a logical namespace ("blogs", "projects")
    async fn upload(&self, file: &UploadFile, namespace: &str) -> Result<ImageRef>;

    /// Delete a single stored image by its external id
    async fn delete(&self, external_id: &str) -> Result<()>;

    /// Delete a batch of images, one request per id, all in flight at once.
    /// Any single failure fails the whole call; the caller must treat the
    /// batch state as unknown in that case.
    async fn delete_many(&self, external_ids: &[String]) -> Result<()> {
        futures::future::try_join_all(external_ids.iter().map(|id| self.delete(id))).await?;
        Ok(())
    }
}
