use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::images::ImageStore;
use crate::models::{ImageRef, UploadFile};

/// In-memory image store used by service tests
#[derive(Default)]
pub struct MemoryImageStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
    /// When set, every upload fails with an upload error
    pub fail_uploads: bool,
    /// When set, every delete fails, leaving stored objects in place
    pub fail_deletes: bool,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.objects.lock().unwrap().contains_key(external_id)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, file: &UploadFile, namespace: &str) -> Result<ImageRef> {
        if self.fail_uploads {
            return Err(AppError::Upload("simulated upload failure".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let external_id = format!("{}/img-{}", namespace, n);
        let url = format!("https://images.test/{}", external_id);

        self.objects
            .lock()
            .unwrap()
            .insert(external_id.clone(), file.data.to_vec());

        Ok(ImageRef { external_id, url })
    }

    async fn delete(&self, external_id: &str) -> Result<()> {
        if self.fail_deletes {
            return Err(AppError::Upload("simulated delete failure".to_string()));
        }

        let removed = self.objects.lock().unwrap().remove(external_id);
        if removed.is_none() {
            return Err(AppError::Upload(format!("unknown image {}", external_id)));
        }
        Ok(())
    }
}
