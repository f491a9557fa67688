use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ImageStoreConfig;
use crate::error::{AppError, Result};
use crate::images::ImageStore;
use crate::models::{ImageRef, UploadFile};

/// Image host client talking to the hosted upload API over HTTPS
pub struct RemoteImageStore {
    config: ImageStoreConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadApiResponse {
    public_id: String,
    secure_url: String,
}

impl RemoteImageStore {
    pub fn new(config: ImageStoreConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageStore for RemoteImageStore {
    async fn upload(&self, file: &UploadFile, namespace: &str) -> Result<ImageRef> {
        let mut part = reqwest::multipart::Part::bytes(file.data.to_vec());
        if let Some(name) = &file.filename {
            part = part.file_name(name.clone());
        }
        if let Some(mime) = &file.content_type {
            part = part
                .mime_str(mime)
                .map_err(|e| AppError::Upload(format!("Invalid content type: {}", e)))?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", namespace.to_string());

        let response = self
            .http
            .post(format!("{}/upload", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!(
                "Image host returned {}",
                response.status()
            )));
        }

        let body: UploadApiResponse = response
            .json()
            .await
            .map_err(|_| AppError::Upload("Image host returned no result".to_string()))?;

        Ok(ImageRef {
            external_id: body.public_id,
            url: body.secure_url,
        })
    }

    async fn delete(&self, external_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/images/{}", self.config.base_url, external_id))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!(
                "Image host delete of {} returned {}",
                external_id,
                response.status()
            )));
        }

        Ok(())
    }
}
