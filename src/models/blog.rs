use serde::Serialize;
use sqlx::FromRow;

use crate::error::{AppError, Result};
use crate::models::{ImageRef, UploadFile};

/// Raw `blogs` row; `images` holds a JSON-encoded ImageRef array
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub images: String,
    pub author: String,
    pub category: String,
    pub read_time: String,
    pub created_at: String,
}

/// Blog post as served over the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub images: Vec<ImageRef>,
    pub author: String,
    pub category: String,
    pub read_time: String,
    pub created_at: String,
}

impl BlogRow {
    pub fn into_post(self) -> Result<BlogPost> {
        let images: Vec<ImageRef> = serde_json::from_str(&self.images).map_err(|e| {
            AppError::Internal(format!("Corrupt image data for blog {}: {}", self.id, e))
        })?;

        Ok(BlogPost {
            id: self.id,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            images,
            author: self.author,
            category: self.category,
            read_time: self.read_time,
            created_at: self.created_at,
        })
    }
}

/// Fields submitted with a blog create; every text field and the
/// file are required, validated at the service boundary
#[derive(Debug, Default)]
pub struct CreateBlogFields {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub file: Option<UploadFile>,
}

/// Partial blog update; `None` means keep the stored value
#[derive(Debug, Default)]
pub struct UpdateBlogFields {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub file: Option<UploadFile>,
}
