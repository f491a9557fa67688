use serde::Serialize;
use sqlx::FromRow;

use crate::error::{AppError, Result};
use crate::models::{ImageRef, UploadFile};

/// Raw `projects` row; `cover` and `tags` hold JSON-encoded arrays
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub cover: String,
    pub tags: String,
    pub github_link: String,
    pub live_link: String,
    pub created_at: String,
}

/// Project as served over the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub cover: Vec<ImageRef>,
    pub tags: Vec<String>,
    pub github_link: String,
    pub live_link: String,
    pub created_at: String,
}

impl ProjectRow {
    pub fn into_project(self) -> Result<Project> {
        let cover: Vec<ImageRef> = serde_json::from_str(&self.cover).map_err(|e| {
            AppError::Internal(format!("Corrupt cover data for project {}: {}", self.id, e))
        })?;
        let tags: Vec<String> = serde_json::from_str(&self.tags).map_err(|e| {
            AppError::Internal(format!("Corrupt tag data for project {}: {}", self.id, e))
        })?;

        Ok(Project {
            id: self.id,
            slug: self.slug,
            title: self.title,
            summary: self.summary,
            cover,
            tags,
            github_link: self.github_link,
            live_link: self.live_link,
            created_at: self.created_at,
        })
    }
}

/// Fields submitted with a project create; every field and the
/// cover file are required, validated at the service boundary
#[derive(Debug, Default)]
pub struct CreateProjectFields {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub github_link: Option<String>,
    pub live_link: Option<String>,
    pub file: Option<UploadFile>,
}

/// Partial project update; `None` means keep the stored value
#[derive(Debug, Default)]
pub struct UpdateProjectFields {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub github_link: Option<String>,
    pub live_link: Option<String>,
    pub file: Option<UploadFile>,
}
