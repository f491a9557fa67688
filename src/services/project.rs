use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::images::ImageStore;
use crate::models::{CreateProjectFields, Project, ProjectRow, UpdateProjectFields};
use crate::services::{map_unique_violation, non_empty, require};

/// Image host namespace for project covers
const NAMESPACE: &str = "projects";

const SLUG_TAKEN: &str = "Slug already in use";

/// Portfolio project lifecycle service
pub struct ProjectService;

impl ProjectService {
    /// List all projects, newest first
    pub async fn list(db: &Database) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> =
            sqlx::query_as("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(db.pool())
                .await?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    /// Get a single project
    pub async fn get(db: &Database, id: &str) -> Result<Project> {
        let row: ProjectRow = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        row.into_project()
    }

    /// Create a project. Validation runs before the cover upload; the
    /// upload runs before the insert. A duplicate slug surfaces as a
    /// conflict, not a generic server error.
    pub async fn create(
        db: &Database,
        images: &dyn ImageStore,
        fields: CreateProjectFields,
    ) -> Result<Project> {
        let slug = require("slug", fields.slug)?;
        let title = require("title", fields.title)?;
        let summary = require("summary", fields.summary)?;
        let github_link = require("githubLink", fields.github_link)?;
        let live_link = require("liveLink", fields.live_link)?;
        let tags = match fields.tags {
            Some(tags) if !tags.is_empty() => tags,
            _ => return Err(AppError::BadRequest("tags is required".to_string())),
        };
        let file = fields
            .file
            .ok_or_else(|| AppError::BadRequest("Cover image is required".to_string()))?;

        let cover = images.upload(&file, NAMESPACE).await?;
        let cover_json = serde_json::to_string(&[&cover])
            .map_err(|e| AppError::Internal(format!("Failed to encode cover ref: {}", e)))?;
        let tags_json = serde_json::to_string(&tags)
            .map_err(|e| AppError::Internal(format!("Failed to encode tags: {}", e)))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO projects (id, slug, title, summary, cover, tags, github_link, live_link, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&slug)
        .bind(&title)
        .bind(&summary)
        .bind(&cover_json)
        .bind(&tags_json)
        .bind(&github_link)
        .bind(&live_link)
        .bind(&now)
        .execute(db.pool())
        .await
        .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        Self::get(db, &id).await
    }

    /// Update a project. A new cover file replaces the whole cover
    /// sequence: old images are deleted from the host first, then the
    /// replacement is uploaded. Omitted fields keep their stored values;
    /// a provided field must be non-empty, tags included.
    pub async fn update(
        db: &Database,
        images: &dyn ImageStore,
        id: &str,
        fields: UpdateProjectFields,
    ) -> Result<Project> {
        let UpdateProjectFields {
            slug,
            title,
            summary,
            tags,
            github_link,
            live_link,
            file,
        } = fields;

        // Reject blank overwrites before touching the image host
        let slug = non_empty("slug", slug)?;
        let title = non_empty("title", title)?;
        let summary = non_empty("summary", summary)?;
        let github_link = non_empty("githubLink", github_link)?;
        let live_link = non_empty("liveLink", live_link)?;
        if let Some(tags) = &tags {
            if tags.is_empty() {
                return Err(AppError::BadRequest("tags must not be empty".to_string()));
            }
        }

        let current = Self::get(db, id).await?;

        let mut cover_refs = current.cover;
        if let Some(file) = &file {
            let old_ids: Vec<String> = cover_refs
                .iter()
                .map(|img| img.external_id.clone())
                .collect();
            if !old_ids.is_empty() {
                images.delete_many(&old_ids).await?;
            }

            // The old refs are gone from the host; drop them from the row
            // before the replacement upload. If that upload fails the
            // record stays coverless rather than pointing at dead ids.
            sqlx::query("UPDATE projects SET cover = '[]' WHERE id = ?")
                .bind(id)
                .execute(db.pool())
                .await?;

            let uploaded = images.upload(file, NAMESPACE).await?;
            cover_refs = vec![uploaded];
        }

        let slug = slug.unwrap_or(current.slug);
        let title = title.unwrap_or(current.title);
        let summary = summary.unwrap_or(current.summary);
        let tags = tags.unwrap_or(current.tags);
        let github_link = github_link.unwrap_or(current.github_link);
        let live_link = live_link.unwrap_or(current.live_link);

        let cover_json = serde_json::to_string(&cover_refs)
            .map_err(|e| AppError::Internal(format!("Failed to encode cover refs: {}", e)))?;
        let tags_json = serde_json::to_string(&tags)
            .map_err(|e| AppError::Internal(format!("Failed to encode tags: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE projects
            SET slug = ?, title = ?, summary = ?, cover = ?, tags = ?, github_link = ?, live_link = ?
            WHERE id = ?
            "#,
        )
        .bind(&slug)
        .bind(&title)
        .bind(&summary)
        .bind(&cover_json)
        .bind(&tags_json)
        .bind(&github_link)
        .bind(&live_link)
        .bind(id)
        .execute(db.pool())
        .await
        .map_err(|e| map_unique_violation(e, SLUG_TAKEN))?;

        Self::get(db, id).await
    }

    /// Delete a project and every cover image it owns
    pub async fn delete(db: &Database, images: &dyn ImageStore, id: &str) -> Result<()> {
        let current = Self::get(db, id).await?;

        let ids: Vec<String> = current
            .cover
            .iter()
            .map(|img| img.external_id.clone())
            .collect();
        if !ids.is_empty() {
            images.delete_many(&ids).await?;
        }

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::db::test_util::test_database;
    use crate::images::memory::MemoryImageStore;
    use crate::models::UploadFile;

    fn test_file() -> UploadFile {
        UploadFile {
            data: Bytes::from_static(b"fake cover bytes"),
            filename: Some("cover.png".to_string()),
            content_type: Some("image/png".to_string()),
        }
    }

    fn valid_fields(slug: &str) -> CreateProjectFields {
        CreateProjectFields {
            slug: Some(slug.to_string()),
            title: Some("Folio".to_string()),
            summary: Some("A portfolio site".to_string()),
            tags: Some(vec!["rust".to_string(), "axum".to_string()]),
            github_link: Some("https://github.com/example/folio".to_string()),
            live_link: Some("https://folio.example.com".to_string()),
            file: Some(test_file()),
        }
    }

    #[tokio::test]
    async fn create_returns_id_and_cover_url() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        let project = ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap();

        assert!(!project.id.is_empty());
        assert_eq!(project.cover.len(), 1);
        assert!(!project.cover[0].url.is_empty());
        assert_eq!(project.tags, vec!["rust", "axum"]);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap();
        let err = ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(ProjectService::list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_to_taken_slug_is_a_conflict() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        ProjectService::create(&db, &store, valid_fields("first"))
            .await
            .unwrap();
        let second = ProjectService::create(&db, &store, valid_fields("second"))
            .await
            .unwrap();

        let err = ProjectService::update(
            &db,
            &store,
            &second.id,
            UpdateProjectFields {
                slug: Some("first".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_tags_are_rejected_before_upload() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        let fields = CreateProjectFields {
            tags: Some(Vec::new()),
            ..valid_fields("folio")
        };
        let err = ProjectService::create(&db, &store, fields).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn update_with_file_replaces_cover() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        let project = ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap();
        let old_id = project.cover[0].external_id.clone();

        let updated = ProjectService::update(
            &db,
            &store,
            &project.id,
            UpdateProjectFields {
                summary: Some("Rewritten".to_string()),
                file: Some(test_file()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.summary, "Rewritten");
        assert_eq!(updated.slug, "folio");
        assert_eq!(updated.cover.len(), 1);
        assert!(!store.contains(&old_id));
        assert!(store.contains(&updated.cover[0].external_id));
    }

    #[tokio::test]
    async fn update_rejects_empty_tags() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        let project = ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap();

        let err = ProjectService::update(
            &db,
            &store,
            &project.id,
            UpdateProjectFields {
                tags: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("tags")));
        let kept = ProjectService::get(&db, &project.id).await.unwrap();
        assert_eq!(kept.tags, vec!["rust", "axum"]);
    }

    #[tokio::test]
    async fn failed_cover_delete_aborts_replacement() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::failing_deletes();

        let project = ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap();

        let err = ProjectService::update(
            &db,
            &store,
            &project.id,
            UpdateProjectFields {
                file: Some(test_file()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Upload(_)));
        // The batch state is unknown; the row and its refs stay untouched
        let kept = ProjectService::get(&db, &project.id).await.unwrap();
        assert_eq!(kept.cover, project.cover);
        assert!(store.contains(&project.cover[0].external_id));
    }

    #[tokio::test]
    async fn delete_removes_record_and_cover() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        let project = ProjectService::create(&db, &store, valid_fields("folio"))
            .await
            .unwrap();
        let cover_id = project.cover[0].external_id.clone();

        ProjectService::delete(&db, &store, &project.id)
            .await
            .unwrap();

        assert!(!store.contains(&cover_id));
        let err = ProjectService::get(&db, &project.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_record_is_not_found() {
        let (_dir, db) = test_database().await;
        let store = MemoryImageStore::new();

        let err = ProjectService::delete(&db, &store, "no-such-id")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
