use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::images::ImageStore;
use crate::models::{BlogPost, BlogRow, CreateBlogFields, UpdateBlogFields};
use crate::services::{non_empty, require};

/// Image host namespace for blog images
const NAMESPACE: &str = "blogs";

/// Blog post lifecycle service
pub struct BlogService;

impl BlogService {
    /// List all blog posts, newest first
    pub async fn list(db: &Database) -> Result<Vec<BlogPost>> {
        let rows: Vec<BlogRow> = sqlx::query_as("SELECT * FROM blogs ORDER BY created_at DESC")
            .fetch_all(db.pool())
            .await?;

        rows.into_iter().map(BlogRow::into_post).collect()
    }

    /// Get a single blog post
    pub async fn get(db: &Database, id: &str) -> Result<BlogPost> {
        let row: BlogRow = sqlx::query_as("SELECT * FROM blogs WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

        row.into_post()
    }

    /// Create a blog post. Field validation happens before the upload;
    /// the upload happens before the insert. A failed insert after a
    /// successful upload leaves the image orphaned on the host.
    pub async fn create(
        db: &Database,
        images: &dyn ImageStore,
        fields: CreateBlogFields,
    ) -> Result<BlogPost> {
        let title = require("title", fields.title)?;
        let excerpt = require("excerpt", fields.excerpt)?;
        let content = require("content", fields.content)?;
        let author = require("author", fields.author)?;
        let category = require("category", fields.category)?;
        let read_time = require("readTime", fields.read_time)?;
        let file = fields
            .file
            .ok_or_else(|| AppError::BadRequest("Image file is required".to_string()))?;

        let image = images.upload(&file, NAMESPACE).await?;
        let images_json = serde_json::to_string(&[&image])
            .map_err(|e| AppError::Internal(format!("Failed to encode image ref: {}", e)))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO blogs (id, title, excerpt, content, images, author, category, read_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&title)
        .bind(&excerpt)
        .bind(&content)
        .bind(&images_json)
        .bind(&author)
        .bind(&category)
        .bind(&read_time)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Self::get(db, &id).await
    }

    /// Update a blog post. A new file replaces the whole image sequence:
    /// old images are deleted from the host first, then the replacement
    /// is uploaded. Omitted text fields keep their stored values; a
    /// provided field must be non-empty.
    pub async fn update(
        db: &Database,
        images: &dyn ImageStore,
        id: &str,
        fields: UpdateBlogFields,
    ) -> Result<BlogPost> {
        let UpdateBlogFields {
            title,
            excerpt,
            content,
            author,
            category,
            read_time,
            file,
        } = fields;

        // Reject blank overwrites before touching the image host
        let title = non_empty("title", title)?;
        let excerpt = non_empty("excerpt", excerpt)?;
        let content = non_empty("content", content)?;
        let author = non_empty("author", author)?;
        let category = non_empty("category", category)?;
        let read_time = non_empty("readTime", read_time)?;

        let current = Self::get(db, id).await?;

        let mut image_refs = current.images;
        if let Some(file) = &file {
            let old_ids: Vec<String> = image_refs
                .iter()
                .map(|img| img.external_id.clone())
                .collect();
            if !old_ids.is_empty() {
                images.delete_many(&old_ids).await?;
            }

            // The old refs are gone from the host; drop them from the row
            // before the replacement upload. If that upload fails the
            // record stays imageless rather than pointing at dead ids.
            sqlx::query("UPDATE blogs SET images = '[]' WHERE id = ?")
                .bind(id)
                .execute(db.pool())
                .await?;

            let uploaded = images.upload(file, NAMESPACE).await?;
            image_refs = vec![uploaded];
        }

        let title = title.unwrap_or(current.title);
        let excerpt = excerpt.unwrap_or(current.excerpt);
        let content = content.unwrap_or(current.content);
        let author = author.unwrap_or(current.author);
        let category = category.unwrap_or(current.category);
        let read_time = read_time.unwrap_or(current.read_time);

        let images_json = serde_json::to_string(&image_refs)
            .map_err(|e| AppError::Internal(format!("Failed to encode image refs: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE blogs
            SET title = ?, excerpt = ?, content = ?, images = ?, author = ?, category = ?, read_time = ?
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&excerpt)
        .bind(&content)
        .bind(&images_json)
        .bind(&author)
        .bind(&category)
        .bind(&read_time)
        .bind(id)
        .execute(db.pool())
        .await?;

        Self::get(db, id).await
    }

    /// Delete a blog post and every image it owns
    pub async fn delete(db: &Database, images: &dyn ImageStore, id: &str) -> Result<()> {
        let current = Self::get(db, id).await?;

        let ids: Vec<String> = current
            .images
            .iter()
            .map(|img| img.external_id.clone())
            .collect();
        if !ids.is_empty() {
            images.delete_many(&ids).await?;
        }

        sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await?;

        Ok(())
    }
}
