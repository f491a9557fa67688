use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::{ApiResponse, AppError, Result};
use crate::handlers::blog::{read_file, read_text};
use crate::models::{CreateProjectFields, Project, UpdateProjectFields};
use crate::services::ProjectService;
use crate::AppState;

/// List all projects
/// GET /api/project
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Project>>>> {
    let projects = ProjectService::list(&state.db).await?;
    Ok(Json(ApiResponse::success(projects)))
}

/// Get a single project
/// GET /api/project/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Project>>> {
    let project = ProjectService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(project)))
}

/// Create a project
/// POST /api/project (multipart, file field `cover`)
pub async fn create_project(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Project>>> {
    let parsed = parse_project_fields(multipart).await?;
    let fields = CreateProjectFields {
        slug: parsed.slug,
        title: parsed.title,
        summary: parsed.summary,
        tags: parsed.tags,
        github_link: parsed.github_link,
        live_link: parsed.live_link,
        file: parsed.file,
    };

    let project = ProjectService::create(&state.db, state.images.as_ref(), fields).await?;
    Ok(Json(ApiResponse::success(project)))
}

/// Update a project
/// PUT /api/project/:id (multipart; omitted fields keep stored values)
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Project>>> {
    let fields = parse_project_fields(multipart).await?;
    let project = ProjectService::update(&state.db, state.images.as_ref(), &id, fields).await?;
    Ok(Json(ApiResponse::success(project)))
}

/// Delete a project
/// DELETE /api/project/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    ProjectService::delete(&state.db, state.images.as_ref(), &id).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Project deleted successfully",
    )))
}

/// Collect the multipart form into project fields. Tags arrive either
/// as a JSON array string, a comma-separated list, or one repeated
/// `tags` field per value.
async fn parse_project_fields(mut multipart: Multipart) -> Result<UpdateProjectFields> {
    let mut fields = UpdateProjectFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "cover" => fields.file = Some(read_file(field).await?),
            "slug" => fields.slug = Some(read_text(field).await?),
            "title" => fields.title = Some(read_text(field).await?),
            "summary" => fields.summary = Some(read_text(field).await?),
            "githubLink" | "github_link" => fields.github_link = Some(read_text(field).await?),
            "liveLink" | "live_link" => fields.live_link = Some(read_text(field).await?),
            "tags" => {
                let text = read_text(field).await?;
                let parsed = parse_tags(&text)?;
                fields.tags.get_or_insert_with(Vec::new).extend(parsed);
            }
            _ => {}
        }
    }

    Ok(fields)
}

fn parse_tags(text: &str) -> Result<Vec<String>> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| AppError::BadRequest(format!("Invalid tags: {}", e)));
    }

    Ok(trimmed
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::parse_tags;

    #[test]
    fn tags_accept_json_array() {
        assert_eq!(
            parse_tags(r#"["rust", "axum"]"#).unwrap(),
            vec!["rust", "axum"]
        );
    }

    #[test]
    fn tags_accept_comma_list() {
        assert_eq!(parse_tags("rust, axum, sqlx").unwrap(), vec!["rust", "axum", "sqlx"]);
        assert_eq!(parse_tags("solo").unwrap(), vec!["solo"]);
    }

    #[test]
    fn malformed_json_tags_are_rejected() {
        assert!(parse_tags(r#"["unterminated"#).is_err());
    }
}
