use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::{ApiResponse, AppError, Result};
use crate::models::{BlogPost, CreateBlogFields, UpdateBlogFields, UploadFile};
use crate::services::BlogService;
use crate::AppState;

/// List all blog posts
/// GET /api/blog
pub async fn list_blogs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BlogPost>>>> {
    let posts = BlogService::list(&state.db).await?;
    Ok(Json(ApiResponse::success(posts)))
}

/// Get a single blog post
/// GET /api/blog/:id
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BlogPost>>> {
    let post = BlogService::get(&state.db, &id).await?;
    Ok(Json(ApiResponse::success(post)))
}

/// Create a blog post
/// POST /api/blog (multipart, file field `image`)
pub async fn create_blog(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BlogPost>>> {
    let parsed = parse_blog_fields(multipart).await?;
    let fields = CreateBlogFields {
        title: parsed.title,
        excerpt: parsed.excerpt,
        content: parsed.content,
        author: parsed.author,
        category: parsed.category,
        read_time: parsed.read_time,
        file: parsed.file,
    };

    let post = BlogService::create(&state.db, state.images.as_ref(), fields).await?;
    Ok(Json(ApiResponse::success(post)))
}

/// Update a blog post
/// PUT /api/blog/:id (multipart; omitted fields keep stored values)
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BlogPost>>> {
    let fields = parse_blog_fields(multipart).await?;
    let post = BlogService::update(&state.db, state.images.as_ref(), &id, fields).await?;
    Ok(Json(ApiResponse::success(post)))
}

/// Delete a blog post
/// DELETE /api/blog/:id
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    BlogService::delete(&state.db, state.images.as_ref(), &id).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Blog deleted successfully",
    )))
}

/// Collect the multipart form into blog fields. A field that is absent
/// stays `None`; that absence is the keep signal on update.
async fn parse_blog_fields(mut multipart: Multipart) -> Result<UpdateBlogFields> {
    let mut fields = UpdateBlogFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => fields.file = Some(read_file(field).await?),
            "title" => fields.title = Some(read_text(field).await?),
            "excerpt" => fields.excerpt = Some(read_text(field).await?),
            "content" => fields.content = Some(read_text(field).await?),
            "author" => fields.author = Some(read_text(field).await?),
            "category" => fields.category = Some(read_text(field).await?),
            "readTime" | "read_time" => fields.read_time = Some(read_text(field).await?),
            _ => {}
        }
    }

    Ok(fields)
}

pub(crate) async fn read_file(field: Field<'_>) -> Result<UploadFile> {
    let filename = field.file_name().map(|s| s.to_string());
    let content_type = field.content_type().map(|s| s.to_string());
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

    Ok(UploadFile {
        data,
        filename,
        content_type,
    })
}

pub(crate) async fn read_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))
}
