use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::limit::RequestBodyLimitLayer;

use super::documents::StatusFilter;
use super::extract::{CurrentUser, Payload};
use crate::actions::blogs;
use crate::error::{Error, Result};
use crate::models::{Blog, BlogInput, BlogStatus};
use crate::services::ImageUpload;
use crate::state::AppState;

/// Room for multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list).post(create))
        .route("/blogs/by-slug/:slug", get(show_by_slug))
        .route("/blogs/:id", get(show).put(update).delete(remove))
        .route("/blogs/:id/publish", post(publish))
        .route("/blogs/:id/unpublish", post(unpublish))
        .route(
            "/blogs/:id/cover",
            post(upload_cover)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(filter): Query<StatusFilter<BlogStatus>>,
) -> Result<Json<Vec<Blog>>> {
    Ok(Json(blogs::list(&state.db, user_id, filter.status).await?))
}

async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Blog>> {
    Ok(Json(blogs::get(&state.db, user_id, id).await?))
}

async fn show_by_slug(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<Blog>> {
    Ok(Json(blogs::get_by_slug(&state.db, user_id, &slug).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<BlogInput>,
) -> Result<(StatusCode, Json<Blog>)> {
    let blog = blogs::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<BlogInput>,
) -> Result<Json<Blog>> {
    Ok(Json(blogs::update(&state.db, user_id, id, input).await?))
}

async fn publish(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Blog>> {
    Ok(Json(blogs::publish(&state.db, user_id, id).await?))
}

async fn unpublish(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Blog>> {
    Ok(Json(blogs::unpublish(&state.db, user_id, id).await?))
}

/// Accepts multipart/form-data with a single image field named "image".
async fn upload_cover(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<Blog>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("cover").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("Failed to read file: {}", e)))?;

        let upload = ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        };
        return Ok(Json(blogs::attach_cover(&state, user_id, id, upload).await?));
    }

    Err(Error::Validation("image: a file is required".to_string()))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    blogs::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
