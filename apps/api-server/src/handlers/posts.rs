//! Post endpoints. Writes require a bearer token; reads are public.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkpost_core::domain::CategoryRef;
use inkpost_core::services::EmptyListing;
use inkpost_shared::MessageResponse;

use super::form::read_post_form;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_post_form(payload, state.posts.max_thumbnail_bytes()).await?;
    let post = state.posts.create_post(form, identity.user_id).await?;

    tracing::debug!(post_id = %post.id, author = %identity.name, "Post published");
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/categories/{category}
///
/// The segment is a category name; a UUID that names no category is looked up by id.
/// A category without posts is reported as not found.
pub async fn list_posts_by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .list_posts_by_category(CategoryRef::Name(path.into_inner()), EmptyListing::NotFound)
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/users/{id}
pub async fn list_posts_by_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_posts_by_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PATCH /api/posts/{id}
pub async fn edit_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_post_form(payload, state.posts.max_thumbnail_bytes()).await?;
    let post = state
        .posts
        .edit_post(path.into_inner(), form, identity.user_id)
        .await?;

    tracing::debug!(post_id = %post.id, author = %identity.name, "Post edited");
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .delete_post(path.into_inner(), identity.user_id)
        .await?;

    tracing::debug!(post_id = %post.id, author = %identity.name, "Post removed by creator");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}
