//! Category endpoints.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkpost_core::domain::{CategoryChanges, CategoryRef};
use inkpost_core::services::EmptyListing;
use inkpost_shared::{CreateCategoryRequest, MessageResponse, UpdateCategoryRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/categories
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let name = body.into_inner().name.unwrap_or_default();
    let category = state.categories.create_category(&name).await?;

    Ok(HttpResponse::Created().json(category))
}

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/categories/{id}
pub async fn get_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = state.categories.get_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

/// PATCH /api/categories/{id}
pub async fn update_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let UpdateCategoryRequest { name, description } = body.into_inner();
    let category = state
        .categories
        .update_category(path.into_inner(), CategoryChanges { name, description })
        .await?;

    Ok(HttpResponse::Ok().json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.categories.delete_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Category deleted")))
}

/// GET /api/categories/{id}/posts
pub async fn list_category_posts(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .list_posts_by_category(CategoryRef::Id(path.into_inner()), EmptyListing::Allow)
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}
