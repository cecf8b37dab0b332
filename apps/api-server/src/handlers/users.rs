//! User lookups.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkpost_core::ports::BaseRepository;
use inkpost_shared::UserResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        name: user.name,
        posts: user.posts,
        created_at: user.created_at.to_rfc3339(),
    }))
}
