use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, Error, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use inkpost_core::domain::User;
use inkpost_core::ports::{BaseRepository, ThumbnailStore, TokenService};
use inkpost_infra::{InMemoryThumbnailStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::config::AppConfig;
use crate::state::{AppState, Repositories};

const BOUNDARY: &str = "inkpost-test-boundary";

/// Hand-built `multipart/form-data` body.
struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

struct TestContext {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    thumbnails: Arc<InMemoryThumbnailStore>,
}

impl TestContext {
    fn new() -> Self {
        let thumbnails = Arc::new(InMemoryThumbnailStore::new());
        let state = AppState::from_parts(
            Repositories::in_memory(),
            thumbnails.clone() as Arc<dyn ThumbnailStore>,
            &AppConfig::default(),
        );
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "inkpost-test".to_string(),
        }));

        Self {
            state,
            tokens,
            thumbnails,
        }
    }

    async fn app(&self) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
        test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .app_data(web::Data::new(self.tokens.clone()))
                .configure(configure_routes),
        )
        .await
    }

    async fn add_user(&self, name: &str) -> (User, String) {
        let user = self
            .state
            .users
            .insert(User::new(name.to_string(), format!("{name}@example.com")))
            .await
            .unwrap();
        let token = self.tokens.generate_token(user.id, name).unwrap();
        (user, token)
    }
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn multipart(req: test::TestRequest, body: Vec<u8>) -> test::TestRequest {
    req.insert_header((
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    ))
    .set_payload(body)
}

fn post_body(title: &str, category_id: &str, description: &str, file_name: &str) -> Vec<u8> {
    MultipartBody::new()
        .text("title", title)
        .text("categoryId", category_id)
        .text("description", description)
        .file("thumbnail", file_name, b"\x89PNG fake image bytes")
        .finish()
}

async fn create_category<S>(app: &S, name: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/categories")
        .set_json(json!({ "name": name }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    test::read_body_json(res).await
}

async fn create_post<S>(app: &S, token: &str, category_id: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = multipart(
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(token)),
        post_body("Hello", category_id, "A first post body", "cover.png"),
    )
    .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    test::read_body_json(res).await
}

async fn user_post_count<S>(app: &S, user_id: Uuid) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{user_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    body["posts"].as_i64().unwrap()
}

#[actix_web::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_category_lifecycle() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let created = create_category(&app, "Travel").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created.get("description").is_none());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/categories/{id}"))
        .set_json(json!({ "description": "Trips and places" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["name"], "Travel");
    assert_eq!(updated["description"], "Trips and places");

    let req = test::TestRequest::get().uri("/api/categories").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{id}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Category deleted");

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri(&format!("/api/categories/{id}"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn test_create_category_without_name_is_unprocessable() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .set_json(json!({}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 422);
}

#[actix_web::test]
async fn test_malformed_id_is_not_found() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri("/api/posts/not-a-uuid")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["title"], "Not Found");
}

#[actix_web::test]
async fn test_create_post_requires_token() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let category = create_category(&app, "Tech").await;

    let req = multipart(
        test::TestRequest::post().uri("/api/posts"),
        post_body("Hi", category["id"].as_str().unwrap(), "Some description", "a.png"),
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(ctx.thumbnails.names().await.is_empty());
}

#[actix_web::test]
async fn test_create_post_stores_thumbnail_and_counts() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (user, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;

    let post = create_post(&app, &token, category["id"].as_str().unwrap()).await;

    let thumbnail = post["thumbnail"].as_str().unwrap();
    assert!(thumbnail.starts_with("cover_"));
    assert!(thumbnail.ends_with(".png"));
    assert_eq!(post["creator"], user.id.to_string());
    assert_eq!(ctx.thumbnails.names().await, vec![thumbnail.to_string()]);
    assert_eq!(user_post_count(&app, user.id).await, 1);
}

#[actix_web::test]
async fn test_create_post_missing_fields() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, token) = ctx.add_user("ada").await;

    let body = MultipartBody::new().text("title", "Only a title").finish();
    let req = multipart(
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&token)),
        body,
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_oversized_thumbnail_is_rejected() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (user, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;

    let body = MultipartBody::new()
        .text("title", "Big")
        .text("categoryId", category["id"].as_str().unwrap())
        .text("description", "A very large picture")
        .file("thumbnail", "huge.png", &vec![0u8; 3_000_000])
        .finish();
    let req = multipart(
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&token)),
        body,
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(ctx.thumbnails.names().await.is_empty());
    assert_eq!(user_post_count(&app, user.id).await, 0);
}

#[actix_web::test]
async fn test_create_post_unknown_category() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, token) = ctx.add_user("ada").await;

    let req = multipart(
        test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&token)),
        post_body("Hi", &Uuid::new_v4().to_string(), "Some description", "a.png"),
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(ctx.thumbnails.names().await.is_empty());
}

#[actix_web::test]
async fn test_edit_by_other_user_is_forbidden() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, owner_token) = ctx.add_user("ada").await;
    let (_, other_token) = ctx.add_user("bob").await;
    let category = create_category(&app, "Tech").await;
    let category_id = category["id"].as_str().unwrap();
    let post = create_post(&app, &owner_token, category_id).await;

    let body = MultipartBody::new()
        .text("title", "Hijacked")
        .text("category", category_id)
        .text("description", "Not my post at all")
        .finish();
    let req = multipart(
        test::TestRequest::patch()
            .uri(&format!("/api/posts/{}", post["id"].as_str().unwrap()))
            .insert_header(bearer(&other_token)),
        body,
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post["id"].as_str().unwrap()))
        .to_request();
    let unchanged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged["title"], "Hello");
}

#[actix_web::test]
async fn test_edit_replaces_thumbnail() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;
    let category_id = category["id"].as_str().unwrap();
    let post = create_post(&app, &token, category_id).await;
    let old_thumbnail = post["thumbnail"].as_str().unwrap().to_string();

    let body = MultipartBody::new()
        .text("title", "Hello again")
        .text("category", category_id)
        .text("description", "An edited description")
        .file("thumbnail", "fresh.jpg", b"jpeg bytes")
        .finish();
    let req = multipart(
        test::TestRequest::patch()
            .uri(&format!("/api/posts/{}", post["id"].as_str().unwrap()))
            .insert_header(bearer(&token)),
        body,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let edited: Value = test::read_body_json(res).await;
    let new_thumbnail = edited["thumbnail"].as_str().unwrap().to_string();
    assert_eq!(edited["title"], "Hello again");
    assert!(new_thumbnail.starts_with("fresh_"));
    assert_eq!(ctx.thumbnails.names().await, vec![new_thumbnail]);
    assert!(ctx.thumbnails.read(&old_thumbnail).await.is_none());
}

#[actix_web::test]
async fn test_edit_with_short_description_is_unprocessable() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;
    let category_id = category["id"].as_str().unwrap();
    let post = create_post(&app, &token, category_id).await;

    let body = MultipartBody::new()
        .text("title", "Hello")
        .text("category", category_id)
        .text("description", "too short")
        .finish();
    let req = multipart(
        test::TestRequest::patch()
            .uri(&format!("/api/posts/{}", post["id"].as_str().unwrap()))
            .insert_header(bearer(&token)),
        body,
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_delete_post_by_creator() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (user, token) = ctx.add_user("ada").await;
    let (_, other_token) = ctx.add_user("bob").await;
    let category = create_category(&app, "Tech").await;
    let post = create_post(&app, &token, category["id"].as_str().unwrap()).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&other_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(ctx.thumbnails.names().await.len(), 1);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Post deleted");

    assert!(ctx.thumbnails.names().await.is_empty());
    assert_eq!(user_post_count(&app, user.id).await, 0);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_referenced_category_conflicts() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;
    let category_id = category["id"].as_str().unwrap();
    create_post(&app, &token, category_id).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{category_id}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/categories/{category_id}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_posts_by_category_listings() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (user, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;
    let category_id = category["id"].as_str().unwrap();

    // Empty category: not found by name, empty list by id
    let req = test::TestRequest::get()
        .uri("/api/posts/categories/Tech")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/categories/{category_id}/posts"))
        .to_request();
    let empty: Value = test::call_and_read_body_json(&app, req).await;
    assert!(empty.as_array().unwrap().is_empty());

    create_post(&app, &token, category_id).await;

    let req = test::TestRequest::get()
        .uri("/api/posts/categories/Tech")
        .to_request();
    let by_name: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/users/{}", user.id))
        .to_request();
    let by_user: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(by_user.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/posts/categories/Missing")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", Uuid::new_v4()))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_listings_embed_category_name() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (_, token) = ctx.add_user("ada").await;
    let category = create_category(&app, "Tech").await;
    let category_id = category["id"].as_str().unwrap();
    let post = create_post(&app, &token, category_id).await;

    // Single-post responses keep the bare category id
    assert_eq!(post["category"], category_id);

    for uri in ["/api/posts", "/api/posts/categories/Tech"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body[0]["category"]["name"], "Tech");
        assert_eq!(body[0]["category"]["id"], category_id);
        assert_eq!(body[0]["id"], post["id"]);
    }
}
