/// Post handlers - HTTP endpoints for post CRUD
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::handlers::AppState;
use crate::models::PostType;
use crate::repository::posts::NewPost;

/// Request body for creating a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub college: String,
    pub caption: Option<String>,
    pub body: Option<String>,
    pub media_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub search: Option<String>,
}

/// Create a post (and its meta row)
pub async fn create_post(
    state: web::Data<AppState>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    if req.college.trim().is_empty() {
        return Err(AppError::Validation("college required".to_string()));
    }

    let tags: Vec<String> = req
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let alias = req
        .alias
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| format!("Anon-{}", &Uuid::new_v4().to_string()[..6]));

    let post = state
        .posts
        .create_post(NewPost {
            post_type: req.post_type.as_str().to_string(),
            college: req.college.trim().to_string(),
            caption: req.caption,
            body: req.body,
            media_url: req.media_url,
            tags,
            alias,
        })
        .await?;

    state.cache.clear_posts().await;

    Ok(HttpResponse::Created().json(post))
}

/// List posts newest-first, optionally filtered by a search term
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let posts = match search {
        Some(term) => {
            if let Some(cached) = state.cache.read_search(term).await {
                return Ok(HttpResponse::Ok().json(cached));
            }
            let posts = state.posts.search_posts(term).await?;
            state.cache.write_search(term, &posts).await;
            posts
        }
        None => {
            if let Some(cached) = state.cache.read_posts_list().await {
                return Ok(HttpResponse::Ok().json(cached));
            }
            let posts = state.posts.list_posts().await?;
            state.cache.write_posts_list(&posts).await;
            posts
        }
    };

    Ok(HttpResponse::Ok().json(posts))
}

/// Get a single post
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Some(cached) = state.cache.read_post(*post_id).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    match state.posts.get_post(*post_id).await? {
        Some(post) => {
            state.cache.write_post(&post).await;
            Ok(HttpResponse::Ok().json(post))
        }
        None => Err(AppError::NotFound(format!("post {}", post_id))),
    }
}

/// Delete a post and everything hanging off it
pub async fn delete_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deleted = state.posts.delete_post_cascade(*post_id).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("post {}", post_id)));
    }

    state.cache.clear_post(*post_id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
