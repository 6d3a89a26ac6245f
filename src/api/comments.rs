use actix_web::{web, HttpResponse};
use mongodb::bson::{oid::ObjectId, DateTime};

use crate::api::error_response;
use crate::database::MongoDB;
use crate::middleware::Caller;
use crate::models::{Comment, CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::services::comment_service;

fn not_found_or_not_owner(comment_id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "success": false,
        "error": format!("Comment {} not found or not owned by caller", comment_id)
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    params(("id" = String, Path, description = "Comment ObjectId (hex)")),
    responses(
        (status = 200, description = "Comment found", body = CommentResponse),
        (status = 404, description = "No such comment")
    )
)]
pub async fn get_comment(path: web::Path<String>, db: web::Data<MongoDB>) -> HttpResponse {
    let comment_id = path.into_inner();

    match comment_service::get_comment(&db, &comment_id).await {
        Ok(Some(comment)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "comment": CommentResponse::from(comment)
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Comment not found"
        })),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "Comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid movie id"),
        (status = 401, description = "Missing or unknown session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    caller: web::ReqData<Caller>,
    db: web::Data<MongoDB>,
    request: web::Json<CreateCommentRequest>,
) -> HttpResponse {
    let request = request.into_inner();

    let movie_id = match ObjectId::parse_str(&request.movie_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "Invalid movie ID"
            }))
        }
    };

    log::info!("💬 POST /comments - movie: {}, user: {}", movie_id, caller.user_id);

    let comment = Comment {
        id: Some(ObjectId::new()),
        name: request.name,
        email: caller.user_id.clone(),
        movie_id,
        text: request.text,
        date: DateTime::now(),
    };

    match comment_service::add_comment(&db, comment).await {
        Ok(stored) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "comment": CommentResponse::from(stored)
        })),
        Err(e) => {
            log::warn!("❌ Failed to add comment: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    params(("id" = String, Path, description = "Comment ObjectId (hex)")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated"),
        (status = 404, description = "No such comment, or the caller is not its author"),
        (status = 401, description = "Missing or unknown session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_comment(
    caller: web::ReqData<Caller>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    request: web::Json<UpdateCommentRequest>,
) -> HttpResponse {
    let comment_id = path.into_inner();

    match comment_service::update_comment(&db, &comment_id, &request.text, &caller.user_id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => not_found_or_not_owner(&comment_id),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    params(("id" = String, Path, description = "Comment ObjectId (hex)")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 404, description = "No such comment, or the caller is not its author"),
        (status = 401, description = "Missing or unknown session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_comment(
    caller: web::ReqData<Caller>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> HttpResponse {
    let comment_id = path.into_inner();

    match comment_service::delete_comment(&db, &comment_id, &caller.user_id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => not_found_or_not_owner(&comment_id),
        Err(e) => error_response(&e),
    }
}
