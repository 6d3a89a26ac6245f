use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Comment on a movie (stored in the `comments` collection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Must be assigned before the comment is inserted
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Author display name
    pub name: String,

    /// Author email; only this user may edit or delete the comment
    pub email: String,

    pub movie_id: ObjectId,

    pub text: String,

    /// Creation time, refreshed on every edit
    pub date: DateTime,
}

/// Request to post a new comment
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    pub movie_id: String,
    pub name: String,
    pub text: String,
}

/// Request to edit a comment's text
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub movie_id: String,
    pub text: String,
    /// RFC 3339
    pub date: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: comment.name,
            email: comment.email,
            movie_id: comment.movie_id.to_hex(),
            text: comment.text,
            date: comment.date.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
