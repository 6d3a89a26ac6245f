pub mod comments;
pub mod health;
pub mod reports;
pub mod swagger;
pub mod users;

use actix_web::{guard, http::StatusCode, web, HttpResponse};

use crate::middleware::SessionAuth;
use crate::utils::AppError;

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::WriteConflict(_) => StatusCode::CONFLICT,
        AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &AppError) -> HttpResponse {
    HttpResponse::build(status_for(err)).json(serde_json::json!({
        "success": false,
        "error": err.to_string()
    }))
}

/// Route table shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1/comments")
                // Reads are public; a failed guard falls through to the
                // session-protected resource below.
                .service(
                    web::resource("/{id}")
                        .guard(guard::Get())
                        .to(comments::get_comment),
                )
                .service(
                    web::resource("/{id}")
                        .wrap(SessionAuth)
                        .route(web::put().to(comments::update_comment))
                        .route(web::delete().to(comments::delete_comment)),
                )
                .service(
                    web::resource("")
                        .wrap(SessionAuth)
                        .route(web::post().to(comments::create_comment)),
                ),
        )
        .service(web::scope("/api/v1/reports").route("/critics", web::get().to(reports::get_critics)))
        .service(
            web::scope("/api/v1/users")
                .wrap(SessionAuth)
                .route("/preferences", web::put().to(users::update_preferences))
                .route("/sessions", web::delete().to(users::logout)),
        );
}
