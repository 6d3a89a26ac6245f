use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mflix Data Service",
        version = "1.0.0",
        description = "Comments, user preferences, sessions and the most-active-commenters report.\n\n**Authentication:** mutating endpoints require a Bearer token bound to a session."
    ),
    paths(
        crate::api::health::health_check,

        crate::api::comments::get_comment,
        crate::api::comments::create_comment,
        crate::api::comments::update_comment,
        crate::api::comments::delete_comment,

        crate::api::reports::get_critics,

        crate::api::users::update_preferences,
        crate::api::users::logout,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::reports::CriticResponse,
            crate::api::users::PreferencesRequest,
            crate::models::CommentResponse,
            crate::models::CreateCommentRequest,
            crate::models::UpdateCommentRequest,
            crate::models::UserInfo,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and store readiness."),
        (name = "Comments", description = "Movie comments. Only the author may edit or delete a comment."),
        (name = "Reports", description = "Server-side aggregations over comments."),
        (name = "Users", description = "Preferences and sessions of the calling user."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Session token"))
                        .build()
                ),
            );
        }
    }
}
