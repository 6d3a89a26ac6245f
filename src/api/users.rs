use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::collections::HashMap;

use crate::api::error_response;
use crate::database::MongoDB;
use crate::middleware::Caller;
use crate::models::UserInfo;
use crate::services::{session_service, user_service};

/// `preferences` may be omitted or null, which is rejected with 400.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PreferencesRequest {
    #[serde(default)]
    pub preferences: Option<HashMap<String, String>>,
}

#[utoipa::path(
    put,
    path = "/api/v1/users/preferences",
    tag = "Users",
    request_body = PreferencesRequest,
    responses(
        (status = 200, description = "Preferences merged", body = UserInfo),
        (status = 400, description = "Preferences missing"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Missing or unknown session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_preferences(
    caller: web::ReqData<Caller>,
    db: web::Data<MongoDB>,
    request: web::Json<PreferencesRequest>,
) -> HttpResponse {
    log::info!("⚙️ PUT /users/preferences - user: {}", caller.user_id);

    if let Err(e) = user_service::update_preferences(&db, &caller.user_id, request.preferences.as_ref()).await {
        log::warn!("❌ Preference update failed for {}: {}", caller.user_id, e);
        return error_response(&e);
    }

    match user_service::get_user(&db, &caller.user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserInfo::from(user)
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "User not found"
        })),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/sessions",
    tag = "Users",
    responses(
        (status = 200, description = "All sessions of the caller removed"),
        (status = 401, description = "Missing or unknown session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(caller: web::ReqData<Caller>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!(
        "👋 DELETE /users/sessions - user: {}, session: {}",
        caller.user_id,
        caller.token_hint()
    );

    match session_service::delete_sessions(&db, &caller.user_id).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => error_response(&e),
    }
}
