use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::api::error_response;
use crate::database::MongoDB;
use crate::models::Critic;
use crate::services::report_service;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CriticResponse {
    pub email: String,
    pub count: i64,
}

impl From<Critic> for CriticResponse {
    fn from(critic: Critic) -> Self {
        CriticResponse {
            email: critic.email,
            count: critic.count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/critics",
    tag = "Reports",
    responses(
        (status = 200, description = "Top 20 commenters, most active first", body = [CriticResponse])
    )
)]
pub async fn get_critics(db: web::Data<MongoDB>) -> HttpResponse {
    match report_service::top_commenters(&db).await {
        Ok(critics) => {
            let critics: Vec<CriticResponse> = critics.into_iter().map(CriticResponse::from).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "total": critics.len(),
                "critics": critics
            }))
        }
        Err(e) => {
            log::error!("❌ Commenter report failed: {}", e);
            error_response(&e)
        }
    }
}
