use crate::{database::MongoDB, services::session_service};
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Identity of the user behind a request's session token. In mflix the
/// session's `user_id` is the user's email, which is also the comment
/// author key.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub token: String,
}

impl Caller {
    /// Short prefix of the session token, safe to put in logs.
    pub fn token_hint(&self) -> String {
        let prefix: String = self.token.chars().take(8).collect();
        if prefix.len() < self.token.len() {
            format!("{}…", prefix)
        } else {
            prefix
        }
    }
}

/// Resolves `Authorization: Bearer <token>` against the `sessions`
/// collection and stores the [`Caller`] in the request extensions.
pub struct SessionAuth;

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_owned);
        let db = req.app_data::<web::Data<MongoDB>>().cloned();

        Box::pin(async move {
            let token = token
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("Missing authorization token"))?;
            let db = db.ok_or_else(|| actix_web::error::ErrorInternalServerError("Database not configured"))?;

            let session = session_service::get_session_by_token(&db, &token)
                .await
                .map_err(|e| {
                    log::error!("❌ Session lookup failed: {}", e);
                    actix_web::error::ErrorInternalServerError("Session lookup failed")
                })?
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("Invalid or expired session"))?;

            req.extensions_mut().insert(Caller {
                user_id: session.user_id,
                token,
            });

            service.call(req).await
        })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
