use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use super::errors::ApiError;
use super::AppState;

/// Caller identified by an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Unauthorized("Authentication unavailable".to_string()))?;

    match state.backend.authenticate(&token) {
        Ok(user_id) => Ok(AuthenticatedUser { user_id, token }),
        Err(e) => {
            warn!("Rejected bearer token");
            Err(state.reject(e))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer mock-jwt-abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("mock-jwt-abc"));

        let basic = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcg=="))
            .to_http_request();
        assert!(bearer_token(&basic).is_none());

        let empty = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer  "))
            .to_http_request();
        assert!(bearer_token(&empty).is_none());

        assert!(bearer_token(&TestRequest::default().to_http_request()).is_none());
    }
}
