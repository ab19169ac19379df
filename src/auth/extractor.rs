//! Actix-web extractor for bearer access tokens.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use super::TokenSigner;
use crate::error::AppError;

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor that requires a valid access token.
///
/// ```ignore
/// async fn protected_handler(auth: BearerAuth) -> impl Responder {
///     // auth.user_id is the authenticated user
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerAuth {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequest for BearerAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(signer) = req.app_data::<web::Data<TokenSigner>>() else {
            return ready(Err(AppError::Internal(
                "TokenSigner not registered as app data".to_string(),
            )));
        };

        let Some(token) = extract_bearer_token(req) else {
            return ready(Err(AppError::Unauthorized(
                "Missing bearer token. Provide an Authorization header.".to_string(),
            )));
        };

        let result = signer.verify(token).and_then(|claims| {
            let user_id = Uuid::parse_str(&claims.user_id)
                .map_err(|_| AppError::Unauthorized("Invalid access token".to_string()))?;
            Ok(BearerAuth {
                user_id,
                email: claims.email,
            })
        });

        ready(result)
    }
}
