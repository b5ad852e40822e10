//! Request authentication.
//!
//! Tokens are HS256 JWTs issued by the account service with the payload
//! `{ "user": { "id", "role" }, "exp" }`. The stored user row is loaded on
//! every request so the display name and current role are authoritative.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// Header accepted in place of `Authorization: Bearer` by older clients.
const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub exp: usize,
}

/// The authenticated caller, available to any handler as an extractor.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

fn request_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| {
            parts
                .headers
                .get(LEGACY_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
        })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = request_token(parts).ok_or(AppError::Unauthorized)?;

        let claims = decode_token(token, &state.jwt_secret).map_err(|e| {
            warn!("Rejected bearer token: {e}");
            AppError::Unauthorized
        })?;

        let user = state
            .repo
            .find_user(claims.user.id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let role = user.role.parse::<Role>()?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::test_support::bearer_for;
    use crate::test_support::user;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_decode_token_reads_user_claims() {
        let creator = user("Ada Lovelace", Role::BidCreator);
        let token = bearer_for(&creator, SECRET);

        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.user.id, creator.id);
        assert_eq!(claims.user.role, Role::BidCreator);
    }

    #[test]
    fn test_decode_token_rejects_wrong_secret() {
        let creator = user("Ada Lovelace", Role::BidCreator);
        let token = bearer_for(&creator, SECRET);
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_request_token_prefers_bearer_then_legacy_header() {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_token(&parts), Some("abc.def.ghi"));

        let (parts, _) = Request::builder()
            .header(LEGACY_TOKEN_HEADER, "abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_token(&parts), Some("abc.def.ghi"));

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(request_token(&parts), None);
    }

    #[test]
    fn test_request_token_falls_back_when_authorization_is_not_bearer() {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .header(LEGACY_TOKEN_HEADER, "abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_token(&parts), Some("abc.def.ghi"));

        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(request_token(&parts), None);
    }

    #[test]
    fn test_require_role_allows_listed_roles_only() {
        let caller = AuthUser {
            id: Uuid::new_v4(),
            name: "Viewer".to_string(),
            role: Role::BidViewer,
        };
        assert!(matches!(
            caller.require_role(&[Role::Admin, Role::BidCreator]),
            Err(AppError::Forbidden)
        ));
        assert!(caller.require_role(&[Role::BidViewer]).is_ok());
    }
}
