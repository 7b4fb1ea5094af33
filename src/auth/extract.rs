//! Request extractors for authenticated routes.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::{AuthService, Claims, Role};
use crate::error::ApiError;
use crate::models::UserInfo;

/// Any signed-in account.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub user: UserInfo,
    pub role: Role,
}

/// A signed-in account with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Token de acceso requerido".to_string()))?;
        let auth = Arc::<AuthService>::from_ref(state);
        let (claims, account) = auth.verify(token)?;
        Ok(Self {
            user: account.info(),
            role: account.role,
            claims,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden(
                "Acceso denegado: se requieren permisos de administrador".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccountStore, JwtKeys};
    use axum::http::Request;

    fn state() -> (Arc<AuthService>, String, String) {
        let mut accounts = AccountStore::new();
        let admin_id = accounts.add("admin", "a@example.com", "pw", Role::Admin).unwrap();
        let user_id = accounts.add("agent", "b@example.com", "pw", Role::User).unwrap();
        let service = AuthService::new(JwtKeys::new("secret", 60), accounts);
        let admin = service.issue_token(service.accounts().find(&admin_id).unwrap());
        let user = service.issue_token(service.accounts().find(&user_id).unwrap());
        (Arc::new(service), admin, user)
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/properties");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let (state, _, _) = state();
        let err = AuthUser::from_request_parts(&mut parts(None), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "Token de acceso requerido"));
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let (state, admin, _) = state();
        let header = format!("Basic {admin}");
        let err = AuthUser::from_request_parts(&mut parts(Some(&header)), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (state, _, _) = state();
        let err = AuthUser::from_request_parts(&mut parts(Some("Bearer abc.def.ghi")), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "Token inválido"));
    }

    #[tokio::test]
    async fn test_admin_extractor_checks_role() {
        let (state, admin, user) = state();

        let header = format!("Bearer {admin}");
        let AdminUser(extracted) = AdminUser::from_request_parts(&mut parts(Some(&header)), &state)
            .await
            .unwrap();
        assert_eq!(extracted.user.username, "admin");

        let header = format!("Bearer {user}");
        let err = AdminUser::from_request_parts(&mut parts(Some(&header)), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
