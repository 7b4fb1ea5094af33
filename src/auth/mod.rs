//! Auth Module
//!
//! JWT sign-in for the admin surface: token signing and verification, the
//! account registry, and the axum extractors guarding mutation routes.

mod accounts;
mod extract;
mod jwt;

use chrono::Utc;
use rand::RngCore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::LoginResponse;

pub use accounts::{Account, AccountStore, Role};
pub use extract::{AdminUser, AuthUser};
pub use jwt::{Claims, JwtKeys, TokenError};

/// Issues and verifies tokens for the registered accounts.
#[derive(Debug, Clone)]
pub struct AuthService {
    keys: JwtKeys,
    accounts: AccountStore,
}

impl AuthService {
    pub fn new(keys: JwtKeys, accounts: AccountStore) -> Self {
        Self { keys, accounts }
    }

    /// Builds the signing key and seeds the admin account from configuration.
    pub fn from_config(config: &Config) -> Self {
        let secret = match &config.jwt_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("JWT_SECRET not set, using a random per-process secret");
                random_bytes()
            }
        };

        let mut accounts = AccountStore::new();
        match &config.admin_password {
            Some(password) => {
                match accounts.add(&config.admin_username, &config.admin_email, password, Role::Admin) {
                    Ok(_) => info!(username = %config.admin_username, "Admin account registered"),
                    Err(err) => error!(error = %err, "Could not hash the admin password, admin login is disabled"),
                }
            }
            None => warn!("ADMIN_PASSWORD not set, admin login is disabled"),
        }

        Self::new(JwtKeys::new(secret, config.jwt_expiry_secs), accounts)
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Exchanges credentials for a signed token.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let account = self
            .accounts
            .authenticate(username, password)
            .ok_or_else(|| ApiError::Unauthorized("Credenciales inválidas".to_string()))?;

        info!(username = %account.username, "Login succeeded");
        Ok(LoginResponse {
            success: true,
            token: self.issue_token(account),
            user: account.info(),
        })
    }

    /// Verifies a bearer token and resolves its account.
    pub fn verify(&self, token: &str) -> Result<(Claims, &Account), ApiError> {
        let claims = self
            .keys
            .decode(token, Utc::now().timestamp())
            .map_err(|err| {
                warn!(error = %err, "Rejected bearer token");
                ApiError::Unauthorized("Token inválido".to_string())
            })?;
        let account = self
            .accounts
            .find(&claims.sub)
            .ok_or_else(|| ApiError::Unauthorized("Usuario no válido".to_string()))?;
        Ok((claims, account))
    }

    /// Signs a fresh token for `account`.
    pub fn issue_token(&self, account: &Account) -> String {
        let claims = self.keys.claims_for(
            &account.id,
            &account.username,
            account.role.as_str(),
            Utc::now().timestamp(),
        );
        self.keys.encode(&claims)
    }
}

fn random_bytes() -> Vec<u8> {
    let mut bytes = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let mut accounts = AccountStore::new();
        accounts
            .add("admin", "admin@example.com", "s3cret", Role::Admin)
            .unwrap();
        accounts.add("agent", "agent@example.com", "pw", Role::User).unwrap();
        AuthService::new(JwtKeys::new("secret", 3600), accounts)
    }

    #[test]
    fn test_login_then_verify() {
        let service = service();
        let response = service.login("admin", "s3cret").unwrap();
        assert!(response.success);
        assert_eq!(response.user.username, "admin");

        let (claims, account) = service.verify(&response.token).unwrap();
        assert_eq!(claims.role, "admin");
        assert_eq!(account.role, Role::Admin);
    }

    #[test]
    fn test_login_bad_password() {
        assert!(matches!(
            service().login("admin", "nope"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_verify_rejects_token_from_other_process() {
        let other = AuthService::new(JwtKeys::new("different", 3600), AccountStore::new());
        let service = service();
        let token = service.login("admin", "s3cret").unwrap().token;
        assert!(matches!(other.verify(&token), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_from_config_without_password_has_no_accounts() {
        let config = Config::default();
        let service = AuthService::from_config(&config);
        assert!(service.accounts().is_empty());
        assert!(service.login("admin", "anything").is_err());
    }

    #[test]
    fn test_from_config_registers_admin() {
        let config = Config {
            admin_password: Some("pw".into()),
            jwt_secret: Some("configured".into()),
            ..Config::default()
        };
        let service = AuthService::from_config(&config);
        assert_eq!(service.accounts().len(), 1);
        assert!(service.login("admin", "pw").is_ok());
    }
}
