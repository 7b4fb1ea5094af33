//! Accounts allowed to sign in.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};

use crate::models::UserInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// A sign-in identity. The password is kept only as an Argon2id PHC string.
#[derive(Clone)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    password_hash: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl Account {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.as_str().to_string(),
        }
    }

    fn password_matches(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// In-memory account registry.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account and returns its identifier.
    pub fn add(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<String, password_hash::Error> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.accounts.push(Account {
            id: id.clone(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            password_hash,
        });
        Ok(id)
    }

    /// Checks credentials against the stored hash.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Account> {
        let account = self.accounts.iter().find(|a| a.username == username)?;
        account.password_matches(password).then_some(account)
    }

    pub fn find(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
