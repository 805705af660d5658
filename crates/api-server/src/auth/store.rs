//! Postgres-backed user credentials store

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::postgres::PgPool;

use super::AuthError;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user. A taken login maps to a conflict, the same
    /// unique-violation boundary the task store uses.
    pub async fn create_user(&self, login: &str, password: &str) -> Result<(), AuthError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(AuthError::InvalidInput("login cannot be empty".to_string()));
        }
        validate_password(password)?;

        sqlx::query("INSERT INTO users (login, password_hash) VALUES ($1, $2)")
            .bind(login)
            .bind(hash_password(password))
            .execute(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AuthError::Conflict(format!("login {login:?} is already taken"))
                }
                _ => AuthError::Storage(err.to_string()),
            })?;
        Ok(())
    }

    /// Check the credentials. Unknown logins and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<(), AuthError> {
        let stored_hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE login = $1")
                .bind(login.trim())
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| AuthError::Storage(err.to_string()))?;

        match stored_hash {
            Some(hash) if verify_password(&hash, password) => Ok(()),
            _ => Err(AuthError::Unauthorized("failed to login".to_string())),
        }
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!("v1${}${}", hex::encode(salt), hex::encode(digest))
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some("v1"), Some(encoded_salt), Some(encoded_digest)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(salt) = hex::decode(encoded_salt) else {
        return false;
    };
    let Ok(expected_digest) = hex::decode(encoded_digest) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    expected_digest == hasher.finalize().as_slice()
}
