//! User entity and password hashing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    /// Salted digest, stored as `<salt>$<hex>`; never the plaintext
    pub password_hash: String,
    pub role_id: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub const ENTITY: &'static str = "users";

    pub fn new(
        first_name: &str,
        last_name: &str,
        username: &str,
        email: &str,
        password: &str,
        role_id: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
            role_id: role_id.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Serialize to a storage record
    pub fn record(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("user serializes")
    }
}

/// Hash a password with a fresh random salt
pub fn hash_password(plain: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, plain))
}

/// Check a plaintext password against a stored `<salt>$<hex>` hash
pub fn verify_password(plain: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hash)) => digest(salt, plain) == hash,
        None => false,
    }
}

fn digest(salt: &str, plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(plain.as_bytes());
    format!("{:x}", hasher.finalize())
}
