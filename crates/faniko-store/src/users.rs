use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use tracing::{info, warn};

use faniko_types::api::{LoginRequest, SignupRequest};
use faniko_types::models::{Role, User};

use crate::validate::{is_valid_email, is_valid_username, normalize};
use crate::{Result, Store, StoreError};

const MIN_PASSWORD_LEN: usize = 6;

impl Store {
    /// Register a fan account.
    pub fn signup(&self, req: SignupRequest) -> Result<User> {
        let email = normalize(&req.email);
        let username = normalize(&req.username);
        let password = req.password.trim();

        info!("Signup attempt: email={} username={}", email, username);

        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(StoreError::Invalid("Missing email, username, or password."));
        }
        if !is_valid_email(&email) {
            return Err(StoreError::Invalid("Please provide a valid email address."));
        }
        if !is_valid_username(&username) {
            return Err(StoreError::Invalid(
                "Username can only contain lowercase letters, numbers, and underscores.",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(StoreError::Invalid(
                "Password must be at least 6 characters long.",
            ));
        }

        // Hash outside the lock.
        let password_hash = hash_password(password)?;

        let user = self.with_tables_mut(|t| {
            if t.users.iter().any(|u| u.email == email) {
                return Err(StoreError::Conflict(
                    "That email is already in use. Try logging in instead.",
                ));
            }
            if t.users.iter().any(|u| u.username == username) {
                return Err(StoreError::Conflict(
                    "That username is already taken. Please choose another.",
                ));
            }

            let user = User {
                id: t.user_ids.next(),
                email,
                username,
                password_hash,
                role: Role::Fan,
                email_verified: false,
                created_at: Utc::now(),
            };
            t.users.push(user.clone());
            Ok(user)
        })?;

        info!(
            "Created user: id={} email={} username={}",
            user.id, user.email, user.username
        );
        Ok(user)
    }

    pub fn login(&self, req: LoginRequest) -> Result<User> {
        let email = normalize(&req.email);
        let password = req.password.trim();

        if email.is_empty() || password.is_empty() {
            return Err(StoreError::Invalid("Missing email or password."));
        }

        let user = self
            .get_user_by_email(&email)?
            .ok_or(StoreError::Unauthorized("Invalid email or password."))?;

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for {}", email);
            return Err(StoreError::Unauthorized("Invalid email or password."));
        }

        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize(email);
        self.with_tables(|t| Ok(t.users.iter().find(|u| u.email == email).cloned()))
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("Corrupt password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
