use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::{NewUser, User};
use crate::database::schema::{EMAIL_MAX_CHARS, USERNAME_MAX_CHARS, USERS_EMAIL_KEY, USERS_USERNAME_KEY};
use crate::database::{DatabaseError, UserRepository};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Please use a different username.")]
    DuplicateUsername,

    #[error("Please use a different email.")]
    DuplicateEmail,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Fields posted by the registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

impl RegistrationForm {
    /// Field-level checks done before touching storage.
    pub fn validate(&self) -> Result<(), UserError> {
        let required = [
            ("Username", &self.username),
            ("Email", &self.email),
            ("Password", &self.password),
            ("Repeat Password", &self.password2),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(UserError::Validation(format!("{} is required.", label)));
            }
        }

        let limits = [
            ("Username", &self.username, USERNAME_MAX_CHARS),
            ("Email", &self.email, EMAIL_MAX_CHARS),
        ];
        for (label, value, max) in limits {
            if value.trim().chars().count() > max {
                return Err(UserError::Validation(format!(
                    "{} must be at most {} characters.",
                    label, max
                )));
            }
        }

        if !looks_like_email(self.email.trim()) {
            return Err(UserError::Validation("Invalid email address.".to_string()));
        }
        if self.password != self.password2 {
            return Err(UserError::Validation("Passwords must match.".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || s.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Registration and login over a user repository.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<User, UserError> {
        form.validate()?;
        let username = form.username.trim().to_string();
        let email = form.email.trim().to_string();

        if self.users.username_exists(&username).await? {
            return Err(UserError::DuplicateUsername);
        }
        if self.users.email_exists(&email).await? {
            return Err(UserError::DuplicateEmail);
        }

        let password_hash = hash_password(form.password, self.bcrypt_cost).await?;

        // A concurrent registration can still win the race; the unique keys decide.
        let user = self
            .users
            .insert(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                DatabaseError::UniqueViolation(key) if key == USERS_USERNAME_KEY => {
                    UserError::DuplicateUsername
                }
                DatabaseError::UniqueViolation(key) if key == USERS_EMAIL_KEY => UserError::DuplicateEmail,
                other => UserError::Database(other),
            })?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Unknown usernames and wrong passwords fail identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError> {
        let username = username.trim();
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(%username, "Login failed: unknown user");
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!(%username, "Login failed: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}

/// bcrypt only reads the first 72 bytes of its input, so it is given a
/// fixed-length digest of the whole password instead.
fn prehash(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

async fn hash_password(password: String, cost: u32) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(prehash(&password), cost))
        .await
        .map_err(|e| UserError::Hash(e.to_string()))?
        .map_err(|e| UserError::Hash(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, UserError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(prehash(&password), &hash))
        .await
        .map_err(|e| UserError::Hash(e.to_string()))?;

    // A stored hash bcrypt can't read is treated as a failed login.
    Ok(verified.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryUserRepository;

    fn service() -> CredentialService {
        CredentialService::new(Arc::new(MemoryUserRepository::default()), 4)
    }

    fn form(username: &str, email: &str, password: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password2: password.to_string(),
        }
    }

    #[tokio::test]
    async fn registered_user_logs_in_with_exact_password_only() {
        let credentials = service();
        let user = credentials.register(form("alice", "alice@example.com", "s3cret")).await.unwrap();
        assert_ne!(user.password_hash, "s3cret");

        let logged_in = credentials.authenticate("alice", "s3cret").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        for wrong in ["s3cret ", "S3cret", "", "s3cre"] {
            let err = credentials.authenticate("alice", wrong).await.unwrap_err();
            assert!(matches!(err, UserError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn passwords_sharing_a_long_prefix_are_distinct() {
        let credentials = service();
        let prefix = "a".repeat(72);
        let real = format!("{}REAL-SUFFIX", prefix);
        credentials.register(form("alice", "alice@example.com", &real)).await.unwrap();

        assert!(credentials.authenticate("alice", &real).await.is_ok());
        for other in [format!("{}totally-different", prefix), prefix.clone()] {
            let err = credentials.authenticate("alice", &other).await.unwrap_err();
            assert!(matches!(err, UserError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn unknown_user_is_indistinguishable_from_wrong_password() {
        let credentials = service();
        let err = credentials.authenticate("nobody", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
    }

    #[tokio::test]
    async fn rejects_taken_username_and_email() {
        let credentials = service();
        credentials.register(form("alice", "alice@example.com", "pw")).await.unwrap();
        credentials.register(form("bob", "bob@example.com", "pw")).await.unwrap();

        let err = credentials.register(form("alice", "other@example.com", "pw")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateUsername));

        // An email taken by an earlier user, with a fresh username.
        let err = credentials.register(form("carol", "alice@example.com", "pw")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail));
        assert_eq!(err.to_string(), "Please use a different email.");
    }

    #[test]
    fn validates_registration_form() {
        assert!(form("a", "a@b.co", "pw").validate().is_ok());

        let mut missing = form("a", "a@b.co", "pw");
        missing.username = "  ".to_string();
        assert!(matches!(missing.validate(), Err(UserError::Validation(m)) if m == "Username is required."));

        for bad in ["ab.co", "a@b", "@b.co", "a@@b.co", "a b@c.de"] {
            assert!(form("a", bad, "pw").validate().is_err(), "{bad}");
        }

        let long_name = "u".repeat(USERNAME_MAX_CHARS + 1);
        assert!(matches!(
            form(&long_name, "a@b.co", "pw").validate(),
            Err(UserError::Validation(m)) if m == "Username must be at most 64 characters."
        ));
        assert!(form(&"u".repeat(USERNAME_MAX_CHARS), "a@b.co", "pw").validate().is_ok());

        let long_email = format!("{}@b.co", "e".repeat(EMAIL_MAX_CHARS));
        assert!(matches!(
            form("a", &long_email, "pw").validate(),
            Err(UserError::Validation(m)) if m == "Email must be at most 120 characters."
        ));

        let mut mismatch = form("a", "a@b.co", "pw");
        mismatch.password2 = "pw2".to_string();
        assert!(matches!(mismatch.validate(), Err(UserError::Validation(m)) if m == "Passwords must match."));
    }
}
