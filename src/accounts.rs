//! User accounts, password verification and bearer tokens.

use std::collections::{HashMap, VecDeque};

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use parking_lot::RwLock;
use rand_core::OsRng;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::models::{AuthSession, Credentials, ProfileUpdate, Registration, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    Conflict(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const TOKEN_PREFIX: &str = "mock-jwt-";
/// Oldest tokens of a user are revoked beyond this many
pub const MAX_SESSIONS_PER_USER: usize = 5;

struct Account {
    profile: UserProfile,
    password_hash: String,
}

struct Directory {
    accounts: Vec<Account>,
    /// token -> user id
    tokens: HashMap<String, String>,
    /// user id -> live tokens, oldest first
    sessions: HashMap<String, VecDeque<String>>,
    next_id: u64,
}

impl Directory {
    fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.profile.email.eq_ignore_ascii_case(email))
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        let token = format!("{}{}", TOKEN_PREFIX, Uuid::new_v4());
        let live = self.sessions.entry(user_id.to_string()).or_default();
        live.push_back(token.clone());
        while live.len() > MAX_SESSIONS_PER_USER {
            if let Some(oldest) = live.pop_front() {
                self.tokens.remove(&oldest);
                debug!(user_id = %user_id, "Revoked oldest session");
            }
        }
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    fn revoke(&mut self, token: &str) -> bool {
        let Some(user_id) = self.tokens.remove(token) else {
            return false;
        };
        if let Some(live) = self.sessions.get_mut(&user_id) {
            live.retain(|t| t != token);
        }
        true
    }
}

/// Registered users and their live sessions.
///
/// Password hashing happens outside the lock; the lock is never held across
/// an `.await`.
pub struct AccountDirectory {
    inner: RwLock<Directory>,
}

impl Default for AccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Directory {
                accounts: Vec::new(),
                tokens: HashMap::new(),
                sessions: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Directory holding the demo user `user@example.com` / `password`
    pub fn seeded() -> Result<Self, AccountError> {
        let directory = Self::new();
        directory.register(&Registration {
            name: "Usuário Teste".to_string(),
            email: "user@example.com".to_string(),
            phone: Some("(11) 98765-4321".to_string()),
            password: "password".to_string(),
        })?;
        Ok(directory)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub fn login(&self, credentials: &Credentials) -> Result<AuthSession, AccountError> {
        let stored = {
            let directory = self.inner.read();
            directory
                .find_by_email(credentials.email.trim())
                .map(|a| (a.profile.clone(), a.password_hash.clone()))
        };

        let Some((profile, password_hash)) = stored else {
            debug!("Login for unknown email");
            return Err(AccountError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&password_hash, &credentials.password)? {
            debug!(user_id = %profile.id, "Login with wrong password");
            return Err(AccountError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.inner.write().issue_token(&profile.id);
        debug!(user_id = %profile.id, "User logged in");
        Ok(AuthSession { user: profile, token })
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub fn register(&self, registration: &Registration) -> Result<AuthSession, AccountError> {
        let name = required("name", &registration.name)?;
        let email = validate_email(&registration.email)?;
        if registration.password.is_empty() {
            return Err(AccountError::Validation("password is required".to_string()));
        }

        let password_hash = hash_password(&registration.password)?;

        let mut directory = self.inner.write();
        if directory.find_by_email(&email).is_some() {
            return Err(AccountError::Conflict(email));
        }

        let profile = UserProfile {
            id: directory.next_id.to_string(),
            name,
            email,
            phone: normalize_phone(registration.phone.as_deref()),
        };
        directory.next_id += 1;
        directory.accounts.push(Account {
            profile: profile.clone(),
            password_hash,
        });
        let token = directory.issue_token(&profile.id);

        debug!(user_id = %profile.id, "User registered");
        Ok(AuthSession { user: profile, token })
    }

    /// Resolve a bearer token to the user id it was issued for
    pub fn authenticate(&self, token: &str) -> Result<String, AccountError> {
        self.inner
            .read()
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AccountError::Unauthorized("Invalid or expired token".to_string()))
    }

    /// Revoke a token. Returns whether it was live.
    pub fn logout(&self, token: &str) -> bool {
        let revoked = self.inner.write().revoke(token);
        if !revoked {
            warn!("Logout with unknown token");
        }
        revoked
    }

    pub fn profile(&self, user_id: &str) -> Result<UserProfile, AccountError> {
        self.inner
            .read()
            .accounts
            .iter()
            .find(|a| a.profile.id == user_id)
            .map(|a| a.profile.clone())
            .ok_or_else(|| AccountError::NotFound(user_id.to_string()))
    }

    /// Merge the provided fields into the stored profile
    #[instrument(skip(self, update))]
    pub fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AccountError> {
        let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
        let email = update.email.as_deref().map(validate_email).transpose()?;

        let mut directory = self.inner.write();

        if let Some(email) = &email {
            let taken = directory
                .accounts
                .iter()
                .any(|a| a.profile.id != user_id && a.profile.email.eq_ignore_ascii_case(email));
            if taken {
                return Err(AccountError::Conflict(email.clone()));
            }
        }

        let account = directory
            .accounts
            .iter_mut()
            .find(|a| a.profile.id == user_id)
            .ok_or_else(|| AccountError::NotFound(user_id.to_string()))?;

        if let Some(name) = name {
            account.profile.name = name;
        }
        if let Some(email) = email {
            account.profile.email = email;
        }
        if update.phone.is_some() {
            account.profile.phone = normalize_phone(update.phone.as_deref());
        }

        debug!(user_id = %user_id, "Profile updated");
        Ok(account.profile.clone())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn required(field: &str, value: &str) -> Result<String, AccountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccountError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn validate_email(email: &str) -> Result<String, AccountError> {
    let email = required("email", email)?;
    let plausible = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !plausible {
        return Err(AccountError::Validation(format!("invalid email: {}", email)));
    }
    Ok(email)
}

fn normalize_phone(phone: Option<&str>) -> Option<String> {
    phone.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string)
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn verify_password(password_hash: &str, password: &str) -> Result<bool, AccountError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AccountError::Hashing(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AccountError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_credentials() -> Credentials {
        Credentials {
            email: "user@example.com".to_string(),
            password: "password".to_string(),
        }
    }

    fn registration(email: &str) -> Registration {
        Registration {
            name: "Maria Silva".to_string(),
            email: email.to_string(),
            phone: None,
            password: "segredo".to_string(),
        }
    }

    #[test]
    fn test_demo_user_can_log_in() {
        let accounts = AccountDirectory::seeded().unwrap();
        let session = accounts.login(&demo_credentials()).unwrap();

        assert_eq!(session.user.id, "1");
        assert_eq!(session.user.name, "Usuário Teste");
        assert!(session.token.starts_with("mock-jwt-"));
        assert_eq!(accounts.authenticate(&session.token).unwrap(), "1");
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let accounts = AccountDirectory::seeded().unwrap();
        let result = accounts.login(&Credentials {
            password: "nope".to_string(),
            ..demo_credentials()
        });
        assert!(matches!(result, Err(AccountError::Unauthorized(_))));
    }

    #[test]
    fn test_unknown_email_is_unauthorized() {
        let accounts = AccountDirectory::seeded().unwrap();
        let result = accounts.login(&Credentials {
            email: "ghost@example.com".to_string(),
            ..demo_credentials()
        });
        assert!(matches!(result, Err(AccountError::Unauthorized(_))));
    }

    #[test]
    fn test_register_assigns_next_id() {
        let accounts = AccountDirectory::seeded().unwrap();
        let session = accounts.register(&registration("maria@example.com")).unwrap();

        assert_eq!(session.user.id, "2");
        assert_eq!(accounts.authenticate(&session.token).unwrap(), "2");
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let accounts = AccountDirectory::seeded().unwrap();
        let result = accounts.register(&registration("USER@example.com"));
        assert!(matches!(result, Err(AccountError::Conflict(_))));
    }

    #[test]
    fn test_register_validates_input() {
        let accounts = AccountDirectory::new();
        assert!(matches!(
            accounts.register(&registration("not-an-email")),
            Err(AccountError::Validation(_))
        ));
        assert!(matches!(
            accounts.register(&Registration {
                name: "  ".to_string(),
                ..registration("a@b.com")
            }),
            Err(AccountError::Validation(_))
        ));
    }

    #[test]
    fn test_logout_revokes_token() {
        let accounts = AccountDirectory::seeded().unwrap();
        let session = accounts.login(&demo_credentials()).unwrap();

        assert!(accounts.logout(&session.token));
        assert!(accounts.authenticate(&session.token).is_err());
        assert!(!accounts.logout(&session.token));
    }

    #[test]
    fn test_sessions_per_user_are_capped() {
        let accounts = AccountDirectory::seeded().unwrap();
        let tokens: Vec<String> = (0..MAX_SESSIONS_PER_USER + 2)
            .map(|_| accounts.login(&demo_credentials()).unwrap().token)
            .collect();

        assert!(accounts.authenticate(&tokens[0]).is_err());
        assert!(accounts.authenticate(&tokens[1]).is_err());
        for token in &tokens[2..] {
            assert_eq!(accounts.authenticate(token).unwrap(), "1");
        }
        assert_eq!(accounts.inner.read().tokens.len(), MAX_SESSIONS_PER_USER);
    }

    #[test]
    fn test_logout_frees_a_session_slot() {
        let accounts = AccountDirectory::seeded().unwrap();
        let first = accounts.login(&demo_credentials()).unwrap().token;
        let second = accounts.login(&demo_credentials()).unwrap().token;
        assert!(accounts.logout(&second));

        for _ in 0..MAX_SESSIONS_PER_USER - 1 {
            accounts.login(&demo_credentials()).unwrap();
        }
        assert_eq!(accounts.authenticate(&first).unwrap(), "1");
    }

    #[test]
    fn test_update_profile_merges_fields() {
        let accounts = AccountDirectory::seeded().unwrap();
        let updated = accounts
            .update_profile(
                "1",
                &ProfileUpdate {
                    name: Some("João".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "João");
        assert_eq!(updated.email, "user@example.com");
        assert_eq!(updated.phone.as_deref(), Some("(11) 98765-4321"));
        assert_eq!(accounts.profile("1").unwrap(), updated);
    }

    #[test]
    fn test_update_profile_email_conflict() {
        let accounts = AccountDirectory::seeded().unwrap();
        accounts.register(&registration("maria@example.com")).unwrap();

        let result = accounts.update_profile(
            "2",
            &ProfileUpdate {
                email: Some("user@example.com".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AccountError::Conflict(_))));
    }

    #[test]
    fn test_update_unknown_user() {
        let accounts = AccountDirectory::new();
        let result = accounts.update_profile("9", &ProfileUpdate::default());
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }
}
