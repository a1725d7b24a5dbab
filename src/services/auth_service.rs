// src/services/auth_service.rs
// DOCUMENTATION: Admin login/logout logic
// PURPOSE: Password verification, login rate limiting and session management

use crate::db::AdminRepository;
use crate::errors::PortfolioError;
use crate::models::{AdminUserResponse, ClientInfo, LoginRequest, SessionStatus};
use crate::services::SessionStore;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sqlx::MySqlPool;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Hash a plaintext password with Argon2id and a random salt (PHC string)
pub fn hash_password(password: &str) -> Result<String, PortfolioError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortfolioError::InternalError(format!("Password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored PHC hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PortfolioError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PortfolioError::InternalError(format!("Stored password hash is invalid: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PortfolioError::InternalError(format!("Password verification failed: {}", e))),
    }
}

/// Per-client login throttle
/// DOCUMENTATION: Allows `max_attempts` in a burst, refilled evenly over `window`
pub struct LoginLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl LoginLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_attempts.max(1)).unwrap_or(NonZeroU32::MIN);
        let period = (window / burst.get()).max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Consume one attempt for the client; Err once the budget is spent
    pub fn check(&self, client_key: &str) -> Result<(), PortfolioError> {
        self.limiter.check_key(&client_key.to_string()).map_err(|_| {
            log::warn!("Login rate limit hit for {}", client_key);
            PortfolioError::TooManyAttempts
        })
    }

    /// Forget clients whose budget has fully refilled
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// Periodically drop idle limiter keys
pub fn start_limiter_cleanup_task(limiter: Arc<LoginLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}

pub struct AuthService;

impl AuthService {
    /// Authenticate and open a session
    /// Returns the session id and the user fields
    pub async fn login(
        pool: &MySqlPool,
        sessions: &SessionStore,
        limiter: &LoginLimiter,
        req: LoginRequest,
        client: &ClientInfo,
    ) -> Result<(String, AdminUserResponse), PortfolioError> {
        req.validate()?;

        let client_key = client.ip_address.as_deref().unwrap_or("unknown");
        limiter.check(client_key)?;

        let username = req.username.trim();
        let user = AdminRepository::find_by_login(pool, username).await?;

        let authenticated = match &user {
            Some(user) if user.is_active => verify_password(&req.password, &user.password_hash)?,
            _ => false,
        };

        if let Err(e) =
            AdminRepository::record_login_attempt(pool, username, client.ip_address.as_deref(), authenticated).await
        {
            log::warn!("Could not record login attempt: {}", e);
        }

        let user = match user {
            Some(user) if authenticated => user,
            _ => {
                log::warn!("Failed login for '{}' from {}", username, client_key);
                return Err(PortfolioError::InvalidCredentials);
            }
        };

        AdminRepository::touch_last_login(pool, user.id).await?;

        let response = user.to_response();
        let session_id = sessions.create(response.clone()).await;
        log::info!("Admin '{}' logged in", response.username);
        Ok((session_id, response))
    }

    pub async fn logout(sessions: &SessionStore, session_id: Option<&str>) {
        if let Some(id) = session_id {
            if sessions.destroy(id).await {
                log::info!("Admin session closed");
            }
        }
    }

    pub async fn status(sessions: &SessionStore, session_id: Option<&str>) -> SessionStatus {
        let user = match session_id {
            Some(id) => sessions.get(id).await,
            None => None,
        };
        SessionStatus {
            authenticated: user.is_some(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_login_limiter_blocks_after_budget() {
        let limiter = LoginLimiter::new(3, Duration::from_secs(900));
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").is_ok());
        }
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Err(PortfolioError::TooManyAttempts)
        ));
        // Other clients keep their own budget
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[tokio::test]
    async fn test_status_without_session() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        let status = AuthService::status(&sessions, None).await;
        assert!(!status.authenticated);
        assert!(status.user.is_none());

        let status = AuthService::status(&sessions, Some("stale")).await;
        assert!(!status.authenticated);
    }
}
