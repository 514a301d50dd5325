//! Application Configuration
//!
//! Configuration for the auth application layer. Built once by the
//! binary from the environment and injected everywhere.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for token signing (HS256)
    pub token_secret: Vec<u8>,
    /// Token lifetime (7 days)
    pub token_ttl: Duration,
    /// Session TTL in the session store (7 days)
    pub session_ttl: Duration,
    /// E-mails promoted to Admin at login (bootstrap allow-list)
    pub bootstrap_admins: Vec<String>,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            token_ttl: Duration::from_secs(7 * 24 * 3600),
            session_ttl: Duration::from_secs(7 * 24 * 3600),
            bootstrap_admins: Vec::new(),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Whether this email is on the bootstrap-admin allow-list
    pub fn is_bootstrap_admin(&self, email: &str) -> bool {
        self.bootstrap_admins.iter().any(|e| e == email)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
