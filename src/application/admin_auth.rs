use std::collections::VecDeque;
use std::sync::Mutex;

use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Open admin sessions kept at once; logging in beyond this evicts the oldest.
pub const MAX_ADMIN_SESSIONS: usize = 16;

/// Shared-password admin login issuing opaque bearer tokens. Tokens live until
/// logout, eviction by newer logins, or process exit.
pub struct AdminAuth {
    password: String,
    tokens: Mutex<VecDeque<String>>,
}

impl AdminAuth {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            tokens: Mutex::new(VecDeque::new()),
        }
    }

    pub fn login(&self, password: &str) -> Result<String, DomainError> {
        if !constant_time_eq(password.as_bytes(), self.password.as_bytes()) {
            log::warn!("Rejected admin login attempt");
            return Err(DomainError::Unauthorized);
        }
        let token = Uuid::new_v4().simple().to_string();
        let mut tokens = self.tokens.lock()?;
        if tokens.len() >= MAX_ADMIN_SESSIONS {
            tokens.pop_front();
            log::info!("Evicted oldest admin session");
        }
        tokens.push_back(token.clone());
        log::info!("Admin session opened");
        Ok(token)
    }

    /// Ends the session for `token`. Returns false when it was not open.
    pub fn logout(&self, token: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.lock()?;
        let before = tokens.len();
        tokens.retain(|open| open != token);
        let closed = tokens.len() < before;
        if closed {
            log::info!("Admin session closed");
        }
        Ok(closed)
    }

    pub fn verify(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .map(|tokens| tokens.iter().any(|open| open == token))
            .unwrap_or(false)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
