//! Authentication boundary.
//!
//! The real credential issuer lives outside this crate; [`MockAuthenticator`]
//! stands in for it and accepts any non-empty credentials.

use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub email: String,
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthError>;
}

/// Placeholder issuer: any non-empty email/password pair gets a session.
#[derive(Debug, Default)]
pub struct MockAuthenticator;

impl Authenticator for MockAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::EmptyCredentials);
        }
        Ok(Session {
            session_id: Uuid::new_v4(),
            email: credentials.email.clone(),
        })
    }
}
