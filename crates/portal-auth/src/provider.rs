//! Identity provider seam.

use crate::storage::Session;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// The signed-in account as the rest of the portal sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub is_anonymous: bool,
}

impl AuthUser {
    /// Email address, or "Guest User" for anonymous sessions
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or("Guest User")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailExists,

    #[error("password rejected as too weak")]
    WeakPassword,

    #[error("malformed email address")]
    InvalidEmail,

    #[error("account disabled")]
    UserDisabled,

    #[error("too many attempts")]
    TooManyAttempts,

    #[error("sign-in method disabled for this project")]
    OperationNotAllowed,

    #[error("network error: {0}")]
    Network(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl IdentityError {
    /// Maps an Identity Toolkit error code such as `EMAIL_EXISTS` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`
    pub fn from_code(message: &str) -> Self {
        let code = message.split([' ', ':']).next().unwrap_or_default();
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "EMAIL_EXISTS" => Self::EmailExists,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "OPERATION_NOT_ALLOWED" | "ADMIN_ONLY_OPERATION" => Self::OperationNotAllowed,
            _ => Self::Provider(message.to_string()),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Incorrect email or password.",
            Self::EmailExists => "An account with this email already exists.",
            Self::WeakPassword => "Password must be at least 6 characters",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyAttempts => "Too many attempts. Please try again later.",
            Self::OperationNotAllowed => "This sign-in method is not available.",
            Self::Network(_) => "Unable to connect. Check your internet connection.",
            Self::Provider(_) => "Sign-in failed. Please try again.",
        }
    }
}

impl From<IdentityError> for portal_core::AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::EmailExists => Self::EmailInUse,
            IdentityError::WeakPassword => Self::WeakPassword,
            other => Self::ProviderFailed(other.to_string()),
        }
    }
}

/// External account service (email/password and anonymous accounts)
pub trait IdentityProvider: Send + Sync {
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send;

    fn sign_in_anonymously(&self) -> impl Future<Output = Result<Session, IdentityError>> + Send;
}
