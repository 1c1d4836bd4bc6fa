//! Sign-in / sign-up modal.
//!
//! Holds the form inputs, the active tab, the per-form error banner, the
//! submit buttons and the page notification. Submitting goes through
//! `begin_*` (validate, mark the button busy) and `finish_*` (restore the
//! button, apply the outcome) so the busy state is observable in between.

use crate::client::{AuthClient, AuthOutcome};
use crate::profile::ProfileStore;
use crate::provider::{AuthUser, IdentityProvider};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_AUTH_MESSAGE: &str = "Please sign in to access this feature";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthTab {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both email and password")]
    MissingCredentials,
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("You must agree to the Terms and Privacy Policy")]
    TermsNotAccepted,
}

/// Sign-in form rules
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Sign-up form rules, checked in order; the first failure wins
pub fn validate_sign_up(
    email: &str,
    password: &str,
    confirm: &str,
    terms_accepted: bool,
) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if !terms_accepted {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub disabled: bool,
    idle_label: &'static str,
}

impl SubmitButton {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            disabled: false,
            idle_label: label,
        }
    }

    fn busy(&mut self, label: &'static str) {
        self.label = label;
        self.disabled = true;
    }

    fn restore(&mut self) {
        self.label = self.idle_label;
        self.disabled = false;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
    pub error: Option<String>,
}

/// Credentials taken from a form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthModal {
    pub visible: bool,
    pub tab: AuthTab,
    pub sign_in: SignInForm,
    pub sign_up: SignUpForm,
    pub sign_in_button: SubmitButton,
    pub sign_up_button: SubmitButton,
    /// Only one notification is shown at a time; a new one replaces it
    pub notification: Option<Notification>,
}

impl Default for AuthModal {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthModal {
    pub fn new() -> Self {
        Self {
            visible: false,
            tab: AuthTab::SignIn,
            sign_in: SignInForm::default(),
            sign_up: SignUpForm::default(),
            sign_in_button: SubmitButton::new("Sign In"),
            sign_up_button: SubmitButton::new("Create Account"),
            notification: None,
        }
    }

    /// Clears every input and error and goes back to the sign-in tab
    fn reset(&mut self) {
        self.sign_in = SignInForm::default();
        self.sign_up = SignUpForm::default();
        self.tab = AuthTab::SignIn;
    }

    pub fn open(&mut self) {
        self.reset();
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.reset();
    }

    /// Swaps the visible form; inputs are kept
    pub fn switch_tab(&mut self, tab: AuthTab) {
        self.tab = tab;
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notification = Some(Notification::new(message, kind));
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Validates the sign-in form and marks its button busy
    pub fn begin_sign_in(&mut self) -> Option<Credentials> {
        let email = self.sign_in.email.trim().to_string();
        if let Err(e) = validate_sign_in(&email, &self.sign_in.password) {
            self.sign_in.error = Some(e.to_string());
            return None;
        }
        self.sign_in.error = None;
        self.sign_in_button.busy("Signing in...");
        Some(Credentials {
            email,
            password: self.sign_in.password.clone(),
        })
    }

    pub fn finish_sign_in(&mut self, outcome: &AuthOutcome<AuthUser>) {
        self.sign_in_button.restore();
        match outcome {
            AuthOutcome::Success(_) => {
                self.close();
                self.notify("Signed in successfully!", NotificationKind::Success);
            }
            AuthOutcome::Failure(message) => {
                self.sign_in.error = Some(non_empty(message, "Sign in failed"));
            }
        }
    }

    /// Validates the sign-up form and marks its button busy
    pub fn begin_sign_up(&mut self) -> Option<Credentials> {
        let form = &self.sign_up;
        let email = form.email.trim().to_string();
        if let Err(e) =
            validate_sign_up(&email, &form.password, &form.confirm_password, form.terms_accepted)
        {
            self.sign_up.error = Some(e.to_string());
            return None;
        }
        self.sign_up.error = None;
        self.sign_up_button.busy("Creating Account...");
        Some(Credentials {
            email,
            password: self.sign_up.password.clone(),
        })
    }

    pub fn finish_sign_up(&mut self, outcome: &AuthOutcome<AuthUser>) {
        self.sign_up_button.restore();
        match outcome {
            AuthOutcome::Success(_) => {
                self.close();
                self.notify("Account created successfully!", NotificationKind::Success);
            }
            AuthOutcome::Failure(message) => {
                self.sign_up.error = Some(non_empty(message, "Sign up failed"));
            }
        }
    }

    pub async fn submit_sign_in<I, S>(&mut self, client: &AuthClient<I, S>) -> bool
    where
        I: IdentityProvider,
        S: ProfileStore,
    {
        let Some(credentials) = self.begin_sign_in() else {
            return false;
        };
        let outcome = client
            .sign_in_with_email(&credentials.email, &credentials.password)
            .await;
        self.finish_sign_in(&outcome);
        outcome.is_success()
    }

    pub async fn submit_sign_up<I, S>(&mut self, client: &AuthClient<I, S>) -> bool
    where
        I: IdentityProvider,
        S: ProfileStore,
    {
        let Some(credentials) = self.begin_sign_up() else {
            return false;
        };
        let outcome = client
            .sign_up_with_email(&credentials.email, &credentials.password)
            .await;
        self.finish_sign_up(&outcome);
        outcome.is_success()
    }

    pub async fn continue_as_guest<I, S>(&mut self, client: &AuthClient<I, S>) -> bool
    where
        I: IdentityProvider,
        S: ProfileStore,
    {
        match client.sign_in_anonymously().await {
            AuthOutcome::Success(_) => {
                self.close();
                self.notify("Continuing as guest user", NotificationKind::Info);
                true
            }
            AuthOutcome::Failure(_) => {
                self.sign_in.error = Some("Failed to continue as guest".to_string());
                false
            }
        }
    }

    /// Signs out once the user has confirmed
    pub async fn sign_out<I, S>(&mut self, client: &AuthClient<I, S>, confirmed: bool) -> bool
    where
        I: IdentityProvider,
        S: ProfileStore,
    {
        if !confirmed {
            return false;
        }
        let outcome = client.sign_out_user().await;
        if outcome.is_success() {
            self.notify("Signed out successfully", NotificationKind::Info);
        }
        outcome.is_success()
    }

    /// Gate for actions that need an account. Returns true when the action
    /// may proceed; otherwise opens the modal with a warning.
    pub fn require_auth(&mut self, user: Option<&AuthUser>, message: Option<&str>) -> bool {
        if user.is_some() {
            return true;
        }
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_AUTH_MESSAGE);
        self.notify(message, NotificationKind::Warning);
        self.open();
        false
    }
}

fn non_empty(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_sign_up_rules_in_order() {
        assert_eq!(
            validate_sign_up("", "secret1", "secret1", true),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_sign_up("a@b.co.za", "secret1", "secret2", false),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_sign_up("a@b.co.za", "abc", "abc", false),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_sign_up("a@b.co.za", "secret1", "secret1", false),
            Err(ValidationError::TermsNotAccepted)
        );
        assert_eq!(validate_sign_up("a@b.co.za", "secret1", "secret1", true), Ok(()));
    }

    #[test]
    fn test_mismatch_rejected_even_when_long_enough() {
        assert_eq!(
            validate_sign_up("a@b.co.za", "longpassword1", "longpassword2", true),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_sign_in_rules() {
        assert_eq!(
            validate_sign_in("  ", "pw"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_sign_in("a@b.co.za", ""),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(validate_sign_in("a@b.co.za", "pw"), Ok(()));
    }

    #[test]
    fn test_open_resets_forms_and_tab() {
        let mut modal = AuthModal::new();
        modal.switch_tab(AuthTab::SignUp);
        modal.sign_up.email = "x@y.co.za".into();
        modal.sign_in.error = Some("old".into());

        modal.open();
        assert!(modal.visible);
        assert_eq!(modal.tab, AuthTab::SignIn);
        assert_eq!(modal.sign_up, SignUpForm::default());
        assert!(modal.sign_in.error.is_none());
    }

    #[test]
    fn test_switch_tab_keeps_inputs() {
        let mut modal = AuthModal::new();
        modal.open();
        modal.sign_in.email = "x@y.co.za".into();
        modal.switch_tab(AuthTab::SignUp);
        modal.switch_tab(AuthTab::SignIn);
        assert_eq!(modal.sign_in.email, "x@y.co.za");
    }

    #[test]
    fn test_busy_button_is_restored_on_failure() {
        let mut modal = AuthModal::new();
        modal.open();
        modal.sign_in.email = " thabo@example.co.za ".into();
        modal.sign_in.password = "secret1".into();

        let credentials = modal.begin_sign_in().unwrap();
        assert_eq!(credentials.email, "thabo@example.co.za");
        assert!(modal.sign_in_button.disabled);
        assert_eq!(modal.sign_in_button.label, "Signing in...");

        modal.finish_sign_in(&AuthOutcome::Failure("Incorrect email or password.".into()));
        assert!(!modal.sign_in_button.disabled);
        assert_eq!(modal.sign_in_button.label, "Sign In");
        assert!(modal.visible);
        assert_eq!(
            modal.sign_in.error.as_deref(),
            Some("Incorrect email or password.")
        );
    }

    #[test]
    fn test_invalid_form_never_goes_busy() {
        let mut modal = AuthModal::new();
        modal.open();
        modal.switch_tab(AuthTab::SignUp);
        modal.sign_up.email = "a@b.co.za".into();
        modal.sign_up.password = "secret1".into();
        modal.sign_up.confirm_password = "secret2".into();

        assert!(modal.begin_sign_up().is_none());
        assert!(!modal.sign_up_button.disabled);
        assert_eq!(modal.sign_up.error.as_deref(), Some("Passwords do not match"));
    }

    #[test]
    fn test_sign_up_success_closes_and_notifies() {
        let mut modal = AuthModal::new();
        modal.open();
        modal.sign_up = SignUpForm {
            email: "a@b.co.za".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            terms_accepted: true,
            error: None,
        };
        assert!(modal.begin_sign_up().is_some());
        assert_eq!(modal.sign_up_button.label, "Creating Account...");

        let user = AuthUser {
            uid: "u".into(),
            email: Some("a@b.co.za".into()),
            is_anonymous: false,
        };
        modal.finish_sign_up(&AuthOutcome::Success(user));
        assert!(!modal.visible);
        assert_eq!(modal.sign_up_button.label, "Create Account");
        assert_eq!(modal.sign_up, SignUpForm::default());
        assert_eq!(
            modal.notification,
            Some(Notification::new(
                "Account created successfully!",
                NotificationKind::Success
            ))
        );
    }

    #[test]
    fn test_auth_gate() {
        let mut modal = AuthModal::new();
        assert!(!modal.require_auth(None, None));
        assert!(modal.visible);
        assert_eq!(
            modal.notification.as_ref().map(|n| n.message.as_str()),
            Some(DEFAULT_AUTH_MESSAGE)
        );
        assert_eq!(
            modal.notification.as_ref().map(|n| n.kind),
            Some(NotificationKind::Warning)
        );

        let mut modal = AuthModal::new();
        modal.require_auth(None, Some("Sign in to save locations"));
        assert_eq!(
            modal.notification.unwrap().message,
            "Sign in to save locations"
        );

        let user = AuthUser {
            uid: "u".into(),
            email: None,
            is_anonymous: true,
        };
        let mut modal = AuthModal::new();
        assert!(modal.require_auth(Some(&user), None));
        assert!(!modal.visible);
    }
}
