//! Accounts for SA Daily Portal
//!
//! Email/password and guest sign-in against Firebase Authentication, the
//! per-user profile store, session persistence and the sign-in modal.

pub mod client;
pub mod firebase;
pub mod modal;
pub mod profile;
pub mod provider;
pub mod storage;

pub use client::{AuthClient, AuthOutcome};
pub use firebase::FirebaseIdentity;
pub use modal::{
    validate_sign_in, validate_sign_up, AuthModal, AuthTab, Credentials, Notification,
    NotificationKind, SignInForm, SignUpForm, SubmitButton, ValidationError, DEFAULT_AUTH_MESSAGE,
};
pub use profile::{
    GeoPoint, Preferences, ProfileError, ProfileStore, SavedLocation, SqliteProfileStore,
    UserProfile,
};
pub use provider::{AuthUser, IdentityError, IdentityProvider};
pub use storage::{Session, SessionStorage};
