//! Account operations for the UI.
//!
//! Every operation returns an [`AuthOutcome`]: failures from the identity
//! provider or the profile store are logged and turned into a message, never
//! returned as errors.

use crate::profile::{GeoPoint, Preferences, ProfileStore, SavedLocation, UserProfile};
use crate::provider::{AuthUser, IdentityError, IdentityProvider};
use crate::storage::{Session, SessionStorage};
use parking_lot::RwLock;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use tracing::instrument;

const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> AuthOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AuthOutcome::Success(value) => Some(value),
            AuthOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Failure(message) => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AuthOutcome<U> {
        match self {
            AuthOutcome::Success(value) => AuthOutcome::Success(f(value)),
            AuthOutcome::Failure(message) => AuthOutcome::Failure(message),
        }
    }
}

/// `{"success": true, "user": ..}` or `{"success": false, "error": ".."}`.
/// Unit values serialize as just `{"success": true}`.
impl<T: Serialize> Serialize for AuthOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            AuthOutcome::Success(value) => {
                map.serialize_entry("success", &true)?;
                let value = serde_json::to_value(value).map_err(S::Error::custom)?;
                if !value.is_null() {
                    map.serialize_entry("user", &value)?;
                }
            }
            AuthOutcome::Failure(message) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
            }
        }
        map.end()
    }
}

pub struct AuthClient<I, S> {
    identity: I,
    profiles: S,
    storage: Option<SessionStorage>,
    session: RwLock<Option<Session>>,
}

impl<I: IdentityProvider, S: ProfileStore> AuthClient<I, S> {
    pub fn new(identity: I, profiles: S) -> Self {
        Self {
            identity,
            profiles,
            storage: None,
            session: RwLock::new(None),
        }
    }

    /// Persists sessions to `storage` and restores one stored earlier
    pub fn with_session_storage(mut self, storage: SessionStorage) -> Self {
        match storage.load() {
            Ok(Some(session)) => {
                tracing::info!("Restored session for {}", session.uid);
                *self.session.get_mut() = Some(session);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable session file: {:#}", e),
        }
        self.storage = Some(storage);
        self
    }

    pub fn profiles(&self) -> &S {
        &self.profiles
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session.read().as_ref().map(Session::user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.read().is_some()
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthOutcome<AuthUser> {
        let result = self.identity.sign_in_with_password(email, password).await;
        self.finish_sign_in(result, "Sign in")
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up_with_email(&self, email: &str, password: &str) -> AuthOutcome<AuthUser> {
        let result = self.identity.sign_up(email, password).await;
        self.finish_sign_in(result, "Sign up")
    }

    #[instrument(skip(self))]
    pub async fn sign_in_anonymously(&self) -> AuthOutcome<AuthUser> {
        let result = self.identity.sign_in_anonymously().await;
        self.finish_sign_in(result, "Anonymous sign in")
    }

    fn finish_sign_in(
        &self,
        result: Result<Session, IdentityError>,
        action: &str,
    ) -> AuthOutcome<AuthUser> {
        let session = match result {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("{} error: {}", action, e);
                return AuthOutcome::Failure(e.user_message().to_string());
            }
        };

        let user = session.user();
        // A profile write failure does not undo the sign-in
        if let Err(e) = self.profiles.upsert_on_sign_in(&user) {
            tracing::error!("Error creating user profile: {}", e);
        }
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.store(&session) {
                tracing::warn!("Failed to persist session: {:#}", e);
            }
        }

        *self.session.write() = Some(session);
        tracing::info!("User signed in: {}", user.label());
        AuthOutcome::Success(user)
    }

    #[instrument(skip(self))]
    pub async fn sign_out_user(&self) -> AuthOutcome<()> {
        // The stored session goes first so a failed delete leaves the user signed in
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.clear() {
                tracing::error!("Sign out error: {:#}", e);
                return AuthOutcome::Failure("Failed to sign out".to_string());
            }
        }
        if let Some(session) = self.session.write().take() {
            tracing::info!("User signed out: {}", session.uid);
        }
        AuthOutcome::Success(())
    }

    /// ID token of the signed-in user
    pub async fn current_user_token(&self) -> AuthOutcome<String> {
        match self.session.read().as_ref() {
            None => AuthOutcome::Failure(NOT_AUTHENTICATED.to_string()),
            Some(session) if session.is_expired() => AuthOutcome::Failure(
                portal_core::AuthError::SessionExpired.user_message().to_string(),
            ),
            Some(session) => AuthOutcome::Success(session.id_token.clone()),
        }
    }

    fn signed_in_uid(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.uid.clone())
    }

    fn with_uid<T>(
        &self,
        action: &str,
        f: impl FnOnce(&str) -> Result<T, crate::profile::ProfileError>,
    ) -> AuthOutcome<T> {
        let Some(uid) = self.signed_in_uid() else {
            return AuthOutcome::Failure(NOT_AUTHENTICATED.to_string());
        };
        match f(&uid) {
            Ok(value) => AuthOutcome::Success(value),
            Err(e) => {
                tracing::error!("Error {}: {}", action, e);
                AuthOutcome::Failure(e.to_string())
            }
        }
    }

    /// Replaces the signed-in user's preferences
    pub async fn update_user_preferences(&self, preferences: &Preferences) -> AuthOutcome<()> {
        self.with_uid("updating preferences", |uid| {
            self.profiles.update_preferences(uid, preferences)
        })
    }

    /// Records the user's home location in their preferences
    pub async fn save_user_location(&self, name: &str, coordinates: GeoPoint) -> AuthOutcome<()> {
        self.with_uid("saving location", |uid| {
            self.profiles.save_location(uid, name, coordinates)
        })
    }

    /// Adds to the saved locations list; `Success(false)` when already saved
    pub async fn add_saved_location(&self, location: &SavedLocation) -> AuthOutcome<bool> {
        self.with_uid("saving location", |uid| {
            self.profiles.add_saved_location(uid, location)
        })
    }

    pub async fn load_saved_locations(&self) -> AuthOutcome<Vec<SavedLocation>> {
        self.with_uid("loading saved locations", |uid| self.profiles.saved_locations(uid))
    }

    pub async fn profile(&self) -> AuthOutcome<UserProfile> {
        self.with_uid("loading profile", |uid| {
            self.profiles
                .get(uid)?
                .ok_or_else(|| crate::profile::ProfileError::NotFound(uid.to_string()))
        })
    }
}
