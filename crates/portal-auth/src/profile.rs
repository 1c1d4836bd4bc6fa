//! Per-user profile documents, kept in SQLite.

use crate::provider::AuthUser;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use portal_core::{RusqliteErrorExt, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("no profile for user {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("preferences could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for ProfileError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.into_storage_error())
    }
}

/// Latitude/longitude as stored on a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub sms_alerts: bool,
    pub email_updates: bool,
    /// `auto`, `light` or `dark`
    pub theme: String,
    pub location: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sms_alerts: false,
            email_updates: true,
            theme: "auto".to_string(),
            location: None,
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub name: String,
    pub address: Option<String>,
    pub coordinates: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub preferences: Preferences,
    pub saved_locations: Vec<SavedLocation>,
}

/// Storage for profile documents.
///
/// Implementations are called from async code but are expected to be quick
/// local operations.
pub trait ProfileStore: Send + Sync {
    /// Creates the profile with default preferences if absent, otherwise
    /// bumps its last-login time. Returns true when the profile was created.
    fn upsert_on_sign_in(&self, user: &AuthUser) -> Result<bool, ProfileError>;

    fn get(&self, uid: &str) -> Result<Option<UserProfile>, ProfileError>;

    /// Replaces the whole preferences object
    fn update_preferences(&self, uid: &str, preferences: &Preferences) -> Result<(), ProfileError>;

    /// Sets `preferences.location` and `preferences.coordinates` only
    fn save_location(&self, uid: &str, name: &str, coordinates: GeoPoint) -> Result<(), ProfileError>;

    /// Set union: returns false when an identical location was already saved
    fn add_saved_location(&self, uid: &str, location: &SavedLocation) -> Result<bool, ProfileError>;

    fn saved_locations(&self, uid: &str) -> Result<Vec<SavedLocation>, ProfileError>;
}

pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

impl SqliteProfileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, ProfileError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), ProfileError> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                uid TEXT PRIMARY KEY,
                email TEXT,
                created_at INTEGER NOT NULL,
                last_login INTEGER NOT NULL,
                preferences TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS saved_locations (
                uid TEXT NOT NULL REFERENCES profiles(uid),
                name TEXT NOT NULL,
                address TEXT NOT NULL DEFAULT '',
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                saved_at INTEGER NOT NULL,
                UNIQUE (uid, name, address, lat, lng)
            );

            CREATE INDEX IF NOT EXISTS idx_saved_locations_uid ON saved_locations(uid, saved_at);
            "#,
        )?;
        Ok(())
    }

    fn ensure_exists(conn: &Connection, uid: &str) -> Result<(), ProfileError> {
        let exists: Option<i64> = conn
            .query_row("SELECT 1 FROM profiles WHERE uid = ?1", params![uid], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(ProfileError::NotFound(uid.to_string()));
        }
        Ok(())
    }

    fn read_preferences(conn: &Connection, uid: &str) -> Result<Preferences, ProfileError> {
        let json: Option<String> = conn
            .query_row(
                "SELECT preferences FROM profiles WHERE uid = ?1",
                params![uid],
                |row| row.get(0),
            )
            .optional()?;
        let json = json.ok_or_else(|| ProfileError::NotFound(uid.to_string()))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn locations(conn: &Connection, uid: &str) -> Result<Vec<SavedLocation>, ProfileError> {
        let mut stmt = conn.prepare(
            "SELECT name, address, lat, lng FROM saved_locations WHERE uid = ?1 ORDER BY saved_at, rowid",
        )?;
        let rows = stmt.query_map(params![uid], |row| {
            let address: String = row.get(1)?;
            Ok(SavedLocation {
                name: row.get(0)?,
                address: Some(address).filter(|a| !a.is_empty()),
                coordinates: GeoPoint {
                    lat: row.get(2)?,
                    lng: row.get(3)?,
                },
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn timestamp(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

impl ProfileStore for SqliteProfileStore {
    fn upsert_on_sign_in(&self, user: &AuthUser) -> Result<bool, ProfileError> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn.lock();

        let updated = conn.execute(
            "UPDATE profiles SET last_login = ?2 WHERE uid = ?1",
            params![user.uid, now],
        )?;
        if updated > 0 {
            tracing::debug!("Updated last login for {}", user.uid);
            return Ok(false);
        }

        let preferences = serde_json::to_string(&Preferences::default())?;
        conn.execute(
            "INSERT INTO profiles (uid, email, created_at, last_login, preferences) VALUES (?1, ?2, ?3, ?3, ?4)",
            params![user.uid, user.email, now, preferences],
        )?;
        tracing::info!("Created profile for {}", user.uid);
        Ok(true)
    }

    fn get(&self, uid: &str) -> Result<Option<UserProfile>, ProfileError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT uid, email, created_at, last_login, preferences FROM profiles WHERE uid = ?1",
                params![uid],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((uid, email, created_at, last_login, preferences)) = row else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            saved_locations: Self::locations(&conn, &uid)?,
            uid,
            email,
            created_at: timestamp(created_at),
            last_login: timestamp(last_login),
            preferences: serde_json::from_str(&preferences)?,
        }))
    }

    fn update_preferences(&self, uid: &str, preferences: &Preferences) -> Result<(), ProfileError> {
        let json = serde_json::to_string(preferences)?;
        let updated = self.conn.lock().execute(
            "UPDATE profiles SET preferences = ?2 WHERE uid = ?1",
            params![uid, json],
        )?;
        if updated == 0 {
            return Err(ProfileError::NotFound(uid.to_string()));
        }
        Ok(())
    }

    fn save_location(&self, uid: &str, name: &str, coordinates: GeoPoint) -> Result<(), ProfileError> {
        let conn = self.conn.lock();
        let mut preferences = Self::read_preferences(&conn, uid)?;
        preferences.location = Some(name.to_string());
        preferences.coordinates = Some(coordinates);
        conn.execute(
            "UPDATE profiles SET preferences = ?2 WHERE uid = ?1",
            params![uid, serde_json::to_string(&preferences)?],
        )?;
        Ok(())
    }

    fn add_saved_location(&self, uid: &str, location: &SavedLocation) -> Result<bool, ProfileError> {
        let conn = self.conn.lock();
        Self::ensure_exists(&conn, uid)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO saved_locations (uid, name, address, lat, lng, saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uid,
                location.name,
                location.address.as_deref().unwrap_or_default(),
                location.coordinates.lat,
                location.coordinates.lng,
                Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn saved_locations(&self, uid: &str) -> Result<Vec<SavedLocation>, ProfileError> {
        let conn = self.conn.lock();
        Self::ensure_exists(&conn, uid)?;
        Self::locations(&conn, uid)
    }
}
