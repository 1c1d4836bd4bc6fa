//! Cookie consent and theme, persisted between visits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentDecision {
    /// "Accept All"
    Accepted,
    /// Saved from the preferences dialog
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Everything that is remembered, under the keys the pages have always used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub gdpr_consent: Option<ConsentDecision>,
    pub gdpr_analytics: bool,
    pub gdpr_ads: bool,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Defaults when nothing has been saved yet
    pub fn load(&self) -> Result<StoredSettings> {
        if !self.path.exists() {
            return Ok(StoredSettings::default());
        }
        let json = fs::read_to_string(&self.path).context("Failed to read settings file")?;
        serde_json::from_str(&json).context("Failed to parse settings file")
    }

    pub fn save(&self, settings: &StoredSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, json).context("Failed to write settings file")?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Consent banner and theme switch state
#[derive(Debug)]
pub struct PageSettings {
    file: SettingsFile,
    stored: StoredSettings,
    system_theme: Theme,
}

impl PageSettings {
    /// Unreadable settings are logged and treated as never saved
    pub fn open(file: SettingsFile, system_prefers_dark: bool) -> Self {
        let stored = file.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable settings: {:#}", e);
            StoredSettings::default()
        });
        Self {
            file,
            stored,
            system_theme: Theme::from_dark(system_prefers_dark),
        }
    }

    pub fn stored(&self) -> &StoredSettings {
        &self.stored
    }

    /// The banner is shown until a decision is stored
    pub fn banner_visible(&self) -> bool {
        self.stored.gdpr_consent.is_none()
    }

    pub fn accept_all(&mut self) -> Result<()> {
        self.stored.gdpr_consent = Some(ConsentDecision::Accepted);
        self.stored.gdpr_analytics = true;
        self.stored.gdpr_ads = true;
        self.file.save(&self.stored)
    }

    pub fn save_preferences(&mut self, analytics: bool, ads: bool) -> Result<()> {
        self.stored.gdpr_consent = Some(ConsentDecision::Custom);
        self.stored.gdpr_analytics = analytics;
        self.stored.gdpr_ads = ads;
        self.file.save(&self.stored)
    }

    /// Analytics may load when allowed or before any decision
    pub fn analytics_allowed(&self) -> bool {
        self.stored.gdpr_analytics || self.banner_visible()
    }

    /// Ads may load when allowed or before any decision
    pub fn ads_allowed(&self) -> bool {
        self.stored.gdpr_ads || self.banner_visible()
    }

    /// Saved theme, else the system preference
    pub fn theme(&self) -> Theme {
        self.stored.theme.unwrap_or(self.system_theme)
    }

    /// The theme switch was flipped; the choice is remembered
    pub fn set_dark(&mut self, dark: bool) -> Result<Theme> {
        let theme = Theme::from_dark(dark);
        self.stored.theme = Some(theme);
        self.file.save(&self.stored)?;
        Ok(theme)
    }

    /// The system preference changed. Only applies when no theme is saved;
    /// returns the theme to apply, if any.
    pub fn system_theme_changed(&mut self, prefers_dark: bool) -> Option<Theme> {
        self.system_theme = Theme::from_dark(prefers_dark);
        match self.stored.theme {
            Some(_) => None,
            None => Some(self.system_theme),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn settings(dir: &tempfile::TempDir, dark: bool) -> PageSettings {
        PageSettings::open(SettingsFile::new(dir.path().join("settings.json")), dark)
    }

    #[test]
    fn test_undecided_allows_everything() {
        let dir = tempfile::tempdir().unwrap();
        let page = settings(&dir, false);
        assert!(page.banner_visible());
        assert!(page.analytics_allowed());
        assert!(page.ads_allowed());
    }

    #[test]
    fn test_accept_all_persists() {
        let dir = tempfile::tempdir().unwrap();
        settings(&dir, false).accept_all().unwrap();

        let page = settings(&dir, false);
        assert!(!page.banner_visible());
        assert_eq!(page.stored().gdpr_consent, Some(ConsentDecision::Accepted));
        assert!(page.analytics_allowed());
        assert!(page.ads_allowed());
    }

    #[test]
    fn test_custom_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = settings(&dir, false);
        page.save_preferences(true, false).unwrap();
        assert_eq!(page.stored().gdpr_consent, Some(ConsentDecision::Custom));
        assert!(page.analytics_allowed());
        assert!(!page.ads_allowed());

        let json = fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(json.contains("\"gdpr_consent\": \"custom\""));
    }

    #[test]
    fn test_theme_follows_system_until_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = settings(&dir, true);
        assert_eq!(page.theme(), Theme::Dark);
        assert_eq!(page.system_theme_changed(false), Some(Theme::Light));
        assert_eq!(page.theme(), Theme::Light);

        assert_eq!(page.set_dark(true).unwrap(), Theme::Dark);
        assert_eq!(page.system_theme_changed(false), None);
        assert_eq!(page.theme(), Theme::Dark);

        let reopened = settings(&dir, false);
        assert_eq!(reopened.theme(), Theme::Dark);
        assert_eq!(reopened.theme().as_str(), "dark");
    }

    #[test]
    fn test_corrupt_file_treated_as_unsaved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "not json").unwrap();
        let page = settings(&dir, false);
        assert!(page.banner_visible());
        assert_eq!(page.theme(), Theme::Light);
    }
}
