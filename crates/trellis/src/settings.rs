//! Application settings.
//!
//! Settings are read from a TOML document. Every section and key is
//! optional; anything missing takes its default.
//!
//! ```toml
//! [features]
//! get_ip_location = true
//! filter_for_us_only = true
//!
//! [keys]
//! ipapi_key = "ACCESS_KEY"
//!
//! [log]
//! database_path = "LocalLog.sdb"
//!
//! [gate]
//! exclusions = ["95.70.*"]
//! included_countries = ["US", "CA"]
//! redirect = "https://www.dhs.gov/topics/cybersecurity"
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::store::DEFAULT_DATABASE_FILE;

/// Feature switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Geolocate unverified sessions.
    pub get_ip_location: bool,
    /// Redirect sessions from countries outside the allow-list.
    pub filter_for_us_only: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            get_ip_location: true,
            filter_for_us_only: true,
        }
    }
}

/// Third-party API keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    pub ipapi_key: String,
}

/// Session log storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub database_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}

/// Exclusion list, country allow-list and redirect target.
#[cfg(feature = "networking")]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Addresses or `*`-terminated prefixes to turn away.
    pub exclusions: Vec<String>,
    /// Two-letter country codes admitted when country filtering is on.
    pub included_countries: Vec<String>,
    pub redirect: String,
}

#[cfg(feature = "networking")]
impl Default for GateSettings {
    fn default() -> Self {
        use trellis_net::ip::{DEFAULT_EXCLUSIONS, DEFAULT_INCLUDED_COUNTRIES, REDIRECT_ADDRESS};
        Self {
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            included_countries: DEFAULT_INCLUDED_COUNTRIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            redirect: REDIRECT_ADDRESS.to_string(),
        }
    }
}

#[cfg(feature = "networking")]
impl GateSettings {
    /// Build the classifier these settings describe.
    pub fn ip_gate(&self) -> trellis_net::IpGate {
        trellis_net::IpGate::new(
            self.exclusions.iter().map(String::as_str),
            self.included_countries.iter().map(String::as_str),
        )
        .with_redirect(self.redirect.clone())
    }
}

/// Everything the application reads from its settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub features: FeatureSettings,
    pub keys: KeySettings,
    pub log: LogSettings,
    #[cfg(feature = "networking")]
    pub gate: GateSettings,
}

impl AppSettings {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(target: "trellis::settings", path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                target: "trellis::settings",
                path = %path.display(),
                "no settings file, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Save settings to `path`.
    ///
    /// The document is written to a sibling temporary file which is then
    /// renamed over `path`, so readers never observe a partial file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;

        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp, path)
        };
        write().map_err(|e| {
            fs::remove_file(&temp).ok();
            SettingsError::io(path, e)
        })
    }
}
