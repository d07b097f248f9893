//! Configuration profiles for the glovetalk CLI.
//!
//! Configuration is stored in `~/.glovetalk/config.yaml` and holds named
//! profiles, one per glove deployment, plus the name of the active one.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glovetalk_gesture::{
    ChannelPolicy, DEFAULT_TOLERANCE, Phrasebook, ToleranceError, ToleranceProfile,
};
use serde::{Deserialize, Serialize};

use crate::paths::{DEFAULT_BASE_DIR, DEFAULT_CONFIG_FILE};

/// Default serial baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Default serial read timeout in milliseconds.
pub const DEFAULT_SERIAL_TIMEOUT_MS: u64 = 1000;
/// Default number of sensor channels.
pub const DEFAULT_CHANNELS: usize = 5;
/// Default speech language tag.
pub const DEFAULT_LANGUAGE: &str = "ml-IN";
/// Default pause between recognition cycles in milliseconds.
pub const DEFAULT_CYCLE_INTERVAL_MS: u64 = 1000;

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot determine home directory")]
    NoHome,

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("profile name must be non-empty")]
    EmptyName,

    #[error("invalid profile: {0}")]
    Invalid(String),
}

impl From<ToleranceError> for ConfigError {
    fn from(e: ToleranceError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Name of the active profile.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_profile: String,

    /// Profiles by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device path or name, e.g. `/dev/ttyUSB0` or `COM4`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,
    pub baud_rate: u32,
    pub timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_SERIAL_TIMEOUT_MS,
        }
    }
}

/// Tolerance as written in YAML: one ratio for every channel, or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToleranceSetting {
    Uniform(f64),
    PerChannel(Vec<f64>),
}

impl Default for ToleranceSetting {
    fn default() -> Self {
        ToleranceSetting::Uniform(DEFAULT_TOLERANCE)
    }
}

impl ToleranceSetting {
    /// Expands the setting into a profile for `channels` channels.
    pub fn to_profile(&self, channels: usize) -> Result<ToleranceProfile, ToleranceError> {
        match self {
            ToleranceSetting::Uniform(ratio) => ToleranceProfile::uniform(*ratio, channels),
            ToleranceSetting::PerChannel(ratios) => ToleranceProfile::per_channel(ratios.clone()),
        }
    }
}

/// Google Cloud Text-to-Speech credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSettings {
    pub api_key: String,

    /// API base URL (optional, uses default if empty).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,
}

/// An external program and the arguments placed before its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSettings {
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Where synthesized audio is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Defaults to `~/.glovetalk/cache` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

/// Playback polling and artifact cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub poll_interval_ms: u64,
    pub cleanup_attempts: u32,
    pub cleanup_backoff_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            cleanup_attempts: 10,
            cleanup_backoff_ms: 100,
        }
    }
}

impl PlaybackSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cleanup_backoff(&self) -> Duration {
        Duration::from_millis(self.cleanup_backoff_ms)
    }
}

/// One glove deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Profile name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub serial: SerialSettings,

    /// Reference dataset CSV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,

    pub channels: usize,
    pub channel_policy: ChannelPolicy,
    pub tolerance: ToleranceSetting,

    /// BCP-47 language tag for speech.
    pub language: String,

    /// Cloud synthesis; without it speech stays local.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleSettings>,

    /// Local speech engine; defaults to `espeak-ng` with the profile language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<ProgramSettings>,

    /// Audio player; defaults to `mpg123 -q`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<ProgramSettings>,

    pub artifacts: ArtifactSettings,
    pub playback: PlaybackSettings,
    pub cycle_interval_ms: u64,
    pub phrases: Phrasebook,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            serial: SerialSettings::default(),
            dataset: None,
            channels: DEFAULT_CHANNELS,
            channel_policy: ChannelPolicy::default(),
            tolerance: ToleranceSetting::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            google: None,
            speaker: None,
            player: None,
            artifacts: ArtifactSettings::default(),
            playback: PlaybackSettings::default(),
            cycle_interval_ms: DEFAULT_CYCLE_INTERVAL_MS,
            phrases: Phrasebook::default(),
        }
    }
}

impl Profile {
    /// Builds the tolerance profile and checks it against the channel count.
    pub fn tolerance_profile(&self) -> Result<ToleranceProfile, ConfigError> {
        if self.channels == 0 {
            return Err(ConfigError::Invalid("channels must be at least 1".to_string()));
        }
        let profile = self.tolerance.to_profile(self.channels)?;
        if profile.len() != self.channels {
            return Err(ConfigError::Invalid(format!(
                "tolerance has {} entries, expected {}",
                profile.len(),
                self.channels
            )));
        }
        Ok(profile)
    }

    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial.timeout_ms)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    /// Returns the Google API key, if one is configured.
    pub fn google_api_key(&self) -> Option<&str> {
        self.google
            .as_ref()
            .map(|g| g.api_key.as_str())
            .filter(|k| !k.is_empty())
    }
}

impl Config {
    /// Gets the default config directory (`~/.glovetalk`).
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR))
    }

    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the config directory path.
    pub fn dir(&self) -> Option<&Path> {
        self.config_path.parent()
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        write_yaml(&self.config_path, self)
    }

    /// Adds or replaces a profile.
    pub fn add_profile(&mut self, name: &str, mut profile: Profile) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        profile.tolerance_profile()?;
        profile.name = name.to_string();
        self.profiles.insert(name.to_string(), profile);
        if self.current_profile.is_empty() {
            self.current_profile = name.to_string();
        }
        self.save()
    }

    /// Deletes a profile.
    pub fn delete_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.profiles.remove(name).is_none() {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        if self.current_profile == name {
            self.current_profile.clear();
        }
        self.save()
    }

    /// Sets the active profile.
    pub fn use_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(name) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        self.current_profile = name.to_string();
        self.save()
    }

    /// Gets a specific profile.
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Gets the active profile.
    pub fn get_current_profile(&self) -> Option<&Profile> {
        if self.current_profile.is_empty() {
            return None;
        }
        self.profiles.get(&self.current_profile)
    }

    /// Resolves the profile by name, or the active one if no name is given.
    ///
    /// With neither a name nor an active profile, built-in defaults apply.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<Profile, ConfigError> {
        match name {
            Some(n) if !n.is_empty() => self
                .get_profile(n)
                .cloned()
                .ok_or_else(|| ConfigError::ProfileNotFound(n.to_string())),
            _ => Ok(self.get_current_profile().cloned().unwrap_or_default()),
        }
    }

    /// Lists all profile names in order.
    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}

/// Loads the configuration, creating an empty file if none exists.
pub fn load_config(custom_path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match custom_path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path().ok_or(ConfigError::NoHome)?,
    };

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        serde_yaml::from_str(&content)?
    } else {
        let cfg = Config::default();
        write_yaml(&config_path, &cfg)?;
        cfg
    };

    cfg.config_path = config_path;
    Ok(cfg)
}

fn write_yaml(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content).map_err(io_err)
}

/// Masks the API key for display.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
