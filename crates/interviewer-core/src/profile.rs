use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Profile is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Signed-in user's display data
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// Picture as a data URL
    #[serde(
        rename = "pictureData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub picture: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            picture: None,
        }
    }
}

/// Where the user profile is kept between runs
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load_profile(&self) -> Result<Option<UserProfile>, ProfileError>;

    fn save_profile(&self, profile: &UserProfile) -> Result<(), ProfileError>;

    /// Set the stored name, keeping the rest of the profile. Skips the write
    /// when the name is unchanged.
    fn update_name(&self, name: &str) -> Result<UserProfile, ProfileError> {
        let mut profile = self.load_profile()?.unwrap_or_default();
        if profile.name != name {
            profile.name = name.to_string();
            self.save_profile(&profile)?;
        }
        Ok(profile)
    }
}

/// Profile kept as a JSON file, by default `<data dir>/interviewer/profile.json`
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new() -> Result<Self, ProfileError> {
        let data_dir = dirs::data_dir().ok_or(ProfileError::NoDataDir)?;
        Ok(Self::at(data_dir.join("interviewer").join("profile.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for JsonProfileStore {
    fn load_profile(&self) -> Result<Option<UserProfile>, ProfileError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Process-lifetime store
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profile: Mutex<Option<UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            profile: Mutex::new(Some(profile)),
        }
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load_profile(&self) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self
            .profile
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), ProfileError> {
        *self.profile.lock().unwrap_or_else(|e| e.into_inner()) = Some(profile.clone());
        Ok(())
    }
}
