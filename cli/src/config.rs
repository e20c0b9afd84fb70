//! CLI Configuration
//!
//! Handles loading and saving the ledger configuration from TOML files,
//! and the committee seed file written by `umbra init`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_committee::{CommitteeKeys, CommitteeMember};
use umbra_ledger::LedgerConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Seed file error: {0}")]
    Seeds(#[from] serde_json::Error),

    #[error("Config not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Full CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UmbraConfig {
    /// Ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Decryption committee settings
    #[serde(default)]
    pub committee: CommitteeSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl UmbraConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let committee = &self.committee;
        if committee.threshold == 0 {
            return Err(ConfigError::Invalid(
                "Threshold must be greater than 0".to_string()
            ));
        }

        if committee.threshold > usize::from(committee.size) {
            return Err(ConfigError::Invalid(
                "Threshold cannot exceed committee size".to_string()
            ));
        }

        if let Some(keys) = &committee.keys {
            if keys.member_count() != usize::from(committee.size)
                || keys.threshold() != committee.threshold
            {
                return Err(ConfigError::Invalid(
                    "Committee keys disagree with size or threshold".to_string()
                ));
            }
        }

        if self.ledger.max_term_months == 0 {
            return Err(ConfigError::Invalid(
                "max_term_months must be greater than 0".to_string()
            ));
        }

        Ok(())
    }
}

/// Decryption committee settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitteeSettings {
    /// Number of committee members
    pub size: u16,

    /// Attestations required for a disclosure
    pub threshold: usize,

    /// Secret member seeds, written by `umbra init`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeds_file: Option<PathBuf>,

    /// Public verification keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<CommitteeKeys>,
}

impl Default for CommitteeSettings {
    fn default() -> Self {
        Self {
            size: 3,
            threshold: 2,
            seeds_file: None,
            keys: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log line encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Secret signing seeds of a committee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeSeeds {
    pub threshold: usize,
    pub members: Vec<MemberSeed>,
}

/// One member's index and hex-encoded ed25519 seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSeed {
    pub index: u16,
    pub seed: String,
}

impl CommitteeSeeds {
    pub fn from_members(members: &[CommitteeMember], threshold: usize) -> Self {
        Self {
            threshold,
            members: members
                .iter()
                .map(|m| MemberSeed {
                    index: m.index(),
                    seed: hex::encode(m.seed()),
                })
                .collect(),
        }
    }

    /// Rebuild the committee members
    pub fn members(&self) -> Result<Vec<CommitteeMember>, ConfigError> {
        self.members
            .iter()
            .map(|m| {
                let bytes = hex::decode(&m.seed).map_err(|e| {
                    ConfigError::Invalid(format!("seed of member {}: {}", m.index, e))
                })?;
                let seed: [u8; 32] = bytes.try_into().map_err(|_| {
                    ConfigError::Invalid(format!("seed of member {} is not 32 bytes", m.index))
                })?;
                Ok(CommitteeMember::from_seed(m.index, &seed))
            })
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
