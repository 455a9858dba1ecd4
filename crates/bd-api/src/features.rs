//! Feature flag types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    Enabled,
    Disabled,
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    Locked,
    Unlocked,
}

impl LockStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }
}

/// One feature flag and its settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeatureConfig {
    pub status: FeatureStatus,
    #[serde(rename = "lockStatus", default, skip_serializing_if = "Option::is_none")]
    pub lock_status: Option<LockStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<serde_json::Value>,
}

impl FeatureConfig {
    pub fn new(status: FeatureStatus) -> Self {
        Self {
            status,
            lock_status: None,
            config: None,
            ttl: None,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// All feature flags visible to a user, keyed by name.
pub type FeatureConfigs = BTreeMap<String, FeatureConfig>;
