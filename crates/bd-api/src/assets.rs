//! Asset upload types.

use serde::{Deserialize, Serialize};

/// How long the backend keeps an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Retention {
    #[serde(rename = "eternal")]
    Eternal,
    #[serde(rename = "persistent")]
    Persistent,
    #[serde(rename = "volatile")]
    Volatile,
    #[serde(rename = "eternal-infrequent_access")]
    EternalInfrequentAccess,
    #[serde(rename = "expiring")]
    Expiring,
}

/// JSON part of an asset upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetMetadata {
    pub public: bool,
    pub retention: Retention,
}

impl AssetMetadata {
    pub fn new(public: bool, retention: Retention) -> Self {
        Self { public, retention }
    }
}

impl Default for AssetMetadata {
    fn default() -> Self {
        Self::new(true, Retention::Eternal)
    }
}

/// Handle of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssetKey {
    pub key: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}
