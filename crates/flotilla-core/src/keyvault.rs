//! Key-vault CLI boundary types
//!
//! Secret resolution is performed outside this crate by shelling out to a
//! key-vault CLI; what crosses the boundary back is the CLI's JSON output.
//! These types give that output a shape. Timestamps stay strings here;
//! the loader has no use for them beyond pass-through.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One secret as printed by `keyvault secret show`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVaultSecret {
    pub attributes: KeyVaultSecretAttributes,
    #[serde(default)]
    pub content_type: Option<String>,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    pub value: String,
}

/// Lifecycle metadata attached to a key-vault secret
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVaultSecretAttributes {
    pub created: String,
    pub enabled: bool,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub not_before: Option<String>,
    pub recovery_level: String,
    pub updated: String,
}

impl KeyVaultSecret {
    /// Parse the JSON a key-vault CLI invocation produced
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::syntax(format!("key-vault CLI output: {}", e))
                .with_help("Run the CLI with JSON output enabled")
        })
    }
}
