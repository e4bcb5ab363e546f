//! Wire contracts for the service client

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata registered ahead of a package payload upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub name: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

impl PackageMetadata {
    pub fn new<S: Into<String>>(name: S, file_name: S) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            description: None,
            properties: HashMap::new(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property<S: Into<String>>(mut self, key: S, value: S) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Minimal projection of a managed resource, as returned by read endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}
