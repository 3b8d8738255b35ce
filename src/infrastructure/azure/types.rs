//! Wire types for the Key Vault and App Configuration REST APIs

use serde::Deserialize;

/// One page of `GET {vault}/secrets`
#[derive(Debug, Clone, Deserialize)]
pub struct SecretListPage {
    /// Secrets on this page
    #[serde(default)]
    pub value: Vec<SecretItem>,

    /// Absolute url of the next page
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

/// Secret metadata from a list page
#[derive(Debug, Clone, Deserialize)]
pub struct SecretItem {
    /// Secret id url, `https://{vault}/secrets/{name}`
    pub id: String,

    /// Secret attributes
    #[serde(default)]
    pub attributes: SecretAttributes,
}

/// Subset of secret attributes
#[derive(Debug, Clone, Deserialize)]
pub struct SecretAttributes {
    /// Disabled secrets cannot be read
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SecretAttributes {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Body of `GET {vault}/secrets/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct SecretBundle {
    /// Secret value
    #[serde(default)]
    pub value: Option<String>,
}

/// One page of `GET {store}/kv`
#[derive(Debug, Clone, Deserialize)]
pub struct KeyValuePage {
    /// Settings on this page
    #[serde(default)]
    pub items: Vec<KeyValueItem>,

    /// Store-relative url of the next page
    #[serde(rename = "@nextLink", default)]
    pub next_link: Option<String>,
}

/// Setting as returned by the store
#[derive(Debug, Clone, Deserialize)]
pub struct KeyValueItem {
    /// Setting key
    pub key: String,

    /// Setting value; absent values are read as empty
    #[serde(default)]
    pub value: Option<String>,

    /// Content type
    #[serde(default)]
    pub content_type: Option<String>,

    /// Label
    #[serde(default)]
    pub label: Option<String>,
}

const fn default_true() -> bool {
    true
}
