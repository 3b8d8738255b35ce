use serde_json::Value;

use crate::domain::error::ResolveError;

/// Content type App Configuration assigns to Key Vault references
pub const KEY_VAULT_REFERENCE_CONTENT_TYPE: &str =
    "application/vnd.microsoft.appconfig.keyvaultref+json";

/// A key/value entry read from the remote config store
///
/// Whether the entry is a secret reference is not stored: it is derived from
/// `value` on demand by [`ConfigurationSetting::is_reference`] and
/// [`ConfigurationSetting::classify`], so it can never disagree with the value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationSetting {
    /// Setting key, written to the environment unchanged
    pub key: String,
    /// Raw value; a JSON `{"uri": ...}` object for secret references
    pub value: String,
    /// Content type as stored, if any
    pub content_type: Option<String>,
    /// Label the setting was read under
    pub label: Option<String>,
}

/// How a setting's value must be materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    /// Use the stored value verbatim
    Literal(String),

    /// Fetch the referenced vault secret
    Reference(SecretReference),
}

impl ConfigurationSetting {
    /// Unlabelled setting without a content type
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Set the content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True when the value is a JSON object with a string `uri` field
    pub fn is_reference(&self) -> bool {
        self.reference_uri().is_some()
    }

    /// Decide whether this setting is a literal or a secret reference
    ///
    /// Malformed JSON and JSON without `uri` are literals. A `uri` that does
    /// not name a vault host and a secret, or a value tagged with the Key Vault
    /// reference content type that carries no `uri`, is an error.
    pub fn classify(&self) -> Result<SettingValue, ResolveError> {
        match self.reference_uri() {
            Some(uri) => SecretReference::parse(&uri)
                .map(SettingValue::Reference)
                .ok_or_else(|| ResolveError::SecretReferenceIncomplete {
                    key: self.key.clone(),
                    reason: format!("uri '{uri}' does not name a vault host and a secret"),
                }),
            None if self.has_reference_content_type() => {
                Err(ResolveError::SecretReferenceIncomplete {
                    key: self.key.clone(),
                    reason: "value carries no secret uri".to_string(),
                })
            }
            None => Ok(SettingValue::Literal(self.value.clone())),
        }
    }

    fn reference_uri(&self) -> Option<String> {
        let parsed: Value = serde_json::from_str(&self.value).ok()?;
        parsed.as_object()?.get("uri")?.as_str().map(str::to_string)
    }

    fn has_reference_content_type(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(KEY_VAULT_REFERENCE_CONTENT_TYPE))
    }
}

/// Pointer from a config store entry to a vault secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    /// Vault host, e.g. `myvault.vault.azure.net`
    pub vault_host: String,
    /// Secret name as stored in the vault
    pub secret_name: String,
}

impl SecretReference {
    /// Parse `https://{vault_host}/secrets/{secret_name}[/version]`
    ///
    /// Splitting on `/` puts the vault host at segment 2 and the secret name
    /// at segment 4.
    pub fn parse(uri: &str) -> Option<Self> {
        let segments: Vec<&str> = uri.trim().split('/').collect();
        let vault_host = segments.get(2).filter(|s| !s.is_empty())?;
        let secret_name = segments.get(4).filter(|s| !s.is_empty())?;
        Some(Self {
            vault_host: (*vault_host).to_string(),
            secret_name: (*secret_name).to_string(),
        })
    }

    /// Endpoint of the vault holding the secret
    pub fn vault_url(&self) -> String {
        format!("https://{}", self.vault_host)
    }
}
