use chrono::{DateTime, Duration, Utc};

/// Listing entry for a vault secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretProperties {
    /// Secret name as stored in the vault (dash separated)
    pub name: String,

    /// Disabled secrets cannot be read and are skipped
    pub enabled: bool,
}

impl SecretProperties {
    /// Build properties from a secret identifier such as
    /// `https://myvault.vault.azure.net/secrets/my-secret`
    ///
    /// Returns `None` when the identifier has no `/secrets/{name}` segment.
    pub fn from_id(id: &str, enabled: bool) -> Option<Self> {
        let (_, rest) = id.split_once("/secrets/")?;
        let name = rest.split('/').next()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            enabled,
        })
    }
}

/// Map a vault secret name onto the environment variable convention
///
/// Vault names only allow `-` as separator, so every `-` becomes `_`.
/// The mapping is lossy: `A-B` and `A_B` both become `A_B`.
pub fn normalize_secret_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Bearer token issued for one resource scope
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Bearer token value; never logged
    pub token: String,
    /// Absolute expiry reported by the token endpoint
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    /// Tokens are refreshed this long before they actually expire
    pub const REFRESH_MARGIN_SECS: i64 = 300;

    /// Token expiring at `expires_on`
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Usable at `now`, with [`Self::REFRESH_MARGIN_SECS`] to spare
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - Duration::seconds(Self::REFRESH_MARGIN_SECS) > now
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}
