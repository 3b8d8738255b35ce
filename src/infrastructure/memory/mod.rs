//! In-memory store adapters
//!
//! Used when no remote store should be contacted, and as deterministic
//! stand-ins for Key Vault and App Configuration in tests. Every retrieval is
//! recorded so callers can assert on what was fetched.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::error::StoreError;
use crate::domain::models::{ConfigurationSetting, SecretProperties};
use crate::domain::ports::{ConfigStore, PageStream, SecretStore, SecretStoreFactory};

/// Secret store holding its secrets in pages
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    endpoint: String,
    pages: Vec<Vec<SecretProperties>>,
    values: HashMap<String, String>,
    list_failure: Option<StoreError>,
    get_failure: Option<StoreError>,
    fetched: Mutex<Vec<String>>,
}

impl InMemorySecretStore {
    /// Empty vault reporting `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Append an enabled secret to the current page
    #[must_use]
    pub fn with_secret(self, name: &str, value: &str) -> Self {
        self.push(name, value, true)
    }

    /// Append a disabled secret to the current page
    #[must_use]
    pub fn with_disabled_secret(self, name: &str, value: &str) -> Self {
        self.push(name, value, false)
    }

    /// Start a new page for subsequent secrets
    #[must_use]
    pub fn with_page_break(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// Fail the listing with `error`
    #[must_use]
    pub fn failing_list(mut self, error: StoreError) -> Self {
        self.list_failure = Some(error);
        self
    }

    /// Fail every secret retrieval with `error`
    #[must_use]
    pub fn failing_get(mut self, error: StoreError) -> Self {
        self.get_failure = Some(error);
        self
    }

    /// Names passed to `get_secret`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(mut self, name: &str, value: &str, enabled: bool) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(SecretProperties {
                name: name.to_string(),
                enabled,
            });
        }
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn list_secrets(&self) -> PageStream<'_, SecretProperties> {
        if let Some(error) = &self.list_failure {
            return stream::iter([Err(error.clone())]).boxed();
        }
        stream::iter(self.pages.clone().into_iter().map(Ok)).boxed()
    }

    async fn get_secret(&self, name: &str) -> Result<String, StoreError> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());

        if let Some(error) = &self.get_failure {
            return Err(error.clone());
        }
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("secret '{name}'")))
    }
}

/// Config store holding its settings in pages
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    endpoint: String,
    pages: Vec<Vec<ConfigurationSetting>>,
    failure: Option<StoreError>,
}

impl InMemoryConfigStore {
    /// Empty store reporting `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Append a plain key/value setting to the current page
    #[must_use]
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.with_setting(ConfigurationSetting::new(key, value))
    }

    /// Append a setting to the current page
    #[must_use]
    pub fn with_setting(mut self, setting: ConfigurationSetting) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(setting);
        }
        self
    }

    /// Start a new page for subsequent settings
    #[must_use]
    pub fn with_page_break(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// Fail the listing with `error` after the configured pages
    #[must_use]
    pub fn failing(mut self, error: StoreError) -> Self {
        self.failure = Some(error);
        self
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn list_settings(&self) -> PageStream<'_, ConfigurationSetting> {
        let pages = self.pages.clone().into_iter().map(Ok);
        let failure = self.failure.clone().map(Err);
        stream::iter(pages.chain(failure)).boxed()
    }
}

/// Hands out registered in-memory vaults by endpoint
#[derive(Debug, Default)]
pub struct InMemorySecretStoreFactory {
    vaults: HashMap<String, Arc<InMemorySecretStore>>,
    requested: Mutex<Vec<String>>,
}

impl InMemorySecretStoreFactory {
    /// Factory with no vaults registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vault under its endpoint
    #[must_use]
    pub fn with_vault(mut self, vault: Arc<InMemorySecretStore>) -> Self {
        self.vaults
            .insert(vault.endpoint().trim_end_matches('/').to_string(), vault);
        self
    }

    /// Vault urls passed to `for_vault`, in call order
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SecretStoreFactory for InMemorySecretStoreFactory {
    fn for_vault(&self, vault_url: &str) -> Result<Arc<dyn SecretStore>, StoreError> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(vault_url.to_string());

        self.vaults
            .get(vault_url.trim_end_matches('/'))
            .map(|vault| Arc::clone(vault) as Arc<dyn SecretStore>)
            .ok_or_else(|| StoreError::Network(format!("could not resolve vault {vault_url}")))
    }
}
