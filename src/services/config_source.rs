//! Config store source with secret reference dereferencing

use futures::TryStreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

use crate::domain::error::{ResolveError, StoreError};
use crate::domain::models::setting::SettingValue;
use crate::domain::models::SecretReference;
use crate::domain::ports::{ConfigStore, SecretStore, SecretStoreFactory};

/// Lists every config store setting and materializes its value
///
/// Settings whose value is a JSON object with a string `uri` are secret
/// references: the secret is fetched from the vault the uri names. Vault
/// clients are created once per host for the duration of a call.
pub struct ConfigStoreSource {
    store: Option<Arc<dyn ConfigStore>>,
    vaults: Arc<dyn SecretStoreFactory>,
}

impl ConfigStoreSource {
    /// Source over `store`; `vaults` builds clients for referenced vaults
    pub fn new(store: Option<Arc<dyn ConfigStore>>, vaults: Arc<dyn SecretStoreFactory>) -> Self {
        Self { store, vaults }
    }

    /// Whether a config store endpoint was provided
    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Fetch every setting in listing order with references resolved
    pub async fn list_and_resolve_all(&self) -> Result<Vec<(String, String)>, ResolveError> {
        let Some(store) = &self.store else {
            warn!("AZURE_APP_CONFIG_ENDPOINT is not set, skipping the config store");
            return Ok(Vec::new());
        };
        let endpoint = store.endpoint();
        info!(endpoint, "Loading settings from config store");

        let mut vault_clients: HashMap<String, Arc<dyn SecretStore>> = HashMap::new();
        let mut resolved = Vec::new();
        let mut references = 0usize;
        let mut pages = store.list_settings();

        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| config_store_failure(endpoint, e))?
        {
            for setting in page {
                let value = match setting.classify().inspect_err(|e| {
                    error!(key = %setting.key, error = %e, "Unusable secret reference");
                })? {
                    SettingValue::Literal(value) => {
                        if value.trim_start().starts_with('{') {
                            trace!(key = %setting.key, "JSON value without secret uri, using it verbatim");
                        }
                        value
                    }
                    SettingValue::Reference(reference) => {
                        references += 1;
                        self.resolve_reference(&setting.key, &reference, &mut vault_clients)
                            .await?
                    }
                };
                resolved.push((setting.key, value));
            }
        }

        info!(
            endpoint,
            count = resolved.len(),
            references,
            vaults = vault_clients.len(),
            "Loaded settings from config store"
        );
        Ok(resolved)
    }

    async fn resolve_reference(
        &self,
        key: &str,
        reference: &SecretReference,
        vault_clients: &mut HashMap<String, Arc<dyn SecretStore>>,
    ) -> Result<String, ResolveError> {
        let vault_url = reference.vault_url();

        let client = match vault_clients.get(&reference.vault_host) {
            Some(client) => Arc::clone(client),
            None => {
                let client = self
                    .vaults
                    .for_vault(&vault_url)
                    .map_err(|e| config_store_failure(&vault_url, e))?;
                vault_clients.insert(reference.vault_host.clone(), Arc::clone(&client));
                client
            }
        };

        debug!(
            key,
            vault = %reference.vault_host,
            secret = %reference.secret_name,
            "Resolving secret reference"
        );
        client
            .get_secret(&reference.secret_name)
            .await
            .map_err(|e| config_store_failure(&vault_url, e))
    }
}

fn config_store_failure(endpoint: &str, source: StoreError) -> ResolveError {
    let err = ResolveError::config_store(endpoint, source);
    if err.is_auth() {
        error!(
            endpoint,
            error = %err,
            "Cannot access the config store or a referenced vault. Grant the application \
             identity the 'App Configuration Data Reader' role on the store and 'get' \
             permission on secrets in every referenced vault"
        );
    } else {
        error!(endpoint, error = %err, "Config store request failed");
    }
    err
}
