//! Secret store source: every enabled vault secret as an environment pair

use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::error::{ResolveError, StoreError};
use crate::domain::models::normalize_secret_name;
use crate::domain::ports::SecretStore;

/// Lists and resolves all secrets of the configured vault
#[derive(Clone, Default)]
pub struct SecretStoreSource {
    store: Option<Arc<dyn SecretStore>>,
}

impl SecretStoreSource {
    /// Source over `store`; `None` when no vault endpoint is configured
    pub fn new(store: Option<Arc<dyn SecretStore>>) -> Self {
        Self { store }
    }

    /// Whether a vault endpoint was provided
    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Fetch every enabled secret, in enumeration order
    ///
    /// Names are normalized (`-` to `_`). Pages are pulled one at a time and
    /// each value is retrieved serially. Without a configured vault this
    /// warns and returns nothing.
    pub async fn list_and_resolve_all(&self) -> Result<Vec<(String, String)>, ResolveError> {
        let Some(store) = &self.store else {
            warn!("AZURE_KEY_VAULT_ENDPOINT is not set, skipping the secret store");
            return Ok(Vec::new());
        };
        let endpoint = store.endpoint();
        info!(endpoint, "Loading secrets from secret store");

        let mut resolved = Vec::new();
        let mut pages = store.list_secrets();

        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| secret_store_failure(endpoint, e))?
        {
            for secret in page {
                if !secret.enabled {
                    debug!(name = %secret.name, "Skipping disabled secret");
                    continue;
                }

                let value = store
                    .get_secret(&secret.name)
                    .await
                    .map_err(|e| secret_store_failure(endpoint, e))?;
                let key = normalize_secret_name(&secret.name);
                debug!(name = %secret.name, key = %key, "Resolved secret");
                resolved.push((key, value));
            }
        }

        info!(endpoint, count = resolved.len(), "Loaded secrets from secret store");
        Ok(resolved)
    }
}

fn secret_store_failure(endpoint: &str, source: StoreError) -> ResolveError {
    let err = ResolveError::secret_store(endpoint, source);
    if err.is_auth() {
        error!(
            endpoint,
            error = %err,
            "Cannot access the secret store. Grant the application identity 'list' and 'get' \
             permissions on secrets (for example the Key Vault Secrets User role)"
        );
    } else {
        error!(endpoint, error = %err, "Secret store request failed");
    }
    err
}
