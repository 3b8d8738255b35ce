use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::domain::error::StoreError;
use crate::domain::models::SecretProperties;

/// Lazily fetched pages of a remote listing
///
/// Each item is one page; the next page is only requested once the consumer
/// polls for it.
pub type PageStream<'a, T> = BoxStream<'a, Result<Vec<T>, StoreError>>;

/// Remote secret store (one vault)
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Vault endpoint, used in errors and logs
    fn endpoint(&self) -> &str;

    /// Enumerate secret names page by page
    fn list_secrets(&self) -> PageStream<'_, SecretProperties>;

    /// Current value of a single secret
    async fn get_secret(&self, name: &str) -> Result<String, StoreError>;
}

/// Builds secret store clients for vaults named by secret references
pub trait SecretStoreFactory: Send + Sync {
    fn for_vault(&self, vault_url: &str) -> Result<Arc<dyn SecretStore>, StoreError>;
}
