use async_trait::async_trait;

use crate::domain::error::StoreError;
use crate::domain::models::AccessToken;

/// Source of bearer tokens for remote stores
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Token valid for `scope` (for example `https://vault.azure.net/.default`)
    async fn get_token(&self, scope: &str) -> Result<AccessToken, StoreError>;
}
