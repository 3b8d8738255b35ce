//! Key Vault REST adapter

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

use super::http::{map_transport_error, normalize_endpoint, read_json};
use super::retry::RetryPolicy;
use super::types::{SecretBundle, SecretListPage};
use crate::domain::error::StoreError;
use crate::domain::models::SecretProperties;
use crate::domain::ports::{PageStream, SecretStore, SecretStoreFactory, TokenCredential};

/// OAuth scope for the Key Vault data plane
pub const KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Key Vault REST API version
pub const KEY_VAULT_API_VERSION: &str = "7.4";

const LIST_PAGE_SIZE: u32 = 25;

/// Client for one vault
///
/// Listing follows `nextLink` one page at a time. Every request carries a
/// bearer token for `KEY_VAULT_SCOPE` and a fresh `x-ms-client-request-id`.
pub struct KeyVaultClient {
    http_client: ReqwestClient,
    vault_url: String,
    credential: Arc<dyn TokenCredential>,
    retry_policy: RetryPolicy,
}

impl KeyVaultClient {
    /// Client for the vault at `vault_url`
    pub fn new(
        http_client: ReqwestClient,
        vault_url: &str,
        credential: Arc<dyn TokenCredential>,
        retry_policy: RetryPolicy,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            http_client,
            vault_url: normalize_endpoint(vault_url)?,
            credential,
            retry_policy,
        })
    }

    fn first_page_url(&self) -> String {
        format!(
            "{}/secrets?api-version={KEY_VAULT_API_VERSION}&maxresults={LIST_PAGE_SIZE}",
            self.vault_url
        )
    }

    async fn send_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        let token = self.credential.get_token(KEY_VAULT_SCOPE).await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token.token)
            .header("x-ms-client-request-id", Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        read_json(response).await
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        self.retry_policy.execute(|| self.send_get(url)).await
    }
}

#[async_trait]
impl SecretStore for KeyVaultClient {
    fn endpoint(&self) -> &str {
        &self.vault_url
    }

    fn list_secrets(&self) -> PageStream<'_, SecretProperties> {
        stream::try_unfold(Some(self.first_page_url()), move |next| async move {
            let Some(url) = next else {
                return Ok::<_, StoreError>(None);
            };

            let page: SecretListPage = self.fetch(&url).await?;
            let secrets: Vec<SecretProperties> = page
                .value
                .into_iter()
                .filter_map(|item| SecretProperties::from_id(&item.id, item.attributes.enabled))
                .collect();
            let next = page.next_link.filter(|link| !link.is_empty());

            Ok(Some((secrets, next)))
        })
        .boxed()
    }

    async fn get_secret(&self, name: &str) -> Result<String, StoreError> {
        let url = format!(
            "{}/secrets/{name}?api-version={KEY_VAULT_API_VERSION}",
            self.vault_url
        );
        let bundle: SecretBundle = self.fetch(&url).await?;

        bundle
            .value
            .ok_or_else(|| StoreError::Decode(format!("Secret '{name}' has no value")))
    }
}

/// Builds `KeyVaultClient`s that share one HTTP pool and credential
pub struct KeyVaultClientFactory {
    http_client: ReqwestClient,
    credential: Arc<dyn TokenCredential>,
    retry_policy: RetryPolicy,
}

impl KeyVaultClientFactory {
    /// Factory sharing one http client, credential and retry policy
    pub fn new(
        http_client: ReqwestClient,
        credential: Arc<dyn TokenCredential>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            credential,
            retry_policy,
        }
    }
}

impl SecretStoreFactory for KeyVaultClientFactory {
    fn for_vault(&self, vault_url: &str) -> Result<Arc<dyn SecretStore>, StoreError> {
        let client = KeyVaultClient::new(
            self.http_client.clone(),
            vault_url,
            Arc::clone(&self.credential),
            self.retry_policy.clone(),
        )?;
        Ok(Arc::new(client))
    }
}
