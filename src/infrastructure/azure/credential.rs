//! Credentials for Azure resource scopes
//!
//! - `ClientSecretCredential`: service principal (tenant, client id, secret)
//! - `ManagedIdentityCredential`: App Service identity endpoint or IMDS
//! - `StaticTokenCredential`: fixed token, for tests and tooling
//! - `DefaultCredential`: picks one of the above from the resolver settings

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::{Client as ReqwestClient, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

use super::http::map_transport_error;
use super::retry::RetryPolicy;
use crate::domain::error::StoreError;
use crate::domain::models::AccessToken;
use crate::domain::ports::TokenCredential;
use crate::infrastructure::config::IdentitySettings;

/// Azure Instance Metadata Service token endpoint
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Token endpoint response (AAD v2, IMDS and App Service shapes)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
    #[serde(default)]
    expires_on: Option<Value>,
}

impl TokenResponse {
    fn into_access_token(self, now: DateTime<Utc>) -> AccessToken {
        let expires_on = self
            .expires_on
            .as_ref()
            .and_then(seconds_from_value)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                self.expires_in
                    .as_ref()
                    .and_then(seconds_from_value)
                    .map(|secs| now + ChronoDuration::seconds(secs))
            })
            .unwrap_or_else(|| now + ChronoDuration::seconds(AccessToken::REFRESH_MARGIN_SECS * 2));

        AccessToken::new(self.access_token, expires_on)
    }
}

/// Token endpoints report seconds either as numbers or numeric strings
fn seconds_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Managed identity endpoints take a resource rather than a scope
fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

/// Per-scope token cache
#[derive(Debug, Default)]
struct TokenCache {
    tokens: Mutex<HashMap<String, AccessToken>>,
}

impl TokenCache {
    async fn get_or_fetch<F, Fut>(&self, scope: &str, fetch: F) -> Result<AccessToken, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, StoreError>>,
    {
        let mut tokens = self.tokens.lock().await;
        if let Some(token) = tokens.get(scope) {
            if token.is_fresh_at(Utc::now()) {
                return Ok(token.clone());
            }
        }

        let token = fetch().await?;
        tokens.insert(scope.to_string(), token.clone());
        Ok(token)
    }
}

/// Token endpoint failures: 4xx means the identity itself is unusable
async fn read_token(response: reqwest::Response) -> Result<AccessToken, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        return Err(if status.is_client_error() && status.as_u16() != 429 {
            StoreError::Credential(format!("HTTP {status}: {body}"))
        } else {
            StoreError::from_status(status.as_u16(), body)
        });
    }

    let parsed: TokenResponse = response
        .json()
        .await
        .map_err(|e| StoreError::Credential(format!("Malformed token response: {e}")))?;
    Ok(parsed.into_access_token(Utc::now()))
}

/// Service principal credential using the client credentials grant
pub struct ClientSecretCredential {
    http_client: ReqwestClient,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    retry_policy: RetryPolicy,
    cache: TokenCache,
}

impl ClientSecretCredential {
    /// Service principal credential for `tenant_id`
    pub fn new(
        http_client: ReqwestClient,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            retry_policy,
            cache: TokenCache::default(),
        }
    }

    /// Override the login authority (sovereign clouds, tests)
    #[must_use]
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into().trim_end_matches('/').to_string();
        self
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken, StoreError> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.authority_host, self.tenant_id);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;
        read_token(response).await
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, StoreError> {
        self.cache
            .get_or_fetch(scope, || {
                debug!(scope, client_id = %self.client_id, "requesting service principal token");
                self.retry_policy.execute(|| self.request_token(scope))
            })
            .await
    }
}

/// Where a managed identity token is requested from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedIdentitySource {
    /// Instance Metadata Service (VMs, AKS, Container Apps)
    Imds { endpoint: String },

    /// App Service / Functions identity endpoint
    AppService { endpoint: String, header: String },
}

/// System- or user-assigned managed identity
pub struct ManagedIdentityCredential {
    http_client: ReqwestClient,
    source: ManagedIdentitySource,
    client_id: Option<String>,
    retry_policy: RetryPolicy,
    cache: TokenCache,
}

impl ManagedIdentityCredential {
    /// Managed identity credential; `client_id` selects a user-assigned identity
    pub fn new(
        http_client: ReqwestClient,
        source: ManagedIdentitySource,
        client_id: Option<String>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            source,
            client_id: client_id.filter(|id| !id.trim().is_empty()),
            retry_policy,
            cache: TokenCache::default(),
        }
    }

    /// Endpoint flavour tokens are requested from
    pub const fn source(&self) -> &ManagedIdentitySource {
        &self.source
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken, StoreError> {
        let resource = scope_to_resource(scope);
        let (endpoint, api_version) = match &self.source {
            ManagedIdentitySource::Imds { endpoint } => (endpoint.as_str(), IMDS_API_VERSION),
            ManagedIdentitySource::AppService { endpoint, .. } => {
                (endpoint.as_str(), APP_SERVICE_API_VERSION)
            }
        };

        let mut url = Url::parse(endpoint).map_err(|_| {
            StoreError::Credential(format!("Invalid managed identity endpoint '{endpoint}'"))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", api_version);
            query.append_pair("resource", resource);
            if let Some(client_id) = &self.client_id {
                query.append_pair("client_id", client_id);
            }
        }

        let request = match &self.source {
            ManagedIdentitySource::Imds { .. } => {
                self.http_client.get(url).header("Metadata", "true")
            }
            ManagedIdentitySource::AppService { header, .. } => {
                self.http_client.get(url).header("X-IDENTITY-HEADER", header)
            }
        };

        let response = request.send().await.map_err(|e| match map_transport_error(&e) {
            StoreError::Network(msg) => {
                StoreError::Credential(format!("Managed identity endpoint unreachable: {msg}"))
            }
            other => other,
        })?;
        read_token(response).await
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, StoreError> {
        self.cache
            .get_or_fetch(scope, || {
                debug!(scope, source = ?self.source, "requesting managed identity token");
                self.retry_policy.execute(|| self.request_token(scope))
            })
            .await
    }
}

/// Credential that always returns the same token
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    /// Credential that always returns `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, StoreError> {
        Ok(AccessToken::new(
            self.token.clone(),
            Utc::now() + ChronoDuration::hours(24),
        ))
    }
}

/// Credential chosen from the configured identity
///
/// A complete service principal (tenant, client id, secret) wins; otherwise
/// the managed identity is used, with the client id selecting a
/// user-assigned identity.
pub enum DefaultCredential {
    /// Tenant, client id and secret are all set
    ClientSecret(ClientSecretCredential),
    /// Managed identity, the fallback
    ManagedIdentity(ManagedIdentityCredential),
}

impl DefaultCredential {
    /// Pick the credential the identity settings describe
    pub fn from_settings(
        identity: &IdentitySettings,
        http_client: ReqwestClient,
        retry_policy: RetryPolicy,
    ) -> Self {
        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            identity.tenant_id.as_deref(),
            identity.client_id.as_deref(),
            identity.client_secret.as_deref(),
        ) {
            debug!(tenant_id, client_id, "using service principal credential");
            return Self::ClientSecret(ClientSecretCredential::new(
                http_client,
                tenant_id,
                client_id,
                client_secret,
                retry_policy,
            ));
        }

        let source = match (
            identity.identity_endpoint.as_deref(),
            identity.identity_header.as_deref(),
        ) {
            (Some(endpoint), Some(header)) => ManagedIdentitySource::AppService {
                endpoint: endpoint.to_string(),
                header: header.to_string(),
            },
            _ => ManagedIdentitySource::Imds {
                endpoint: IMDS_ENDPOINT.to_string(),
            },
        };
        debug!(?source, client_id = ?identity.client_id, "using managed identity credential");

        Self::ManagedIdentity(ManagedIdentityCredential::new(
            http_client,
            source,
            identity.client_id.clone(),
            retry_policy,
        ))
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, StoreError> {
        match self {
            Self::ClientSecret(credential) => credential.get_token(scope).await,
            Self::ManagedIdentity(credential) => credential.get_token(scope).await,
        }
    }
}
