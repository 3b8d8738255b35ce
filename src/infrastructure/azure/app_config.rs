//! App Configuration REST adapter

use futures::stream::{self, StreamExt};
use reqwest::{Client as ReqwestClient, Url};
use std::sync::Arc;
use uuid::Uuid;

use super::http::{map_transport_error, normalize_endpoint, read_json};
use super::retry::RetryPolicy;
use super::types::{KeyValueItem, KeyValuePage};
use crate::domain::error::StoreError;
use crate::domain::models::ConfigurationSetting;
use crate::domain::ports::{ConfigStore, PageStream, TokenCredential};

/// OAuth scope for the App Configuration data plane
pub const APP_CONFIG_SCOPE: &str = "https://azconfig.io/.default";

/// App Configuration REST API version
pub const APP_CONFIG_API_VERSION: &str = "1.0";

const KV_SET_ACCEPT: &str = "application/vnd.microsoft.appconfig.kvset+json, application/problem+json";

/// Client for one App Configuration store
///
/// Lists `/kv` and follows the relative `@nextLink` until exhausted.
pub struct AppConfigClient {
    http_client: ReqwestClient,
    endpoint: String,
    base_url: Url,
    credential: Arc<dyn TokenCredential>,
    retry_policy: RetryPolicy,
    label_filter: Option<String>,
}

impl AppConfigClient {
    /// Client for the store at `endpoint`
    pub fn new(
        http_client: ReqwestClient,
        endpoint: &str,
        credential: Arc<dyn TokenCredential>,
        retry_policy: RetryPolicy,
    ) -> Result<Self, StoreError> {
        let endpoint = normalize_endpoint(endpoint)?;
        let base_url =
            Url::parse(&endpoint).map_err(|_| StoreError::InvalidEndpoint(endpoint.clone()))?;

        Ok(Self {
            http_client,
            endpoint,
            base_url,
            credential,
            retry_policy,
            label_filter: None,
        })
    }

    /// Only list settings carrying this label
    #[must_use]
    pub fn with_label_filter(mut self, label: Option<String>) -> Self {
        self.label_filter = label.filter(|l| !l.is_empty());
        self
    }

    fn first_page_url(&self) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join("/kv")
            .map_err(|_| StoreError::InvalidEndpoint(self.endpoint.clone()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", APP_CONFIG_API_VERSION);
            if let Some(label) = &self.label_filter {
                query.append_pair("label", label);
            }
        }
        Ok(url)
    }

    /// `@nextLink` is relative to the store endpoint
    fn resolve_next_link(&self, link: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(link)
            .map_err(|e| StoreError::Decode(format!("Invalid @nextLink '{link}': {e}")))
    }

    async fn send_get(&self, url: &Url) -> Result<KeyValuePage, StoreError> {
        let token = self.credential.get_token(APP_CONFIG_SCOPE).await?;

        let response = self
            .http_client
            .get(url.clone())
            .bearer_auth(&token.token)
            .header("Accept", KV_SET_ACCEPT)
            .header("x-ms-client-request-id", Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        read_json(response).await
    }

    async fn fetch_page(&self, url: &Url) -> Result<KeyValuePage, StoreError> {
        self.retry_policy.execute(|| self.send_get(url)).await
    }
}

impl From<KeyValueItem> for ConfigurationSetting {
    fn from(item: KeyValueItem) -> Self {
        Self {
            key: item.key,
            value: item.value.unwrap_or_default(),
            content_type: item.content_type.filter(|ct| !ct.is_empty()),
            label: item.label,
        }
    }
}

impl ConfigStore for AppConfigClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn list_settings(&self) -> PageStream<'_, ConfigurationSetting> {
        let first = self.first_page_url();

        stream::try_unfold(Some(first), move |next| async move {
            let url = match next {
                None => return Ok::<_, StoreError>(None),
                Some(url) => url?,
            };

            let page = self.fetch_page(&url).await?;
            let settings: Vec<ConfigurationSetting> =
                page.items.into_iter().map(ConfigurationSetting::from).collect();
            let next = page
                .next_link
                .filter(|link| !link.is_empty())
                .map(|link| self.resolve_next_link(&link));

            Ok(Some((settings, next)))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::azure::credential::StaticTokenCredential;
    use futures::TryStreamExt;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn client_for(url: &str) -> AppConfigClient {
        AppConfigClient::new(
            ReqwestClient::new(),
            url,
            Arc::new(StaticTokenCredential::new("ac-token")),
            RetryPolicy::new(0, 1, 1, Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_settings_follows_relative_next_link() {
        let mut server = Server::new_async().await;

        let first = server
            .mock("GET", "/kv")
            .match_query(Matcher::Exact("api-version=1.0".into()))
            .match_header("authorization", "Bearer ac-token")
            .with_status(200)
            .with_header("content-type", "application/vnd.microsoft.appconfig.kvset+json")
            .with_body(
                r#"{"items":[
                    {"key":"AZURE_COSMOS_DATABASE_NAME","value":"Todo","label":null,"content_type":""},
                    {"key":"EMPTY","value":null}
                ],"@nextLink":"/kv?api-version=1.0&after=RU1QVFk="}"#,
            )
            .create_async()
            .await;

        let second = server
            .mock("GET", "/kv")
            .match_query(Matcher::UrlEncoded("after".into(), "RU1QVFk=".into()))
            .with_status(200)
            .with_body(
                r#"{"items":[{"key":"DB","value":"{\"uri\":\"https://v.vault.azure.net/secrets/db\"}","content_type":"application/vnd.microsoft.appconfig.keyvaultref+json;charset=utf-8"}]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let pages: Vec<Vec<ConfigurationSetting>> =
            client.list_settings().try_collect().await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0][0].key, "AZURE_COSMOS_DATABASE_NAME");
        assert_eq!(pages[0][0].value, "Todo");
        assert!(pages[0][0].content_type.is_none());
        assert_eq!(pages[0][1].value, "");
        assert!(pages[1][0].is_reference());
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_label_filter_is_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/kv")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api-version".into(), "1.0".into()),
                Matcher::UrlEncoded("label".into(), "prod".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"items":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url()).with_label_filter(Some("prod".into()));
        let pages: Vec<Vec<ConfigurationSetting>> =
            client.list_settings().try_collect().await.unwrap();

        assert_eq!(pages, vec![Vec::<ConfigurationSetting>::new()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/kv")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"type":"https://azconfig.io/errors/invalid-token"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.list_settings().try_next().await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized(_)));
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let result = AppConfigClient::new(
            ReqwestClient::new(),
            "myconfig.azconfig.io",
            Arc::new(StaticTokenCredential::new("t")),
            RetryPolicy::default(),
        );
        assert!(matches!(result, Err(StoreError::InvalidEndpoint(_))));
    }
}
