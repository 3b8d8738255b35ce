//! Azure REST adapters driven end to end against mock servers

mod common;

use std::sync::Arc;
use std::time::Duration;

use envcascade::domain::ports::{ConfigStore, SecretStore, SecretStoreFactory};
use envcascade::infrastructure::azure::{
    build_http_client, AppConfigClient, ClientSecretCredential, KeyVaultClient, RetryPolicy,
    StaticTokenCredential,
};
use envcascade::infrastructure::environment::InMemoryEnvironment;
use envcascade::infrastructure::memory::{InMemorySecretStore, InMemorySecretStoreFactory};
use envcascade::services::{
    ConfigStoreSource, EnvironmentMerger, LocalSourceLoader, SecretStoreSource,
};
use envcascade::{
    EnvironmentStore, ResolveError, RuntimeMode, SchemaExtractor, SourcePolicy, StartupPipeline,
    TokenCredential,
};
use mockito::{Matcher, Server};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(2, 1, 5, Duration::from_secs(5))
}

fn pipeline(
    vault: Option<Arc<dyn SecretStore>>,
    store: Option<Arc<dyn ConfigStore>>,
    referenced: Arc<dyn SecretStoreFactory>,
) -> StartupPipeline {
    let dir = std::env::temp_dir().join("envcascade-remote-tests");
    StartupPipeline::new(
        EnvironmentMerger::new(
            RuntimeMode::Production,
            SourcePolicy::SecretStoreThenConfigStore,
            LocalSourceLoader::new(dir.join(".env")),
            SecretStoreSource::new(vault),
            ConfigStoreSource::new(store, referenced),
        ),
        Box::new(SchemaExtractor::new()),
    )
}

#[tokio::test]
async fn test_resolves_from_both_stores() {
    common::setup_test_logging();
    let mut vault_server = Server::new_async().await;
    let mut config_server = Server::new_async().await;
    let vault_url = vault_server.url();

    let _list = vault_server
        .mock("GET", "/secrets")
        .match_query(Matcher::UrlEncoded("api-version".into(), "7.4".into()))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "value": [{"id": format!("{vault_url}/secrets/AZURE-COSMOS-DATABASE-NAME")}],
                "nextLink": null
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _get = vault_server
        .mock("GET", "/secrets/AZURE-COSMOS-DATABASE-NAME")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"value":"FromVault"}"#)
        .create_async()
        .await;

    let _kv = config_server
        .mock("GET", "/kv")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer token-123")
        .with_status(200)
        .with_body(
            serde_json::json!({
                "items": [
                    {"key": "APPLICATIONINSIGHTS_ROLE_NAME", "value": "api"},
                    {
                        "key": "AZURE_COSMOS_CONNECTION_STRING",
                        "value": "{\"uri\":\"https://refvault.vault.azure.net/secrets/cosmos\"}",
                        "content_type": "application/vnd.microsoft.appconfig.keyvaultref+json;charset=utf-8"
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let credential: Arc<dyn TokenCredential> = Arc::new(StaticTokenCredential::new("token-123"));
    let vault = KeyVaultClient::new(http.clone(), &vault_url, Arc::clone(&credential), fast_retry())
        .unwrap();
    let store =
        AppConfigClient::new(http, &config_server.url(), credential, fast_retry()).unwrap();
    let referenced = InMemorySecretStoreFactory::new().with_vault(Arc::new(
        InMemorySecretStore::new("https://refvault.vault.azure.net")
            .with_secret("cosmos", "AccountEndpoint=https://cosmos/"),
    ));

    let mut pipeline = pipeline(
        Some(Arc::new(vault)),
        Some(Arc::new(store)),
        Arc::new(referenced),
    );
    let mut env = InMemoryEnvironment::new();
    let config = pipeline.run(&mut env).await.unwrap();

    assert_eq!(config.database.database_name, "FromVault");
    assert_eq!(config.database.connection_string, "AccountEndpoint=https://cosmos/");
    assert_eq!(config.observability.role_name, "api");
    assert_eq!(
        env.get("AZURE_COSMOS_DATABASE_NAME").as_deref(),
        Some("FromVault")
    );
}

#[tokio::test]
async fn test_throttled_listing_is_retried() {
    let mut server = Server::new_async().await;
    let throttled = server
        .mock("GET", "/kv")
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let store = AppConfigClient::new(
        http,
        &server.url(),
        Arc::new(StaticTokenCredential::new("t")),
        fast_retry(),
    )
    .unwrap();

    let ok = server
        .mock("GET", "/kv")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items":[{"key":"K","value":"V"}]}"#)
        .create_async()
        .await;

    let source = ConfigStoreSource::new(
        Some(Arc::new(store)),
        Arc::new(InMemorySecretStoreFactory::new()),
    );
    let pairs = source.list_and_resolve_all().await.unwrap();

    assert_eq!(pairs, vec![("K".to_string(), "V".to_string())]);
    throttled.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_rejected_service_principal_aborts_resolution() {
    let mut login = Server::new_async().await;
    let _token = login
        .mock("POST", "/tenant-1/oauth2/v2.0/token")
        .with_status(401)
        .with_body(r#"{"error":"invalid_client"}"#)
        .create_async()
        .await;

    let mut config_server = Server::new_async().await;
    let kv = config_server
        .mock("GET", "/kv")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let credential: Arc<dyn TokenCredential> = Arc::new(
        ClientSecretCredential::new(http.clone(), "tenant-1", "client-1", "wrong", fast_retry())
            .with_authority_host(login.url()),
    );
    let store = AppConfigClient::new(http, &config_server.url(), credential, fast_retry()).unwrap();

    let mut pipeline = pipeline(
        None,
        Some(Arc::new(store)),
        Arc::new(InMemorySecretStoreFactory::new()),
    );
    let mut env = InMemoryEnvironment::new();
    let err = pipeline.run(&mut env).await.unwrap_err();

    assert!(matches!(err, ResolveError::ConfigStoreAuth { .. }));
    kv.assert_async().await;
}
