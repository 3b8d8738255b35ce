//! Wiring from resolver settings to a ready `StartupPipeline`

use std::sync::Arc;
use tracing::debug;

use crate::domain::error::ResolveError;
use crate::domain::ports::{ConfigStore, SecretStore, SecretStoreFactory, TokenCredential};
use crate::infrastructure::azure::{
    build_http_client, AppConfigClient, DefaultCredential, KeyVaultClient, KeyVaultClientFactory,
};
use crate::infrastructure::config::ResolverSettings;
use crate::services::{
    ConfigStoreSource, EnvironmentMerger, LocalSourceLoader, SchemaExtractor, SecretStoreSource,
    StartupPipeline,
};

/// Build the pipeline with Azure-backed stores for every configured endpoint
///
/// Clients are only constructed here; no remote call happens until the
/// pipeline runs.
pub fn build_pipeline(settings: &ResolverSettings) -> Result<StartupPipeline, ResolveError> {
    let retry_policy = settings.remote.retry_policy();
    let endpoint_for_errors = settings
        .app_config_endpoint
        .clone()
        .or_else(|| settings.key_vault_endpoint.clone())
        .unwrap_or_default();

    let http_client = build_http_client(settings.remote.timeout())
        .map_err(|e| ResolveError::config_store(&endpoint_for_errors, e))?;

    let credential: Arc<dyn TokenCredential> = Arc::new(DefaultCredential::from_settings(
        &settings.identity,
        http_client.clone(),
        retry_policy.clone(),
    ));

    let secret_store = settings
        .key_vault_endpoint
        .as_deref()
        .map(|endpoint| {
            KeyVaultClient::new(
                http_client.clone(),
                endpoint,
                Arc::clone(&credential),
                retry_policy.clone(),
            )
            .map(|client| Arc::new(client) as Arc<dyn SecretStore>)
            .map_err(|e| ResolveError::secret_store(endpoint, e))
        })
        .transpose()?;

    let config_store = settings
        .app_config_endpoint
        .as_deref()
        .map(|endpoint| {
            AppConfigClient::new(
                http_client.clone(),
                endpoint,
                Arc::clone(&credential),
                retry_policy.clone(),
            )
            .map(|client| {
                Arc::new(client.with_label_filter(settings.label.clone())) as Arc<dyn ConfigStore>
            })
            .map_err(|e| ResolveError::config_store(endpoint, e))
        })
        .transpose()?;

    let vaults: Arc<dyn SecretStoreFactory> = Arc::new(KeyVaultClientFactory::new(
        http_client,
        credential,
        retry_policy,
    ));

    debug!(
        mode = %settings.runtime_mode(),
        secret_store = secret_store.is_some(),
        config_store = config_store.is_some(),
        "Building startup pipeline"
    );

    let merger = EnvironmentMerger::new(
        settings.runtime_mode(),
        settings.source_policy,
        LocalSourceLoader::new(&settings.env_file),
        SecretStoreSource::new(secret_store),
        ConfigStoreSource::new(config_store, vaults),
    );

    Ok(StartupPipeline::new(merger, Box::new(SchemaExtractor::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::environment::InMemoryEnvironment;
    use crate::services::StartupState;
    use std::io::Write;

    #[tokio::test]
    async fn test_development_pipeline_reads_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AZURE_COSMOS_DATABASE_NAME=Todo").unwrap();

        let settings = ResolverSettings {
            env_file: file.path().to_path_buf(),
            ..Default::default()
        };
        let mut pipeline = build_pipeline(&settings).unwrap();
        let mut env = InMemoryEnvironment::new();

        let config = pipeline.run(&mut env).await.unwrap();

        assert_eq!(config.database.database_name, "Todo");
        assert_eq!(pipeline.state(), StartupState::Extracted);
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let settings = ResolverSettings {
            key_vault_endpoint: Some("myvault".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_pipeline(&settings),
            Err(ResolveError::SecretStore { .. })
        ));
    }
}
