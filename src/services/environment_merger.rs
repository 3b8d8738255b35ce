//! Precedence-ordered merge of all sources into the environment

use tracing::{debug, info, warn};

use crate::domain::error::ResolveError;
use crate::domain::models::{RuntimeMode, SourcePolicy};
use crate::domain::ports::EnvironmentStore;

use super::config_source::ConfigStoreSource;
use super::local_source::{LocalSourceLoader, LocalSourceSummary};
use super::secret_source::SecretStoreSource;

/// What a merge wrote into the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Mode the merge ran in
    pub mode: RuntimeMode,
    /// Set when the local file was consulted
    pub local: Option<LocalSourceSummary>,
    /// Keys written from the secret store
    pub secret_store_keys: usize,
    /// Keys written from the config store
    pub config_store_keys: usize,
}

/// Applies the source precedence for the current runtime mode
///
/// Production: secret store (only with `SecretStoreThenConfigStore`), then
/// config store, each pair overwriting in iteration order. Development: the
/// local file only, never overwriting.
pub struct EnvironmentMerger {
    mode: RuntimeMode,
    policy: SourcePolicy,
    local: LocalSourceLoader,
    secrets: SecretStoreSource,
    config: ConfigStoreSource,
}

impl EnvironmentMerger {
    /// Merger for `mode`; the remote sources are only consulted in production
    pub fn new(
        mode: RuntimeMode,
        policy: SourcePolicy,
        local: LocalSourceLoader,
        secrets: SecretStoreSource,
        config: ConfigStoreSource,
    ) -> Self {
        Self {
            mode,
            policy,
            local,
            secrets,
            config,
        }
    }

    /// Runtime mode the merger was built for
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Populate `env` from every applicable source
    pub async fn resolve_environment(
        &self,
        env: &mut dyn EnvironmentStore,
    ) -> Result<MergeSummary, ResolveError> {
        let mut summary = MergeSummary {
            mode: self.mode,
            local: None,
            secret_store_keys: 0,
            config_store_keys: 0,
        };

        if !self.mode.is_production() {
            info!(mode = %self.mode, path = %self.local.path().display(), "Resolving from local sources");
            summary.local = Some(self.local.load(env));
            return Ok(summary);
        }

        info!(mode = %self.mode, policy = ?self.policy, "Resolving from remote sources");

        if self.policy.merges_secret_store() {
            let secrets = self.secrets.list_and_resolve_all().await?;
            summary.secret_store_keys = write_all(env, secrets, "secret_store");
        }

        let settings = self.config.list_and_resolve_all().await?;
        summary.config_store_keys = write_all(env, settings, "config_store");

        info!(
            secret_store_keys = summary.secret_store_keys,
            config_store_keys = summary.config_store_keys,
            "Environment populated"
        );
        Ok(summary)
    }
}

/// Overwrite every pair in order; values are never logged
///
/// Pairs the environment rejects are skipped with a warning. Returns the
/// number of keys written.
fn write_all(env: &mut dyn EnvironmentStore, pairs: Vec<(String, String)>, source: &str) -> usize {
    let mut written = 0;
    for (key, value) in pairs {
        let replaced = env.has(&key);
        match env.set(&key, &value) {
            Ok(()) => {
                written += 1;
                debug!(key = %key, source, replaced, "Set environment variable");
            }
            Err(e) => {
                warn!(key = %key, source, error = %e, "Skipping setting the environment cannot hold");
            }
        }
    }
    written
}
