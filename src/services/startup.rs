//! One-shot startup resolution

use tracing::{error, info};

use crate::domain::error::ResolveError;
use crate::domain::models::ResolvedConfig;
use crate::domain::ports::EnvironmentStore;

use super::config_extractor::ConfigExtractor;
use super::environment_merger::EnvironmentMerger;

/// Progress of the startup resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    /// Nothing has run yet, or the last run failed
    Uninitialized,
    /// Sources merged; extraction pending
    SourcesPopulated,
    /// Configuration extracted; further runs are rejected
    Extracted,
}

/// Drives `Uninitialized -> SourcesPopulated -> Extracted` exactly once
///
/// A fatal merge error leaves the pipeline `Uninitialized` and the
/// extractor is not invoked.
pub struct StartupPipeline {
    merger: EnvironmentMerger,
    extractor: Box<dyn ConfigExtractor>,
    state: StartupState,
}

impl StartupPipeline {
    /// Pipeline in the `Uninitialized` state
    pub fn new(merger: EnvironmentMerger, extractor: Box<dyn ConfigExtractor>) -> Self {
        Self {
            merger,
            extractor,
            state: StartupState::Uninitialized,
        }
    }

    /// Current state
    pub const fn state(&self) -> StartupState {
        self.state
    }

    /// Populate `env` from all sources and extract the typed configuration
    pub async fn run(
        &mut self,
        env: &mut dyn EnvironmentStore,
    ) -> Result<ResolvedConfig, ResolveError> {
        if self.state != StartupState::Uninitialized {
            return Err(ResolveError::AlreadyResolved);
        }

        let summary = self.merger.resolve_environment(env).await.inspect_err(|e| {
            error!(error = %e, "Configuration resolution failed");
        })?;
        self.state = StartupState::SourcesPopulated;

        let config = self.extractor.extract(&*env);
        self.state = StartupState::Extracted;

        info!(
            mode = %summary.mode,
            secret_store_keys = summary.secret_store_keys,
            config_store_keys = summary.config_store_keys,
            local_keys = summary.local.map_or(0, |local| local.applied),
            "Configuration resolved"
        );
        Ok(config)
    }
}
