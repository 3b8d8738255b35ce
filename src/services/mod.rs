//! Resolution services
//!
//! Sources feed the `EnvironmentMerger`, which `StartupPipeline` runs once
//! before handing the populated environment to a `ConfigExtractor`.

pub mod config_extractor;
pub mod config_source;
pub mod environment_merger;
pub mod local_source;
pub mod secret_source;
pub mod startup;

pub use config_extractor::{missing_required, ConfigExtractor, SchemaExtractor};
pub use config_source::ConfigStoreSource;
pub use environment_merger::{EnvironmentMerger, MergeSummary};
pub use local_source::{LineError, LocalSourceLoader, LocalSourceSummary};
pub use secret_source::SecretStoreSource;
pub use startup::{StartupPipeline, StartupState};
