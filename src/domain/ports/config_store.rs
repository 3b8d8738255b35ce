use crate::domain::models::ConfigurationSetting;

use super::secret_store::PageStream;

/// Remote key/value configuration store
pub trait ConfigStore: Send + Sync {
    /// Store endpoint, used in errors and logs
    fn endpoint(&self) -> &str;

    /// Enumerate every setting page by page
    fn list_settings(&self) -> PageStream<'_, ConfigurationSetting>;
}
