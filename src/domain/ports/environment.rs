use std::collections::BTreeMap;

use crate::domain::error::EnvironmentError;

/// String-keyed namespace that every configuration source writes into
///
/// Keys are case-sensitive and values are always strings. The production
/// implementation is bound to the process environment; tests substitute an
/// in-memory map.
pub trait EnvironmentStore: Send {
    /// Current value for `key`, if set
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key`, replacing any existing value
    ///
    /// Pairs the process environment cannot hold (see
    /// [`EnvironmentError::check`]) are rejected and leave the store unchanged.
    fn set(&mut self, key: &str, value: &str) -> Result<(), EnvironmentError>;

    /// Whether `key` is set (an empty value still counts as set)
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Copy of every key/value pair, ordered by key
    fn snapshot(&self) -> BTreeMap<String, String>;
}
