//! Environment store implementations
//!
//! - `ProcessEnvironment`: the real process environment
//! - `InMemoryEnvironment`: isolated map for tests and dry runs

use std::collections::{BTreeMap, HashMap};
use std::env;

use crate::domain::error::EnvironmentError;
use crate::domain::ports::EnvironmentStore;

/// Environment store bound to the process environment
///
/// Only one instance should be created, at startup, before any other thread
/// reads the environment.
#[derive(Debug, Default)]
pub struct ProcessEnvironment {
    _private: (),
}

impl ProcessEnvironment {
    /// Handle on the current process environment
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnvironmentStore for ProcessEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        EnvironmentError::check(key, value)?;
        env::set_var(key, value);
        Ok(())
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }
}

/// Environment store backed by a plain map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryEnvironment {
    vars: HashMap<String, String>,
}

impl InMemoryEnvironment {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with pre-set variables
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of keys set
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no key is set
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvironmentStore for InMemoryEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        EnvironmentError::check(key, value)?;
        self.vars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_set_overwrites() {
        let mut env = InMemoryEnvironment::with_vars([("A", "1")]);
        assert!(env.has("A"));
        env.set("A", "2").unwrap();
        assert_eq!(env.get("A").as_deref(), Some("2"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_in_memory_keys_are_case_sensitive() {
        let env = InMemoryEnvironment::with_vars([("Key", "v")]);
        assert!(env.has("Key"));
        assert!(!env.has("KEY"));
    }

    #[test]
    fn test_empty_value_counts_as_set() {
        let env = InMemoryEnvironment::with_vars([("EMPTY", "")]);
        assert!(env.has("EMPTY"));
    }

    #[test]
    fn test_in_memory_rejects_what_the_process_cannot_hold() {
        let mut env = InMemoryEnvironment::new();
        assert!(matches!(
            env.set("Feature=Beta", "on"),
            Err(EnvironmentError::InvalidKey(_))
        ));
        assert!(env.is_empty());
    }

    #[test]
    fn test_process_environment_rejects_invalid_pairs_without_panicking() {
        let mut env = ProcessEnvironment::new();

        assert_eq!(
            env.set("Feature=Beta", "on"),
            Err(EnvironmentError::InvalidKey("Feature=Beta".to_string()))
        );
        assert!(matches!(env.set("", "on"), Err(EnvironmentError::InvalidKey(_))));
        assert!(matches!(
            env.set("ENVCASCADE_NUL_VALUE_TEST", "a\0b"),
            Err(EnvironmentError::InvalidValue(_))
        ));
        assert!(!env.has("ENVCASCADE_NUL_VALUE_TEST"));
    }

    #[test]
    fn test_process_environment_roundtrip() {
        temp_env::with_var_unset("ENVCASCADE_PROCESS_ENV_TEST", || {
            let mut env = ProcessEnvironment::new();
            assert!(!env.has("ENVCASCADE_PROCESS_ENV_TEST"));

            env.set("ENVCASCADE_PROCESS_ENV_TEST", "value").unwrap();
            assert_eq!(
                env.get("ENVCASCADE_PROCESS_ENV_TEST").as_deref(),
                Some("value")
            );
            assert_eq!(
                env.snapshot().get("ENVCASCADE_PROCESS_ENV_TEST").map(String::as_str),
                Some("value")
            );
        });
    }
}
