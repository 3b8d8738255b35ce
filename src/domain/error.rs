use thiserror::Error;

/// Failure of a single remote store call (token, page or secret fetch)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credential rejected (HTTP 401)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Identity lacks permission (HTTP 403)
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Secret or resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote store asked us to slow down (HTTP 429)
    #[error("Request throttled by remote store")]
    Throttled,

    /// Remote store failed (HTTP 5xx)
    #[error("Remote store error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// Any other unexpected status code
    #[error("Unexpected response (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },

    /// Per-call timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// Connection could not be established or was dropped
    #[error("Network error: {0}")]
    Network(String),

    /// No token could be obtained from the configured identity
    #[error("Credential unavailable: {0}")]
    Credential(String),

    /// Response body did not match the expected shape
    #[error("Invalid response payload: {0}")]
    Decode(String),

    /// Endpoint is not a usable URL
    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl StoreError {
    /// Map an HTTP status code and response body to an error variant
    ///
    /// - 401: Unauthorized
    /// - 403: Forbidden
    /// - 404: Not found
    /// - 429: Throttled
    /// - 5xx: Server error
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Unauthorized(body),
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            429 => Self::Throttled,
            500..=599 => Self::Server { status, body },
            _ => Self::Unexpected { status, body },
        }
    }

    /// Authentication, authorization and connectivity failures
    ///
    /// Timeouts count as connectivity failures.
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_)
                | Self::Forbidden(_)
                | Self::Timeout
                | Self::Network(_)
                | Self::Credential(_)
        )
    }

    /// Failures worth another attempt after backing off
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Throttled | Self::Server { .. } | Self::Network(_))
    }
}

/// Key/value pair the environment cannot hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Key is empty or contains `=` or a NUL byte
    #[error("Invalid environment variable name '{0}'")]
    InvalidKey(String),

    /// Value contains a NUL byte
    #[error("Value for environment variable '{0}' contains a NUL byte")]
    InvalidValue(String),
}

impl EnvironmentError {
    /// Check a pair against the rules every environment shares
    pub fn check(key: &str, value: &str) -> Result<(), Self> {
        if key.is_empty() || key.contains(['=', '\0']) {
            return Err(Self::InvalidKey(key.to_string()));
        }
        if value.contains('\0') {
            return Err(Self::InvalidValue(key.to_string()));
        }
        Ok(())
    }
}

/// Fatal errors that abort the startup resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Vault rejected the identity or could not be reached
    #[error("Secret store authentication failed at {endpoint}: {source}")]
    SecretStoreAuth { endpoint: String, source: StoreError },

    /// Any other vault failure
    #[error("Secret store request failed at {endpoint}: {source}")]
    SecretStore { endpoint: String, source: StoreError },

    /// Config store (or a referenced vault) rejected the identity
    #[error("Config store authentication failed at {endpoint}: {source}")]
    ConfigStoreAuth { endpoint: String, source: StoreError },

    /// Any other config store failure, including a missing referenced secret
    #[error("Config store request failed at {endpoint}: {source}")]
    ConfigStore { endpoint: String, source: StoreError },

    /// Setting tagged as a reference without a usable `uri`
    #[error("Setting '{key}' is a secret reference without a usable secret uri: {reason}")]
    SecretReferenceIncomplete { key: String, reason: String },

    /// The pipeline already completed once
    #[error("Configuration has already been resolved for this process")]
    AlreadyResolved,
}

impl ResolveError {
    /// Wrap a secret store failure, separating auth failures
    pub fn secret_store(endpoint: impl Into<String>, source: StoreError) -> Self {
        let endpoint = endpoint.into();
        if source.is_auth() {
            Self::SecretStoreAuth { endpoint, source }
        } else {
            Self::SecretStore { endpoint, source }
        }
    }

    /// Wrap a config store failure, separating auth failures
    pub fn config_store(endpoint: impl Into<String>, source: StoreError) -> Self {
        let endpoint = endpoint.into();
        if source.is_auth() {
            Self::ConfigStoreAuth { endpoint, source }
        } else {
            Self::ConfigStore { endpoint, source }
        }
    }

    /// Whether the failure needs an identity or role assignment fix
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::SecretStoreAuth { .. } | Self::ConfigStoreAuth { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            StoreError::from_status(401, "bad token".into()),
            StoreError::Unauthorized(_)
        ));
        assert!(matches!(
            StoreError::from_status(403, "denied".into()),
            StoreError::Forbidden(_)
        ));
        assert!(matches!(
            StoreError::from_status(404, String::new()),
            StoreError::NotFound(_)
        ));
        assert_eq!(StoreError::from_status(429, String::new()), StoreError::Throttled);
        assert!(matches!(
            StoreError::from_status(503, String::new()),
            StoreError::Server { status: 503, .. }
        ));
        assert!(matches!(
            StoreError::from_status(418, String::new()),
            StoreError::Unexpected { status: 418, .. }
        ));
    }

    #[test]
    fn test_auth_classification() {
        assert!(StoreError::Unauthorized(String::new()).is_auth());
        assert!(StoreError::Forbidden(String::new()).is_auth());
        assert!(StoreError::Timeout.is_auth());
        assert!(StoreError::Credential(String::new()).is_auth());
        assert!(!StoreError::NotFound(String::new()).is_auth());
        assert!(!StoreError::Throttled.is_auth());
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Throttled.is_transient());
        assert!(StoreError::Server { status: 500, body: String::new() }.is_transient());
        assert!(!StoreError::Timeout.is_transient());
        assert!(!StoreError::Forbidden(String::new()).is_transient());
    }

    #[test]
    fn test_resolve_error_wrapping() {
        let err = ResolveError::secret_store("https://v", StoreError::Forbidden("no".into()));
        assert!(matches!(err, ResolveError::SecretStoreAuth { .. }));
        assert!(err.is_auth());

        let err = ResolveError::config_store("https://c", StoreError::NotFound("gone".into()));
        assert!(matches!(err, ResolveError::ConfigStore { .. }));
        assert!(!err.is_auth());
        assert!(err.to_string().contains("https://c"));
    }

    #[test]
    fn test_environment_entry_check() {
        assert!(EnvironmentError::check("DB_PASSWORD", "ab$cd9").is_ok());
        assert!(EnvironmentError::check("Feature:Beta", "on").is_ok());
        assert_eq!(
            EnvironmentError::check("Feature=Beta", "on"),
            Err(EnvironmentError::InvalidKey("Feature=Beta".into()))
        );
        assert!(matches!(
            EnvironmentError::check("", "x"),
            Err(EnvironmentError::InvalidKey(_))
        ));
        assert_eq!(
            EnvironmentError::check("K", "a\0b"),
            Err(EnvironmentError::InvalidValue("K".into()))
        );
    }
}
