//! Property tests for vault secret name normalization

use envcascade::domain::models::{normalize_secret_name, SecretReference};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalized_names_never_contain_dashes(name in "[A-Za-z0-9-]{1,127}") {
        let normalized = normalize_secret_name(&name);
        prop_assert!(!normalized.contains('-'));
        prop_assert_eq!(normalized.len(), name.len());
    }

    #[test]
    fn normalization_only_touches_dashes(name in "[A-Za-z0-9-]{1,127}") {
        let normalized = normalize_secret_name(&name);
        for (original, mapped) in name.chars().zip(normalized.chars()) {
            if original == '-' {
                prop_assert_eq!(mapped, '_');
            } else {
                prop_assert_eq!(mapped, original);
            }
        }
    }

    #[test]
    fn normalization_is_idempotent(name in "[A-Za-z0-9_-]{1,127}") {
        let once = normalize_secret_name(&name);
        prop_assert_eq!(normalize_secret_name(&once), once);
    }

    #[test]
    fn reference_uri_yields_host_and_name(
        vault in "[a-z][a-z0-9-]{2,22}",
        secret in "[A-Za-z0-9-]{1,64}",
    ) {
        let uri = format!("https://{vault}.vault.azure.net/secrets/{secret}");
        let reference = SecretReference::parse(&uri).unwrap();
        prop_assert_eq!(reference.vault_url(), format!("https://{vault}.vault.azure.net"));
        prop_assert_eq!(reference.secret_name, secret);
    }
}
