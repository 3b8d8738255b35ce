//! Resolution against the real process environment

mod common;

use envcascade::cli::build_pipeline;
use envcascade::infrastructure::environment::ProcessEnvironment;
use envcascade::{EnvironmentStore, ResolverSettings};

#[tokio::test]
async fn test_development_run_keeps_process_values() {
    let file = common::env_file(
        "ENVCASCADE_TEST_OVERRIDE=from-file\n\
         ENVCASCADE_TEST_FILE_ONLY=file\n\
         AZURE_COSMOS_DATABASE_NAME=FromFile\n",
    );
    let settings = ResolverSettings {
        env_file: file.path().to_path_buf(),
        ..Default::default()
    };

    temp_env::async_with_vars(
        [
            ("APP_ENV", Some("development")),
            ("ENVCASCADE_TEST_OVERRIDE", Some("from-process")),
            ("ENVCASCADE_TEST_FILE_ONLY", None),
            ("AZURE_COSMOS_DATABASE_NAME", Some("FromProcess")),
        ],
        async {
            let mut pipeline = build_pipeline(&settings).unwrap();
            let mut env = ProcessEnvironment::new();

            let config = pipeline.run(&mut env).await.unwrap();

            assert_eq!(config.database.database_name, "FromProcess");
            assert_eq!(
                std::env::var("ENVCASCADE_TEST_OVERRIDE").as_deref(),
                Ok("from-process")
            );
            assert_eq!(env.get("ENVCASCADE_TEST_FILE_ONLY").as_deref(), Some("file"));
        },
    )
    .await;
}
