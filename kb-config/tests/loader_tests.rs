//! Integration tests for config loading and site resolution.

use kb_config::{ConfigError, ConfigLoader, ConfigSiteResolver, ResolveError, SiteResolver};
use serial_test::serial;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
kuboard:
  sites:
    - name: s1
      url: https://kuboard.example.com
      username: admin
      access_key: ak
      secret_key: sk
  clusters:
    - cluster_id: c1
      kuboard_site_name: s1
logging:
  level: INFO
  file: test.log
worker:
  bind_addr: 127.0.0.1:9000
retry:
  maximum_attempts: 5
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(FULL_CONFIG);
    let config = ConfigLoader::load_file(file.path()).expect("config should load");

    let kuboard = config.kuboard.as_ref().expect("kuboard section");
    assert_eq!(kuboard.sites.len(), 1);
    assert_eq!(kuboard.clusters[0].cluster_id, "c1");
    assert_eq!(config.logging.file.as_deref(), Some("test.log"));
    assert_eq!(config.worker.bind_addr, "127.0.0.1:9000");
    assert_eq!(config.worker.task_queue, "kuboard");
    assert_eq!(config.retry.maximum_attempts, 5);
    assert_eq!(config.retry.initial_interval_ms, 1_000);
}

#[test]
fn test_load_missing_file() {
    let err = ConfigLoader::load_file(std::path::Path::new("nonexistent_config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_load_invalid_structure() {
    let file = write_config(
        r#"
kuboard:
  sites:
    - name: s1
      url: https://kuboard.example.com
"#,
    );
    let err = ConfigLoader::load_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_load_rejects_bad_url() {
    let file = write_config(
        r#"
kuboard:
  sites:
    - name: s1
      url: "::not-a-url::"
      username: admin
      access_key: ak
      secret_key: sk
"#,
    );
    let err = ConfigLoader::load_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_resolver_from_loaded_config() {
    let file = write_config(FULL_CONFIG);
    let config = ConfigLoader::load_file(file.path()).unwrap();
    let resolver = ConfigSiteResolver::new(config.kuboard.clone());

    let site = resolver.resolve("c1").expect("c1 is mapped");
    assert_eq!(site.name, "s1");
    assert_eq!(
        site.credentials.cookie(),
        "KuboardUsername=admin; KuboardAccessKey=ak.sk"
    );

    assert_eq!(
        resolver.resolve("unknown"),
        Err(ResolveError::MappingNotFound("unknown".into()))
    );
}

#[test]
fn test_example_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/config.example.yaml");
    let config = ConfigLoader::load_file(&path).expect("shipped example config should load");
    assert!(config.kuboard.is_some());
}

#[test]
#[serial]
fn test_load_global_is_loaded_once() {
    let missing = ConfigLoader::with_path("/nonexistent/kb/config.yaml").load_global();
    assert!(matches!(missing, Err(ConfigError::NotFound(_))));

    let file = write_config(FULL_CONFIG);
    let first = ConfigLoader::with_path(file.path())
        .load_global()
        .expect("config should load");
    assert_eq!(first.retry.maximum_attempts, 5);

    let other = write_config("retry:\n  maximum_attempts: 2\n");
    let second = ConfigLoader::with_path(other.path())
        .load_global()
        .expect("cached config");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.retry.maximum_attempts, 5);
}
