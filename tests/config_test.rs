//! Unit tests for configuration
//!
//! Defaults, partial TOML overrides, and explicit-path failures.

use eks_bootstrap::config::{Config, DEFAULT_CLUSTER_NAME, DEFAULT_INSTANCE_TYPE};
use std::path::Path;

#[test]
fn defaults_match_hardcoded_constants() {
    let config = Config::default();

    assert_eq!(config.cluster.name, DEFAULT_CLUSTER_NAME);
    assert_eq!(config.cluster.instance_type, DEFAULT_INSTANCE_TYPE);
    assert_eq!(config.cluster.nodes, 2);
    assert_eq!(config.cluster.nodes_min, 2);
    assert_eq!(config.cluster.nodes_max, 4);

    assert_eq!(config.retry.login_attempts, 3);
    assert_eq!(config.retry.cluster_attempts, 3);
    assert_eq!(config.retry.verify_attempts, 30);

    assert!(config.deploy.enabled);
    assert_eq!(config.image.repository, "web-app");
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let config: Config = toml::from_str(
        r#"
[cluster]
name = "staging-cluster"
nodes_max = 6

[retry]
verify_attempts = 10
"#,
    )
    .unwrap();

    assert_eq!(config.cluster.name, "staging-cluster");
    assert_eq!(config.cluster.nodes_max, 6);
    assert_eq!(config.cluster.instance_type, DEFAULT_INSTANCE_TYPE);
    assert_eq!(config.retry.verify_attempts, 10);
    assert_eq!(config.retry.login_attempts, 3);
}

#[test]
fn explicit_missing_config_path_is_an_error() {
    let result = Config::load(Some(Path::new("/nonexistent/eks-bootstrap.toml")));
    assert!(result.is_err());
}

#[test]
fn config_file_round_trips_through_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eks-bootstrap.toml");
    std::fs::write(
        &path,
        r#"
[image]
repository = "frontend"
tag = "v2"

[deploy]
enabled = false
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.image.repository, "frontend");
    assert_eq!(config.image.tag, "v2");
    assert!(!config.deploy.enabled);
}
