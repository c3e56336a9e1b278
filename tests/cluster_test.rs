//! Cluster provisioner: retry budget, idempotent create, step ordering.

mod common;

use common::MockRunner;
use eks_bootstrap::config::ClusterConfig;
use eks_bootstrap::pipeline::Step;
use eks_bootstrap::retry::RetryPolicy;
use eks_bootstrap::steps::ClusterStep;
use eks_bootstrap::ProvisionContext;
use std::sync::Arc;
use std::time::Duration;

fn ctx_with_region() -> ProvisionContext {
    ProvisionContext {
        region: Some("us-west-2".to_string()),
        account_id: Some("123456789012".to_string()),
        image_uri: None,
    }
}

fn cluster_config() -> ClusterConfig {
    ClusterConfig {
        zones: vec!["us-west-2a".to_string(), "us-west-2b".to_string()],
        ..ClusterConfig::default()
    }
}

fn policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::ZERO)
}

#[tokio::test]
async fn provisions_cluster_oidc_and_nodegroup_in_order() {
    let runner = Arc::new(MockRunner::new());
    let step = ClusterStep::new(runner.clone(), cluster_config(), policy(3));

    let mut ctx = ctx_with_region();
    step.run(&mut ctx).await.unwrap();

    let lines: Vec<String> = runner.calls().into_iter().map(|c| c.line).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("eksctl create cluster"));
    assert!(lines[0].contains("--without-nodegroup"));
    assert!(lines[0].contains("--zones us-west-2a,us-west-2b"));
    assert!(lines[1].contains("associate-iam-oidc-provider"));
    assert!(lines[1].contains("--approve"));
    assert!(lines[2].contains("eksctl create nodegroup"));
    assert!(lines[2].contains("--managed"));
    assert!(lines[2].contains("--asg-access"));
    assert!(lines[2].contains("--full-ecr-access"));
}

#[tokio::test]
async fn create_cluster_budget_is_exact_and_blocks_later_commands() {
    let runner = Arc::new(MockRunner::new().with_rule(
        "eksctl create cluster",
        1,
        "",
        "Error: ResourceLimitExceeded: too many VPCs",
    ));
    let step = ClusterStep::new(runner.clone(), cluster_config(), policy(3));

    let mut ctx = ctx_with_region();
    let result = step.run(&mut ctx).await;

    assert!(result.is_err());
    assert_eq!(runner.calls_matching("eksctl create cluster"), 3);
    assert_eq!(runner.calls_matching("associate-iam-oidc-provider"), 0);
    assert_eq!(runner.calls_matching("eksctl create nodegroup"), 0);
}

#[tokio::test]
async fn existing_cluster_counts_as_success() {
    let runner = Arc::new(MockRunner::new().with_rule(
        "eksctl create cluster",
        1,
        "",
        "AlreadyExistsException: Stack [eksctl-web-app-cluster-cluster] already exists",
    ));
    let step = ClusterStep::new(runner.clone(), cluster_config(), policy(3));

    let mut ctx = ctx_with_region();
    step.run(&mut ctx).await.unwrap();

    // No retries on the already-exists path, and the sequence continues
    assert_eq!(runner.calls_matching("eksctl create cluster"), 1);
    assert_eq!(runner.calls_matching("associate-iam-oidc-provider"), 1);
    assert_eq!(runner.calls_matching("eksctl create nodegroup"), 1);
}

#[tokio::test]
async fn nodegroup_failure_is_fatal_after_budget() {
    let runner = Arc::new(MockRunner::new().with_rule(
        "eksctl create nodegroup",
        1,
        "",
        "Error: InsufficientInstanceCapacity",
    ));
    let step = ClusterStep::new(runner.clone(), cluster_config(), policy(3));

    let mut ctx = ctx_with_region();
    let result = step.run(&mut ctx).await;

    assert!(result.is_err());
    assert_eq!(runner.calls_matching("eksctl create nodegroup"), 3);
}
