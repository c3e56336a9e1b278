/// Cluster provisioner.
///
/// Creates the zonal cluster without a default node group, associates the
/// IAM OIDC identity-federation provider, then creates a managed
/// auto-scaling node group with a fixed instance type, count range, and IAM
/// access grants. Everything is delegated to eksctl; no placement logic of
/// our own.
use crate::config::ClusterConfig;
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::pipeline::Step;
use crate::retry::{retry, RetryPolicy};
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::sync::Arc;

/// IAM access grants attached to the node group
const NODEGROUP_ACCESS_FLAGS: &[&str] = &[
    "--asg-access",
    "--external-dns-access",
    "--full-ecr-access",
    "--alb-ingress-access",
];

pub struct ClusterStep {
    runner: Arc<dyn CommandRunner>,
    config: ClusterConfig,
    create_policy: RetryPolicy,
}

impl ClusterStep {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        config: ClusterConfig,
        create_policy: RetryPolicy,
    ) -> Self {
        Self {
            runner,
            config,
            create_policy,
        }
    }

    /// eksctl reports an existing cluster/nodegroup as a CloudFormation
    /// AlreadyExists failure; that counts as success for idempotent intent.
    fn already_exists(result_stderr: &str) -> bool {
        result_stderr.contains("AlreadyExists") || result_stderr.contains("already exists")
    }

    async fn create_cluster(&self, region: &str) -> Result<()> {
        let mut args: Vec<String> = vec![
            "create".to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            self.config.name.clone(),
            "--region".to_string(),
            region.to_string(),
            "--version".to_string(),
            self.config.version.clone(),
            "--without-nodegroup".to_string(),
        ];
        if !self.config.zones.is_empty() {
            args.push("--zones".to_string());
            args.push(self.config.zones.join(","));
        }

        retry(self.create_policy, "cluster create", || {
            let runner = Arc::clone(&self.runner);
            let args = args.clone();
            let name = self.config.name.clone();
            async move {
                let result = runner.run("eksctl", &args).await?;
                if result.success() {
                    tracing::info!("[Cluster] Created cluster {}", name);
                    return Ok(());
                }
                if Self::already_exists(&result.stderr) {
                    tracing::info!("[Cluster] Cluster {} already exists, continuing", name);
                    return Ok(());
                }
                Err(ProvisionError::Cluster(format!(
                    "eksctl create cluster failed (exit {}): {}",
                    result.exit_code,
                    result.last_stderr_line(),
                )))
            }
        })
        .await
    }

    async fn associate_oidc_provider(&self, region: &str) -> Result<()> {
        let args: Vec<String> = [
            "utils",
            "associate-iam-oidc-provider",
            "--cluster",
            self.config.name.as_str(),
            "--region",
            region,
            "--approve",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let result = self.runner.run("eksctl", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Cluster(format!(
                "Associating OIDC provider failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        tracing::info!("[Cluster] OIDC provider associated");
        Ok(())
    }

    async fn create_nodegroup(&self, region: &str) -> Result<()> {
        let mut args: Vec<String> = vec![
            "create".to_string(),
            "nodegroup".to_string(),
            "--cluster".to_string(),
            self.config.name.clone(),
            "--region".to_string(),
            region.to_string(),
            "--name".to_string(),
            self.config.nodegroup_name.clone(),
            "--node-type".to_string(),
            self.config.instance_type.clone(),
            "--nodes".to_string(),
            self.config.nodes.to_string(),
            "--nodes-min".to_string(),
            self.config.nodes_min.to_string(),
            "--nodes-max".to_string(),
            self.config.nodes_max.to_string(),
            "--managed".to_string(),
        ];
        args.extend(NODEGROUP_ACCESS_FLAGS.iter().map(|s| s.to_string()));

        retry(self.create_policy, "nodegroup create", || {
            let runner = Arc::clone(&self.runner);
            let args = args.clone();
            let name = self.config.nodegroup_name.clone();
            async move {
                let result = runner.run("eksctl", &args).await?;
                if result.success() {
                    tracing::info!("[Cluster] Created node group {}", name);
                    return Ok(());
                }
                if Self::already_exists(&result.stderr) {
                    tracing::info!("[Cluster] Node group {} already exists, continuing", name);
                    return Ok(());
                }
                Err(ProvisionError::Cluster(format!(
                    "eksctl create nodegroup failed (exit {}): {}",
                    result.exit_code,
                    result.last_stderr_line(),
                )))
            }
        })
        .await
    }
}

#[async_trait]
impl Step for ClusterStep {
    fn name(&self) -> &'static str {
        "provision-cluster"
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> Result<()> {
        let region = ctx.region()?.to_string();

        self.create_cluster(&region).await?;
        self.associate_oidc_provider(&region).await?;
        self.create_nodegroup(&region).await?;

        Ok(())
    }
}
