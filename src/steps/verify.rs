/// Verifier — polls cluster, node group, and node status until ready.
///
/// All three queries are checked each round in one bounded retry loop
/// (fixed count, fixed sleep). Exhausting the budget is fatal.
use crate::config::ClusterConfig;
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::pipeline::Step;
use crate::retry::{retry, RetryPolicy};
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::sync::Arc;

pub struct VerifyStep {
    runner: Arc<dyn CommandRunner>,
    config: ClusterConfig,
    poll_policy: RetryPolicy,
}

impl VerifyStep {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        config: ClusterConfig,
        poll_policy: RetryPolicy,
    ) -> Self {
        Self {
            runner,
            config,
            poll_policy,
        }
    }

    async fn cluster_status(&self, region: &str) -> Result<String> {
        let args: Vec<String> = [
            "eks",
            "describe-cluster",
            "--name",
            self.config.name.as_str(),
            "--region",
            region,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let result = self.runner.run("aws", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Verify(format!(
                "describe-cluster failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        let body: serde_json::Value = serde_json::from_str(&result.stdout)?;
        Ok(body["cluster"]["status"].as_str().unwrap_or("").to_string())
    }

    async fn nodegroup_status(&self, region: &str) -> Result<String> {
        let args: Vec<String> = [
            "eks",
            "describe-nodegroup",
            "--cluster-name",
            self.config.name.as_str(),
            "--nodegroup-name",
            self.config.nodegroup_name.as_str(),
            "--region",
            region,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let result = self.runner.run("aws", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Verify(format!(
                "describe-nodegroup failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        let body: serde_json::Value = serde_json::from_str(&result.stdout)?;
        Ok(body["nodegroup"]["status"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }

    /// Count of Ready nodes from `kubectl get nodes --no-headers`.
    async fn ready_node_count(&self) -> Result<u32> {
        let args: Vec<String> = ["get", "nodes", "--no-headers"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = self.runner.run("kubectl", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Verify(format!(
                "kubectl get nodes failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        let ready = result
            .stdout
            .lines()
            .filter(|line| {
                line.split_whitespace().nth(1).map(|status| status == "Ready") == Some(true)
            })
            .count() as u32;

        Ok(ready)
    }

    /// One polling round: all three queries must indicate readiness.
    async fn check_ready(&self, region: &str) -> Result<()> {
        let cluster_status = self.cluster_status(region).await?;
        if cluster_status != "ACTIVE" {
            return Err(ProvisionError::Verify(format!(
                "Cluster {} not active yet (status {})",
                self.config.name, cluster_status
            )));
        }

        let nodegroup_status = self.nodegroup_status(region).await?;
        if nodegroup_status != "ACTIVE" {
            return Err(ProvisionError::Verify(format!(
                "Node group {} not active yet (status {})",
                self.config.nodegroup_name, nodegroup_status
            )));
        }

        let ready = self.ready_node_count().await?;
        if ready < self.config.nodes_min {
            return Err(ProvisionError::Verify(format!(
                "Only {}/{} nodes Ready",
                ready, self.config.nodes_min
            )));
        }

        tracing::info!(
            "[Verify] Cluster {} active, node group {} active, {} nodes Ready",
            self.config.name,
            self.config.nodegroup_name,
            ready
        );
        Ok(())
    }
}

#[async_trait]
impl Step for VerifyStep {
    fn name(&self) -> &'static str {
        "verify-cluster"
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> Result<()> {
        let region = ctx.region()?.to_string();

        retry(self.poll_policy, "cluster readiness", || {
            let region = region.clone();
            async move { self.check_ready(&region).await }
        })
        .await
    }
}
