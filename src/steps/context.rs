/// Credential/context configurator.
///
/// Resolves region from the instance metadata service and account id from
/// the identity service, then persists both as shell profile exports and as
/// the AWS CLI default region. An empty token or a failed lookup is fatal.
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::imds::ImdsClient;
use crate::pipeline::Step;
use crate::profile;
use crate::retry::RetryPolicy;
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ContextStep {
    runner: Arc<dyn CommandRunner>,
    imds: ImdsClient,
    token_policy: RetryPolicy,
    profile_path: PathBuf,
}

impl ContextStep {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        imds: ImdsClient,
        token_policy: RetryPolicy,
        profile_path: PathBuf,
    ) -> Self {
        Self {
            runner,
            imds,
            token_policy,
            profile_path,
        }
    }

    /// Account id via the identity service (`sts get-caller-identity`).
    async fn resolve_account_id(&self) -> Result<String> {
        let args: Vec<String> = ["sts", "get-caller-identity", "--output", "json"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = self.runner.run("aws", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Context(format!(
                "Caller identity lookup failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        let identity: serde_json::Value = serde_json::from_str(&result.stdout)?;
        let account = identity["Account"].as_str().unwrap_or("").trim().to_string();
        if account.is_empty() {
            return Err(ProvisionError::Context(
                "Caller identity response had no Account field".to_string(),
            ));
        }

        Ok(account)
    }

    async fn set_cli_default_region(&self, region: &str) -> Result<()> {
        let args: Vec<String> = ["configure", "set", "region", region]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = self.runner.run("aws", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Context(format!(
                "Setting CLI default region failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Step for ContextStep {
    fn name(&self) -> &'static str {
        "configure-context"
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> Result<()> {
        let token = self.imds.fetch_token(self.token_policy).await?;
        let region = self.imds.region(&token).await?;
        let account_id = self.resolve_account_id().await?;

        tracing::info!(
            "[Context] Resolved region={} account={}",
            region,
            account_id
        );

        profile::persist_export(&self.profile_path, "AWS_REGION", &region)?;
        profile::persist_export(&self.profile_path, "AWS_ACCOUNT_ID", &account_id)?;
        self.set_cli_default_region(&region).await?;

        ctx.region = Some(region);
        ctx.account_id = Some(account_id);
        Ok(())
    }
}
