/// Image builder/publisher.
///
/// Clones the application source tree if absent, builds the image, creates
/// the ECR repository when missing, logs in to the registry (fixed retry
/// budget), then tags and pushes. Exhausting the login budget is fatal.
use crate::config::ImageConfig;
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::pipeline::Step;
use crate::retry::{retry, RetryPolicy};
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::sync::Arc;

pub struct ImageStep {
    runner: Arc<dyn CommandRunner>,
    config: ImageConfig,
    login_policy: RetryPolicy,
}

impl ImageStep {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        config: ImageConfig,
        login_policy: RetryPolicy,
    ) -> Self {
        Self {
            runner,
            config,
            login_policy,
        }
    }

    fn local_tag(&self) -> String {
        format!("{}:{}", self.config.repository, self.config.tag)
    }

    async fn ensure_source_tree(&self) -> Result<()> {
        if self.config.source_dir.exists() {
            tracing::info!(
                "[Image] Source tree already present at {:?}, skipping clone",
                self.config.source_dir
            );
            return Ok(());
        }

        let args = vec![
            "clone".to_string(),
            self.config.source_url.clone(),
            self.config.source_dir.to_string_lossy().to_string(),
        ];
        let result = self.runner.run("git", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Image(format!(
                "git clone failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }
        Ok(())
    }

    async fn build(&self) -> Result<()> {
        let args = vec![
            "build".to_string(),
            "-t".to_string(),
            self.local_tag(),
            self.config.source_dir.to_string_lossy().to_string(),
        ];
        let result = self.runner.run("docker", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Image(format!(
                "docker build failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }
        tracing::info!("[Image] Built {}", self.local_tag());
        Ok(())
    }

    /// Create the repository entry if the describe probe fails.
    async fn ensure_repository(&self, region: &str) -> Result<()> {
        let describe: Vec<String> = [
            "ecr",
            "describe-repositories",
            "--repository-names",
            self.config.repository.as_str(),
            "--region",
            region,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let probe = self.runner.run("aws", &describe).await?;
        if probe.success() {
            tracing::info!(
                "[Image] Repository {} already exists",
                self.config.repository
            );
            return Ok(());
        }

        tracing::info!("[Image] Creating repository {}", self.config.repository);
        let create: Vec<String> = [
            "ecr",
            "create-repository",
            "--repository-name",
            self.config.repository.as_str(),
            "--region",
            region,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let result = self.runner.run("aws", &create).await?;
        if !result.success() {
            return Err(ProvisionError::Image(format!(
                "Creating repository {} failed (exit {}): {}",
                self.config.repository,
                result.exit_code,
                result.last_stderr_line(),
            )));
        }
        Ok(())
    }

    async fn login(&self, region: &str, registry: &str) -> Result<()> {
        let script = format!(
            "aws ecr get-login-password --region {} | docker login --username AWS --password-stdin {}",
            region, registry
        );

        retry(self.login_policy, "registry login", || {
            let runner = Arc::clone(&self.runner);
            let script = script.clone();
            async move {
                let result = runner.run_shell(&script).await?;
                if result.success() {
                    Ok(())
                } else {
                    Err(ProvisionError::Image(format!(
                        "docker login failed (exit {}): {}",
                        result.exit_code,
                        result.last_stderr_line(),
                    )))
                }
            }
        })
        .await
    }

    async fn tag_and_push(&self, remote: &str) -> Result<()> {
        let tag_args = vec![
            "tag".to_string(),
            self.local_tag(),
            remote.to_string(),
        ];
        let result = self.runner.run("docker", &tag_args).await?;
        if !result.success() {
            return Err(ProvisionError::Image(format!(
                "docker tag failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        let push_args = vec!["push".to_string(), remote.to_string()];
        let result = self.runner.run("docker", &push_args).await?;
        if !result.success() {
            return Err(ProvisionError::Image(format!(
                "docker push failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        tracing::info!("[Image] Pushed {}", remote);
        Ok(())
    }
}

#[async_trait]
impl Step for ImageStep {
    fn name(&self) -> &'static str {
        "build-and-push-image"
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> Result<()> {
        let region = ctx.region()?.to_string();
        let registry = ctx.registry_host()?;
        let remote = format!("{}/{}", registry, self.local_tag());

        self.ensure_source_tree().await?;
        self.build().await?;
        self.ensure_repository(&region).await?;
        self.login(&region, &registry).await?;
        self.tag_and_push(&remote).await?;

        ctx.image_uri = Some(remote);
        Ok(())
    }
}
