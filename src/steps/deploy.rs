/// Application deploy — renders Deployment/Service manifests with the
/// pushed image URI and applies them via kubectl, then waits for rollout.
use crate::config::DeployConfig;
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::manifest::ManifestRenderer;
use crate::pipeline::Step;
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tera::Context;

/// Manifests applied in order
const DEPLOY_MANIFESTS: &[&str] = &[
    "manifests/deployment.yaml.j2",
    "manifests/service.yaml.j2",
];

pub struct DeployStep {
    runner: Arc<dyn CommandRunner>,
    renderer: ManifestRenderer,
    config: DeployConfig,
}

impl DeployStep {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        renderer: ManifestRenderer,
        config: DeployConfig,
    ) -> Self {
        Self {
            runner,
            renderer,
            config,
        }
    }

    fn build_context(&self, image_uri: &str) -> Context {
        let mut context = Context::new();
        context.insert("app_name", &self.config.app_name);
        context.insert("namespace", &self.config.namespace);
        context.insert("replicas", &self.config.replicas);
        context.insert("image", image_uri);
        context.insert("container_port", &self.config.container_port);
        context.insert("service_port", &self.config.service_port);
        context
    }

    async fn apply(&self, manifest: &str) -> Result<()> {
        let args: Vec<String> = ["apply", "-f", "-"].iter().map(|s| s.to_string()).collect();

        let result = self.runner.run_with_stdin("kubectl", &args, manifest).await?;
        if !result.success() {
            return Err(ProvisionError::Deploy(format!(
                "kubectl apply failed (exit {}): {}",
                result.exit_code,
                result.last_stderr_line(),
            )));
        }
        Ok(())
    }

    async fn wait_for_rollout(&self) -> Result<()> {
        let args = vec![
            "rollout".to_string(),
            "status".to_string(),
            format!("deployment/{}", self.config.app_name),
            "--namespace".to_string(),
            self.config.namespace.clone(),
            "--timeout=180s".to_string(),
        ];

        let result = self.runner.run("kubectl", &args).await?;
        if !result.success() {
            return Err(ProvisionError::Deploy(format!(
                "Rollout of {} did not complete (exit {}): {}",
                self.config.app_name,
                result.exit_code,
                result.last_stderr_line(),
            )));
        }

        tracing::info!("[Deploy] Rollout of {} complete", self.config.app_name);
        Ok(())
    }
}

#[async_trait]
impl Step for DeployStep {
    fn name(&self) -> &'static str {
        "deploy-application"
    }

    async fn run(&self, ctx: &mut ProvisionContext) -> Result<()> {
        let image_uri = ctx.image_uri()?.to_string();
        let context = self.build_context(&image_uri);

        for template in DEPLOY_MANIFESTS {
            let rendered = self.renderer.render(template, &context)?;
            tracing::debug!(
                "[Deploy] Rendered {} ({} bytes)",
                template,
                rendered.len()
            );
            self.apply(&rendered).await?;
        }

        self.wait_for_rollout().await
    }
}
