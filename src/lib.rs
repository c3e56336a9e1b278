pub mod config;
pub mod context;
pub mod error;
pub mod imds;
pub mod manifest;
pub mod pipeline;
pub mod profile;
pub mod progress;
pub mod retry;
pub mod runner;
pub mod steps;

pub use config::Config;
pub use context::ProvisionContext;
pub use error::{ProvisionError, Result};
pub use pipeline::{run_pipeline, Step};
pub use progress::{LogProgressReporter, ProgressReporter};
pub use runner::{CommandRunner, ExecResult, HostRunner};

use imds::ImdsClient;
use manifest::ManifestRenderer;
use std::sync::Arc;
use steps::{ClusterStep, ContextStep, DeployStep, ImageStep, ToolsStep, VerifyStep};

/// Build the full provisioning sequence for a configuration:
/// tools → context → image → cluster → verify (→ deploy).
pub fn standard_steps(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> Result<Vec<Box<dyn Step>>> {
    let imds = ImdsClient::new(config.imds.endpoint.clone(), config.imds.token_ttl_secs);
    let profile_path = config.profile_path()?;

    let mut steps: Vec<Box<dyn Step>> = vec![
        Box::new(ToolsStep::new(Arc::clone(&runner))),
        Box::new(ContextStep::new(
            Arc::clone(&runner),
            imds,
            config.retry.imds(),
            profile_path,
        )),
        Box::new(ImageStep::new(
            Arc::clone(&runner),
            config.image.clone(),
            config.retry.login(),
        )),
        Box::new(ClusterStep::new(
            Arc::clone(&runner),
            config.cluster.clone(),
            config.retry.cluster(),
        )),
        Box::new(VerifyStep::new(
            Arc::clone(&runner),
            config.cluster.clone(),
            config.retry.verify(),
        )),
    ];

    if config.deploy.enabled {
        steps.push(Box::new(DeployStep::new(
            Arc::clone(&runner),
            ManifestRenderer::from_embedded()?,
            config.deploy.clone(),
        )));
    }

    Ok(steps)
}

/// Build the verify-only sequence: context → verify.
pub fn verify_steps(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> Result<Vec<Box<dyn Step>>> {
    let imds = ImdsClient::new(config.imds.endpoint.clone(), config.imds.token_ttl_secs);
    let profile_path = config.profile_path()?;

    Ok(vec![
        Box::new(ContextStep::new(
            Arc::clone(&runner),
            imds,
            config.retry.imds(),
            profile_path,
        )),
        Box::new(VerifyStep::new(
            Arc::clone(&runner),
            config.cluster.clone(),
            config.retry.verify(),
        )),
    ])
}
