//! eks-bootstrap binary. Provisions an EKS cluster on the current instance
//! and deploys the containerized web application to it. Exit status 1 on
//! any failed step, 0 on full completion.

use clap::Parser;
use eks_bootstrap::progress::LogProgressReporter;
use eks_bootstrap::{run_pipeline, Config, HostRunner, ProvisionContext};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "eks-bootstrap",
    version,
    about = "Provision an EKS cluster and deploy the web application"
)]
struct Args {
    /// Path to eks-bootstrap.toml (defaults to fixed lookup locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shell profile file for exported variables (defaults to ~/.bash_profile)
    #[arg(long)]
    profile_file: Option<PathBuf>,

    /// Only verify an existing cluster; skip install/build/provision
    #[arg(long)]
    verify_only: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("[eks-bootstrap] Provisioning failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("[eks-bootstrap] Provisioning complete");
}

async fn run(args: Args) -> eks_bootstrap::Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(profile_file) = args.profile_file {
        config.profile_file = Some(profile_file);
    }

    let runner: Arc<dyn eks_bootstrap::CommandRunner> = Arc::new(HostRunner::new());
    let steps = if args.verify_only {
        eks_bootstrap::verify_steps(&config, runner)?
    } else {
        eks_bootstrap::standard_steps(&config, runner)?
    };

    let mut ctx = ProvisionContext::new();
    run_pipeline(&steps, &mut ctx, &LogProgressReporter).await
}
