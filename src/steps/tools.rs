/// Dependency installer — ensures the external CLIs are present.
///
/// For each required tool: probe for presence; if present, skip (re-running
/// never reinstalls); if absent, run its fixed install sequence. Any install
/// failure is immediately fatal, with no partial-success semantics.
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::pipeline::Step;
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// kubectl release fetched when absent
const KUBECTL_VERSION: &str = "1.29.3";

/// eksctl release fetched when absent
const EKSCTL_VERSION: &str = "0.176.0";

/// AWS CLI v2 bundle URL
const AWSCLI_BUNDLE_URL: &str = "https://awscli.amazonaws.com/awscli-exe-linux-x86_64.zip";

/// How presence of a tool is detected
enum Probe {
    /// Binary on PATH
    Binary(&'static str),
    /// Marker file relative to the probe root
    File(&'static str),
}

struct ToolSpec {
    name: &'static str,
    probe: Probe,
}

/// Required tools, in install order
const REQUIRED_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "tar",
        probe: Probe::Binary("tar"),
    },
    ToolSpec {
        name: "jq",
        probe: Probe::Binary("jq"),
    },
    ToolSpec {
        name: "bash-completion",
        probe: Probe::File("usr/share/bash-completion/bash_completion"),
    },
    ToolSpec {
        name: "aws",
        probe: Probe::Binary("aws"),
    },
    ToolSpec {
        name: "kubectl",
        probe: Probe::Binary("kubectl"),
    },
    ToolSpec {
        name: "eksctl",
        probe: Probe::Binary("eksctl"),
    },
    ToolSpec {
        name: "docker",
        probe: Probe::Binary("docker"),
    },
];

/// Fixed install sequence for a tool
fn install_commands(tool: &str) -> Vec<Vec<String>> {
    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    match tool {
        "tar" => vec![cmd(&["sudo", "yum", "install", "-y", "tar"])],
        "jq" => vec![cmd(&["sudo", "yum", "install", "-y", "jq"])],
        "bash-completion" => vec![cmd(&["sudo", "yum", "install", "-y", "bash-completion"])],
        "aws" => vec![
            cmd(&["curl", "-fsSL", "-o", "/tmp/awscliv2.zip", AWSCLI_BUNDLE_URL]),
            cmd(&["unzip", "-q", "-o", "/tmp/awscliv2.zip", "-d", "/tmp"]),
            cmd(&["sudo", "/tmp/aws/install", "--update"]),
        ],
        "kubectl" => {
            let url = format!(
                "https://dl.k8s.io/release/v{}/bin/linux/amd64/kubectl",
                KUBECTL_VERSION
            );
            vec![
                vec![
                    "curl".to_string(),
                    "-fsSL".to_string(),
                    "-o".to_string(),
                    "/tmp/kubectl".to_string(),
                    url,
                ],
                cmd(&["chmod", "+x", "/tmp/kubectl"]),
                cmd(&["sudo", "mv", "/tmp/kubectl", "/usr/local/bin/kubectl"]),
            ]
        }
        "eksctl" => {
            let url = format!(
                "https://github.com/eksctl-io/eksctl/releases/download/v{}/eksctl_Linux_amd64.tar.gz",
                EKSCTL_VERSION
            );
            vec![
                vec![
                    "curl".to_string(),
                    "-fsSL".to_string(),
                    "-o".to_string(),
                    "/tmp/eksctl.tar.gz".to_string(),
                    url,
                ],
                cmd(&["tar", "-xzf", "/tmp/eksctl.tar.gz", "-C", "/tmp"]),
                cmd(&["sudo", "mv", "/tmp/eksctl", "/usr/local/bin/eksctl"]),
            ]
        }
        "docker" => vec![
            cmd(&["sudo", "yum", "install", "-y", "docker"]),
            cmd(&["sudo", "systemctl", "enable", "--now", "docker"]),
        ],
        other => {
            // Unknown tools have no install procedure; surface this loudly
            // rather than silently skipping.
            tracing::error!("[Tools] No install procedure for {}", other);
            Vec::new()
        }
    }
}

pub struct ToolsStep {
    runner: Arc<dyn CommandRunner>,
    probe_root: PathBuf,
}

impl ToolsStep {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            probe_root: PathBuf::from("/"),
        }
    }

    /// Override the root for file-based probes. Tests point this at a
    /// temporary directory.
    pub fn with_probe_root(mut self, root: PathBuf) -> Self {
        self.probe_root = root;
        self
    }

    fn is_present(&self, spec: &ToolSpec) -> bool {
        match &spec.probe {
            Probe::Binary(name) => self.runner.lookup(name).is_some(),
            Probe::File(rel) => self.probe_root.join(rel).is_file(),
        }
    }

    async fn install(&self, name: &str) -> Result<()> {
        let commands = install_commands(name);
        if commands.is_empty() {
            return Err(ProvisionError::Tool(format!(
                "No install procedure for {}",
                name
            )));
        }

        for command in commands {
            let (program, args) = command
                .split_first()
                .ok_or_else(|| ProvisionError::Tool(format!("Empty install command for {}", name)))?;

            let result = self.runner.run(program, args).await?;
            if !result.success() {
                return Err(ProvisionError::Tool(format!(
                    "Installing {} failed at `{}` (exit {}): {}",
                    name,
                    command.join(" "),
                    result.exit_code,
                    result.last_stderr_line(),
                )));
            }
        }

        tracing::info!("[Tools] Installed {}", name);
        Ok(())
    }
}

#[async_trait]
impl Step for ToolsStep {
    fn name(&self) -> &'static str {
        "install-tools"
    }

    async fn run(&self, _ctx: &mut ProvisionContext) -> Result<()> {
        for spec in REQUIRED_TOOLS {
            if self.is_present(spec) {
                tracing::info!("[Tools] {} already present, skipping", spec.name);
                continue;
            }

            tracing::info!("[Tools] {} not found, installing", spec.name);
            self.install(spec.name).await?;
        }

        Ok(())
    }
}
