/// Bootstrap configuration
/// Loaded from eks-bootstrap.toml; every value has a hard-coded default so
/// the binary runs with no config file at all.
use crate::error::{ProvisionError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Constants for hardcoded values
/// Default cluster name
pub const DEFAULT_CLUSTER_NAME: &str = "web-app-cluster";

/// Default Kubernetes control-plane version
pub const DEFAULT_KUBERNETES_VERSION: &str = "1.29";

/// Default node group name
pub const DEFAULT_NODEGROUP_NAME: &str = "web-app-nodes";

/// Default worker instance type
pub const DEFAULT_INSTANCE_TYPE: &str = "t3.medium";

/// Default ECR repository name
pub const DEFAULT_REPOSITORY_NAME: &str = "web-app";

/// Default instance metadata endpoint (IMDSv2)
pub const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254";

/// Default IMDSv2 token TTL in seconds
pub const DEFAULT_IMDS_TOKEN_TTL_SECS: u64 = 21600;

/// Bootstrap configuration
/// Loaded from eks-bootstrap.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Cluster and node group settings
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Application image settings
    #[serde(default)]
    pub image: ImageConfig,

    /// Instance metadata endpoint settings
    #[serde(default)]
    pub imds: ImdsConfig,

    /// Retry budgets (fixed counts, fixed sleeps)
    #[serde(default)]
    pub retry: RetryConfig,

    /// Application deploy settings
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Shell profile file receiving the exported variables.
    /// Defaults to $HOME/.bash_profile when unset.
    #[serde(default)]
    pub profile_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ProvisionError::Config(format!("Failed to read config file {:?}: {}", path, e))
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                ProvisionError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?;
            tracing::info!("Loaded bootstrap config from {:?}", path);
            return Ok(config);
        }

        // Try to find config file in fixed locations
        let config_paths = [
            PathBuf::from("eks-bootstrap.toml"),
            PathBuf::from("/etc/eks-bootstrap/config.toml"),
        ];

        for path in config_paths {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ProvisionError::Config(format!("Failed to read config file {:?}: {}", path, e))
                })?;
                let config: Config = toml::from_str(&content).map_err(|e| {
                    ProvisionError::Config(format!("Failed to parse config file {:?}: {}", path, e))
                })?;
                tracing::info!("Loaded bootstrap config from {:?}", path);
                return Ok(config);
            }
        }

        tracing::warn!("No eks-bootstrap.toml found, using defaults");
        Ok(Self::default())
    }

    /// Resolve the profile file path, defaulting to $HOME/.bash_profile.
    pub fn profile_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.profile_file {
            return Ok(path.clone());
        }
        let home = std::env::var_os("HOME")
            .ok_or_else(|| ProvisionError::Config("HOME is not set".to_string()))?;
        Ok(PathBuf::from(home).join(".bash_profile"))
    }
}

/// Cluster and node group configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster name
    #[serde(default = "default_cluster_name")]
    pub name: String,

    /// Kubernetes version string passed to eksctl
    #[serde(default = "default_kubernetes_version")]
    pub version: String,

    /// Availability zones for the zonal cluster (empty = provider default)
    #[serde(default)]
    pub zones: Vec<String>,

    /// Node group name
    #[serde(default = "default_nodegroup_name")]
    pub nodegroup_name: String,

    /// Worker instance type
    #[serde(default = "default_instance_type")]
    pub instance_type: String,

    /// Desired node count
    #[serde(default = "default_nodes")]
    pub nodes: u32,

    /// Auto-scaling minimum
    #[serde(default = "default_nodes_min")]
    pub nodes_min: u32,

    /// Auto-scaling maximum
    #[serde(default = "default_nodes_max")]
    pub nodes_max: u32,
}

fn default_cluster_name() -> String {
    DEFAULT_CLUSTER_NAME.to_string()
}

fn default_kubernetes_version() -> String {
    DEFAULT_KUBERNETES_VERSION.to_string()
}

fn default_nodegroup_name() -> String {
    DEFAULT_NODEGROUP_NAME.to_string()
}

fn default_instance_type() -> String {
    DEFAULT_INSTANCE_TYPE.to_string()
}

fn default_nodes() -> u32 {
    2
}

fn default_nodes_min() -> u32 {
    2
}

fn default_nodes_max() -> u32 {
    4
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: default_cluster_name(),
            version: default_kubernetes_version(),
            zones: Vec::new(),
            nodegroup_name: default_nodegroup_name(),
            instance_type: default_instance_type(),
            nodes: default_nodes(),
            nodes_min: default_nodes_min(),
            nodes_max: default_nodes_max(),
        }
    }
}

/// Application image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// ECR repository name
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Image tag
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Git URL of the application source tree
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Local checkout directory for the application source
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY_NAME.to_string()
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_source_url() -> String {
    "https://github.com/aws-samples/eks-workshop-sample-app.git".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("web-app")
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            tag: default_tag(),
            source_url: default_source_url(),
            source_dir: default_source_dir(),
        }
    }
}

/// Instance metadata endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImdsConfig {
    /// Metadata endpoint base URL
    #[serde(default = "default_imds_endpoint")]
    pub endpoint: String,

    /// Session token TTL in seconds
    #[serde(default = "default_imds_token_ttl")]
    pub token_ttl_secs: u64,
}

fn default_imds_endpoint() -> String {
    DEFAULT_IMDS_ENDPOINT.to_string()
}

fn default_imds_token_ttl() -> u64 {
    DEFAULT_IMDS_TOKEN_TTL_SECS
}

impl Default for ImdsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_imds_endpoint(),
            token_ttl_secs: default_imds_token_ttl(),
        }
    }
}

/// Retry budgets. Counts and sleeps are fixed per site; there is no backoff
/// curve anywhere in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_imds_attempts")]
    pub imds_attempts: u32,
    #[serde(default = "default_imds_delay_secs")]
    pub imds_delay_secs: u64,

    #[serde(default = "default_login_attempts")]
    pub login_attempts: u32,
    #[serde(default = "default_login_delay_secs")]
    pub login_delay_secs: u64,

    #[serde(default = "default_cluster_attempts")]
    pub cluster_attempts: u32,
    #[serde(default = "default_cluster_delay_secs")]
    pub cluster_delay_secs: u64,

    #[serde(default = "default_verify_attempts")]
    pub verify_attempts: u32,
    #[serde(default = "default_verify_delay_secs")]
    pub verify_delay_secs: u64,
}

fn default_imds_attempts() -> u32 {
    5
}

fn default_imds_delay_secs() -> u64 {
    2
}

fn default_login_attempts() -> u32 {
    3
}

fn default_login_delay_secs() -> u64 {
    5
}

fn default_cluster_attempts() -> u32 {
    3
}

fn default_cluster_delay_secs() -> u64 {
    20
}

fn default_verify_attempts() -> u32 {
    30
}

fn default_verify_delay_secs() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            imds_attempts: default_imds_attempts(),
            imds_delay_secs: default_imds_delay_secs(),
            login_attempts: default_login_attempts(),
            login_delay_secs: default_login_delay_secs(),
            cluster_attempts: default_cluster_attempts(),
            cluster_delay_secs: default_cluster_delay_secs(),
            verify_attempts: default_verify_attempts(),
            verify_delay_secs: default_verify_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub fn imds(&self) -> RetryPolicy {
        RetryPolicy::new(self.imds_attempts, Duration::from_secs(self.imds_delay_secs))
    }

    pub fn login(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.login_attempts,
            Duration::from_secs(self.login_delay_secs),
        )
    }

    pub fn cluster(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.cluster_attempts,
            Duration::from_secs(self.cluster_delay_secs),
        )
    }

    pub fn verify(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.verify_attempts,
            Duration::from_secs(self.verify_delay_secs),
        )
    }
}

/// Application deploy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Whether to deploy the application after the cluster is verified
    #[serde(default = "default_deploy_enabled")]
    pub enabled: bool,

    /// Application name used for Deployment/Service metadata
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Target namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Replica count
    #[serde(default = "default_replicas")]
    pub replicas: u32,

    /// Container port the application listens on
    #[serde(default = "default_container_port")]
    pub container_port: u16,

    /// Service port exposed by the load balancer
    #[serde(default = "default_service_port")]
    pub service_port: u16,
}

fn default_deploy_enabled() -> bool {
    true
}

fn default_app_name() -> String {
    "web-app".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_replicas() -> u32 {
    2
}

fn default_container_port() -> u16 {
    3000
}

fn default_service_port() -> u16 {
    80
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            enabled: default_deploy_enabled(),
            app_name: default_app_name(),
            namespace: default_namespace(),
            replicas: default_replicas(),
            container_port: default_container_port(),
            service_port: default_service_port(),
        }
    }
}
