use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Error type for provisioning operations.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Context error: {0}")]
    Context(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Cluster error: {0}")]
    Cluster(String),

    #[error("Verify error: {0}")]
    Verify(String),

    #[error("Deploy error: {0}")]
    Deploy(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
