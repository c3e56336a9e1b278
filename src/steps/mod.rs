/// Provisioning steps, in pipeline order.
pub mod tools;
pub mod context;
pub mod image;
pub mod cluster;
pub mod verify;
pub mod deploy;

pub use cluster::ClusterStep;
pub use context::ContextStep;
pub use deploy::DeployStep;
pub use image::ImageStep;
pub use tools::ToolsStep;
pub use verify::VerifyStep;
