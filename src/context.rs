/// Values threaded between pipeline steps.
///
/// The only state the pipeline carries: region and account id resolved by
/// the context step, and the pushed image URI produced by the image step.
/// Each is set once and read by later steps.
use crate::error::{ProvisionError, Result};

#[derive(Debug, Clone, Default)]
pub struct ProvisionContext {
    pub region: Option<String>,
    pub account_id: Option<String>,
    pub image_uri: Option<String>,
}

impl ProvisionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Result<&str> {
        self.region
            .as_deref()
            .ok_or_else(|| ProvisionError::Context("Region not resolved yet".to_string()))
    }

    pub fn account_id(&self) -> Result<&str> {
        self.account_id
            .as_deref()
            .ok_or_else(|| ProvisionError::Context("Account id not resolved yet".to_string()))
    }

    pub fn image_uri(&self) -> Result<&str> {
        self.image_uri
            .as_deref()
            .ok_or_else(|| ProvisionError::Context("Image URI not available yet".to_string()))
    }

    /// Registry host for the resolved account/region.
    pub fn registry_host(&self) -> Result<String> {
        Ok(format!(
            "{}.dkr.ecr.{}.amazonaws.com",
            self.account_id()?,
            self.region()?
        ))
    }
}
