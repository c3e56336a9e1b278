/// Manifest renderer using Tera for Jinja2-style template rendering.
///
/// Templates are compiled into the binary so the tool is self-contained on a
/// bare instance with nothing but the binary present.
use crate::error::{ProvisionError, Result};
use tera::{Context, Tera};

/// Embedded manifest templates (name, content)
pub const ALL_TEMPLATES: &[(&str, &str)] = &[
    (
        "manifests/deployment.yaml.j2",
        include_str!("../templates/deployment.yaml.j2"),
    ),
    (
        "manifests/service.yaml.j2",
        include_str!("../templates/service.yaml.j2"),
    ),
];

pub struct ManifestRenderer {
    tera: Tera,
}

impl ManifestRenderer {
    /// Create a renderer from the embedded templates.
    pub fn from_embedded() -> Result<Self> {
        let mut tera = Tera::default();
        let mut template_count = 0;

        for (name, content) in ALL_TEMPLATES {
            tera.add_raw_template(name, content).map_err(|e| {
                ProvisionError::Deploy(format!("Failed to add embedded template {}: {}", name, e))
            })?;
            template_count += 1;
            tracing::debug!("[ManifestRenderer] Loaded embedded template: {}", name);
        }

        tracing::info!(
            "[ManifestRenderer] Loaded {} embedded templates",
            template_count
        );

        Ok(Self { tera })
    }

    /// Render a template with a Tera context.
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        let rendered = self.tera.render(template_name, context).map_err(|e| {
            ProvisionError::Deploy(format!("Failed to render template {}: {}", template_name, e))
        })?;

        tracing::debug!(
            "[ManifestRenderer] Rendered template {} ({} bytes)",
            template_name,
            rendered.len()
        );

        Ok(rendered)
    }

    /// List all loaded template names
    pub fn list_templates(&self) -> Vec<String> {
        self.tera.get_template_names().map(String::from).collect()
    }
}
