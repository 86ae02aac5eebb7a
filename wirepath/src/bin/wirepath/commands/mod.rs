pub mod models;
pub mod paths;
pub mod resolve;

use anyhow::Result;
use std::sync::Arc;
use wirepath::{RecordKey, Resolver, TypeCache, TypeRef};

use crate::context::ProjectContext;
use crate::output::OutputManager;
use crate::scanner::{ScannedModel, build_registry, scan_project};

/// Scanned models of a project together with a cache over them.
pub struct Workspace {
    pub models: Vec<ScannedModel>,
    pub cache: TypeCache,
}

impl Workspace {
    pub fn load(ctx: &ProjectContext, output: &OutputManager) -> Result<Self> {
        if !ctx.has_config() {
            output.verbose(&format!(
                "No {} found, scanning with defaults",
                ctx.config_path.display()
            ));
        }
        let models = scan_project(ctx)?;
        output.verbose(&format!("Scanned {} models", models.len()));
        let cache = TypeCache::new(Arc::new(build_registry(&models)));
        Ok(Self { models, cache })
    }

    pub fn model(&self, name: &str) -> Result<&ScannedModel> {
        if let Some(model) = self.models.iter().find(|model| model.name == name) {
            return Ok(model);
        }
        let known: Vec<_> = self.models.iter().map(|model| model.name.as_str()).collect();
        if known.is_empty() {
            anyhow::bail!("Model `{name}` not found: no models were discovered");
        }
        anyhow::bail!("Model `{name}` not found. Known models: {}", known.join(", "))
    }

    pub fn resolver(&self, name: &str) -> Result<Resolver<'_>> {
        let model = self.model(name)?;
        let root = TypeRef::record(RecordKey::new(model.name.clone()));
        Ok(Resolver::new(&self.cache, &root)?)
    }
}
