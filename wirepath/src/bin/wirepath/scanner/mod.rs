//! Model scanning: recover record descriptors from a project's Rust sources.
//!
//! Scanning runs in two passes. The first parses every discovered file with
//! `syn` and records structs deriving the configured model derive; the second
//! describes field types, treating any discovered struct name as a record.
//! Scanned records are keyed by their bare struct name.

mod discovery;
mod parser;

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use wirepath::{FieldDescriptor, RecordDescriptor, RecordKey, Registry};

use discovery::discover_models;
use parser::{SourceModel, parse_model_file};

use crate::context::ProjectContext;

/// A model found in source, with its resolved descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct ScannedModel {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub descriptor: RecordDescriptor,
}

/// Scan the project for models.
pub fn scan_project(ctx: &ProjectContext) -> Result<Vec<ScannedModel>> {
    let settings = &ctx.config.scan;
    let files = discover_models(&ctx.project_root, settings)?;
    log::debug!("{} candidate files under {}", files.len(), ctx.project_root.display());

    let mut sources = Vec::new();
    for file in &files {
        sources.extend(parse_model_file(&file.path, &file.relative_path, &settings.derive)?);
    }
    Ok(resolve_models(sources))
}

/// Second pass: describe field types now that every model name is known.
///
/// When two files declare a model with the same name, the first one in path
/// order is kept.
pub fn resolve_models(sources: Vec<SourceModel>) -> Vec<ScannedModel> {
    let names: HashSet<String> = sources.iter().map(|model| model.name.clone()).collect();
    let mut seen = HashSet::new();

    sources
        .into_iter()
        .filter(|model| {
            let first = seen.insert(model.name.clone());
            if !first {
                log::warn!("duplicate model `{}` in {}:{} ignored", model.name, model.file, model.line);
            }
            first
        })
        .map(|model| {
            let mut descriptor = RecordDescriptor::new(RecordKey::new(model.name.clone()));
            for field in model.fields {
                let ty = parser::to_type_ref(&field.ty, &names);
                descriptor.fields.push(FieldDescriptor::new(field.name, field.annotation, ty));
            }
            ScannedModel {
                name: model.name,
                file: model.file,
                line: model.line,
                descriptor,
            }
        })
        .collect()
}

/// Registry over scanned models.
pub fn build_registry(models: &[ScannedModel]) -> Registry {
    let registry = Registry::new();
    for model in models {
        registry.insert(model.descriptor.clone());
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wirepath::{FieldAnnotation, TypeRef};

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        fs::write(
            root.join("src/models/user.rs"),
            r#"
#[derive(WireModel)]
pub struct User {
    #[wire("name")]
    pub name: String,
    #[wire("addr")]
    pub address: Option<Address>,
    #[wire("friends")]
    pub friends: Vec<Box<User>>,
}
"#,
        )
        .unwrap();
        fs::write(
            root.join("src/models/address.rs"),
            r#"
#[derive(WireModel)]
pub struct Address {
    #[wire("city")]
    pub city: String,
}
"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn scans_and_links_models_across_files() {
        let dir = project();
        let ctx = ProjectContext::find(Some(dir.path())).unwrap();
        let models = scan_project(&ctx).unwrap();

        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Address", "User"]);

        let user = &models[1];
        assert_eq!(user.line, 3);
        assert_eq!(
            user.descriptor.fields[1].ty,
            TypeRef::pointer(TypeRef::record(RecordKey::new("Address")))
        );
        assert_eq!(user.descriptor.fields[1].annotation, Some(FieldAnnotation::named("addr")));
    }

    #[test]
    fn duplicate_names_keep_the_first() {
        let sources = parser::parse_model_source(
            "#[derive(WireModel)] struct A { #[wire(\"x\")] x: u8 }\n\
             mod again { #[derive(WireModel)] struct A { #[wire(\"y\")] y: u8 } }",
            "src/lib.rs",
            "WireModel",
        )
        .unwrap();
        let models = resolve_models(sources);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].descriptor.fields[0].name, "x");
    }

    #[test]
    fn registry_resolves_scanned_models() {
        let dir = project();
        let ctx = ProjectContext::find(Some(dir.path())).unwrap();
        let registry = build_registry(&scan_project(&ctx).unwrap());
        let cache = wirepath::TypeCache::new(std::sync::Arc::new(registry));

        let resolver = wirepath::Resolver::new(&cache, &TypeRef::record(RecordKey::new("User"))).unwrap();
        assert_eq!(resolver.get("address.city").as_deref(), Some("addr.city"));
        assert_eq!(resolver.get("friends.friends.name").as_deref(), Some("friends.friends.name"));
    }
}
