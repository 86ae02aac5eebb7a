use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color as TableColor, Table};
use serde::Serialize;
use wirepath::Resolver;

use crate::commands::Workspace;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Resolving paths",
    commands: &[
        "wirepath resolve User name                      # Single field",
        "wirepath resolve User address.city friends.name # Several paths at once",
        "wirepath --output compact resolve User address.city",
    ],
}];

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Model name as declared in source
    pub model: String,

    /// Dotted application paths, e.g. `address.city`
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Resolution {
    pub path: String,
    pub wire: Option<String>,
    /// Structural problem met while descending, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub model: String,
    pub results: Vec<Resolution>,
}

impl ResolveReport {
    pub fn build(resolver: &Resolver<'_>, model: &str, paths: &[String]) -> Self {
        let results = paths
            .iter()
            .map(|path| match resolver.try_get(path) {
                Ok(wire) => Resolution {
                    path: path.clone(),
                    wire,
                    error: None,
                },
                Err(err) => Resolution {
                    path: path.clone(),
                    wire: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();
        Self {
            model: model.to_string(),
            results,
        }
    }

    pub fn unresolved(&self) -> usize {
        self.results.iter().filter(|result| result.wire.is_none()).count()
    }
}

impl TableDisplay for ResolveReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Path", "", "Wire path"]);
        for result in &self.results {
            let wire = match (&result.wire, &result.error) {
                (Some(wire), _) => Cell::new(wire),
                (None, Some(err)) if output.options.no_color => Cell::new(err),
                (None, Some(err)) => Cell::new(err).fg(TableColor::Red),
                (None, None) => output.optional_cell(None, "unresolved"),
            };
            table.add_row(vec![Cell::new(&result.path), Cell::new(ICONS.arrow), wire]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.results
            .iter()
            .map(|result| format!("{}={}", result.path, result.wire.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Resolve every path; fails when any of them does not resolve.
pub fn handle_resolve(args: ResolveArgs, ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let workspace = Workspace::load(ctx, output)?;
    let resolver = workspace.resolver(&args.model)?;

    let report = ResolveReport::build(&resolver, &args.model, &args.paths);
    output.display(&report)?;

    match report.unresolved() {
        0 => {
            output.success(&format!("{} paths resolved on {}", report.results.len(), args.model));
            Ok(())
        }
        missing => anyhow::bail!("{missing} of {} paths did not resolve on {}", report.results.len(), args.model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wirepath::{FieldAnnotation, RecordDescriptor, RecordKey, Registry, TypeCache, TypeRef};

    fn cache() -> TypeCache {
        let registry = Registry::new();
        registry.insert(
            RecordDescriptor::new(RecordKey::new("Order"))
                .field("id", FieldAnnotation::named("_id"), TypeRef::scalar("String"))
                .field(
                    "customer",
                    FieldAnnotation::named("cust"),
                    TypeRef::record(RecordKey::new("Customer")),
                ),
        );
        TypeCache::new(Arc::new(registry))
    }

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reports_resolved_unknown_and_broken_paths() {
        let cache = cache();
        let resolver = Resolver::new(&cache, &TypeRef::record(RecordKey::new("Order"))).unwrap();
        let report = ResolveReport::build(&resolver, "Order", &paths(&["id", "total", "customer.name"]));

        assert_eq!(report.results[0].wire.as_deref(), Some("_id"));
        assert_eq!(report.results[1].wire, None);
        assert!(report.results[1].error.is_none());
        assert_eq!(report.results[2].error.as_deref(), Some("record `Customer` is not registered"));
        assert_eq!(report.unresolved(), 2);
        assert_eq!(report.to_compact(), "id=_id\ntotal=\ncustomer.name=");
    }

    #[test]
    fn json_omits_missing_errors() {
        let cache = cache();
        let resolver = Resolver::new(&cache, &TypeRef::record(RecordKey::new("Order"))).unwrap();
        let report = ResolveReport::build(&resolver, "Order", &paths(&["customer"]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["model"], "Order");
        assert_eq!(json["results"][0]["wire"], "cust");
        assert!(json["results"][0].get("error").is_none());
    }
}
