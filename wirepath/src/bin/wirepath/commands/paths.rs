use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::commands::Workspace;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Field maps",
    commands: &[
        "wirepath paths User                 # Every resolvable path of User",
        "wirepath paths User --prefix address",
    ],
}];

#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Model name as declared in source
    pub model: String,

    /// Only show paths under this application path
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldMap {
    pub model: String,
    pub paths: BTreeMap<String, String>,
}

impl FieldMap {
    /// Keep `prefix` itself and everything below it.
    pub fn retain_prefix(&mut self, prefix: &str) {
        let nested = format!("{prefix}.");
        self.paths.retain(|app, _| app == prefix || app.starts_with(&nested));
    }
}

impl TableDisplay for FieldMap {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Application path", "Wire path"]);
        for (app, wire) in &self.paths {
            table.add_row(vec![Cell::new(app), Cell::new(wire)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.paths
            .iter()
            .map(|(app, wire)| format!("{app}={wire}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn handle_paths(args: PathsArgs, ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let workspace = Workspace::load(ctx, output)?;
    let resolver = workspace.resolver(&args.model)?;

    let mut map = FieldMap {
        model: args.model,
        paths: resolver.field_map()?,
    };
    if let Some(prefix) = &args.prefix {
        map.retain_prefix(prefix);
    }

    if map.paths.is_empty() {
        output.warning(&format!("{} has no resolvable paths", map.model));
        return Ok(());
    }

    output.heading(&format!("Field map of {}", map.model));
    output.display(&map)?;
    output.info(&format!("{} paths", map.paths.len()));
    Ok(())
}
