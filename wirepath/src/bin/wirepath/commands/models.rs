use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use wirepath::normalize;

use crate::commands::Workspace;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::scanner::ScannedModel;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Listing models",
    commands: &[
        "wirepath models                   # Every model in the project",
        "wirepath models --output json     # Machine-readable listing",
        "wirepath --project ../api models  # Scan another project",
    ],
}];

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Only list models whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,
}

/// One row of `wirepath models`.
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub file: String,
    pub line: usize,
    /// Fields that resolve to a wire name.
    pub wire_fields: Vec<String>,
    pub inline: Vec<String>,
    pub skipped: usize,
    /// Model names reachable through annotated fields.
    pub links: Vec<String>,
}

impl From<&ScannedModel> for ModelSummary {
    fn from(model: &ScannedModel) -> Self {
        let mut summary = ModelSummary {
            name: model.name.clone(),
            file: model.file.clone(),
            line: model.line,
            wire_fields: Vec::new(),
            inline: Vec::new(),
            skipped: 0,
            links: Vec::new(),
        };

        for field in &model.descriptor.fields {
            let Some(annotation) = &field.annotation else {
                continue;
            };
            if annotation.skip {
                summary.skipped += 1;
                continue;
            }
            if annotation.inline {
                summary.inline.push(field.name.clone());
            } else {
                summary.wire_fields.push(field.name.clone());
            }
            if let Some(key) = normalize::record_key(&field.ty)
                && !summary.links.iter().any(|link| link == key.as_str())
            {
                summary.links.push(key.to_string());
            }
        }
        summary
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ModelList(pub Vec<ModelSummary>);

impl TableDisplay for ModelList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Model", "Location", "Wire fields", "Inline", "Skipped", "Links"]);
        for model in &self.0 {
            let inline = (!model.inline.is_empty()).then(|| model.inline.join(", "));
            let links = (!model.links.is_empty()).then(|| model.links.join(", "));
            table.add_row(vec![
                Cell::new(&model.name),
                Cell::new(format!("{}:{}", model.file, model.line)),
                Cell::new(model.wire_fields.join(", ")),
                output.optional_cell(inline.as_deref(), "-"),
                Cell::new(model.skipped),
                output.optional_cell(links.as_deref(), "-"),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|model| {
                format!(
                    "{} {}:{} fields={} links={}",
                    model.name,
                    model.file,
                    model.line,
                    model.wire_fields.len(),
                    model.links.join(",")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn handle_models(args: ModelsArgs, ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let workspace = Workspace::load(ctx, output)?;

    let list = ModelList(
        workspace
            .models
            .iter()
            .filter(|model| args.filter.as_deref().is_none_or(|filter| model.name.contains(filter)))
            .map(ModelSummary::from)
            .collect(),
    );

    if list.0.is_empty() {
        output.warning(&format!(
            "No models found under {} (derive `{}`)",
            ctx.config.scan.search_dirs.join(", "),
            ctx.config.scan.derive
        ));
        return Ok(());
    }

    output.heading("Models");
    output.display(&list)?;
    output.success(&format!("{} models", list.0.len()));
    Ok(())
}
