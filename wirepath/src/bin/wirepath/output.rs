use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// One line per item
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be rendered in every output format.
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Render `data` in the configured format, or as a string for tests.
    pub fn render<T>(&self, data: &T) -> Result<String>
    where
        T: Serialize + TableDisplay,
    {
        Ok(match self.options.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Table => data.to_table(self).to_string(),
            OutputFormat::Compact => data.to_compact(),
        })
    }

    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        println!("{}", self.render(data)?);
        Ok(())
    }

    /// Status lines are suppressed for JSON so stdout stays parseable.
    fn chatty(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    pub fn success(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.decorate(ICONS.success, message, THEME.success));
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.decorate(ICONS.error, message, THEME.error));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.decorate(ICONS.warning, message, THEME.warning));
        }
    }

    pub fn info(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.decorate(ICONS.info, message, THEME.info));
        }
    }

    /// Only shown with `--verbose`.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.decorate(ICONS.arrow, message, THEME.muted));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.chatty() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(THEME.primary).bold());
        }
    }

    fn decorate(&self, icon: &str, message: &str, color: colored::Color) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }

    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }
        table
    }

    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| {
                let cell = Cell::new(h).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            })
            .collect();
        table.set_header(header_cells);
    }

    /// Cell for a value that may be missing, dimmed when absent.
    pub fn optional_cell(&self, value: Option<&str>, missing: &str) -> Cell {
        match value {
            Some(value) => Cell::new(value),
            None if self.options.no_color => Cell::new(missing),
            None => Cell::new(missing).fg(TableColor::DarkGrey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    impl TableDisplay for TestData {
        fn to_table(&self, output: &OutputManager) -> Table {
            let mut table = output.create_table();
            output.add_table_header(&mut table, &["Name", "Value"]);
            table.add_row(vec![Cell::new(&self.name), Cell::new(self.value.to_string())]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.name, self.value)
        }
    }

    fn manager(output_format: OutputFormat) -> OutputManager {
        OutputManager::new(GlobalOptions {
            output_format,
            no_color: true,
            ..Default::default()
        })
    }

    fn data() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_render_json() {
        let rendered = manager(OutputFormat::Json).render(&data()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["name"], "test");
        assert_eq!(value["value"], 42);
    }

    #[test]
    fn test_render_compact() {
        assert_eq!(manager(OutputFormat::Compact).render(&data()).unwrap(), "test=42");
    }

    #[test]
    fn test_render_table() {
        let rendered = manager(OutputFormat::Table).render(&data()).unwrap();
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("42"));
    }

    #[test]
    fn test_quiet_display_is_ok() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(manager.display(&data()).is_ok());
    }
}
