mod commands;
mod context;
mod examples;
mod output;
mod scanner;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::io;
use std::path::PathBuf;

use commands::{
    models::{ModelsArgs, handle_models},
    paths::{PathsArgs, handle_paths},
    resolve::{ResolveArgs, handle_resolve},
};
use context::ProjectContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("WIREPATH_PROJECT", "Project root to scan instead of the enclosing Cargo project"),
    ("RUST_LOG", "Log filter (defaults to warn, or debug with --verbose)"),
];

#[derive(Parser)]
#[command(name = "wirepath")]
#[command(version)]
#[command(
    about = "Inspect how model field paths map to wire field names",
    long_about = r#"Scans a Rust project for #[derive(WireModel)] structs and resolves
dotted application paths (address.city) to wire paths (addr.city) the
same way the wirepath library does at runtime.

Commands:
  models    List discovered models
  resolve   Resolve application paths on a model
  paths     Print the full field map of a model
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Project root (defaults to the nearest directory with a Cargo.toml)
    #[arg(long, env = "WIREPATH_PROJECT", global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List models declared in the project
    Models(ModelsArgs),

    /// Resolve application paths on a model
    Resolve(ResolveArgs),

    /// Print every resolvable path of a model
    Paths(PathsArgs),
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        let matches = match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => matches,
            Err(err) => exit_with(err),
        };
        match Cli::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(err) => exit_with(err),
        }
    }
}

fn exit_with(err: clap::error::Error) -> ! {
    let code = match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => err.exit_code(),
    };
    if let Err(print_err) = err.print()
        && print_err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to display help: {print_err}");
    }
    std::process::exit(code);
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    let mut command = Cli::command()
        .after_long_help(render_top_level_appendix(use_color))
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });

    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand
                .clone()
                .after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let _ = writeln!(buffer, "{}", stylize("Examples:", theme.highlight, true, use_color));
    for (index, group) in groups.iter().enumerate() {
        let _ = writeln!(buffer, "  {}", stylize(group.title, theme.primary, true, use_color));
        for command in group.commands {
            let arrow = stylize(ICONS.arrow, theme.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {}", stylize(command, theme.secondary, false, use_color));
        }
        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }
    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let _ = writeln!(buffer, "{}", stylize("Environment Variables:", theme.highlight, true, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let _ = writeln!(buffer, "  {key_text}  {}", stylize(description, theme.value, false, use_color));
    }

    buffer.push('\n');
    let tip = stylize(
        "Use 'wirepath <command> --help' to view examples for each command.",
        theme.secondary,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{} {tip}", stylize("Tip:", theme.highlight, true, use_color));
    buffer
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.secondary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    let color = match color {
        ThemeColor::Black => ClapColor::Ansi(AnsiColor::Black),
        ThemeColor::Red => ClapColor::Ansi(AnsiColor::Red),
        ThemeColor::Green => ClapColor::Ansi(AnsiColor::Green),
        ThemeColor::Yellow => ClapColor::Ansi(AnsiColor::Yellow),
        ThemeColor::Blue => ClapColor::Ansi(AnsiColor::Blue),
        ThemeColor::Magenta => ClapColor::Ansi(AnsiColor::Magenta),
        ThemeColor::Cyan => ClapColor::Ansi(AnsiColor::Cyan),
        ThemeColor::White => ClapColor::Ansi(AnsiColor::White),
        ThemeColor::BrightBlack => ClapColor::Ansi(AnsiColor::BrightBlack),
        ThemeColor::BrightRed => ClapColor::Ansi(AnsiColor::BrightRed),
        ThemeColor::BrightGreen => ClapColor::Ansi(AnsiColor::BrightGreen),
        ThemeColor::BrightYellow => ClapColor::Ansi(AnsiColor::BrightYellow),
        ThemeColor::BrightBlue => ClapColor::Ansi(AnsiColor::BrightBlue),
        ThemeColor::BrightMagenta => ClapColor::Ansi(AnsiColor::BrightMagenta),
        ThemeColor::BrightCyan => ClapColor::Ansi(AnsiColor::BrightCyan),
        ThemeColor::BrightWhite => ClapColor::Ansi(AnsiColor::BrightWhite),
        ThemeColor::TrueColor { r, g, b } => ClapColor::Rgb(RgbColor(r, g, b)),
    };
    Style::new().fg_color(Some(color))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let cli = Cli::parse_with_styles();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli.project, cli.command, &output) {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(project: Option<PathBuf>, command: Commands, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find(project.as_deref())?;
    output.verbose(&format!("Project root: {}", ctx.project_root.display()));

    match command {
        Commands::Models(args) => handle_models(args, &ctx, output),
        Commands::Resolve(args) => handle_resolve(args, &ctx, output),
        Commands::Paths(args) => handle_paths(args, &ctx, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wirepath", "resolve", "User", "name", "address.city", "--output", "json", "-q"])
            .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.quiet);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.model, "User");
                assert_eq!(args.paths, ["name", "address.city"]);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn resolve_requires_a_path() {
        assert!(Cli::try_parse_from(["wirepath", "resolve", "User"]).is_err());
    }

    #[test]
    fn stylize_without_color_is_plain() {
        assert_eq!(stylize("Tip:", THEME.highlight, true, false), "Tip:");
    }
}
