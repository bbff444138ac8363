mod input;
mod logging;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};

use flamescope::export::{export_to_string, json::errors_to_json, ExportData, ExportFormat};
use flamescope::parser::{
    ErrorKind, ValidationErrors, Validator, ValidatorConfig, DEFAULT_MAX_DEPTH, MAX_SUPPORTED_DEPTH,
};
use flamescope::table::{flatten, SortColumn, SortDirection, SortState};
use flamescope::ui::{run_app, App};

use input::InputSource;

#[derive(Parser)]
#[command(name = "flamescope")]
#[command(version)]
#[command(about = "Flame graph validator and self/total table viewer", long_about = None)]
struct Cli {
    /// Deepest node level accepted before a document is rejected as too deep
    #[arg(
        long,
        global = true,
        env = "FLAMESCOPE_MAX_DEPTH",
        default_value_t = DEFAULT_MAX_DEPTH,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_SUPPORTED_DEPTH as u64)
    )]
    max_depth: usize,

    /// Write diagnostics to this file (the viewer logs nowhere otherwise)
    #[arg(long, global = true, env = "FLAMESCOPE_LOG_FILE", value_hint = ValueHint::FilePath)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore a flame graph interactively
    View {
        /// Flame graph JSON file, or - for standard input
        #[arg(value_hint = ValueHint::FilePath)]
        input: InputSource,
    },
    /// Validate a flame graph and report every problem found
    Check {
        /// Flame graph JSON file, or - for standard input
        #[arg(value_hint = ValueHint::FilePath)]
        input: InputSource,

        /// Print errors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the self/total table
    Table {
        /// Flame graph JSON file, or - for standard input
        #[arg(value_hint = ValueHint::FilePath)]
        input: InputSource,

        /// Column to sort by (name, self, total); pre-order when omitted
        #[arg(short, long)]
        sort: Option<SortColumn>,

        /// Sort direction (asc, desc, none)
        #[arg(short, long, default_value_t = SortDirection::Descending)]
        direction: SortDirection,

        /// Output format (json, csv, markdown)
        #[arg(short, long, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    init_logging(&cli)?;

    let config = ValidatorConfig::new(cli.max_depth);
    debug!(max_depth = config.max_depth, "configuration loaded");

    match cli.command {
        Commands::View { input } => view(input, config),
        Commands::Check { input, json } => check(&input, config, json),
        Commands::Table {
            input,
            sort,
            direction,
            format,
        } => table(&input, config, sort, direction, format),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    match (&cli.log_file, &cli.command) {
        (Some(path), _) => logging::init_file(path)
            .with_context(|| format!("Failed to open log file {}", path.display())),
        (None, Commands::View { .. }) => Ok(()),
        (None, _) => {
            logging::init_stderr();
            Ok(())
        }
    }
}

/// Exit status for a rejected document: 2 when it was too deep, 1 otherwise.
fn failure_code(errors: &ValidationErrors) -> ExitCode {
    match errors.kind() {
        ErrorKind::TooDeep => ExitCode::from(2),
        ErrorKind::Parse | ErrorKind::Structure => ExitCode::from(1),
    }
}

fn print_errors<W: Write>(writer: &mut W, errors: &ValidationErrors) -> io::Result<()> {
    writeln!(writer, "{}", errors)?;
    for error in errors {
        writeln!(writer, "  {}", error)?;
    }
    Ok(())
}

fn check(input: &InputSource, config: ValidatorConfig, json: bool) -> Result<ExitCode> {
    let text = input.read()?;
    let mut stdout = io::stdout().lock();

    match Validator::new(config).validate(&text) {
        Ok(tree) => {
            info!(nodes = tree.node_count(), "document is valid");
            if json {
                writeln!(stdout, "{}", serde_json::json!({ "kind": "ok", "errors": [] }))?;
            } else {
                writeln!(
                    stdout,
                    "{}: ok ({} nodes, root total {})",
                    input,
                    tree.node_count(),
                    tree.value
                )?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            if json {
                let rendered = errors_to_json(&errors).context("Failed to serialize errors")?;
                writeln!(stdout, "{}", rendered)?;
            } else {
                write!(stdout, "{}: ", input)?;
                print_errors(&mut stdout, &errors)?;
            }
            Ok(failure_code(&errors))
        }
    }
}

fn table(
    input: &InputSource,
    config: ValidatorConfig,
    sort: Option<SortColumn>,
    direction: SortDirection,
    format: ExportFormat,
) -> Result<ExitCode> {
    let text = input.read()?;

    let tree = match Validator::new(config).validate(&text) {
        Ok(tree) => tree,
        Err(errors) => {
            let mut stderr = io::stderr().lock();
            write!(stderr, "{}: ", input)?;
            print_errors(&mut stderr, &errors)?;
            return Ok(failure_code(&errors));
        }
    };

    let sort = match sort {
        Some(column) => SortState::sorted_by(column, direction),
        None => SortState::new(),
    };
    let data = ExportData::new(&flatten(&tree), sort);
    let output = export_to_string(format, &data)
        .with_context(|| format!("Failed to render {} table", format))?;

    io::stdout().lock().write_all(output.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

fn view(input: InputSource, config: ValidatorConfig) -> Result<ExitCode> {
    let text = input.read()?;

    let mut app = App::new(input.to_string(), config);
    app.set_input(&text);

    let mut stdout = io::stdout();
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut app, || {
        input
            .reload()
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    })?;

    terminal.show_cursor()?;
    Ok(ExitCode::SUCCESS)
}

/// Restores the terminal even when the viewer exits with an error.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_table_arguments() {
        let cli = Cli::try_parse_from([
            "flamescope", "table", "trace.json", "--sort", "self", "--direction", "asc", "--format", "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Table {
                input,
                sort,
                direction,
                format,
            } => {
                assert_eq!(input, InputSource::File(PathBuf::from("trace.json")));
                assert_eq!(sort, Some(SortColumn::SelfValue));
                assert_eq!(direction, SortDirection::Ascending);
                assert_eq!(format, ExportFormat::Csv);
            }
            _ => panic!("Expected table command"),
        }
    }

    #[test]
    fn test_table_defaults() {
        let cli = Cli::try_parse_from(["flamescope", "table", "-"]).unwrap();
        assert_eq!(cli.max_depth, DEFAULT_MAX_DEPTH);
        match cli.command {
            Commands::Table {
                input,
                sort,
                direction,
                format,
            } => {
                assert_eq!(input, InputSource::Stdin);
                assert_eq!(sort, None);
                assert_eq!(direction, SortDirection::Descending);
                assert_eq!(format, ExportFormat::Markdown);
            }
            _ => panic!("Expected table command"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["flamescope", "check", "a.json", "--json", "--max-depth", "8"])
            .unwrap();
        assert_eq!(cli.max_depth, 8);
        assert!(matches!(cli.command, Commands::Check { json: true, .. }));
    }

    #[test]
    fn test_max_depth_range() {
        let deep = Cli::try_parse_from(["flamescope", "check", "a.json", "--max-depth", "200"]).unwrap();
        assert_eq!(deep.max_depth, 200);

        assert!(Cli::try_parse_from(["flamescope", "check", "a.json", "--max-depth", "0"]).is_err());
        let too_large = (MAX_SUPPORTED_DEPTH + 1).to_string();
        assert!(
            Cli::try_parse_from(["flamescope", "check", "a.json", "--max-depth", too_large.as_str()]).is_err()
        );
    }

    #[test]
    fn test_rejects_unknown_sort_column() {
        assert!(Cli::try_parse_from(["flamescope", "table", "a.json", "--sort", "weight"]).is_err());
    }

    #[test]
    fn test_failure_code() {
        let config = ValidatorConfig::new(1);
        let too_deep = Validator::new(config)
            .validate(r#"{"name":"r","value":1,"children":[{"name":"c","value":1}]}"#)
            .unwrap_err();
        assert_eq!(failure_code(&too_deep), ExitCode::from(2));

        let malformed = Validator::default().validate("{").unwrap_err();
        assert_eq!(failure_code(&malformed), ExitCode::from(1));
    }

    #[test]
    fn test_print_errors() {
        let errors = Validator::default()
            .validate(r#"{"name":"root","value":"x"}"#)
            .unwrap_err();
        let mut output = Vec::new();
        print_errors(&mut output, &errors).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("  value: Expected number, received string"));
    }
}
