//! Purpose: `primer` CLI entry point and command dispatch bootstrap.
//! Role: Binary crate root; parses args, runs commands, prints results.
//! Invariants: The no-argument invocation prints exactly three demo lines on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};

mod bench;
mod command_dispatch;
mod notice;

use bench::{BenchArgs, BenchFormat};
use notice::{Notice, notice_json};
use primer::core::error::{Error, ErrorKind, to_exit_code};
use primer::core::ops;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint()),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode).map_err(|err| (err, color_mode))
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid arguments");
    first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string()
}

fn clap_error_hint() -> &'static str {
    "Run `primer --help` (or `primer <command> --help`) for usage."
}

#[derive(Parser)]
#[command(
    name = "primer",
    version,
    about = "Tiny arithmetic and greeting demo",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Running with no command prints the demo: add(2, 3), mul(4, 5), and
greet("World"), one result per line.
"#,
    after_help = r#"EXAMPLES
  $ primer
  5
  20
  Hello, World!

  $ primer add 2 3
  $ primer mul -2 3
  $ primer greet Alice --json
  $ primer bench --format both

LEARN MORE
  $ primer <command> --help"#
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Print the three demo results",
        long_about = r#"Print the demo results in fixed order: add(2, 3), mul(4, 5), greet("World").

This is also what running `primer` with no command does."#,
        after_help = r#"EXAMPLES
  $ primer demo
  $ primer demo --json"#
    )]
    Demo {
        #[arg(long, help = "Emit one JSON envelope instead of three plain lines")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Add two integers",
        after_help = r#"EXAMPLES
  $ primer add 2 3
  $ primer add -2 3
  $ primer add 2 3 --json"#
    )]
    Add {
        #[arg(allow_negative_numbers = true, help = "Left addend")]
        a: i64,
        #[arg(allow_negative_numbers = true, help = "Right addend")]
        b: i64,
        #[arg(long, help = "Emit JSON instead of a plain number")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Multiply two integers",
        after_help = r#"EXAMPLES
  $ primer mul 3 4
  $ primer mul -2 3
  $ primer mul 3 4 --json"#
    )]
    Mul {
        #[arg(allow_negative_numbers = true, help = "Left factor")]
        a: i64,
        #[arg(allow_negative_numbers = true, help = "Right factor")]
        b: i64,
        #[arg(long, help = "Emit JSON instead of a plain number")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Greet a name",
        long_about = r#"Print the fixed greeting for NAME.

NAME is embedded verbatim; the empty string is allowed."#,
        after_help = r#"EXAMPLES
  $ primer greet Alice
  $ primer greet ""
  $ primer greet "John Doe" --json"#
    )]
    Greet {
        #[arg(help = "Name to greet (may be empty)")]
        name: String,
        #[arg(long, help = "Emit JSON instead of the greeting line")]
        json: bool,
    },
    #[command(
        about = "Benchmark the core operations",
        long_about = r#"Time add, mul, and greet in-process and report ns-per-call summaries.

The JSON report goes to stdout; the table goes to stderr."#,
        after_help = r#"EXAMPLES
  $ primer bench
  $ primer bench --iters 100000 --rounds 16 --format both
  $ primer bench --format json --out bench.json

NOTES
  - Use a release build for representative numbers.
  - p50/p95 summarize per-round ns-per-call samples."#
    )]
    Bench {
        #[arg(long, default_value_t = 10_000, help = "Calls per timed round")]
        iters: u64,
        #[arg(long, default_value_t = 8, help = "Timed rounds per operation")]
        rounds: u32,
        #[arg(long, default_value = "table", help = "Output format: json|table|both")]
        format: String,
        #[arg(
            long,
            value_name = "PATH",
            help = "Also write the JSON report to this file",
            value_hint = ValueHint::FilePath
        )]
        out: Option<PathBuf>,
    },
    #[command(
        about = "Print version info as JSON",
        long_about = r#"Emit version info as JSON (stable, machine-readable)."#,
        after_help = r#"EXAMPLES
  $ primer version"#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        long_about = r#"Generate shell completion scripts.

Prints a completion script for the given shell to stdout.
Install the generated file in your shell's completion directory (or source it)
to enable tab completion."#,
        after_help = r#"EXAMPLES
  $ primer completion bash > ~/.local/share/bash-completion/completions/primer
  $ primer completion zsh > ~/.zfunc/_primer
  $ primer completion fish > ~/.config/fish/completions/primer.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    match err.message() {
        Some(message) => message.to_string(),
        None => match err.kind() {
            ErrorKind::Internal => "internal error".to_string(),
            ErrorKind::Usage => "usage error".to_string(),
            ErrorKind::Io => "i/o error".to_string(),
        },
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}
