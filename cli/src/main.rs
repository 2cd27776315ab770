use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_dispatch_core::{CommandContext, CommandError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod config;
mod shell;

use config::ShellConfig;
use shell::{ADMIN, Shell};

/// Output format for results and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "dispatch-shell")]
#[command(about = "Key/value shell driven by a typed command grammar")]
struct Cli {
    /// YAML configuration file (prompt, usage style).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides it.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Enable commands that require administrator access.
    #[arg(long, global = true)]
    admin: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute command lines in order, stopping at the first failure.
    Run(RunArgs),
    /// Print usage for the whole grammar or beneath a literal path.
    Usage(UsageArgs),
    /// Read command lines from stdin until EOF.
    Repl,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Command lines, one per argument (quote lines containing spaces).
    #[arg(required = true)]
    lines: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Literal path to describe (e.g. `admin`).
    path: Vec<String>,
}

/// Outcome of one executed line, as rendered by `--format json`.
#[derive(Debug, Serialize)]
struct LineReport<'a> {
    line: &'a str,
    ok: bool,
    output: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
}

impl<'a> LineReport<'a> {
    fn new(line: &'a str, result: &Result<Vec<String>, CommandError>) -> Self {
        match result {
            Ok(output) => Self {
                line,
                ok: true,
                output: output.clone(),
                error: None,
                position: None,
            },
            Err(err) => Self {
                line,
                ok: false,
                output: Vec::new(),
                error: Some(err.to_string()),
                position: err.as_parse().map(|parse| parse.index()),
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_ref()).and_then(|config| {
        let shell = Shell::new(config.usage_style.clone());
        let context = CommandContext::builder().put(&ADMIN, cli.admin).build();
        match cli.command {
            Command::Run(args) => run_lines(&shell, &context, cli.format, &args.lines),
            Command::Usage(args) => run_usage(&shell, &context, cli.format, &args.path),
            Command::Repl => run_repl(&shell, &context, cli.format, &config),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ShellConfig, String> {
    match path {
        Some(path) => ShellConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(ShellConfig::default()),
    }
}

fn run_lines(
    shell: &Shell,
    context: &CommandContext,
    format: OutputFormat,
    lines: &[String],
) -> Result<(), String> {
    let mut reports = Vec::with_capacity(lines.len());
    let mut failure = None;

    for line in lines {
        let result = shell.execute(line, context);
        match format {
            OutputFormat::Text => {
                if let Ok(output) = &result {
                    print_lines(output);
                }
            }
            OutputFormat::Json => reports.push(LineReport::new(line, &result)),
        }
        if let Err(err) = result {
            failure = Some(format!("'{line}': {err}"));
            break;
        }
    }

    if format == OutputFormat::Json {
        print_json(&reports)?;
    }
    match failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

fn run_usage(
    shell: &Shell,
    context: &CommandContext,
    format: OutputFormat,
    path: &[String],
) -> Result<(), String> {
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    let lines = shell
        .usage(&path, context)
        .ok_or_else(|| format!("Unknown command path '{}'", path.join(" ")))?;
    match format {
        OutputFormat::Text => print_lines(&lines),
        OutputFormat::Json => print_json(&serde_json::json!({ "usage": lines }))?,
    }
    Ok(())
}

fn run_repl(
    shell: &Shell,
    context: &CommandContext,
    format: OutputFormat,
    config: &ShellConfig,
) -> Result<(), String> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = std::io::stdout();

    loop {
        if interactive {
            print!("{}", config.prompt);
            stdout
                .flush()
                .map_err(|err| format!("Failed to write prompt: {err}"))?;
        }

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        if read == 0 {
            return Ok(());
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        let result = shell.execute(line, context);
        match format {
            OutputFormat::Text => match &result {
                Ok(output) => print_lines(output),
                Err(err) => eprintln!("error: {err}"),
            },
            OutputFormat::Json => print_json_line(&LineReport::new(line, &result))?,
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{json}");
    Ok(())
}

fn print_json_line<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{json}");
    Ok(())
}
