// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use picks_cli::{
    PooledSummary, ResidualDump, SkippedWindow, merge_dumps, parse_windows_json, run_eval,
    summarize_residuals,
};
use picks_core::{EvalConfig, Phase, PickError, ValidatedEvalConfig};
use picks_eval::{EvaluationWindow, ExperimentKey, ScoreMap};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LABEL: &str = "default";

struct Cli {
    command: Command,
    verbose: bool,
}

enum Command {
    Eval(EvalArgs),
    Summarize(SummarizeArgs),
}

#[derive(Debug, Default)]
struct EvalArgs {
    windows: PathBuf,
    config: Option<PathBuf>,
    threshold: Option<f64>,
    min_distance: Option<usize>,
    tolerance: Option<usize>,
    sampling_rate_hz: Option<f64>,
    no_smooth: bool,
    skip_invalid: bool,
    label: Option<String>,
    seed: u64,
    output: Option<PathBuf>,
    residuals: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug, Default)]
struct SummarizeArgs {
    /// Dumps to pool, in merge order.
    residuals: Vec<PathBuf>,
    phase: Option<Phase>,
    output: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Pick(#[from] PickError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    InvalidInput(String),
}

impl CliError {
    fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Pick(err) => err.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}

#[derive(Serialize)]
struct ExperimentOutput<'a> {
    label: &'a str,
    seed: u64,
}

#[derive(Serialize)]
struct EvalOutput<'a> {
    command: &'static str,
    experiment: ExperimentOutput<'a>,
    windows_evaluated: usize,
    windows_skipped: &'a [SkippedWindow],
    config: &'a EvalConfig,
    scores: ScoreMap,
}

#[derive(Serialize)]
struct SummarizeOutput<'a> {
    command: &'static str,
    sampling_rate_hz: f64,
    summaries: &'a [PooledSummary],
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let Some(cli) = parse_cli_from_env()? else {
        return Ok(());
    };

    init_tracing(cli.verbose);
    match cli.command {
        Command::Eval(args) => handle_eval(args),
        Command::Summarize(args) => handle_summarize(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_cli_from_env() -> Result<Option<Cli>, CliError> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    parse_cli(&args)
}

fn parse_cli(args: &[String]) -> Result<Option<Cli>, CliError> {
    if args.is_empty() || matches!(args[0].as_str(), "-h" | "--help") {
        print_root_help();
        return Ok(None);
    }
    if matches!(args[0].as_str(), "-V" | "--version") {
        print_version();
        return Ok(None);
    }

    let command_name = args[0].as_str();
    let rest = &args[1..];

    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_command_help(command_name)?;
        return Ok(None);
    }
    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        print_version();
        return Ok(None);
    }

    let cli = match command_name {
        "eval" => {
            let args = parse_eval_args(rest)?;
            Cli {
                verbose: args.verbose,
                command: Command::Eval(args),
            }
        }
        "summarize" => {
            let args = parse_summarize_args(rest)?;
            Cli {
                verbose: args.verbose,
                command: Command::Summarize(args),
            }
        }
        _ => {
            return Err(CliError::invalid_input(format!(
                "unknown command '{command_name}'; expected one of: eval, summarize"
            )));
        }
    };

    Ok(Some(cli))
}

fn parse_eval_args(tokens: &[String]) -> Result<EvalArgs, CliError> {
    let mut args = EvalArgs::default();
    let mut flags = Flags::new(tokens);
    while let Some(flag) = flags.next_flag()? {
        match flag.name {
            "--windows" => args.windows = PathBuf::from(flags.value(&flag)?),
            "--config" => args.config = Some(PathBuf::from(flags.value(&flag)?)),
            "--threshold" => args.threshold = Some(flags.parsed(&flag, "a number")?),
            "--min-distance" => {
                args.min_distance = Some(flags.parsed(&flag, "a non-negative integer")?);
            }
            "--tolerance" => {
                args.tolerance = Some(flags.parsed(&flag, "a non-negative integer")?);
            }
            "--sampling-rate" => args.sampling_rate_hz = Some(flags.parsed(&flag, "a number")?),
            "--no-smooth" => args.no_smooth = flag.switch()?,
            "--skip-invalid" => args.skip_invalid = flag.switch()?,
            "--label" => args.label = Some(flags.value(&flag)?.to_string()),
            "--seed" => args.seed = flags.parsed(&flag, "a non-negative integer")?,
            "--output" => args.output = Some(PathBuf::from(flags.value(&flag)?)),
            "--residuals" => args.residuals = Some(PathBuf::from(flags.value(&flag)?)),
            "--verbose" => args.verbose = flag.switch()?,
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown eval option '{other}'"
                )));
            }
        }
    }

    if args.windows.as_os_str().is_empty() {
        return Err(CliError::invalid_input("eval requires --windows <path>"));
    }

    Ok(args)
}

fn parse_summarize_args(tokens: &[String]) -> Result<SummarizeArgs, CliError> {
    let mut args = SummarizeArgs::default();
    let mut flags = Flags::new(tokens);
    while let Some(flag) = flags.next_flag()? {
        match flag.name {
            "--residuals" => args.residuals.push(PathBuf::from(flags.value(&flag)?)),
            "--phase" => args.phase = Some(Phase::parse(flags.value(&flag)?)?),
            "--output" => args.output = Some(PathBuf::from(flags.value(&flag)?)),
            "--verbose" => args.verbose = flag.switch()?,
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown summarize option '{other}'"
                )));
            }
        }
    }

    if args.residuals.is_empty() {
        return Err(CliError::invalid_input(
            "summarize requires at least one --residuals <path>",
        ));
    }

    Ok(args)
}

/// One `--name` or `--name=value` token.
struct Flag<'a> {
    name: &'a str,
    inline: Option<&'a str>,
}

impl Flag<'_> {
    /// Boolean flags are set by presence alone.
    fn switch(&self) -> Result<bool, CliError> {
        match self.inline {
            Some(_) => Err(CliError::invalid_input(format!(
                "{} does not accept a value",
                self.name
            ))),
            None => Ok(true),
        }
    }
}

/// Cursor over subcommand tokens; values follow their flag inline or as the
/// next token.
struct Flags<'a> {
    tokens: std::slice::Iter<'a, String>,
}

impl<'a> Flags<'a> {
    fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens: tokens.iter(),
        }
    }

    fn next_flag(&mut self) -> Result<Option<Flag<'a>>, CliError> {
        let Some(token) = self.tokens.next() else {
            return Ok(None);
        };
        if !token.starts_with("--") {
            return Err(CliError::invalid_input(format!(
                "unexpected positional argument '{token}'; expected --flag value"
            )));
        }
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token.as_str(), None),
        };
        Ok(Some(Flag { name, inline }))
    }

    fn value(&mut self, flag: &Flag<'a>) -> Result<&'a str, CliError> {
        if let Some(value) = flag.inline {
            return Ok(value);
        }
        match self.tokens.next() {
            None => Err(CliError::invalid_input(format!(
                "{} requires a value",
                flag.name
            ))),
            Some(value) if value.starts_with("--") => Err(CliError::invalid_input(format!(
                "{} requires a value, but got option '{value}'",
                flag.name
            ))),
            Some(value) => Ok(value.as_str()),
        }
    }

    fn parsed<T: FromStr>(&mut self, flag: &Flag<'a>, expected: &str) -> Result<T, CliError> {
        let raw = self.value(flag)?;
        parse_arg(raw, flag.name, expected)
    }
}

fn parse_arg<T: FromStr>(raw: &str, flag: &str, expected: &str) -> Result<T, CliError> {
    raw.parse::<T>()
        .map_err(|_| CliError::invalid_input(format!("{flag} expects {expected}, got '{raw}'")))
}

fn print_version() {
    println!("picks {}", env!("CARGO_PKG_VERSION"));
}

fn print_root_help() {
    println!(
        "picks {}\n\nUSAGE:\n  picks <COMMAND> [OPTIONS]\n\nCOMMANDS:\n  eval        Extract and score P/S picks for a window file\n  summarize   Pool and summarize residual dumps\n\nGLOBAL OPTIONS:\n  -h, --help      Show help\n  -V, --version   Show version\n\nRun 'picks <COMMAND> --help' for subcommand options.",
        env!("CARGO_PKG_VERSION")
    );
}

fn print_command_help(command: &str) -> Result<(), CliError> {
    match command {
        "eval" => {
            println!(
                "USAGE:\n  picks eval --windows <path> [OPTIONS]\n\nOPTIONS:\n  --windows <path>          Required JSON array of windows\n  --config <path>           Full EvalConfig JSON; flags below override it\n  --threshold <float>       Default: 0.2\n  --min-distance <usize>    Default: 50\n  --tolerance <usize>       Default: 25\n  --sampling-rate <float>   Default: 100\n  --no-smooth               Disable the 3-tap moving average\n  --skip-invalid            Skip windows with non-finite samples instead of failing\n  --label <name>            Experiment label. Default: default\n  --seed <u64>              Experiment seed. Default: 0\n  --output <path>           Write score JSON to file\n  --residuals <path>        Write residual dump JSON to file\n  --verbose                 Log every window"
            );
            Ok(())
        }
        "summarize" => {
            println!(
                "USAGE:\n  picks summarize --residuals <path> [--residuals <path> ...] [OPTIONS]\n\nOPTIONS:\n  --residuals <path>        Residual dump JSON; repeat to pool seeds\n  --phase <P|S>             Only report one phase\n  --output <path>           Write JSON output to file\n  --verbose                 Debug logging"
            );
            Ok(())
        }
        _ => Err(CliError::invalid_input(format!(
            "unknown command '{command}'; expected one of: eval, summarize"
        ))),
    }
}

fn resolve_config(args: &EvalArgs) -> Result<ValidatedEvalConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => *EvalConfig::from_json_str(read_text(path)?.as_str())?.as_config(),
        None => EvalConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.extract.threshold = threshold;
    }
    if let Some(min_distance) = args.min_distance {
        config.extract.min_distance = min_distance;
    }
    if let Some(tolerance) = args.tolerance {
        config.matching.tolerance = tolerance;
    }
    if let Some(rate) = args.sampling_rate_hz {
        config.sampling_rate_hz = rate;
    }
    if args.no_smooth {
        config.extract.smooth = false;
    }

    Ok(config.validate()?)
}

fn handle_eval(args: EvalArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let windows = load_windows(args.windows.as_path())?;
    let experiment = ExperimentKey::new(
        args.label.as_deref().unwrap_or(DEFAULT_LABEL),
        args.seed,
    );
    tracing::info!(
        windows = windows.len(),
        label = %experiment.label,
        seed = experiment.seed,
        "evaluating"
    );

    let run = run_eval(&windows, config, experiment, args.skip_invalid)?;

    if let Some(path) = args.residuals.as_deref() {
        let dump = ResidualDump::from_collector(&run.residuals, config.sampling_rate_hz())
            .with_summaries()?;
        write_json_output(&dump, Some(path))?;
    }

    write_json_output(
        &EvalOutput {
            command: "eval",
            experiment: ExperimentOutput {
                label: run.report.experiment.label.as_str(),
                seed: run.report.experiment.seed,
            },
            windows_evaluated: run.report.windows,
            windows_skipped: &run.skipped,
            config: &run.report.config,
            scores: run.report.score_map(),
        },
        args.output.as_deref(),
    )
}

fn handle_summarize(args: SummarizeArgs) -> Result<(), CliError> {
    let dumps = args
        .residuals
        .iter()
        .map(|path| load_dump(path))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(dumps = dumps.len(), "summarizing");

    let (residuals, sampling_rate_hz) = merge_dumps(dumps)?;
    let mut summaries = summarize_residuals(&residuals, sampling_rate_hz)?;
    if let Some(phase) = args.phase {
        summaries.retain(|summary| summary.phase == phase);
    }

    write_json_output(
        &SummarizeOutput {
            command: "summarize",
            sampling_rate_hz,
            summaries: &summaries,
        },
        args.output.as_deref(),
    )
}

fn load_windows(path: &Path) -> Result<Vec<EvaluationWindow>, CliError> {
    parse_windows_document(read_text(path)?.as_str(), path)
}

fn parse_windows_document(raw: &str, path: &Path) -> Result<Vec<EvaluationWindow>, CliError> {
    parse_windows_json(raw).map_err(|source| {
        CliError::json(
            format!("invalid windows JSON in '{}'", path.display()),
            source,
        )
    })
}

fn load_dump(path: &Path) -> Result<ResidualDump, CliError> {
    parse_dump_document(read_text(path)?.as_str(), path)
}

fn parse_dump_document(raw: &str, path: &Path) -> Result<ResidualDump, CliError> {
    serde_json::from_str(raw).map_err(|source| {
        CliError::json(
            format!("invalid residual dump in '{}'", path.display()),
            source,
        )
    })
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}
