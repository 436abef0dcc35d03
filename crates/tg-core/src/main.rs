//! TrendGuard - lifecycle phase decoding for engagement metrics
//!
//! The main entry point for trendguard, handling:
//! - Viterbi decoding of observation sequences into lifecycle phases
//! - Lifecycle analysis and decline detection
//! - Model configuration inspection and validation

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{info, info_span, warn};

use tg_core::config::{
    build_model, list_presets, load_model, read_model_file, ConfigError, ConfigOptions,
    ConfigSnapshot, ConfigSource, PresetName, ResolvedModel,
};
use tg_core::exit_codes::ExitCode;
use tg_core::hmm::{HmmError, ViterbiDecoder};
use tg_core::input::{load_trends, InputError, Trend};
use tg_core::lifecycle::{
    analyze_trend_with, AnalysisSummary, DeclineDetector, SkippedTrend, DEFAULT_MIN_POINTS,
    DEFAULT_TERMINAL_STATES,
};
use tg_core::logging::{generate_run_id, init_logging, verbosity_level, LogConfig, LogFormat};
use tg_core::output::{
    render_analysis_md, render_analysis_summary, render_decode_md, render_decode_summary,
    DecodedTrend, OutputFormat, SCHEMA_VERSION,
};
use tg_core::schema::{available_schemas, generate_all_schemas, generate_schema};

/// TrendGuard - decode engagement trends into lifecycle phases
#[derive(Parser)]
#[command(name = "trendguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Model file (overrides every other model source)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Built-in model used when no model file is found
    #[arg(long, global = true)]
    preset: Option<PresetName>,

    /// Directory containing model.json
    #[arg(long, global = true, env = "TRENDGUARD_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

impl GlobalOpts {
    fn config_options(&self) -> ConfigOptions {
        ConfigOptions {
            model_path: self.model.clone(),
            config_dir: self.config_dir.clone(),
            preset: self.preset,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode each trend into its most likely phase sequence
    Decode(DecodeArgs),

    /// Decode trends and report where each one enters a terminal phase
    Analyze(AnalyzeArgs),

    /// Inspect and validate model configuration
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Observation file (`-` for stdin)
    input: PathBuf,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Observation file (`-` for stdin)
    input: PathBuf,

    /// Phase that counts as decline (repeatable; defaults to the model's)
    #[arg(long = "terminal-state")]
    terminal_state: Vec<String>,

    /// Skip trends with fewer points than this
    #[arg(long, default_value_t = DEFAULT_MIN_POINTS)]
    min_points: usize,

    /// Analyze only the trend with this name
    #[arg(long)]
    trend: Option<String>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved model and where it came from
    Show,
    /// Validate a model file
    Validate {
        /// Model file to validate
        path: PathBuf,
    },
    /// List built-in presets
    Presets,
    /// Print JSON schema for model files and outputs
    Schema {
        /// Schema to print (all when omitted)
        name: Option<String>,
    },
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::Clean
                }
                _ => ExitCode::ArgsError,
            };
            return code.into();
        }
    };

    let log_config = LogConfig::from_env(
        verbosity_level(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let run_id = generate_run_id();
    let span = info_span!("run", run_id = %run_id);
    let _enter = span.enter();

    let ctx = RunContext {
        global: &cli.global,
        run_id: &run_id,
    };

    let exit_code = match &cli.command {
        Commands::Decode(args) => run_decode(&ctx, args),
        Commands::Analyze(args) => run_analyze(&ctx, args),
        Commands::Config(args) => run_config(&ctx, args),
        Commands::Version => print_version(&ctx),
    };

    exit_code.into()
}

struct RunContext<'a> {
    global: &'a GlobalOpts,
    run_id: &'a str,
}

impl RunContext<'_> {
    fn format(&self) -> OutputFormat {
        self.global.format
    }

    fn load_model(&self) -> Result<ResolvedModel, ExitCode> {
        load_model(&self.global.config_options()).map_err(|e| output_config_error(self, &e))
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_decode(ctx: &RunContext<'_>, args: &DecodeArgs) -> ExitCode {
    let resolved = match ctx.load_model() {
        Ok(r) => r,
        Err(code) => return code,
    };
    let trends = match load_trends(&args.input) {
        Ok(t) => t,
        Err(e) => return output_input_error(ctx, &e),
    };

    let decoder = ViterbiDecoder::default();
    let mut results = Vec::with_capacity(trends.len());
    for trend in &trends {
        let path = match decoder.decode_path(&resolved.model, &trend.observations) {
            Ok(p) => p,
            Err(e) => return output_decode_error(ctx, trend, &e),
        };
        results.push(DecodedTrend {
            name: trend.display_name().to_string(),
            labels: path.labels(&resolved.model),
            states: path.states,
            log_score: path.log_score,
            confidence: path.confidence,
        });
    }
    info!(trends = results.len(), "decode complete");

    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "model": &resolved.snapshot,
                "trends": results,
            });
            if let Err(code) = print_json(&response) {
                return code;
            }
        }
        OutputFormat::Md => print!("{}", render_decode_md(&results)),
        OutputFormat::Summary => print!("{}", render_decode_summary(&results)),
    }
    ExitCode::Clean
}

fn run_analyze(ctx: &RunContext<'_>, args: &AnalyzeArgs) -> ExitCode {
    let resolved = match ctx.load_model() {
        Ok(r) => r,
        Err(code) => return code,
    };

    let detector = match terminal_detector(&resolved, &args.terminal_state) {
        Ok(d) => d,
        Err(unknown) => {
            return output_error(
                ctx,
                ExitCode::ArgsError,
                &format!(
                    "unknown terminal state(s) {}; model states are {}",
                    unknown.join(", "),
                    resolved.model.states().join(", ")
                ),
                None,
            );
        }
    };

    let mut trends = match load_trends(&args.input) {
        Ok(t) => t,
        Err(e) => return output_input_error(ctx, &e),
    };
    if let Some(wanted) = &args.trend {
        trends.retain(|t| t.display_name() == wanted);
        if trends.is_empty() {
            return output_error(
                ctx,
                ExitCode::ArgsError,
                &format!("no trend named '{}' in input", wanted),
                None,
            );
        }
    }

    let decoder = ViterbiDecoder::default();
    let mut reports = Vec::new();
    let mut skipped = Vec::new();
    for trend in &trends {
        let name = trend.display_name();
        if trend.len() < args.min_points {
            warn!(
                trend = name,
                points = trend.len(),
                min_points = args.min_points,
                "trend too short, skipping"
            );
            skipped.push(SkippedTrend {
                name: name.to_string(),
                points: trend.len(),
                reason: format!("fewer than {} points", args.min_points),
            });
            continue;
        }
        match analyze_trend_with(&decoder, &resolved.model, name, &trend.observations, &detector) {
            Ok(report) => reports.push(report),
            Err(e) => return output_decode_error(ctx, trend, &e),
        }
    }

    let summary = AnalysisSummary::new(reports, skipped);
    info!(
        analyzed = summary.total_trends_analyzed,
        with_decline = summary.trends_with_decline,
        skipped = summary.skipped.len(),
        "analysis complete"
    );

    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": summary.generated_at.to_rfc3339(),
                "model": &resolved.snapshot,
                "terminal_states": detector.terminal_states(),
                "summary": &summary,
            });
            if let Err(code) = print_json(&response) {
                return code;
            }
        }
        OutputFormat::Md => print!("{}", render_analysis_md(&summary)),
        OutputFormat::Summary => print!("{}", render_analysis_summary(&summary)),
    }

    if summary.any_decline() {
        ExitCode::DeclineDetected
    } else {
        ExitCode::Clean
    }
}

/// Terminal set: `--terminal-state` flags, else the model file's, else the
/// default labels the model actually defines.
fn terminal_detector(
    resolved: &ResolvedModel,
    cli_states: &[String],
) -> Result<DeclineDetector, Vec<String>> {
    let detector = if !cli_states.is_empty() {
        DeclineDetector::new(cli_states.iter().cloned())
    } else if !resolved.config.terminal_states.is_empty() {
        DeclineDetector::new(resolved.config.terminal_states.iter().cloned())
    } else {
        DeclineDetector::new(
            DEFAULT_TERMINAL_STATES
                .iter()
                .filter(|s| resolved.model.state_index(s).is_some())
                .copied(),
        )
    };
    let unknown = detector.unknown_states(&resolved.model);
    if unknown.is_empty() {
        Ok(detector)
    } else {
        Err(unknown)
    }
}

fn run_config(ctx: &RunContext<'_>, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(ctx),
        ConfigCommands::Validate { path } => run_config_validate(ctx, path),
        ConfigCommands::Presets => run_config_presets(ctx),
        ConfigCommands::Schema { name } => run_config_schema(ctx, name.as_deref()),
    }
}

/// Display the resolved model (including the built-in default if no file is present).
fn run_config_show(ctx: &RunContext<'_>) -> ExitCode {
    let resolved = match ctx.load_model() {
        Ok(r) => r,
        Err(code) => return code,
    };
    let snapshot = &resolved.snapshot;

    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "source": resolved.source.to_string(),
                "path": resolved.path.as_ref().map(|p| p.display().to_string()),
                "hash": &snapshot.model_hash,
                "model": &resolved.config,
            });
            if let Err(code) = print_json(&response) {
                return code;
            }
        }
        OutputFormat::Md => {
            println!("# Model Configuration\n");
            println!("- Source: {}", resolved.source);
            if let Some(path) = &resolved.path {
                println!("- Path: {}", path.display());
            }
            println!("- Hash: {}", snapshot.short_id());
            println!("- States: {}", resolved.model.states().join(", "));
            println!("- Features: {}", resolved.model.feature_names().join(", "));
            println!(
                "- Terminal states: {}",
                snapshot.summary.terminal_states.join(", ")
            );
        }
        OutputFormat::Summary => {
            println!(
                "[{}] {} states x {} features from {} ({})",
                ctx.run_id,
                resolved.model.n_states(),
                resolved.model.dim(),
                resolved.source,
                snapshot.short_id()
            );
        }
    }
    ExitCode::Clean
}

fn run_config_validate(ctx: &RunContext<'_>, path: &Path) -> ExitCode {
    let result = read_model_file(path).and_then(|(config, raw)| {
        build_model(&config).map(|model| (config, model, raw))
    });
    let (config, model, raw) = match result {
        Ok(v) => v,
        Err(e) => return output_config_error(ctx, &e),
    };
    let snapshot = ConfigSnapshot::new(
        &config,
        &ConfigSource::CliArgument,
        Some(path),
        Some(&raw),
    );
    info!(path = %path.display(), "model file valid");

    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "valid",
                "path": path.display().to_string(),
                "model": &snapshot,
            });
            if let Err(code) = print_json(&response) {
                return code;
            }
        }
        OutputFormat::Md => {
            println!("# Model Validation\n");
            println!("- Path: {}", path.display());
            println!("- Status: valid");
            println!("- States: {}", model.states().join(", "));
        }
        OutputFormat::Summary => {
            println!(
                "{}: valid ({} states, {} features)",
                path.display(),
                model.n_states(),
                model.dim()
            );
        }
    }
    ExitCode::Clean
}

fn run_config_presets(ctx: &RunContext<'_>) -> ExitCode {
    let presets = list_presets();
    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "presets": presets,
            });
            if let Err(code) = print_json(&response) {
                return code;
            }
        }
        OutputFormat::Md => {
            println!("# Presets\n");
            println!("| name | states | features | description |\n|---|---|---|---|");
            for p in &presets {
                println!(
                    "| {} | {} | {} | {} |",
                    p.name,
                    p.states.join(", "),
                    p.dimensions,
                    p.description
                );
            }
        }
        OutputFormat::Summary => {
            for p in &presets {
                println!("{}: {}", p.name, p.description);
            }
        }
    }
    ExitCode::Clean
}

fn run_config_schema(ctx: &RunContext<'_>, name: Option<&str>) -> ExitCode {
    let value = match name {
        Some(name) => match generate_schema(name) {
            Some(schema) => schema,
            None => {
                let known: Vec<&str> = available_schemas().iter().map(|(n, _)| *n).collect();
                return output_error(
                    ctx,
                    ExitCode::ArgsError,
                    &format!("unknown schema '{}'; available: {}", name, known.join(", ")),
                    None,
                );
            }
        },
        None => json!(generate_all_schemas()),
    };
    match print_json(&value) {
        Ok(()) => ExitCode::Clean,
        Err(code) => code,
    }
}

fn print_version(ctx: &RunContext<'_>) -> ExitCode {
    let version = env!("CARGO_PKG_VERSION");
    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "name": "trendguard",
                "version": version,
                "schema_version": SCHEMA_VERSION,
            });
            if let Err(code) = print_json(&response) {
                return code;
            }
        }
        OutputFormat::Md | OutputFormat::Summary => println!("trendguard {}", version),
    }
    ExitCode::Clean
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json(value: &serde_json::Value) -> Result<(), ExitCode> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize output");
            Err(ExitCode::InternalError)
        }
    }
}

/// Print an error object to stderr in the selected format.
fn output_error(
    ctx: &RunContext<'_>,
    exit_code: ExitCode,
    message: &str,
    detail_code: Option<u32>,
) -> ExitCode {
    if exit_code.is_caller_fault() {
        tracing::warn!(code = exit_code.code_name(), "{}", message);
    } else {
        tracing::error!(code = exit_code.code_name(), "{}", message);
    }
    match ctx.format() {
        OutputFormat::Json => {
            let response = json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "error": {
                    "code": exit_code.code_name(),
                    "exit_code": exit_code.as_i32(),
                    "detail_code": detail_code,
                    "message": message,
                }
            });
            match serde_json::to_string_pretty(&response) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("error: {}", message),
            }
        }
        OutputFormat::Summary => {
            eprintln!("[{}] error: {}", ctx.run_id, message);
        }
        OutputFormat::Md => {
            eprintln!("# Error\n");
            eprintln!("Error: {}", message);
        }
    }
    exit_code
}

fn output_config_error(ctx: &RunContext<'_>, error: &ConfigError) -> ExitCode {
    let exit_code = match error {
        ConfigError::IoError { .. } => ExitCode::IoError,
        _ => ExitCode::ConfigError,
    };
    output_error(ctx, exit_code, &error.to_string(), Some(error.code()))
}

fn output_input_error(ctx: &RunContext<'_>, error: &InputError) -> ExitCode {
    output_error(ctx, ExitCode::InputError, &error.to_string(), None)
}

fn output_decode_error(ctx: &RunContext<'_>, trend: &Trend, error: &HmmError) -> ExitCode {
    let exit_code = if error.is_input_error() {
        ExitCode::InputError
    } else {
        ExitCode::InternalError
    };
    output_error(
        ctx,
        exit_code,
        &format!("trend '{}': {}", trend.display_name(), error),
        None,
    )
}
