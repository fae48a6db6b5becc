//! Lens CLI - Command-line interface for Friction Lens
//!
//! Commands:
//! - analyze: Detect friction moments in a session and join external events
//! - normalize: Print the normalized event stream and session metadata
//! - doctor: Diagnose installation and input health

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use friction_lens::config::AnalyzerConfig;
use friction_lens::detectors::default_detectors;
use friction_lens::error::{AnalysisError, MalformedRecordWarning};
use friction_lens::pipeline::{SessionAnalyzer, SessionReport};
use friction_lens::schema::RECORD_FORMAT;
use friction_lens::types::{NormalizedEvent, SessionMetadata};
use friction_lens::{LENS_VERSION, PRODUCER_NAME};
use serde_json::Value;

/// Lens - Find UX friction in recorded user sessions
#[derive(Parser)]
#[command(name = "lens")]
#[command(version = LENS_VERSION)]
#[command(about = "Detect friction moments in session recordings", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect moments in one session and correlate them with external events
    Analyze {
        /// Interaction records file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// External analytics events file (JSON array)
        #[arg(short, long)]
        external: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Session identifier stamped on every moment
        #[arg(long, default_value = "session")]
        session_id: String,

        /// Correlation window in milliseconds
        #[arg(long, default_value_t = friction_lens::config::DEFAULT_CORRELATION_WINDOW_MS)]
        window_ms: i64,

        /// Events kept on each side of a moment as context
        #[arg(long, default_value_t = friction_lens::config::DEFAULT_CONTEXT_RADIUS)]
        context_radius: usize,

        /// Omit context windows from moments
        #[arg(long)]
        no_context: bool,

        /// Print the full report (metadata and warnings) instead of the moment list
        #[arg(long)]
        report: bool,
    },

    /// Print normalized events, session metadata and record warnings
    Normalize {
        /// Interaction records file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Session identifier
        #[arg(long, default_value = "session")]
        session_id: String,
    },

    /// Diagnose installation and input health
    Doctor {
        /// Interaction records file to check
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// JSON array of moments
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// One line per moment
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), LensCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            external,
            input_format,
            output_format,
            session_id,
            window_ms,
            context_radius,
            no_context,
            report,
        } => {
            let config = AnalyzerConfig::default()
                .with_correlation_window_ms(window_ms)
                .with_context_radius(context_radius)
                .with_context(!no_context);
            cmd_analyze(
                &input,
                external.as_deref(),
                input_format,
                output_format,
                &session_id,
                config,
                report,
            )
        }

        Commands::Normalize {
            input,
            input_format,
            session_id,
        } => cmd_normalize(&input, input_format, &session_id),

        Commands::Doctor { input, json } => cmd_doctor(input.as_deref(), json),
    }
}

fn cmd_analyze(
    input: &Path,
    external: Option<&Path>,
    input_format: InputFormat,
    output_format: OutputFormat,
    session_id: &str,
    config: AnalyzerConfig,
    full_report: bool,
) -> Result<(), LensCliError> {
    let records = read_records(input, &input_format)?;
    let external = match external {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Value::Array(Vec::new()),
    };

    let analyzer = SessionAnalyzer::with_config(config);
    let report = analyzer.analyze(session_id, &records, &external)?;
    log::info!(
        "{} moments, {} warnings",
        report.moments.len(),
        report.warnings.len()
    );

    println!("{}", format_report(&report, &output_format, full_report)?);
    Ok(())
}

fn cmd_normalize(
    input: &Path,
    input_format: InputFormat,
    session_id: &str,
) -> Result<(), LensCliError> {
    let records = read_records(input, &input_format)?;
    let analyzer = SessionAnalyzer::new();
    let (session, warnings) = analyzer.build_session(session_id, &records)?;

    let output = NormalizeOutput {
        session_id: session.session_id,
        metadata: session.metadata,
        events: session.events,
        warnings,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_doctor(input: Option<&Path>, json: bool) -> Result<(), LensCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "lens_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Lens version {}", LENS_VERSION),
    });

    checks.push(DoctorCheck {
        name: "record_format".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input records: {}", RECORD_FORMAT),
    });

    let detectors: Vec<&str> = default_detectors().iter().map(|d| d.name()).collect();
    checks.push(DoctorCheck {
        name: "detectors".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} detectors: {}", detectors.len(), detectors.join(", ")),
    });

    if let Some(path) = input {
        checks.push(check_input(path));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass records with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: LENS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Lens Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(LensCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_input(path: &Path) -> DoctorCheck {
    let name = "input".to_string();
    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: "Input file does not exist".to_string(),
        };
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return DoctorCheck {
                name,
                status: CheckStatus::Error,
                message: format!("Cannot read input file: {}", e),
            }
        }
    };

    let format = if content.trim_start().starts_with('[') {
        InputFormat::Json
    } else {
        InputFormat::Ndjson
    };
    let records = match parse_records(&content, &format) {
        Ok(records) => records,
        Err(e) => {
            return DoctorCheck {
                name,
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            }
        }
    };

    match SessionAnalyzer::new().normalize(&records) {
        Ok(batch) if batch.warnings.is_empty() => DoctorCheck {
            name,
            status: CheckStatus::Ok,
            message: format!("{} events, no malformed records", batch.events.len()),
        },
        Ok(batch) => DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: format!(
                "{} events, {} malformed records (first: {})",
                batch.events.len(),
                batch.warnings.len(),
                batch.warnings[0]
            ),
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    }
}

// Helper functions

fn read_records(input: &Path, format: &InputFormat) -> Result<Value, LensCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };
    parse_records(&data, format)
}

fn parse_records(data: &str, format: &InputFormat) -> Result<Value, LensCliError> {
    match format {
        InputFormat::Json => Ok(serde_json::from_str(data)?),
        InputFormat::Ndjson => {
            let mut records = Vec::new();
            for (line_num, line) in data.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let record = serde_json::from_str(line).map_err(|e| {
                    LensCliError::ParseError(format!("Line {}: {}", line_num + 1, e))
                })?;
                records.push(record);
            }
            Ok(Value::Array(records))
        }
    }
}

fn format_report(
    report: &SessionReport,
    format: &OutputFormat,
    full_report: bool,
) -> Result<String, LensCliError> {
    match format {
        OutputFormat::Json if full_report => Ok(serde_json::to_string(report)?),
        OutputFormat::Json => Ok(serde_json::to_string(&report.moments)?),
        OutputFormat::JsonPretty if full_report => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(&report.moments)?),
        OutputFormat::Text => {
            let mut lines = Vec::new();
            if full_report {
                let m = &report.metadata;
                lines.push(format!(
                    "session {} ({} -> {}, {} ms) {}",
                    report.session_id, m.start_time, m.end_time, m.duration, m.url
                ));
            }
            for correlated in &report.moments {
                lines.push(correlated.moment.summary());
                for external in &correlated.nearby_external_events {
                    lines.push(format!(
                        "    {:.2} {} @ {}",
                        external.relevance_score, external.event.kind, external.event.timestamp
                    ));
                }
            }
            if full_report {
                for warning in &report.warnings {
                    lines.push(format!("warning: {}", warning));
                }
            }
            Ok(lines.join("\n"))
        }
    }
}

// Error types

#[derive(Debug)]
enum LensCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for LensCliError {
    fn from(e: io::Error) -> Self {
        LensCliError::Io(e)
    }
}

impl From<AnalysisError> for LensCliError {
    fn from(e: AnalysisError) -> Self {
        LensCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for LensCliError {
    fn from(e: serde_json::Error) -> Self {
        LensCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LensCliError> for CliError {
    fn from(e: LensCliError) -> Self {
        match e {
            LensCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LensCliError::Analysis(AnalysisError::InvalidInput(msg)) => CliError {
                code: "INVALID_INPUT".to_string(),
                message: msg,
                hint: Some("Records and external events must each be a JSON array".to_string()),
            },
            LensCliError::Analysis(e) => CliError {
                code: "ANALYSIS_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'lens doctor --input <file>' for details".to_string()),
            },
            LensCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LensCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            LensCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Use --input-format json for a JSON array".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizeOutput {
    session_id: String,
    metadata: SessionMetadata,
    events: Vec<NormalizedEvent>,
    warnings: Vec<MalformedRecordWarning>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
