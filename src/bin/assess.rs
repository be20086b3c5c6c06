//! Assess CLI - Command-line interface for Nutri-Assess
//!
//! Commands:
//! - compute: Assess raw input records into reports (batch mode)
//! - run: Assess streaming NDJSON from stdin (streaming mode)
//! - validate: Report normalizer notices for raw input records
//! - doctor: Diagnose engine health and configuration
//! - schema: Print input/output schema information

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nutri_assess::encoder::REPORT_VERSION;
use nutri_assess::pediatric;
use nutri_assess::pipeline::AssessmentProcessor;
use nutri_assess::schema::{InputReader, RawAssessmentInput, SCHEMA_VERSION};
use nutri_assess::types::AssessmentReport;
use nutri_assess::units::{LengthUnit, WeightUnit};
use nutri_assess::{Normalizer, ENGINE_VERSION, PRODUCER_NAME};

/// Assess - Clinical nutrition assessment engine
#[derive(Parser)]
#[command(name = "assess")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute body composition, BMI classification and energy needs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess raw input records into reports (batch mode)
    Compute {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        #[command(flatten)]
        units: UnitDefaults,

        /// Producer instance id (random when omitted)
        #[arg(long)]
        instance_id: Option<String>,
    },

    /// Assess streaming NDJSON from stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        #[command(flatten)]
        units: UnitDefaults,

        /// Producer instance id (random when omitted)
        #[arg(long)]
        instance_id: Option<String>,

        /// Flush output after each record (`--flush false` to buffer)
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        flush: bool,
    },

    /// Report normalizer notices for raw input records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        #[command(flatten)]
        units: UnitDefaults,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,

        /// Fail when any record raises a notice
        #[arg(long)]
        strict: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

/// Units applied to records that do not name their own
#[derive(clap::Args, Clone, Default)]
struct UnitDefaults {
    /// Default weight unit (kg, lb, st)
    #[arg(long)]
    weight_unit: Option<WeightUnit>,

    /// Default length unit (cm, in)
    #[arg(long)]
    length_unit: Option<LengthUnit>,
}

impl UnitDefaults {
    fn apply(&self, record: &mut RawAssessmentInput) {
        if record.weight_unit.is_none() {
            record.weight_unit = self.weight_unit.map(|u| u.abbreviation().to_string());
        }
        if record.length_unit.is_none() {
            record.length_unit = self.length_unit.map(|u| u.abbreviation().to_string());
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// One JSON object or a JSON array of objects
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (nutri.assessment_input.v1)
    Input,
    /// Output report schema
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

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

/// Initialize tracing on stderr so stdout stays machine-readable
fn init_tracing(verbose: u8, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = match verbose {
            0 => "nutri_assess=warn,assess=warn",
            1 => "nutri_assess=info,assess=info",
            _ => "nutri_assess=debug,assess=debug",
        };
        directives.into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<(), AssessCliError> {
    match cli.command {
        Commands::Compute {
            input,
            output,
            input_format,
            output_format,
            units,
            instance_id,
        } => cmd_compute(
            &input,
            &output,
            input_format,
            output_format,
            &units,
            instance_id,
        ),

        Commands::Run {
            output_format,
            units,
            instance_id,
            flush,
        } => cmd_run(output_format, &units, instance_id, flush),

        Commands::Validate {
            input,
            input_format,
            units,
            json,
            strict,
        } => cmd_validate(&input, input_format, &units, json, strict),

        Commands::Doctor { json } => cmd_doctor(json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn make_processor(instance_id: Option<String>) -> AssessmentProcessor {
    match instance_id {
        Some(id) => AssessmentProcessor::with_instance_id(id),
        None => AssessmentProcessor::new(),
    }
}

fn read_input(input: &Path) -> Result<String, AssessCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_records(
    input: &Path,
    input_format: InputFormat,
    units: &UnitDefaults,
) -> Result<Vec<RawAssessmentInput>, AssessCliError> {
    let input_data = read_input(input)?;

    let mut records = match input_format {
        InputFormat::Ndjson => InputReader::parse_ndjson(&input_data)?,
        InputFormat::Json => InputReader::parse_document(&input_data)?,
    };

    if records.is_empty() {
        return Err(AssessCliError::NoRecords);
    }

    records.iter_mut().for_each(|record| units.apply(record));
    debug!(count = records.len(), "records read");
    Ok(records)
}

fn cmd_compute(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    units: &UnitDefaults,
    instance_id: Option<String>,
) -> Result<(), AssessCliError> {
    let records = read_records(input, input_format, units)?;
    let processor = make_processor(instance_id);

    let reports: Vec<AssessmentReport> = records.iter().map(|r| processor.process(r)).collect();
    info!(reports = reports.len(), "assessment complete");

    let output_data = format_output(&reports, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    units: &UnitDefaults,
    instance_id: Option<String>,
    flush: bool,
) -> Result<(), AssessCliError> {
    let processor = make_processor(instance_id);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut processed = 0usize;

    for (line_num, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let mut record: RawAssessmentInput = serde_json::from_str(trimmed).map_err(|e| {
            AssessCliError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
        })?;
        units.apply(&mut record);

        let report = processor.process(&record);
        write!(stdout, "{}", format_output(std::slice::from_ref(&report), &output_format)?)?;
        if flush {
            stdout.flush()?;
        }
        processed += 1;
    }

    stdout.flush()?;
    info!(reports = processed, "stream closed");
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    units: &UnitDefaults,
    json: bool,
    strict: bool,
) -> Result<(), AssessCliError> {
    let records = read_records(input, input_format, units)?;

    let details: Vec<RecordNotices> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let normalized = Normalizer::normalize(record);
            if normalized.notices.is_empty() {
                return None;
            }
            Some(RecordNotices {
                index,
                id: record.id.clone(),
                notices: normalized
                    .notices
                    .iter()
                    .map(|n| format!("{}: {}", enum_name(&n.field), enum_name(&n.kind)))
                    .collect(),
            })
        })
        .collect();

    let report = ValidationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        total_records: records.len(),
        clean_records: records.len() - details.len(),
        records_with_notices: details.len(),
        records: details,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:        {}", report.total_records);
        println!("Clean records:        {}", report.clean_records);
        println!("Records with notices: {}", report.records_with_notices);

        if !report.records.is_empty() {
            println!("\nNotices:");
            for record in &report.records {
                println!(
                    "  - Record {} (index {}):",
                    record.id.as_deref().unwrap_or("unknown"),
                    record.index
                );
                for notice in &record.notices {
                    println!("      {}", notice);
                }
            }
        }
    }

    if strict && report.records_with_notices > 0 {
        Err(AssessCliError::ValidationFailed(report.records_with_notices))
    } else {
        Ok(())
    }
}

fn cmd_doctor(json: bool) -> Result<(), AssessCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Nutri-Assess version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}, report version {}", SCHEMA_VERSION, REPORT_VERSION),
    });

    checks.push(if pediatric::tables_consistent() {
        DoctorCheck {
            name: "pediatric_tables".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Waist percentile tables cover ages {}-{}",
                pediatric::MIN_AGE_YEARS,
                pediatric::MAX_AGE_YEARS
            ),
        }
    } else {
        DoctorCheck {
            name: "pediatric_tables".to_string(),
            status: CheckStatus::Error,
            message: "Waist percentile tables are incomplete or out of order".to_string(),
        }
    });

    // Check stdin is available (for streaming mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    checks.push(log_filter_check(std::env::var("RUST_LOG").ok().as_deref()));

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Nutri-Assess Doctor Report");
        println!("==========================");
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
        Err(AssessCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// `RUST_LOG` overrides `-v`; an unparseable value silently falls back to the flags
fn log_filter_check(rust_log: Option<&str>) -> DoctorCheck {
    let (status, message) = match rust_log {
        None => (
            CheckStatus::Ok,
            "RUST_LOG unset; -v flags select the log level".to_string(),
        ),
        Some(filter) if EnvFilter::try_new(filter).is_ok() => {
            (CheckStatus::Ok, format!("RUST_LOG filter: {}", filter))
        }
        Some(filter) => (
            CheckStatus::Warning,
            format!("RUST_LOG={} is not a valid filter; -v flags are used instead", filter),
        ),
    };
    DoctorCheck {
        name: "log_filter".to_string(),
        status,
        message,
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), AssessCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("Every field is optional. Numbers may be sent as JSON numbers or strings;");
                println!("blank strings mean \"not provided\".");
                println!();
                println!("- id: correlation id echoed into the report");
                println!("- gender: male | female (m, f, man, woman, boy, girl)");
                println!("- age_years, height_cm, waist_cm");
                println!("- current_weight_kg, usual_weight_kg, selected_weight_kg");
                println!("- activity_factor: 1.375 | 1.5 | 1.55 | 1.725 | 1.9 or a level name");
                println!("- change_duration: 2 | 5 | 7.5 | 10 | 20 or week | 1mo | 3mo | 6mo | 1yr");
                println!("- ascites_offset_kg, edema_offset_kg: kg or none | minimal | moderate | severe");
                println!("- calorie_deficit_kcal: subtracted from TEE (negative adds calories)");
                println!("- weight_unit: kg | lb | st; length_unit: cm | in");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: assessment report {}", REPORT_VERSION);
                println!();
                println!("- report_version, computed_at_utc, id");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- input: canonical input in kg, cm and years");
                println!("- notices: [{{ field, kind }}] raised while normalizing");
                println!("- result:");
                println!("  - body_composition: {{ dry_weight_kg, weight_loss_pct, weight_loss_severity, simple, accurate }}");
                println!("  - classification: {{ bmi_current, bmi_selected, waist_risk, waist_label, pediatric_waist }}");
                println!("  - energy: {{ harris_benedict, mifflin_st_jeor }} x {{ actual, selected }}");
                println!("  - calorie_estimates: {{ by_weight_status, by_activity_actual, by_activity_selected }}");
                println!("- display: metric name -> formatted string (blank as \"\" or \"0%\")");
            }
        }
    }

    Ok(())
}

// Helper functions

fn format_output(
    reports: &[AssessmentReport],
    format: &OutputFormat,
) -> Result<String, AssessCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)? + "\n"),
    }
}

/// Serialized name of a unit-only enum
fn enum_name<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn get_input_json_schema() -> String {
    let number_or_text = serde_json::json!({ "type": ["number", "string"] });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "nutri.assessment_input.v1",
        "title": SCHEMA_VERSION,
        "description": "Raw clinical nutrition assessment input",
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "gender": { "type": "string" },
            "age_years": number_or_text,
            "height_cm": number_or_text,
            "waist_cm": number_or_text,
            "current_weight_kg": number_or_text,
            "usual_weight_kg": number_or_text,
            "selected_weight_kg": number_or_text,
            "activity_factor": number_or_text,
            "change_duration": number_or_text,
            "ascites_offset_kg": number_or_text,
            "edema_offset_kg": number_or_text,
            "calorie_deficit_kcal": number_or_text,
            "weight_unit": { "type": "string", "enum": ["kg", "lb", "st"] },
            "length_unit": { "type": "string", "enum": ["cm", "in"] }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "nutri.assessment_report",
        "description": "Nutri-Assess report",
        "type": "object",
        "required": ["report_version", "producer", "computed_at_utc", "input", "notices", "result", "display"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "id": { "type": ["string", "null"] },
            "input": { "type": "object" },
            "notices": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "kind": { "type": "string" }
                    }
                }
            },
            "result": {
                "type": "object",
                "properties": {
                    "body_composition": { "type": "object" },
                    "classification": { "type": "object" },
                    "energy": { "type": "object" },
                    "calorie_estimates": { "type": "object" }
                }
            },
            "display": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum AssessCliError {
    Io(io::Error),
    Compute(nutri_assess::ComputeError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for AssessCliError {
    fn from(e: io::Error) -> Self {
        AssessCliError::Io(e)
    }
}

impl From<nutri_assess::ComputeError> for AssessCliError {
    fn from(e: nutri_assess::ComputeError) -> Self {
        AssessCliError::Compute(e)
    }
}

impl From<serde_json::Error> for AssessCliError {
    fn from(e: serde_json::Error) -> Self {
        AssessCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AssessCliError> for CliError {
    fn from(e: AssessCliError) -> Self {
        match e {
            AssessCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            AssessCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            AssessCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            AssessCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No assessment records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            AssessCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records raised notices", count),
                hint: Some("Run 'assess validate' without --strict for details".to_string()),
            },
            AssessCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            AssessCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    total_records: usize,
    clean_records: usize,
    records_with_notices: usize,
    records: Vec<RecordNotices>,
}

#[derive(serde::Serialize)]
struct RecordNotices {
    index: usize,
    id: Option<String>,
    notices: Vec<String>,
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

#[derive(Debug, PartialEq, serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flushes_by_default() {
        let cli = Cli::try_parse_from(["assess", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { flush: true, .. }));
    }

    #[test]
    fn test_run_flush_can_be_disabled() {
        let cli = Cli::try_parse_from(["assess", "run", "--flush", "false"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { flush: false, .. }));
    }

    #[test]
    fn test_log_filter_check() {
        assert_eq!(log_filter_check(None).status, CheckStatus::Ok);
        assert_eq!(log_filter_check(Some("nutri_assess=debug")).status, CheckStatus::Ok);

        let check = log_filter_check(Some("nutri_assess=loud"));
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("nutri_assess=loud"));
    }
}
