//! RollPress CLI - JSON bridge to the estimate engine
//!
//! Commands: presets, validate, estimate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when the engine produces no result

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

use rollpress_core::{
    config::{self, EngineConfig},
    CostLine, CostLineSet, EstimatePipeline, JobEstimate, JobForm, MaterialKind, NoResult,
    PayloadError, PresetRegistry,
};

#[derive(Parser)]
#[command(name = "rollpress-cli")]
#[command(version, about = "RollPress CLI - Roll-fed sticker layout and cost estimates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of additional preset catalogs (overrides the config file)
    #[arg(short, long)]
    presets_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List roll and material presets
    Presets,

    /// Validate a job without estimating it
    Validate {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Estimate layout, material, cost and print time for a job
    Estimate {
        #[command(flatten)]
        job: JobArgs,
    },
}

#[derive(clap::Args)]
struct JobArgs {
    /// JSON payload (JobForm)
    #[arg(short = 'j', long)]
    payload: String,

    /// Roll preset ID
    #[arg(short, long)]
    roll: Option<String>,

    /// Substrate preset ID
    #[arg(short, long)]
    substrate: Option<String>,

    /// Laminate preset ID
    #[arg(short, long)]
    laminate: Option<String>,

    /// Cost lines counted in the total (e.g. material,laminate,ink)
    #[arg(long, value_delimiter = ',')]
    lines: Vec<String>,
}

/// Determines the log level from CLI arguments and configuration.
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => println!(r#"{{"error": "Failed to serialize output: {}"}}"#, e),
    }
}

/// Why a job form could not be assembled.
#[derive(Debug)]
enum FormError {
    /// The payload itself is a "no result" outcome.
    NoResult(NoResult),
    Failed(String),
}

impl From<String> for FormError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<PayloadError> for FormError {
    fn from(error: PayloadError) -> Self {
        match error {
            PayloadError::Rejected(outcome) => Self::NoResult(outcome),
            PayloadError::Malformed(e) => Self::Failed(format!("Invalid payload: {}", e)),
        }
    }
}

fn fail(message: String) -> ExitCode {
    error!("{}", message);
    print_json(&serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn no_result(outcome: NoResult) -> ExitCode {
    debug!(%outcome, "no result");
    print_json(&serde_json::json!({
        "success": false,
        "noResult": outcome,
        "reason": outcome.to_string(),
    }));
    ExitCode::from(2)
}

fn reject(error: FormError) -> ExitCode {
    match error {
        FormError::NoResult(outcome) => no_result(outcome),
        FormError::Failed(message) => fail(message),
    }
}

fn preset_listing(registry: &PresetRegistry) -> serde_json::Value {
    serde_json::json!({
        "rolls": registry.list_rolls(),
        "substrates": registry.list_materials_of(MaterialKind::Substrate),
        "laminates": registry.list_materials_of(MaterialKind::Laminate),
    })
}

fn estimate_report(estimate: &JobEstimate) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "estimate": estimate,
        "overage": estimate.packing.layout.overage(estimate.cost.quantity),
        "printedLengthIn": estimate.packing.material.printed_length_in(),
    })
}

/// Payload first, then the named presets, then the configuration defaults.
fn assemble_form(
    job: &JobArgs,
    registry: &PresetRegistry,
    cfg: &EngineConfig,
) -> Result<JobForm, FormError> {
    let mut form = JobForm::from_payload(&job.payload)?;

    if !job.lines.is_empty() {
        let lines = job.lines.iter()
            .map(|name| CostLine::from_str_loose(name).ok_or_else(|| format!("Unknown cost line: {}", name)))
            .collect::<Result<CostLineSet, String>>()?;
        form.enabled_cost_lines = Some(lines);
    }

    if let Some(id) = job.roll.as_ref().or(cfg.default_roll.as_ref()) {
        let preset = registry.roll(id).ok_or_else(|| format!("Roll preset not found: {}", id))?;
        form = form.or(preset.to_form());
    }

    for (id, kind) in [(&job.substrate, MaterialKind::Substrate), (&job.laminate, MaterialKind::Laminate)] {
        let Some(id) = id else { continue };
        let preset = registry.material(id)
            .filter(|m| m.kind == kind)
            .ok_or_else(|| format!("{:?} preset not found: {}", kind, id))?;
        form = form.or(preset.to_form());
    }

    Ok(form.or(cfg.fallback_form()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(get_log_level(cli.verbose, cli.quiet, &cfg.logging.level));

    let registry = match cli.presets_dir.as_ref().or(cfg.presets_dir.as_ref()) {
        Some(dir) => match PresetRegistry::load_from_dir(dir) {
            Ok(r) => r,
            Err(e) => return fail(format!("Failed to load presets: {}", e)),
        },
        None => PresetRegistry::builtin(),
    };

    let pipeline = EstimatePipeline::new();

    match cli.command {
        Commands::Presets => {
            print_json(&preset_listing(&registry));
            ExitCode::SUCCESS
        }

        Commands::Validate { job } => {
            let form = match assemble_form(&job, &registry, &cfg) {
                Ok(f) => f,
                Err(e) => return reject(e),
            };

            let request = match form.into_request() {
                Ok(r) => r,
                Err(outcome) => return no_result(outcome),
            };

            let result = pipeline.validate(&request);
            print_json(&result);
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Estimate { job } => {
            let form = match assemble_form(&job, &registry, &cfg) {
                Ok(f) => f,
                Err(e) => return reject(e),
            };
            debug!(?form, "assembled job form");

            match pipeline.compute_form(form) {
                Ok(estimate) => {
                    print_json(&estimate_report(&estimate));
                    ExitCode::SUCCESS
                }
                Err(outcome) => no_result(outcome),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollpress_core::InputField;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
    }

    #[test]
    fn presets_fill_missing_fields_only() {
        let job = JobArgs {
            payload: r#"{"stickerWidthIn": 2, "stickerHeightIn": 2, "quantity": 50, "spacingIn": 0.25}"#.to_string(),
            roll: Some("54in-150ft".to_string()),
            substrate: Some("white-vinyl".to_string()),
            laminate: Some("gloss-laminate".to_string()),
            lines: vec![],
        };
        let form = assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default()).unwrap();
        assert_eq!(form.spacing_in, Some(0.25));
        assert_eq!(form.usable_width_in, Some(53.25));
        assert_eq!(form.material_cost_per_roll, Some(189.0));
        assert_eq!(form.laminate_cost_per_roll, Some(128.0));
        assert_eq!(form.seconds_per_section, Some(200));
    }

    #[test]
    fn laminate_id_used_as_substrate_is_rejected() {
        let job = JobArgs {
            payload: "{}".to_string(),
            roll: None,
            substrate: Some("gloss-laminate".to_string()),
            laminate: None,
            lines: vec![],
        };
        assert!(assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default()).is_err());
    }

    fn payload_job(payload: &str) -> JobArgs {
        JobArgs {
            payload: payload.to_string(),
            roll: Some("54in-150ft".to_string()),
            substrate: Some("white-vinyl".to_string()),
            laminate: Some("gloss-laminate".to_string()),
            lines: vec![],
        }
    }

    #[test]
    fn non_numeric_payload_field_is_no_result() {
        let job = payload_job(r#"{"stickerWidthIn": "abc", "stickerHeightIn": 3, "quantity": 100}"#);
        let result = assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default());
        assert!(matches!(
            result,
            Err(FormError::NoResult(NoResult::InvalidInput { field: InputField::StickerWidth }))
        ));
    }

    #[test]
    fn fractional_quantity_is_no_result() {
        let job = payload_job(r#"{"stickerWidthIn": 3, "stickerHeightIn": 3, "quantity": 2.5}"#);
        let result = assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default());
        assert!(matches!(
            result,
            Err(FormError::NoResult(NoResult::InvalidInput { field: InputField::Quantity }))
        ));
    }

    #[test]
    fn unparseable_payload_is_a_failure() {
        let job = payload_job("{ not json");
        let result = assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default());
        assert!(matches!(result, Err(FormError::Failed(_))));
    }

    #[test]
    fn estimate_report_includes_overage_and_printed_length() {
        let job = payload_job(r#"{"stickerWidthIn": 3, "stickerHeightIn": 3, "quantity": 100}"#);
        let form = assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default()).unwrap();
        let estimate = EstimatePipeline::new().compute_form(form).unwrap();

        let report = estimate_report(&estimate);
        assert_eq!(report["success"], true);
        assert_eq!(report["overage"], 2);
        // 6 rows of 3in with 5 spacings of 0.125in
        assert!((report["printedLengthIn"].as_f64().unwrap() - 18.625).abs() < 1e-9);
    }

    #[test]
    fn preset_listing_splits_materials_by_kind() {
        let listing = preset_listing(&PresetRegistry::builtin());
        assert_eq!(listing["rolls"].as_array().unwrap().len(), 2);
        assert_eq!(listing["substrates"].as_array().unwrap().len(), 2);
        assert_eq!(listing["laminates"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn lines_flag_selects_cost_lines() {
        let job = JobArgs {
            payload: "{}".to_string(),
            roll: None,
            substrate: None,
            laminate: None,
            lines: vec!["material".to_string(), "Promo".to_string()],
        };
        let form = assemble_form(&job, &PresetRegistry::builtin(), &EngineConfig::default()).unwrap();
        let lines = form.enabled_cost_lines.unwrap();
        assert!(lines.contains(CostLine::Promo));
        assert!(!lines.contains(CostLine::Ink));

        let bad = JobArgs { lines: vec!["shipping".to_string()], ..job };
        assert!(assemble_form(&bad, &PresetRegistry::builtin(), &EngineConfig::default()).is_err());
    }
}
