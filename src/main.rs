use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use tvpick_core::catalog::{self, Catalog};
use tvpick_core::config::{ConfigError, EngineConfig};
use tvpick_core::error::{EngineError, ErrorCode};
use tvpick_core::scene::SceneProfiles;
use tvpick_core::schema::{CoreSchema, FieldMapping};
use tvpick_core::selection::DecisionEngine;
use tvpick_core::telemetry::{self, TelemetryError};
use tvpick_core::types::{PickRequest, ValidationWarning};

#[derive(Parser, Debug)]
#[command(
    name = "tvpick",
    about = "Pick, rank and compare televisions from a validated spec catalog",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Record files or directories (yaml, yml, json)
    #[arg(long = "catalog", global = true, value_name = "PATH")]
    catalog: Vec<PathBuf>,
    /// Core schema document (defaults to the built-in v0 schema)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,
    /// Field mapping document (defaults to identity)
    #[arg(long, global = true)]
    mapping: Option<PathBuf>,
    /// Scene profiles document (defaults to the built-in profiles)
    #[arg(long, global = true)]
    profiles: Option<PathBuf>,
    /// Override the size tolerance in inches
    #[arg(long, global = true)]
    size_tolerance: Option<u32>,
    /// Override the neutral floor for undocumented attributes
    #[arg(long, global = true)]
    neutral_floor: Option<f64>,
    /// Override the number of explanation entries per slot
    #[arg(long, global = true)]
    explain_top_k: Option<usize>,
    /// Override the log filter
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide slots A/B/C for a request
    Pick(RequestArgs),
    /// List every matching candidate in rank order with score breakdowns
    Rank {
        #[command(flatten)]
        request: RequestArgs,
        /// Number of candidates to return (1..=50)
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Apply constraints only and list matching records
    Search(RequestArgs),
    /// Side-by-side attribute matrix for two or more ids
    Compare {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Load the catalog and report validation warnings
    Validate,
}

#[derive(Args, Debug, Default)]
struct RequestArgs {
    /// JSON request document; flags below override its fields
    #[arg(long)]
    request: Option<PathBuf>,
    #[arg(long)]
    request_id: Option<String>,
    /// Requested screen size in inches
    #[arg(long, allow_negative_numbers = true)]
    size: Option<i64>,
    #[arg(long)]
    scene: Option<String>,
    /// Brand allow-list; repeat or comma-separate
    #[arg(long, value_delimiter = ',')]
    brand: Vec<String>,
    #[arg(long, allow_negative_numbers = true)]
    budget: Option<f64>,
    /// Restrict to these record ids; repeat or comma-separate
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read request {path}: {source}")]
    RequestIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed request {path}: {source}")]
    RequestMalformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Engine(err.into())
    }
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            CliError::Engine(err) => err.code(),
            CliError::Telemetry(_)
            | CliError::RequestIo { .. }
            | CliError::RequestMalformed { .. }
            | CliError::Output(_) => ErrorCode::InvalidInput,
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    ok: bool,
    catalog_version: String,
    records: usize,
    warning_count: usize,
    warnings: Vec<ValidationWarning>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let body = json!({
                "ok": false,
                "error": { "code": err.code(), "message": err.to_string() },
            });
            println!("{body:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = effective_config(&cli.global)?;
    telemetry::init(&config.log_level)?;

    let schema = match &cli.global.schema {
        Some(path) => CoreSchema::from_path(path).map_err(EngineError::from)?,
        None => CoreSchema::v0(),
    };
    let mapping = match &cli.global.mapping {
        Some(path) => FieldMapping::from_path(path).map_err(EngineError::from)?,
        None => FieldMapping::identity(),
    };
    let profiles = match &cli.global.profiles {
        Some(path) => SceneProfiles::from_path(path).map_err(EngineError::from)?,
        None => SceneProfiles::builtin(),
    };
    profiles.check_against(&schema).map_err(EngineError::from)?;

    let (catalog, warnings) = catalog::load(&cli.global.catalog, &schema, &mapping);
    if cli.global.catalog.is_empty() {
        warn!("no --catalog sources given; the catalog is empty");
    }
    info!(
        records = catalog.len(),
        warnings = warnings.len(),
        version = %catalog.version(),
        "catalog ready"
    );
    let catalog: Arc<Catalog> = Arc::new(catalog);
    let engine = DecisionEngine::new(profiles, config)?;

    let output = match cli.command {
        Command::Pick(args) => to_json(&engine.pick(&catalog, &read_request(args)?))?,
        Command::Rank { request, top } => {
            to_json(&engine.rank(&catalog, &read_request(request)?, top))?
        }
        Command::Search(args) => to_json(&engine.search(&catalog, &read_request(args)?))?,
        Command::Compare { ids } => {
            let matrix = engine.compare(&catalog, &ids).map_err(EngineError::from)?;
            to_json(&matrix)?
        }
        Command::Validate => to_json(&ValidationReport {
            ok: warnings.is_empty(),
            catalog_version: catalog.version().to_string(),
            records: catalog.len(),
            warning_count: warnings.len(),
            warnings,
        })?,
    };

    Ok(output)
}

fn effective_config(global: &GlobalArgs) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(inches) = global.size_tolerance {
        config = config.with_size_tolerance(inches);
    }
    if let Some(floor) = global.neutral_floor {
        config = config.with_neutral_floor(floor);
    }
    if let Some(k) = global.explain_top_k {
        config = config.with_explain_top_k(k);
    }
    if let Some(level) = &global.log_level {
        config.log_level = level.clone();
    }
    config.validated()
}

fn read_request(args: RequestArgs) -> Result<PickRequest, CliError> {
    let mut request = match &args.request {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| CliError::RequestIo {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| CliError::RequestMalformed {
                path: path.clone(),
                source,
            })?
        }
        None => PickRequest::default(),
    };

    if args.request_id.is_some() {
        request.request_id = args.request_id;
        request.clear_malformed("request_id");
    }
    if args.size.is_some() {
        request.size_inch = args.size;
        request.clear_malformed("size_inch");
    }
    if args.scene.is_some() {
        request.scene = args.scene;
        request.clear_malformed("scene");
    }
    if !args.brand.is_empty() {
        request.brand = args.brand;
        request.clear_malformed("brand");
    }
    if args.budget.is_some() {
        request.budget = args.budget;
        request.clear_malformed("budget");
    }
    if !args.ids.is_empty() {
        request.ids = Some(args.ids);
        request.clear_malformed("ids");
    }

    Ok(request)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
