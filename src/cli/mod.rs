pub mod check;
pub mod generate;
pub mod plan;

use std::path::{Path, PathBuf};
use std::process;

use chrono::{DateTime, Utc};
use clap::Args;

use babymaker::config::{BranchSchema, GeneratorConfig};
use babymaker::diagnostic::{render_diagnostics, Diagnostic};
use babymaker::error::{ConfigError, GenerateError};

/// The two inputs every subcommand takes.
#[derive(Args)]
pub struct InputArgs {
    /// Reduction configuration (YAML)
    pub config: PathBuf,
    /// Branch schema dump of the input file (YAML or JSON)
    pub schema: PathBuf,
}

/// Loaded inputs plus the configuration text for diagnostics.
pub struct Inputs {
    pub config_path: PathBuf,
    pub config_source: String,
    pub config: GeneratorConfig,
    pub schema: BranchSchema,
}

/// Load configuration and schema, rendering any error and exiting.
pub fn load_inputs(args: &InputArgs) -> Inputs {
    let config_source = match std::fs::read_to_string(&args.config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.config.display(), e);
            process::exit(1);
        }
    };
    let config = match GeneratorConfig::from_yaml_str(&config_source) {
        Ok(c) => c,
        Err(e) => exit_with_config_errors(&[e], &args.config, &config_source),
    };
    let schema = match BranchSchema::load(&args.schema) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: schema '{}': {}", args.schema.display(), e);
            process::exit(1);
        }
    };
    log::debug!(
        "loaded {} output tree(s), {} input tree(s)",
        config.len(),
        schema.len()
    );
    Inputs {
        config_path: args.config.clone(),
        config_source,
        config,
        schema,
    }
}

impl Inputs {
    pub fn filename(&self) -> String {
        self.config_path.to_string_lossy().into_owned()
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) {
        render_diagnostics(diagnostics, &self.filename(), &self.config_source);
    }

    /// Report a failed run and exit.
    pub fn fail(&self, err: GenerateError) -> ! {
        match err {
            GenerateError::Config(errors) => {
                exit_with_config_errors(&errors, &self.config_path, &self.config_source)
            }
            other => {
                eprintln!("error: {}", other);
                process::exit(1);
            }
        }
    }
}

fn exit_with_config_errors(errors: &[ConfigError], path: &Path, source: &str) -> ! {
    let diagnostics: Vec<Diagnostic> = errors.iter().map(|e| e.to_diagnostic(source)).collect();
    render_diagnostics(&diagnostics, &path.to_string_lossy(), source);
    eprintln!("error: {} configuration error(s)", errors.len());
    process::exit(1);
}

/// Initialise logging. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

/// Current time, or `SOURCE_DATE_EPOCH` when set.
pub fn build_timestamp() -> DateTime<Utc> {
    if let Ok(epoch) = std::env::var("SOURCE_DATE_EPOCH") {
        match epoch.trim().parse::<i64>().ok().and_then(|s| DateTime::from_timestamp(s, 0)) {
            Some(ts) => return ts,
            None => log::warn!("ignoring invalid SOURCE_DATE_EPOCH '{}'", epoch),
        }
    }
    Utc::now()
}
