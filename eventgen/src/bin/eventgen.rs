//! Synthetic analytics event log generator.

#![allow(clippy::print_stdout)]

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, anyhow};
use byte_unit::{Byte, UnitType};
use clap::{Args, Parser, Subcommand};
use eventgen::{
    config::{self, Config},
    fingerprint::Fingerprint,
};
use eventgen_stream::{Cohort, EventName, Generator, persist};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// Environment variable holding the full configuration document. When set it
/// takes precedence over `--config-path`.
const CONFIG_ENV_VAR: &str = "EVENTGEN_CONFIG";

fn default_config_path() -> String {
    "eventgen.yaml".to_string()
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the event log
    Run(RunArgs),
    /// Validate configuration file and exit
    ConfigCheck(ConfigCheckArgs),
}

#[derive(Args)]
struct RunArgs {
    /// path on disk to the configuration file
    #[clap(long, default_value_t = default_config_path())]
    config_path: String,
    /// seed for the random generator, overrides the configured seed
    #[clap(long)]
    seed: Option<u64>,
    /// number of users to simulate, overrides the configured population
    #[clap(long)]
    users: Option<u32>,
    /// destination of the event log, overrides the configured path
    #[clap(long)]
    output: Option<PathBuf>,
    /// print the fingerprint of the written event log
    #[clap(short, long)]
    fingerprint: bool,
    /// path to a file containing the expected fingerprint
    #[clap(short, long, requires = "fingerprint")]
    verify: Option<PathBuf>,
}

#[derive(Args)]
struct ConfigCheckArgs {
    /// path on disk to the configuration file
    #[clap(long, default_value_t = default_config_path())]
    config_path: String,
}

fn load_config(config_path: &str) -> Result<Config> {
    if let Ok(contents) = env::var(CONFIG_ENV_VAR) {
        debug!("Using config from env var '{CONFIG_ENV_VAR}'");
        return config::parse_config(&contents)
            .with_context(|| format!("Failed to parse configuration from {CONFIG_ENV_VAR}"));
    }

    let path = Path::new(config_path);
    if config_path == default_config_path() && !path.exists() {
        info!("No configuration file at {config_path}, using defaults");
        return Ok(Config::default());
    }
    debug!("Attempting to open configuration file at: {config_path}");
    config::load_config_from_path(path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))
}

/// Fold command line overrides into the loaded configuration.
fn apply_overrides(mut config: Config, args: &RunArgs) -> Config {
    if let Some(seed) = args.seed {
        config.seed = Some(config::seed_from_u64(seed));
    }
    if let Some(users) = args.users {
        config.cohort.users = users;
    }
    if let Some(output) = &args.output {
        config.output.path.clone_from(output);
    }
    config
}

fn resolve_seed(seed: Option<[u8; 32]>) -> [u8; 32] {
    seed.unwrap_or_else(|| {
        let seed: [u8; 32] = rand::rng().random();
        info!("No seed configured, drew {seed:?}");
        seed
    })
}

fn verify_fingerprint(fingerprint: &Fingerprint, verify_path: &Path) -> Result<()> {
    let expected = fs::read_to_string(verify_path)
        .with_context(|| format!("Could not read verify file {}", verify_path.display()))?;
    if fingerprint.matches_str(&expected) {
        info!("✓ Fingerprint matches expected value");
        Ok(())
    } else {
        error!("✗ Fingerprint mismatch!");
        error!("  Expected: {}", expected.trim());
        error!("  Got:      {fingerprint}");
        Err(anyhow!("Fingerprint verification failed"))
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let config = apply_overrides(load_config(&args.config_path)?, args);
    config.validate().context("Configuration validation failed")?;

    let seed = resolve_seed(config.seed);
    let mut rng = StdRng::from_seed(seed);
    let cohort = Cohort::new(config.cohort.clone())?;

    let start = Instant::now();
    let log = cohort.generate(&mut rng)?;
    info!("Event generation took {:?}", start.elapsed());

    let path = &config.output.path;
    persist(&log, path, config.output.encoding)
        .with_context(|| format!("Failed to write event log to {}", path.display()))?;

    let summary = log.summary();
    let written = fs::metadata(path)
        .with_context(|| format!("Could not stat {}", path.display()))?
        .len();
    info!(
        "Wrote {} to {}",
        Byte::from_u64(written).get_appropriate_unit(UnitType::Binary),
        path.display()
    );
    info!("{summary}");
    if summary.count(EventName::TaskAssigned) == 0 {
        warn!("No golden path events were generated");
    }
    println!(
        "Generated {} events for {} users and saved to {}",
        summary.records,
        summary.users,
        path.display()
    );

    if args.fingerprint {
        let bytes =
            fs::read(path).with_context(|| format!("Could not read back {}", path.display()))?;
        let fingerprint = Fingerprint::of(&bytes);
        if let Some(verify_path) = &args.verify {
            verify_fingerprint(&fingerprint, verify_path)?;
        } else {
            println!("{fingerprint}");
        }
    }

    Ok(())
}

fn config_check(args: &ConfigCheckArgs) -> Result<()> {
    let config = load_config(&args.config_path)?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration file is valid");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .finish()
        .init();

    let version = env!("CARGO_PKG_VERSION");
    info!("Starting eventgen {version} run.");

    let cli = Cli::parse();
    let res = match &cli.command {
        Commands::Run(args) => run(args),
        Commands::ConfigCheck(args) => config_check(args),
    };
    if let Err(err) = &res {
        error!("{err:#}");
    }
    res
}
