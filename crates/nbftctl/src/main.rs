use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nbft::{ChecksumPolicy, DecodeConfig, Nbft};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let format = std::env::var("NBFT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

        // Logs go to stderr so stdout stays parseable.
        if format.eq_ignore_ascii_case("json") {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter.clone())
                .with_target(true)
                .with_writer(io::stderr)
                .json()
                .flatten_event(true)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_writer(io::stderr)
                .compact()
                .init();
        }
    });
}

#[derive(Parser, Debug)]
#[command(name = "nbftctl")]
#[command(about = "Inspect ACPI NVMe Boot Firmware Tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ChecksumArg {
    Ignore,
    Warn,
    Enforce,
}

impl From<ChecksumArg> for ChecksumPolicy {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Ignore => ChecksumPolicy::Ignore,
            ChecksumArg::Warn => ChecksumPolicy::Warn,
            ChecksumArg::Enforce => ChecksumPolicy::Enforce,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a table and print every descriptor
    Show {
        /// Table image, e.g. a copy of /sys/firmware/acpi/tables/NBFT
        file: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// YAML decoder configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Reject unknown minor revisions
        #[arg(long)]
        strict_minor: bool,
        #[arg(long, value_enum)]
        checksum: Option<ChecksumArg>,
    },
    /// Validate the header and control block only
    Check {
        file: PathBuf,
        /// YAML decoder configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Load the YAML config if given, then apply flag overrides.
fn load_config(
    path: Option<&Path>,
    strict_minor: bool,
    checksum: Option<ChecksumArg>,
) -> Result<DecodeConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            DecodeConfig::from_yaml_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DecodeConfig::default(),
    };
    if strict_minor {
        config.strict_minor_revision = true;
    }
    if let Some(checksum) = checksum {
        config.checksum = checksum.into();
    }
    debug!(?config, "decoder configuration");
    Ok(config)
}

fn read_table(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("reading table {}", path.display()))?;
    info!(path = %path.display(), len = bytes.len(), "loaded NBFT image");
    Ok(bytes)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            file,
            format,
            config,
            strict_minor,
            checksum,
        } => {
            let config = load_config(config.as_deref(), strict_minor, checksum)?;
            let bytes = read_table(&file)?;
            let table = Nbft::parse_with(&bytes, &config)
                .with_context(|| format!("decoding {}", file.display()))?;
            let report = table.report();

            let mut out = io::stdout().lock();
            match format {
                OutputFormat::Text => write!(out, "{report}")?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &report)?;
                    writeln!(out)?;
                }
            }
        }
        Commands::Check { file, config } => {
            let config = load_config(config.as_deref(), false, None)?;
            let bytes = read_table(&file)?;
            let table = Nbft::parse_with(&bytes, &config)
                .with_context(|| format!("decoding {}", file.display()))?;
            let header = table.header();
            let control = table.control();
            println!(
                "{}: NBFT {}.{} len {} #HFI {} #NS {} #SEC {} #DISC {}",
                file.display(),
                header.major_revision,
                header.minor_revision,
                header.length,
                control.hfi.count,
                control.ssns.count,
                control.security.count,
                control.discovery.count
            );
        }
    }

    Ok(())
}
