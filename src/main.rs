use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pkgscan::{
    config::{MappingConfig, ScanConfig},
    output::{format_result_to_string, print_result, OutputFormat},
    version::normalize,
    PackageScanner,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "pkgscan")]
#[command(
    author,
    version,
    about = "Scan a classpath and derive OSGi versions for the packages on it"
)]
struct Cli {
    /// Log progress and discovered packages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories and archives for packages
    Scan {
        /// Classpath entry (directory or archive); repeatable
        #[arg(short, long = "classpath", value_name = "PATH")]
        classpath: Vec<PathBuf>,

        /// Package root to start from, e.g. org.example; repeatable
        #[arg(short, long = "root", value_name = "PACKAGE")]
        roots: Vec<String>,

        /// Package include pattern; repeatable
        #[arg(long = "include", value_name = "PATTERN")]
        include: Vec<String>,

        /// Package exclude pattern; repeatable
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Archive file name include pattern; repeatable
        #[arg(long = "archive-include", value_name = "PATTERN")]
        archive_include: Vec<String>,

        /// Archive file name exclude pattern; repeatable
        #[arg(long = "archive-exclude", value_name = "PATTERN")]
        archive_exclude: Vec<String>,

        /// Force a version, e.g. --map 'org.example*=1.0'; repeatable
        #[arg(short, long = "map", value_name = "PATTERN=VERSION")]
        mappings: Vec<String>,

        /// Output format (header, table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file to use instead of the default one
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the OSGi form of each version
    Normalize {
        #[arg(required = true)]
        versions: Vec<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

struct ScanArgs {
    classpath: Vec<PathBuf>,
    roots: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    archive_include: Vec<String>,
    archive_exclude: Vec<String>,
    mappings: Vec<String>,
    format: Option<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "pkgscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> Result<u8> {
    match command {
        Commands::Scan {
            classpath,
            roots,
            include,
            exclude,
            archive_include,
            archive_exclude,
            mappings,
            format,
            output,
            config,
        } => run_scan(ScanArgs {
            classpath,
            roots,
            include,
            exclude,
            archive_include,
            archive_exclude,
            mappings,
            format,
            output,
            config,
        }),
        Commands::Normalize { versions } => {
            for version in versions {
                println!("{}", normalize(&version));
            }
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_scan(args: ScanArgs) -> Result<u8> {
    let config_path = args.config.clone().unwrap_or_else(ScanConfig::config_path);
    let mut config = ScanConfig::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    apply_overrides(&mut config, &args)?;

    if config.classpath.is_empty() {
        anyhow::bail!("no classpath given; use --classpath or set `classpath` in the config file");
    }

    let format_str = args.format.clone().unwrap_or_else(|| config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let scanner = PackageScanner::from_config(&config).context("invalid scan configuration")?;

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {} classpath entries...", config.classpath.len()));
        Some(pb)
    } else {
        None
    };

    let report = scanner.scan();

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Found {} packages", report.packages.len()));
    }

    if let Some(path) = args.output {
        let content = format_result_to_string(&report, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&report, format)?;
    }

    Ok(exit_codes::SUCCESS)
}

/// Command-line values extend the lists from the config file.
fn apply_overrides(config: &mut ScanConfig, args: &ScanArgs) -> Result<()> {
    config.classpath.extend(args.classpath.iter().cloned());
    config.roots.extend(args.roots.iter().cloned());
    config.packages.include.extend(args.include.iter().cloned());
    config.packages.exclude.extend(args.exclude.iter().cloned());
    config.archives.include.extend(args.archive_include.iter().cloned());
    config.archives.exclude.extend(args.archive_exclude.iter().cloned());

    for raw in &args.mappings {
        config.mappings.push(parse_mapping(raw)?);
    }
    Ok(())
}

fn parse_mapping(raw: &str) -> Result<MappingConfig> {
    let (package, version) = raw
        .split_once('=')
        .with_context(|| format!("mapping '{}' must look like PATTERN=VERSION", raw))?;
    let package = package.trim();
    if package.is_empty() {
        anyhow::bail!("mapping '{}' has an empty pattern", raw);
    }
    let version = version.trim();
    Ok(MappingConfig {
        package: package.to_string(),
        version: (!version.is_empty()).then(|| version.to_string()),
        normalize: true,
    })
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = ScanConfig::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = ScanConfig::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", ScanConfig::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'pkgscan config --init' to create one.");
        println!();
        println!("Default configuration:");
        println!("{}", ScanConfig::generate_default_config());
    }

    Ok(())
}
