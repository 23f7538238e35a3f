//! sparkperf command-line tool
//!
//! Lists the benchmark catalog, expands tests into launch arguments and
//! manages the configuration file.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sparkperf::common::config;
use sparkperf::common::PerfConfig;
use sparkperf::suites::expander::PreparedAxes;
use sparkperf::suites::{output_path, Catalog, ResolvedRun, SuiteKind, TestSuiteDescriptor};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sparkperf")]
#[command(about = "Benchmark configuration generator for Spark performance suites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tests of the selected suites
    List {
        #[command(flatten)]
        selection: Selection,

        /// Show launch target, scale factor and run counts
        #[arg(short, long)]
        detailed: bool,
    },

    /// Expand tests into their resolved launch arguments
    Expand {
        #[command(flatten)]
        selection: Selection,

        /// Only expand tests with this short name
        #[arg(short, long)]
        test: Option<String>,

        /// Override the configured scale factor
        #[arg(long)]
        scale_factor: Option<f64>,

        /// Skip tests that fail to expand instead of stopping
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Print the result file each selected suite would write
    OutputNames {
        #[command(flatten)]
        selection: Selection,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(clap::Args)]
struct Selection {
    /// Suites to use (spark, pyspark, streaming, mllib, python-mllib);
    /// defaults to the suites the configuration enables
    #[arg(short, long = "suite")]
    suites: Vec<String>,

    /// Use every suite
    #[arg(short, long, conflicts_with = "suites")]
    all: bool,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Generate default configuration file
    Generate {
        /// Output path for configuration
        #[arg(short, long, default_value = "sparkperf.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        path: PathBuf,
    },

    /// Show current configuration
    Show {
        /// Apply the environment and the --config file on top of the defaults
        #[arg(long)]
        resolved: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
    Toml,
}

#[derive(Serialize)]
struct TestListing {
    suite: SuiteKind,
    short_name: String,
    launch_target: String,
    scale_factor: f64,
    runs: usize,
}

#[derive(Serialize)]
struct ListReport {
    tests: Vec<TestListing>,
}

#[derive(Serialize)]
struct ExpandedTest {
    suite: SuiteKind,
    short_name: String,
    launch_target: String,
    scale_factor: f64,
    runs: Vec<ResolvedRun>,
}

#[derive(Serialize)]
struct ExpandReport {
    tests: Vec<ExpandedTest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
}

#[derive(Serialize)]
struct OutputNames {
    suite: SuiteKind,
    path: PathBuf,
}

#[derive(Serialize)]
struct OutputNamesReport {
    outputs: Vec<OutputNames>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sparkperf={0},sparkperf_common={0},sparkperf_suites={0}",
            log_level
        ))
    });

    // Logs go to stderr so structured output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List {
            ref selection,
            detailed,
        } => {
            let config = load_configuration(cli.config.as_deref()).await?;
            list_tests(&config, selection, detailed, cli.format)
        }
        Commands::Expand {
            ref selection,
            ref test,
            scale_factor,
            continue_on_error,
        } => {
            let mut config = load_configuration(cli.config.as_deref()).await?;
            if let Some(factor) = scale_factor {
                config.tests.scale_factor = factor;
            }
            expand_tests(&config, selection, test.as_deref(), continue_on_error, cli.format).await
        }
        Commands::OutputNames { ref selection } => {
            let config = load_configuration(cli.config.as_deref()).await?;
            print_output_names(&config, selection, cli.format)
        }
        Commands::Config { ref action } => handle_config_command(action, cli.config.as_deref()).await,
    }
}

/// Defaults, then the file if one was given, then the environment.
async fn load_configuration(config_path: Option<&Path>) -> Result<PerfConfig> {
    let Some(path) = config_path else {
        debug!("Using default configuration");
        return Ok(PerfConfig::from_env()?);
    };

    debug!("Loading configuration from {}", path.display());
    let mut config = config::load_from_file(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;
    config.apply_env_overrides()?;
    config.fill_hdfs_from_hostname();
    config.validate()?;
    Ok(config)
}

fn build_catalog(config: &PerfConfig, selection: &Selection) -> Result<Catalog> {
    let catalog = if selection.all {
        Catalog::build_all(config)?
    } else if selection.suites.is_empty() {
        Catalog::build(config)?
    } else {
        let kinds = selection
            .suites
            .iter()
            .map(|s| s.parse::<SuiteKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Catalog::build_for(config, &kinds)?
    };

    if catalog.suites().is_empty() {
        warn!("No suites selected; enable one in the configuration or pass --suite");
    }
    Ok(catalog)
}

fn run_count(test: &TestSuiteDescriptor) -> Result<usize> {
    let env = PreparedAxes::new(test.env_axes(), test.scale_factor())?;
    let cli = PreparedAxes::new(test.cli_axes(), test.scale_factor())?;
    Ok(env.combination_count().saturating_mul(cli.combination_count()))
}

fn list_tests(config: &PerfConfig, selection: &Selection, detailed: bool, format: OutputFormat) -> Result<()> {
    let catalog = build_catalog(config, selection)?;

    let tests = catalog
        .tests()
        .map(|(suite, test)| -> Result<TestListing> {
            Ok(TestListing {
                suite,
                short_name: test.short_name().to_string(),
                launch_target: test.launch_target().to_string(),
                scale_factor: test.scale_factor(),
                runs: run_count(test)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    match format {
        OutputFormat::Text => {
            let mut current = None;
            for test in &tests {
                if current != Some(test.suite) {
                    println!("{}", test.suite);
                    current = Some(test.suite);
                }
                if detailed {
                    println!(
                        "  {:<28} {:<26} scale {:<8} {} run(s)",
                        test.short_name, test.launch_target, test.scale_factor, test.runs
                    );
                } else {
                    println!("  {}", test.short_name);
                }
            }
            info!("{} tests in {} suites", catalog.total_tests(), catalog.suites().len());
        }
        _ => println!("{}", render(&ListReport { tests }, format)?),
    }

    Ok(())
}

async fn expand_tests(
    config: &PerfConfig,
    selection: &Selection,
    only: Option<&str>,
    continue_on_error: bool,
    format: OutputFormat,
) -> Result<()> {
    let catalog = build_catalog(config, selection)?;

    let selected: Vec<(SuiteKind, TestSuiteDescriptor)> = catalog
        .tests()
        .filter(|(_, test)| only.map_or(true, |name| test.short_name() == name))
        .map(|(suite, test)| (suite, test.clone()))
        .collect();

    if selected.is_empty() {
        bail!("no test matches the selection");
    }
    info!("Expanding {} tests", selected.len());

    let mut set = JoinSet::new();
    for (index, (suite, test)) in selected.into_iter().enumerate() {
        set.spawn_blocking(move || {
            let runs = test.resolved_runs();
            (index, suite, test, runs)
        });
    }

    let mut expanded = Vec::new();
    let mut failed = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (index, suite, test, runs) = joined.context("expansion task panicked")?;
        match runs {
            Ok(runs) => expanded.push((
                index,
                ExpandedTest {
                    suite,
                    short_name: test.short_name().to_string(),
                    launch_target: test.launch_target().to_string(),
                    scale_factor: test.scale_factor(),
                    runs,
                },
            )),
            Err(e) if continue_on_error => {
                warn!("Skipping {}/{}: {}", suite, test.short_name(), e);
                failed.push((index, format!("{}/{}", suite, test.short_name())));
            }
            Err(e) => {
                set.abort_all();
                return Err(e).with_context(|| format!("failed to expand {}/{}", suite, test.short_name()));
            }
        }
    }

    // Tasks finish in any order; report in declaration order
    expanded.sort_by_key(|(index, _)| *index);
    failed.sort_by_key(|(index, _)| *index);
    let report = ExpandReport {
        tests: expanded.into_iter().map(|(_, test)| test).collect(),
        failed: failed.into_iter().map(|(_, name)| name).collect(),
    };

    match format {
        OutputFormat::Text => {
            for test in &report.tests {
                println!(
                    "{}/{} ({}, scale {})",
                    test.suite, test.short_name, test.launch_target, test.scale_factor
                );
                for run in &test.runs {
                    let tokens: Vec<&str> = run
                        .env
                        .iter()
                        .chain(run.args.iter())
                        .map(|token| display_token(token))
                        .collect();
                    println!("  {}", tokens.join(" "));
                }
            }
        }
        _ => println!("{}", render(&report, format)?),
    }

    if !report.failed.is_empty() {
        warn!("{} tests failed to expand: {}", report.failed.len(), report.failed.join(", "));
    }
    Ok(())
}

fn print_output_names(config: &PerfConfig, selection: &Selection, format: OutputFormat) -> Result<()> {
    let catalog = build_catalog(config, selection)?;
    let now = chrono::Local::now().naive_local();

    let outputs: Vec<OutputNames> = catalog
        .suites()
        .iter()
        .map(|suite| OutputNames {
            suite: suite.kind,
            path: output_path(&config.output.results_dir, suite.kind, &config.build.commit_id, &now),
        })
        .collect();

    match format {
        OutputFormat::Text => {
            for output in &outputs {
                println!("{}: {}", output.suite, output.path.display());
            }
        }
        _ => println!("{}", render(&OutputNamesReport { outputs }, format)?),
    }
    Ok(())
}

async fn handle_config_command(action: &ConfigCommands, config_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigCommands::Generate { output } => {
            info!("Generating configuration file: {}", output.display());
            let config = config::generate_default_config();
            config::save_to_file(&config, output).await?;
            println!("Configuration saved to: {}", output.display());
        }
        ConfigCommands::Validate { path } => {
            info!("Validating configuration: {}", path.display());
            let config = config::load_from_file(path)
                .await
                .with_context(|| format!("configuration validation failed for {}", path.display()))?;
            // Extra tests are checked when they become descriptors
            Catalog::build_all(&config)
                .with_context(|| format!("invalid extra test in {}", path.display()))?;
            println!("Configuration is valid");
        }
        ConfigCommands::Show { resolved } => {
            let config = if *resolved {
                load_configuration(config_path).await?
            } else {
                config::generate_default_config()
            };
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Empty values are shown as `""` so they stay visible in the text view
fn display_token(token: &str) -> &str {
    if token.is_empty() {
        "\"\""
    } else {
        token
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json | OutputFormat::Text => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
    })
}
