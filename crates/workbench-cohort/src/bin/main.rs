//! Cohort criteria command-line interface

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use workbench_cohort::cli::{describe, ids, normalize, output, validate};

/// Cohort criteria command-line tool
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author, version, about = "Cohort definition tools", long_about = None)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite stored criteria the way the editor saves them
    Normalize {
        /// Criteria file (`-` for stdin)
        file: PathBuf,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Check criteria files for errors and warnings
    Validate {
        /// Criteria files to validate
        files: Vec<PathBuf>,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },

    /// List the criteria of a definition
    Describe {
        /// Criteria file (`-` for stdin)
        file: PathBuf,
    },

    /// Generate element ids
    Ids {
        /// Number of ids
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Id prefix
        #[arg(short, long)]
        prefix: Option<String>,

        /// Criteria file whose ids must not be reused
        #[arg(short, long)]
        reserve_from: Option<PathBuf>,
    },
}

/// Log filter for `-v` count and `RUST_LOG`; `RUST_LOG` directives win when set
fn log_filter(verbosity: u8, env: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(env.unwrap_or_default())
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(verbosity, env.as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Normalize { file, pretty } => {
            let config = normalize::NormalizeConfig {
                file,
                pretty,
                output_file: cli.output.clone(),
            };
            normalize::normalize(config).await
        }

        Commands::Validate { files, strict } => {
            let config = validate::ValidateConfig {
                files,
                strict,
                verbose: cli.verbose > 0,
            };
            validate::validate(config).await
        }

        Commands::Describe { file } => {
            let config = describe::DescribeConfig {
                file,
                output_format: cli.format.clone(),
                output_file: cli.output.clone(),
            };
            describe::describe(config).await
        }

        Commands::Ids {
            count,
            prefix,
            reserve_from,
        } => {
            let config = ids::IdsConfig {
                count,
                prefix,
                reserve_from,
                output_format: cli.format.clone(),
                output_file: cli.output.clone(),
            };
            ids::ids(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_sets_default_level() {
        assert_eq!(log_filter(0, None).to_string().to_lowercase(), "warn");
        assert_eq!(log_filter(2, Some("")).to_string().to_lowercase(), "debug");
    }

    #[test]
    fn test_rust_log_takes_precedence() {
        let filter = log_filter(3, Some("workbench_cohort_search=debug"))
            .to_string()
            .to_lowercase();
        assert!(filter.contains("workbench_cohort_search=debug"));
        assert!(!filter.contains("trace"));
    }
}
