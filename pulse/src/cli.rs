use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pulse_config::{Config, OverridableConfig};
use pulse_metrics::{MetricsPublisher, PublishInput};

use crate::setup;
use crate::transport::StdoutTransport;

/// The config folder used when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = ".pulse";

/// Publishes metric events.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about)]
struct Cli {
    /// The path to the config folder or config file. Defaults to `.pulse`.
    #[arg(long, short, global = true, env = "PULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long, global = true, env = "PULSE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Publish metric events read as JSON lines.
    Publish(PublishArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Args)]
struct PublishArgs {
    /// File with one JSON publish input per line. Reads stdin if omitted.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Overrides the configured topic.
    #[arg(long)]
    topic: Option<String>,

    /// Print batches to stdout instead of sending them.
    #[arg(long)]
    dry_run: bool,
}

/// Runs the command line application.
pub fn execute() -> Result<()> {
    let cli = Cli::parse();

    let topic = match &cli.command {
        Command::Publish(args) => args.topic.clone(),
        Command::Config => None,
    };
    let overrides = OverridableConfig {
        topic,
        log_level: cli.log_level,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;

    match cli.command {
        Command::Publish(args) => publish(config, args),
        Command::Config => dump_config(&config),
    }
}

/// Loads the config file and applies the command line overrides.
///
/// An explicit path must exist. Without one, the default config folder is used if it exists and
/// the configuration is built from defaults and overrides otherwise.
fn load_config(path: Option<&Path>, overrides: OverridableConfig) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
        None => return Ok(Config::from_overrides(overrides)?),
    };

    let mut config = Config::from_path(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.apply_override(overrides)?;
    Ok(config)
}

fn dump_config(config: &Config) -> Result<()> {
    let yaml = config.to_yaml()?;
    #[allow(clippy::print_stdout)]
    {
        print!("{yaml}");
    }
    Ok(())
}

fn publish(config: Config, args: PublishArgs) -> Result<()> {
    setup::init_logging(&config);
    setup::dump_spawn_infos(&config);

    let inputs = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input file {}", path.display()))?;
            read_inputs(BufReader::new(file))?
        }
        None => read_inputs(io::stdin().lock())?,
    };

    if inputs.is_empty() {
        pulse_log::info!("no metric events to publish");
        return Ok(());
    }

    let failures = Arc::new(AtomicUsize::new(0));
    let publisher = {
        let failures = failures.clone();
        create_publisher(&config, args.dry_run)?.with_on_error(move |error| {
            failures.fetch_add(1, Ordering::Relaxed);
            pulse_metrics::log_error(error);
        })
    };

    let count = inputs.len();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(publisher.publish(inputs));

    if failures.load(Ordering::Relaxed) > 0 {
        anyhow::bail!("failed to publish {count} metric event(s)");
    }

    pulse_log::info!("published {count} metric event(s)");
    Ok(())
}

fn create_publisher(config: &Config, dry_run: bool) -> Result<MetricsPublisher> {
    #[cfg(feature = "kafka")]
    if !dry_run {
        return pulse_metrics::kafka_publisher(config.metrics(), config.kafka_params())
            .context("failed to set up the kafka publisher");
    }

    #[cfg(not(feature = "kafka"))]
    if !dry_run {
        pulse_log::warn!("pulse was built without kafka support, printing events to stdout");
    }

    let publisher = MetricsPublisher::new(config.metrics(), Arc::new(StdoutTransport))?;
    Ok(publisher)
}

/// Parses one publish input per non-empty line.
fn read_inputs<R: BufRead>(reader: R) -> Result<Vec<PublishInput>> {
    let mut inputs = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let input = serde_json::from_str(&line)
            .with_context(|| format!("invalid publish input on line {}", index + 1))?;
        inputs.push(input);
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pulse_metrics::ScopeInput;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish_args() {
        let cli = Cli::parse_from([
            "pulse",
            "publish",
            "--config",
            "/etc/pulse",
            "--input",
            "events.jsonl",
            "--dry-run",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/pulse")));
        let Command::Publish(args) = cli.command else {
            panic!("expected publish command");
        };
        assert_eq!(args.input, Some(PathBuf::from("events.jsonl")));
        assert!(args.dry_run);
        assert_eq!(args.topic, None);
    }

    #[test]
    fn test_read_inputs() {
        let lines = r#"
{"eventName": "UserLoggedIn"}

{"eventName": "CellLocationRequestProcessed", "teamId": "12345e6f-8e12-49bd-9789-b807608ad3c2"}
"#;

        let inputs = read_inputs(lines.as_bytes()).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], PublishInput::generic("UserLoggedIn"));
        assert!(matches!(inputs[1].scope, ScopeInput::Team { .. }));
    }

    #[test]
    fn test_read_inputs_invalid_line() {
        let lines = "{\"eventName\": \"A\"}\n{\"value\": 1}\n";

        let error = read_inputs(lines.as_bytes()).unwrap_err();
        insta::assert_snapshot!(error, @"invalid publish input on line 2");
    }

    #[test]
    fn test_load_config_without_file() {
        let overrides = OverridableConfig {
            topic: Some("events".to_owned()),
            ..Default::default()
        };

        let config = load_config(None, overrides).unwrap();

        assert!(config.path().as_os_str().is_empty());
        assert_eq!(config.metrics().topic, "events");
    }

    #[test]
    fn test_load_config_explicit_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");

        let error = load_config(Some(&path), OverridableConfig::default()).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("failed to load config from {}", path.display())
        );
    }
}
