//! WolfDeploy - Deployment Reconciliation Planner
//!
//! Offline front end over the planner: reads declared and observed
//! deployment documents and prints what a reconciliation would do.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wolfdeploy::config::{LoggingConfig, WolfDeployConfig};
use wolfdeploy::deployment::{normalize_instance_size, AutoscalingPolicy, ComputeAutoscaling, DeploymentSpec};
use wolfdeploy::error::Result;
use wolfdeploy::reconcile::{DeploymentResource, Reconciler};

/// WolfDeploy - Deployment Reconciliation Planner
#[derive(Parser)]
#[command(name = "wolfdeploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "wolfdeploy.toml")]
    config: PathBuf,

    /// Log level, overriding the configuration (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a reconciliation of a declared resource against the remote state
    Plan {
        /// Declared resource document (JSON)
        #[arg(short, long)]
        resource: PathBuf,

        /// Deployment spec reported by the remote API (JSON)
        #[arg(short, long)]
        observed: PathBuf,
    },

    /// Show what happens to the remote deployment when the resource is deleted
    CheckDeletion {
        /// Declared resource document (JSON)
        #[arg(short, long)]
        resource: PathBuf,
    },

    /// Clamp an instance size into compute autoscaling bounds
    Normalize {
        /// Instance size to clamp
        size: String,

        /// Minimum autoscaling instance size
        #[arg(long)]
        min: String,

        /// Maximum autoscaling instance size
        #[arg(long)]
        max: String,
    },

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "wolfdeploy.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { resource, observed } => {
            let config = WolfDeployConfig::from_file(&cli.config)?;
            init_logging(&config.logging, cli.log_level.as_deref());
            run_plan(&config, &resource, &observed)
        }
        Commands::CheckDeletion { resource } => {
            let config = WolfDeployConfig::from_file(&cli.config)?;
            init_logging(&config.logging, cli.log_level.as_deref());
            run_check_deletion(&config, &resource)
        }
        Commands::Normalize { size, min, max } => {
            init_logging(&LoggingConfig::default(), cli.log_level.as_deref());
            run_normalize(&size, min, max)
        }
        Commands::Init { output } => {
            run_init(output)
        }
        Commands::Validate => {
            run_validate(cli.config)
        }
    }
}

/// Initialize logging. Logs go to stderr so stdout stays machine readable.
fn init_logging(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(logging.level.as_str());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Plan one reconciliation
fn run_plan(config: &WolfDeployConfig, resource_path: &Path, observed_path: &Path) -> Result<()> {
    let resource: DeploymentResource = read_json(resource_path)?;
    let observed: DeploymentSpec = read_json(observed_path)?;
    tracing::debug!("Planning {} against {:?}", resource.metadata.name, observed_path);

    let reconciler = Reconciler::from_config(config);
    let decision = match reconciler.plan(&resource, &observed) {
        Ok(d) => d,
        Err(e) => {
            if e.is_user_correctable() {
                tracing::error!("Resource {} needs to be fixed: {}", resource.metadata.name, e);
            } else {
                tracing::error!("Planning failed: {}", e);
            }
            return Err(e);
        }
    };

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

/// Show the deletion policy of a resource
fn run_check_deletion(config: &WolfDeployConfig, resource_path: &Path) -> Result<()> {
    let resource: DeploymentResource = read_json(resource_path)?;
    let policy = Reconciler::from_config(config).plan_deletion(&resource.metadata);

    println!("{}", policy);
    Ok(())
}

/// Clamp an instance size
fn run_normalize(size: &str, min: String, max: String) -> Result<()> {
    let policy = AutoscalingPolicy {
        disk: None,
        compute: Some(ComputeAutoscaling {
            enabled: Some(true),
            scale_down_enabled: None,
            min_instance_size: min,
            max_instance_size: max,
        }),
    };

    println!("{}", normalize_instance_size(size, Some(&policy))?);
    Ok(())
}

/// Initialize configuration file
fn run_init(output: PathBuf) -> Result<()> {
    let config_content = format!(r#"# WolfDeploy Configuration
# Generated configuration file

[operator]
# Resources labelled with a newer version are not reconciled
version = "{version}"

[logging]
level = "info"
format = "pretty"
"#, version = env!("CARGO_PKG_VERSION"));

    std::fs::write(&output, config_content)?;
    println!("Configuration file created: {}", output.display());
    println!("Then plan with: wolfdeploy --config {} plan --resource <file> --observed <file>", output.display());

    Ok(())
}

/// Validate configuration
fn run_validate(config_path: PathBuf) -> Result<()> {
    match WolfDeployConfig::from_file(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!("  System Version: {}", config.system_version());
            println!("  Log Level:      {}", config.logging.level);
            println!("  Log Format:     {}", config.logging.format);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            Err(e)
        }
    }
}
