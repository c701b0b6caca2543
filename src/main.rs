//! # NVIDIA Operator Controller
//!
//! Renders and applies the NVIDIA GPU Operator or NVIDIA Network Operator
//! manifests for a lifecycle manager, one trigger per invocation.
//!
//! ## Usage
//!
//! ```bash
//! # Print the manifests the options would produce
//! nvidia-operator-controller render --deployment gpu --config options.yaml
//!
//! # Print the configuration hash
//! nvidia-operator-controller hash --deployment network --config options.yaml
//!
//! # Handle a trigger against the cluster, keeping state in a file
//! nvidia-operator-controller reconcile --deployment gpu --trigger config-changed \
//!     --config options.yaml --state state.json
//! ```
//!
//! `reconcile` exits with `EX_TEMPFAIL` (75) when the trigger was deferred
//! and should be delivered again later.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nvidia_operator_controller::config::ControllerConfig;
use nvidia_operator_controller::constants::EXIT_CODE_DEFERRED;
use nvidia_operator_controller::observability::metrics;
use nvidia_operator_controller::{Deployment, Trigger};
use std::path::PathBuf;
use tracing::info;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// NVIDIA Operator Controller
#[derive(Parser)]
#[command(name = "nvidia-operator-controller", version = VERSION)]
#[command(about = "Reconcile the NVIDIA GPU and Network operator deployments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate options and print the rendered manifests
    Render {
        /// Deployment to render (gpu or network)
        #[arg(short, long)]
        deployment: Deployment,

        /// YAML file of options overriding the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Namespace to render into (default: the `namespace` option)
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Print the configuration hash
    Hash {
        #[arg(short, long)]
        deployment: Deployment,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Handle one lifecycle trigger against the cluster
    Reconcile {
        #[arg(short, long)]
        deployment: Deployment,

        /// config-changed, install, upgrade, update-status or stop
        #[arg(short, long)]
        trigger: Trigger,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file holding controller state between invocations
        #[arg(short, long)]
        state: PathBuf,

        /// Print Prometheus metrics after handling the trigger
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must be installed before the kube client opens a TLS connection
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| panic!("Failed to install rustls crypto provider"));

    let config = ControllerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if config.enable_metrics {
        metrics::register_metrics()?;
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            deployment,
            config: options,
            namespace,
        } => {
            let raw = cli::load_options(deployment, options.as_deref())?;
            cli::render::render_command(&config, deployment, &raw, namespace)
        }
        Commands::Hash {
            deployment,
            config: options,
        } => {
            let raw = cli::load_options(deployment, options.as_deref())?;
            cli::hash::hash_command(&config, deployment, &raw).map(|_| ())
        }
        Commands::Reconcile {
            deployment,
            trigger,
            config: options,
            state,
            metrics: print_metrics,
        } => {
            info!("Starting NVIDIA Operator Controller {}", VERSION);
            let raw = cli::load_options(deployment, options.as_deref())?;
            let deferred =
                cli::reconcile::reconcile_command(&config, deployment, trigger, &raw, &state)
                    .await?;

            if print_metrics && config.enable_metrics {
                print!("{}", metrics::gather_metrics()?);
            }
            if deferred {
                std::process::exit(EXIT_CODE_DEFERRED);
            }
            Ok(())
        }
    }
}
