// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubegate::config::Config;
use kubegate::error::GatewayError;
use kubegate::gateway::Gateway;
use kubegate::resources::ListQuery;

#[derive(Parser)]
#[command(name = "kubegate")]
#[command(about = "Read and create Kubernetes resources across clusters", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the clusters that were loaded
    Clusters,

    /// List resources of a kind
    List {
        cluster: String,
        kind: String,
        #[arg(short, long, default_value = "")]
        namespace: String,
        /// Label selector, passed to the cluster as is
        #[arg(short = 'l', long)]
        selector: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Continue token from a previous page
        #[arg(long = "continue")]
        continue_token: Option<String>,
    },

    /// Get one resource by name
    Get {
        cluster: String,
        kind: String,
        name: String,
        #[arg(short, long, default_value = "")]
        namespace: String,
    },

    /// Create a resource from a YAML or JSON manifest
    Create {
        cluster: String,
        #[arg(short, long, default_value = "")]
        kind: String,
        /// Manifest file
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long, default_value = "")]
        namespace: String,
    },
}

#[derive(Serialize)]
struct Failure {
    kind: String,
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so that stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let failure = match e.downcast_ref::<GatewayError>() {
                Some(err) => Failure {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                },
                None => Failure {
                    kind: "Internal".to_string(),
                    message: format!("{:#}", e),
                },
            };
            match serde_json::to_string_pretty(&failure) {
                Ok(json) => println!("{}", json),
                Err(_) => eprintln!("{}", failure.message),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = Config::from_env()?;
    let gateway = Gateway::from_config(&config).await;
    info!("Loaded {} cluster(s)", gateway.registry().len());

    let output = match cli.command {
        Commands::Clusters => serde_json::to_string_pretty(&gateway.registry().cluster_ids())?,
        Commands::List {
            cluster,
            kind,
            namespace,
            selector,
            limit,
            continue_token,
        } => {
            let query = ListQuery {
                label_selector: selector,
                limit,
                continue_token,
            };
            let list = gateway
                .list_resources(&cluster, &kind, &namespace, &query)
                .await?;
            serde_json::to_string_pretty(&list)?
        }
        Commands::Get {
            cluster,
            kind,
            name,
            namespace,
        } => {
            let view = gateway
                .get_resource(&cluster, &kind, &namespace, &name)
                .await?;
            serde_json::to_string_pretty(&view)?
        }
        Commands::Create {
            cluster,
            kind,
            file,
            namespace,
        } => {
            let manifest = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read manifest {}", file.display()))?;
            let name = gateway
                .create_resource(&cluster, &kind, &namespace, &manifest)
                .await?;
            serde_json::to_string_pretty(&serde_json::json!({ "name": name }))?
        }
    };

    Ok(output)
}
