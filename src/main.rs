use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kube_job_cleaner::{
    audit::TracingSink,
    cli::{Cli, OutputFormat},
    cluster::{self, ClientTimeouts, KubeClusterClient},
    error::{self, CleanerError},
    reclaim::JobCleaner,
    Config,
};

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries only the summary so `--format json`
    // stays machine readable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kube_job_cleaner=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::select! {
        result = run(&cli) => result,
        e = interrupted(tokio::signal::ctrl_c()) => Err(e),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(e.exit_code());
    }
}

/// Resolves once `signal` fires. If the handler could not be installed the
/// run carries on without interrupt support.
async fn interrupted<F>(signal: F) -> CleanerError
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => CleanerError::Interrupted,
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, interrupts are disabled: {}", e);
            std::future::pending().await
        }
    }
}

async fn run(cli: &Cli) -> error::Result<()> {
    let config = Config::load(&cli.config)?;

    let dry_run = cli.dry_run || config.cleaner.dry_run;
    if dry_run {
        warn!("[!] Running in dry-run mode: no Jobs or Pods will be deleted");
    }

    let kubeconfig = cli
        .kubeconfig
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| config.kubeconfig_path());

    let client = cluster::authenticate(
        kubeconfig.as_deref(),
        ClientTimeouts {
            connect: config.connect_timeout(),
            read: config.read_timeout(),
        },
    )
    .await?;

    let cleaner = JobCleaner::new(
        Arc::new(KubeClusterClient::new(client, config.request_timeout())),
        Arc::new(TracingSink),
        dry_run,
    );

    info!("Deleting succeeded Jobs in all namespaces...");
    let summary = cleaner.run().await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
        }
        OutputFormat::Table => summary.print_summary(cli.verbose),
    }

    Ok(())
}
