use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "kube-job-cleaner")]
#[command(about = "Delete succeeded Kubernetes Jobs and their Pods across all namespaces")]
#[command(version)]
pub struct Cli {
    /// Don't delete Jobs or Pods, only log what would be deleted
    #[arg(long)]
    pub dry_run: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Kubeconfig used when no in-cluster service account is available
    /// (defaults to $HOME/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Output format of the final summary
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// List every eligible job in the summary
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["kube-job-cleaner"]).unwrap();
        assert!(!cli.dry_run);
        assert_eq!(cli.config, "config.toml");
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.kubeconfig.is_none());
    }

    #[test]
    fn test_dry_run_and_json() {
        let cli = Cli::try_parse_from([
            "kube-job-cleaner",
            "--dry-run",
            "--format",
            "json",
            "--kubeconfig",
            "/tmp/kubeconfig",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.kubeconfig.as_deref(), Some("/tmp/kubeconfig"));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["kube-job-cleaner", "--format", "yaml"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
