use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{info, warn};

use crate::error::{CleanerError, Result};

/// Timeouts applied to the underlying HTTP client
#[derive(Debug, Clone, Copy)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

/// Create an authenticated client for the kube-apiserver.
///
/// Tries the in-cluster service account first, then falls back to a
/// kubeconfig file: `kubeconfig` when given, otherwise `$HOME/.kube/config`.
pub async fn authenticate(kubeconfig: Option<&Path>, timeouts: ClientTimeouts) -> Result<Client> {
    info!("Creating kube-apiserver client from in-cluster service account...");

    let in_cluster_err = match Config::incluster() {
        Ok(config) => match build_client(config, timeouts) {
            Ok(client) => {
                info!("Using in-cluster service account");
                return Ok(client);
            }
            Err(e) => e,
        },
        Err(e) => e.to_string(),
    };

    warn!(
        "In-cluster client creation failed, trying kubeconfig: {}",
        in_cluster_err
    );

    let path = match kubeconfig {
        Some(path) => path.to_path_buf(),
        None => default_kubeconfig_path(std::env::var_os("HOME")).ok_or_else(|| {
            CleanerError::Auth {
                in_cluster: in_cluster_err.clone(),
                kubeconfig: "HOME is not set".to_string(),
            }
        })?,
    };

    match load_kubeconfig(&path).await {
        Ok(config) => {
            let client = build_client(config, timeouts).map_err(|e| CleanerError::Auth {
                in_cluster: in_cluster_err.clone(),
                kubeconfig: e,
            })?;
            info!("Using kubeconfig {}", path.display());
            Ok(client)
        }
        Err(e) => Err(CleanerError::Auth {
            in_cluster: in_cluster_err,
            kubeconfig: e,
        }),
    }
}

/// `$HOME/.kube/config`
pub fn default_kubeconfig_path(home: Option<OsString>) -> Option<PathBuf> {
    home.filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".kube").join("config"))
}

async fn load_kubeconfig(path: &Path) -> std::result::Result<Config, String> {
    let kubeconfig = Kubeconfig::read_from(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| format!("failed to load {}: {}", path.display(), e))
}

fn build_client(mut config: Config, timeouts: ClientTimeouts) -> std::result::Result<Client, String> {
    config.connect_timeout = Some(timeouts.connect);
    config.read_timeout = Some(timeouts.read);
    Client::try_from(config).map_err(|e| format!("failed to create client: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kubeconfig_path() {
        let path = default_kubeconfig_path(Some(OsString::from("/home/ops")));
        assert_eq!(path, Some(PathBuf::from("/home/ops/.kube/config")));
    }

    #[test]
    fn test_default_kubeconfig_path_without_home() {
        assert_eq!(default_kubeconfig_path(None), None);
        assert_eq!(default_kubeconfig_path(Some(OsString::new())), None);
    }

    #[tokio::test]
    async fn test_load_missing_kubeconfig() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");

        let err = load_kubeconfig(&path).await.unwrap_err();
        assert!(err.contains("failed to read"));
    }

    #[tokio::test]
    async fn test_load_invalid_kubeconfig() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "not: [valid").unwrap();

        assert!(load_kubeconfig(&path).await.is_err());
    }
}
