use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub cleaner: CleanerConfig,
    pub kube: KubeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CleanerConfig {
    pub dry_run: bool,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KubeConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    #[serde(default)]
    pub kubeconfig: Option<String>,
}

impl Config {
    /// Load configuration: built-in defaults, then the optional file at `path`,
    /// then `KJC_*` environment variables (`KJC_CLEANER__DRY_RUN=true`).
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = Self::builder(path)?
            .add_source(
                config::Environment::with_prefix("KJC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder(
        path: &str,
    ) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("cleaner.dry_run", false)?
            .set_default("cleaner.request_timeout_secs", 30)?
            .set_default("kube.connect_timeout_secs", 5)?
            .set_default("kube.read_timeout_secs", 30)?
            .add_source(config::File::with_name(path).required(false)))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.cleaner.request_timeout_secs == 0 {
            anyhow::bail!("cleaner.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.cleaner.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.kube.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.kube.read_timeout_secs)
    }

    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kube.kubeconfig.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_file(contents: &str) -> anyhow::Result<Config> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        file.write_all(contents.as_bytes())?;
        let path = file.path().to_string_lossy().to_string();
        let config: Config = Config::builder(&path)?.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_without_file() {
        let config: Config = Config::builder("does-not-exist")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(!config.cleaner.dry_run);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert!(config.kubeconfig_path().is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = load_file(
            r#"
            [cleaner]
            dry_run = true
            request_timeout_secs = 10

            [kube]
            kubeconfig = "/etc/kube/admin.conf"
            "#,
        )
        .unwrap();

        assert!(config.cleaner.dry_run);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.kubeconfig_path(),
            Some(PathBuf::from("/etc/kube/admin.conf"))
        );
    }

    #[test]
    fn test_environment_overrides_defaults() {
        // Only `load` reads the environment, so this cannot leak into the
        // other tests.
        std::env::set_var("KJC_CLEANER__DRY_RUN", "true");
        std::env::set_var("KJC_CLEANER__REQUEST_TIMEOUT_SECS", "7");

        let result = Config::load("does-not-exist");

        std::env::remove_var("KJC_CLEANER__DRY_RUN");
        std::env::remove_var("KJC_CLEANER__REQUEST_TIMEOUT_SECS");

        let config = result.unwrap();
        assert!(config.cleaner.dry_run);
        assert_eq!(config.request_timeout(), Duration::from_secs(7));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = load_file(
            r#"
            [cleaner]
            request_timeout_secs = 0
            "#,
        );
        assert!(result.is_err());
    }
}
