use std::path::Path;

use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("page_cache_size must be at least 1")]
    InvalidPageCacheSize,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Directory for daily rolling log files. Logs go to stderr when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Pages kept per session before the least recently used one is evicted.
    pub page_cache_size: usize,
    /// Searched in order for `<Name>.html` and `<Name>.wod`.
    pub template_dirs: Vec<Utf8PathBuf>,
    pub session_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            log_dir: None,
            page_cache_size: 100,
            template_dirs: Vec::new(),
            session_timeout_secs: 3600,
        }
    }
}

impl Settings {
    /// Load settings for an application rooted at `project_root`.
    ///
    /// Sources, lowest priority first: the user config dir's `ng.toml`, the
    /// project's `.ng.toml`, the project's `ng.toml`, then `NG_*` environment
    /// variables.
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("is", "ng", "ng")
            .map(|proj_dirs| proj_dirs.config_dir().join("ng.toml"));

        Self::load_from_paths(
            project_root,
            user_config_file.as_deref(),
            Environment::with_prefix("NG"),
        )
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".ng.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("ng.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            environment
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("template_dirs"),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        if settings.page_cache_size == 0 {
            return Err(ConfigError::InvalidPageCacheSize);
        }

        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}
