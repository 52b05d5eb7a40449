//! Configuration service for symlens
//!
//! The global file is read first and the project file is merged over it
//! key by key, so a project only has to name what it changes. A few
//! `SYMLENS_*` environment variables override both.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::models::ChildDepth;
use crate::models::config::SymlensConfig;

#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn load(&self, global_only: bool) -> Result<SymlensConfig, ConfigError>;
    fn config_path(&self, global: bool) -> PathBuf;
    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError>;
}

pub struct DefaultConfigService {
    root: PathBuf,
}

impl DefaultConfigService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn global_config_path() -> PathBuf {
        // XDG standard: ~/.config/symlens/config.toml
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("symlens")
            .join("config.toml")
    }

    fn project_config_path(&self) -> PathBuf {
        self.root.join(".symlens").join("config.toml")
    }

    async fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
        if !path.exists() {
            return Ok(toml::Table::new());
        }
        let content = tokio::fs::read_to_string(path).await?;
        content
            .parse::<toml::Table>()
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    async fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let config = SymlensConfig::default();
        let content =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigService for DefaultConfigService {
    async fn load(&self, global_only: bool) -> Result<SymlensConfig, ConfigError> {
        let mut table = Self::load_table(&Self::global_config_path()).await?;
        if !global_only {
            let project = Self::load_table(&self.project_config_path()).await?;
            merge_tables(&mut table, project);
        }

        let config: SymlensConfig = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;
        let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
        validate(&config)?;
        Ok(config)
    }

    fn config_path(&self, global: bool) -> PathBuf {
        if global {
            Self::global_config_path()
        } else {
            self.project_config_path()
        }
    }

    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.config_path(global);

        if path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                message: format!(
                    "Config already exists: {}. Use --force to overwrite.",
                    path.display()
                ),
            });
        }

        Self::write_default_config(&path).await?;
        Ok(path)
    }
}

/// Recursively overlay `overlay` onto `base`; tables merge, everything else replaces
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn apply_env_overrides(
    mut config: SymlensConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<SymlensConfig, ConfigError> {
    fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    if let Some(val) = var("SYMLENS_MAX_ROWS") {
        config.output.max_rows = parse("SYMLENS_MAX_ROWS", &val)?;
    }
    if let Some(val) = var("SYMLENS_SAMPLING_CEILING") {
        config.output.sampling_ceiling = parse("SYMLENS_SAMPLING_CEILING", &val)?;
    }
    if let Some(val) = var("SYMLENS_CHILDREN_DEPTH") {
        config.children.default_depth = parse::<ChildDepth>("SYMLENS_CHILDREN_DEPTH", &val)?;
    }
    Ok(config)
}

fn validate(config: &SymlensConfig) -> Result<(), ConfigError> {
    let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    };

    let output = &config.output;
    if output.max_rows == 0 {
        return Err(invalid("output.max_rows", "must be at least 1"));
    }
    if output.sample_size == 0 {
        return Err(invalid("output.sample_size", "must be at least 1"));
    }
    if output.sample_size > output.sampling_ceiling {
        return Err(invalid(
            "output.sample_size",
            "must not exceed output.sampling_ceiling",
        ));
    }
    if output.field_char_cap == 0 {
        return Err(invalid("output.field_char_cap", "must be at least 1"));
    }
    Ok(())
}
