//! Layered configuration loading with figment.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. the profile file, `warden.{profile}.toml`, when a profile is set
//! 3. the main file, `warden.toml` or `config.toml` (YAML variants with the
//!    `yaml-config` feature)
//! 4. `WARDEN_*` environment variables, `__` separating nested keys:
//!    `WARDEN_FLOOD__THRESHOLD=20`, `WARDEN_BOT__OWNER_ID=12345`
//! 5. programmatic overrides ([`ConfigLoader::set`], [`ConfigLoader::merge`])
//!
//! The profile comes from [`ConfigLoader::profile`] or `WARDEN_PROFILE`.
//! Without search paths the current directory and the user config directory
//! (`~/.config/warden` on Linux) are searched.

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::WardenConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "WARDEN_";
const PROFILE_VAR: &str = "WARDEN_PROFILE";
const APP_DIR: &str = "warden";

/// A file format compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Enabled formats, in search order.
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn from_extension(ext: &str) -> Option<Self> {
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn merge(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

/// Configuration loader.
#[derive(Debug)]
pub struct ConfigLoader {
    profile: Option<String>,
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    load_env: bool,
    /// Merged over every other source.
    overrides: Figment,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            profile: std::env::var(PROFILE_VAR)
                .ok()
                .filter(|p| !p.trim().is_empty()),
            search_paths: Vec::new(),
            config_file: None,
            load_env: true,
            overrides: Figment::new(),
        }
    }

    /// Sets the profile, e.g. `production` loads `warden.production.toml`.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Some(profile.as_ref().to_lowercase());
        self
    }

    /// Adds a directory to search. Replaces the default search locations.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a full configuration over every other source.
    pub fn merge(mut self, config: WardenConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Sets a single key over every other source, e.g. `("flood.threshold", 5)`.
    pub fn set<V: serde::Serialize>(mut self, key: &str, value: V) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<WardenConfig> {
        let profile = self.profile.clone();
        let config: WardenConfig = self.figment()?.extract()?;
        validate_config(&config)?;

        debug!(
            profile = profile.as_deref().unwrap_or("-"),
            owner = ?config.bot.owner_id,
            sudoers = config.bot.sudo_users.len(),
            flood_threshold = config.flood.threshold,
            flood_window_ms = config.flood.window_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// The merged sources, before extraction.
    ///
    /// Embedders can pull their own sections out of the same files, e.g.
    /// `loader.figment()?.extract_inner::<MySettings>("notes")`.
    pub fn figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(WardenConfig::default()));

        figment = match &self.config_file {
            Some(path) => Self::merge_explicit(figment, path)?,
            None => self.merge_searched(figment),
        };

        if self.load_env {
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["PROFILE"])
                    .split("__"),
            );
        }

        Ok(figment.merge(self.overrides))
    }

    fn merge_explicit(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format =
            FileFormat::from_extension(ext).ok_or_else(|| ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext.to_string(),
            })?;
        info!(path = %path.display(), "Loading configuration file");
        Ok(format.merge(figment, path))
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join(APP_DIR)))
            .collect()
    }

    /// Merges the first directory holding a main file, together with its
    /// profile file. Profile files in earlier directories still apply.
    fn merge_searched(&self, mut figment: Figment) -> Figment {
        let dirs = self.search_dirs();

        for dir in &dirs {
            for stem in ["warden", "config"] {
                for &format in FileFormat::ENABLED {
                    for ext in format.extensions() {
                        if let Some(profile) = &self.profile {
                            let path = dir.join(format!("{stem}.{profile}.{ext}"));
                            if path.exists() {
                                debug!(path = %path.display(), "Loading profile configuration");
                                figment = format.merge(figment, &path);
                            }
                        }

                        let path = dir.join(format!("{stem}.{ext}"));
                        if path.exists() {
                            info!(path = %path.display(), "Loading configuration file");
                            return format.merge(figment, &path);
                        }
                    }
                }
            }
        }

        warn!(searched = ?dirs, "No configuration file found, using defaults");
        figment
    }
}
