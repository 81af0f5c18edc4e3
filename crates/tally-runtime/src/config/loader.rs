//! Layered configuration loading.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `tally.toml` (or `config.toml`), found in the search paths
//! 3. Its profile variant, e.g. `tally.production.toml`
//! 4. `TALLY_*` environment variables, `__` separating nested keys
//!    (`TALLY_STORAGE__DATA_FILE`, `TALLY_SEED__TOKEN`)
//! 5. Programmatic overrides ([`ConfigLoader::set`])
//!
//! With the `yaml-config` feature `.yaml` / `.yml` files are found too.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .file("./config/tally.toml")
//!     .set("storage.data_file", "/tmp/data.json")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::TallyConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "TALLY_";
const FILE_STEMS: [&str; 2] = ["tally", "config"];

/// Name of the active configuration profile.
///
/// `dev` and `prod` are accepted for `development` and `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "" | "dev" => Self::default(),
            "prod" => Self("production".to_string()),
            _ => Self(name),
        }
    }

    /// Reads `TALLY_PROFILE`.
    pub fn from_env() -> Self {
        std::env::var("TALLY_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self("development".to_string())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Enabled formats and the extensions they claim, in search order.
    #[allow(unused_mut)]
    fn enabled() -> Vec<(Self, &'static str)> {
        let mut formats = Vec::new();
        #[cfg(feature = "toml-config")]
        formats.push((Self::Toml, "toml"));
        #[cfg(feature = "yaml-config")]
        formats.extend([(Self::Yaml, "yaml"), (Self::Yaml, "yml")]);
        formats
    }

    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::enabled()
            .into_iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(ext))
            .map(|(format, _)| format)
    }

    #[allow(unused_variables)]
    fn merge(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(figment::providers::Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(figment::providers::Yaml::file(path)),
        }
    }
}

/// Builder that assembles a [`TallyConfig`] from files, environment and
/// overrides.
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Explicit file; disables the search.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search. Without any, the current directory and
    /// the user config directory (`~/.config/tally` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Overrides a single dotted key, e.g. `"storage.data_file"`.
    pub fn set<V: Serialize>(mut self, key: &str, value: V) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<TallyConfig> {
        let mut figment = Figment::from(Serialized::defaults(TallyConfig::default()));

        for (format, path) in self.files()? {
            info!(path = %path.display(), "Loading configuration file");
            figment = format.merge(figment, &path);
        }

        if self.load_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["PROFILE"]).split("__"));
        }

        let config: TallyConfig = figment
            .merge(self.overrides)
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("invalid configuration: {e}")))?;
        validate_config(&config)?;

        debug!(
            profile = %self.profile,
            data_file = %config.storage.data_file.display(),
            logging_level = %config.logging.level,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Files to merge, lowest priority first.
    fn files(&self) -> ConfigResult<Vec<(FileFormat, PathBuf)>> {
        if let Some(path) = &self.config_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            let format = FileFormat::of(path).ok_or_else(|| {
                ConfigError::ParseError(format!(
                    "unsupported or disabled configuration format: {}",
                    path.display()
                ))
            })?;
            return Ok(vec![(format, path.clone())]);
        }

        let dirs = self.search_dirs();
        let found = self.discover(&dirs);
        if found.is_empty() {
            warn!(paths = ?dirs, "No configuration file found, using defaults");
        }
        Ok(found)
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("tally")))
            .collect()
    }

    /// The first base file found wins; its profile variant, if present next
    /// to it, is layered over it.
    fn discover(&self, dirs: &[PathBuf]) -> Vec<(FileFormat, PathBuf)> {
        let formats = FileFormat::enabled();

        for dir in dirs {
            for stem in FILE_STEMS {
                for &(format, ext) in &formats {
                    let base = dir.join(format!("{stem}.{ext}"));
                    if !base.is_file() {
                        continue;
                    }

                    let mut files = vec![(format, base)];
                    let variant = dir.join(format!("{stem}.{}.{ext}", self.profile));
                    if variant.is_file() {
                        debug!(path = %variant.display(), "Found profile configuration");
                        files.push((format, variant));
                    }
                    return files;
                }
            }
        }
        Vec::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
