//!
//! Configuration structures and utilities for wiring up the asset pipeline.
//!
//! A configuration can be created in many ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! In both TOML-based methods, environment variables can be referenced in the TOML
//! using the {{ VAR_NAME }} syntax, and they will be substituted with the corresponding
//! environment variable value. This is done via the `replace_handlebars_with_env`
//! function and prevents deploy-specific values from being stored directly in the
//! TOML files.
//!
//! Configuration is split into logical sections, each represented by their own struct:
//!
//! - `AssetConfig` for the pre-encoded asset pipeline
//! - `LoggingConfig` for logging and tracing settings
//!

mod assets;
mod logging;

pub use assets::*;
pub use logging::*;

use {
    crate::{
        Result,
        dispatch::ServeMode,
        mime::UnknownExtension,
        negotiate::EncodingCandidate,
        utils::replace_handlebars_with_env,
    },
    serde::Deserialize,
    std::{env, fs, str::FromStr},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    ///
    /// Creates a default configuration.
    /// This will attempt to load configuration from the file based on the RUST_ENV
    /// environment variable falling back to a default configuration if the environment
    /// variable is not set. Configuration files should be located in the "config/"
    /// directory of your project.
    ///
    fn default() -> Self {
        match Self::from_rust_env() {
            Ok(config) => config,
            Err(_) => Config {
                assets: AssetConfig::default(),
                logging: LoggingConfig::default(),
            },
        }
    }
}

impl Config {
    ///
    /// Loads the configuration from a file based on the RUST_ENV environment variable.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Given an environment name, loads the corresponding configuration file,
    /// substitutes any environment variables, and returns a Config struct.
    /// The configuration file is expected to be located at "config/{env}.toml"
    /// where {env} is the provided environment name (e.g., "dev", "prod").
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        replace_handlebars_with_env(toml_str).parse()
    }

    /// Sets the document root of the AssetConfig.
    pub fn with_doc_root<S: AsRef<str>>(mut self, doc_root: S) -> Self {
        self.assets.doc_root = doc_root.as_ref().into();
        self
    }

    /// Sets the sibling delivery mode of the AssetConfig.
    pub fn with_serve_mode(mut self, mode: ServeMode) -> Self {
        self.assets.mode = mode;
        self
    }

    /// Sets the comma-separated ignore pattern list of the AssetConfig.
    pub fn with_ignore<S: AsRef<str>>(mut self, patterns: S) -> Self {
        self.assets.ignore = patterns.as_ref().into();
        self
    }

    /// Replaces the encoding candidate list of the AssetConfig.
    pub fn with_encodings(mut self, encodings: Vec<EncodingCandidate>) -> Self {
        self.assets.encodings = encodings;
        self
    }

    /// Adds one MIME table entry to the AssetConfig.
    pub fn with_mime_type<S: AsRef<str>, T: AsRef<str>>(mut self, ext: S, mime_type: T) -> Self {
        self.assets
            .mime
            .types
            .insert(ext.as_ref().into(), mime_type.as_ref().into());
        self
    }

    /// Sets the unknown-extension policy of the AssetConfig.
    pub fn with_unknown_extension(mut self, policy: UnknownExtension) -> Self {
        self.assets.unknown_extension = policy;
        self
    }

    /// Sets the log output format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Validates all configuration sections.
    pub fn validate(&self) -> Result<()> {
        self.assets.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    ///
    /// Initializes the tracing subscriber according to the logging configuration.
    /// Safe to call more than once; subsequent calls are no-ops.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::from_default_env();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

impl FromStr for Config {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(s)?;
        Ok(config)
    }
}
