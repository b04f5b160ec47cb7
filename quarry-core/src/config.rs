use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", .path.display())]
    Parsing {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything a build or dev session needs to know, grouped by table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub build: BuildConfig,
    pub dev: DevConfig,
    pub assets: AssetConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ConfigError::Parsing {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Site metadata, exposed to every template as `site`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: Option<String>,
    pub lang: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quarry".into(),
            description: None,
            lang: "en".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding `base.html` and the `components/` templates
    pub templates: PathBuf,
    /// TOML file describing pages and sections
    pub content: PathBuf,
    /// Output root
    pub output: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("./layouts"),
            content: PathBuf::from("./content.toml"),
            output: PathBuf::from("./build"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DevConfig {
    pub host: String,
    pub port: u16,
    /// How often template sources are checked for changes
    pub poll_interval_ms: u64,
    /// Open a browser once the server is up
    pub open: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            poll_interval_ms: 500,
            open: false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub enable: bool,
    pub command: String,
    pub input: PathBuf,
    /// Relative to the build output root
    pub output: PathBuf,
    pub minify: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            enable: false,
            command: "./node_modules/.bin/tailwindcss".into(),
            input: PathBuf::from("./styles/globals.css"),
            output: PathBuf::from("assets/css/style.css"),
            minify: true,
        }
    }
}
