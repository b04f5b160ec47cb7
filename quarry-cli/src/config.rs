use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use quarry_core::config::Config;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "./quarry.toml";

/// Load configuration with cascading precedence:
/// 1. Environment variables (QUARRY_*, `__` between nested keys)
/// 2. Configuration file
/// 3. Defaults (lowest priority)
pub fn load(args: &ArgMatches) -> Result<Config> {
    let config_file = args
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_FILE);

    load_from(Path::new(config_file), Environment::with_prefix("QUARRY"))
}

fn load_from(config_file: &Path, env: Environment) -> Result<Config> {
    let mut builder = ConfigBuilder::builder();

    // 1. Start with defaults
    builder = builder.add_source(ConfigBuilder::try_from(&Config::default())?);

    // 2. Add configuration file if it exists
    if config_file.exists() {
        builder = builder.add_source(File::from(config_file));
    } else {
        tracing::debug!(path = %config_file.display(), "no config file, using defaults");
    }

    // 3. Add environment variables
    builder = builder.add_source(
        env.prefix_separator("_")
            .separator("__") // Use double underscore for nested keys
            .try_parsing(true),
    );

    let config: Config = builder.build()?.try_deserialize()?;

    Ok(config)
}
