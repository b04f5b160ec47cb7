mod cmd;
mod config;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

pub(crate) fn cli() -> Command {
    Command::new("quarry")
        .about("Assemble a static site from typed sections and reusable templates")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("dev")
                .long("dev")
                .help("Run in development mode (build, serve and rebuild on template changes)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value(config::DEFAULT_CONFIG_FILE),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .init();

    let args = cli().get_matches();
    let config = config::load(&args)?;
    let pages = cmd::load_pages(&config)?;

    if args.get_flag("dev") {
        cmd::dev::execute(config, pages).await
    } else {
        cmd::build::execute(&config, &pages)
    }
}
