use anyhow::Result;
use quarry_core::config::Config;
use quarry_core::{Page, rebuild};

pub fn execute(config: &Config, pages: &[Page]) -> Result<()> {
    // In one-shot mode a failed asset step is as fatal as a failed page
    let report = rebuild(config, pages)?;

    println!(
        "Built {} pages into {}",
        report.len(),
        config.build.output.display()
    );

    Ok(())
}
