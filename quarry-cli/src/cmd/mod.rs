pub mod build;
pub mod dev;

use anyhow::Result;
use quarry_core::config::Config;
use quarry_core::{Page, content};
use tracing::info;

/// Pages come from the content file, or the starter site when there is none.
/// Read once; edits to content need a restart.
pub fn load_pages(config: &Config) -> Result<Vec<Page>> {
    let path = &config.build.content;
    if !path.exists() {
        info!(path = %path.display(), "no content file, using the starter site");
        return Ok(content::starter_site());
    }

    let pages = content::load(path)?;
    info!(pages = pages.len(), path = %path.display(), "content loaded");
    Ok(pages)
}
