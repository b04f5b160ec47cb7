use thiserror::Error;
use tracing::info;

use crate::assets::{AssetError, AssetPipeline};
use crate::build::{BuildError, BuildReport, build};
use crate::config::Config;
use crate::content::Page;
use crate::registry::{LoadError, Registry, TemplateSources};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("asset step failed")]
    Assets(#[source] AssetError),
    #[error(transparent)]
    Site(#[from] SiteError),
}

/// Load the templates fresh and build every page.
pub fn build_site(config: &Config, pages: &[Page]) -> Result<BuildReport, SiteError> {
    let sources = TemplateSources::new(&config.build.templates);
    let registry = Registry::load(&sources)?.with_global("site", &config.site);

    let report = build(pages, &registry, &config.build.output)?;
    info!(
        pages = report.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        output = %config.build.output.display(),
        "site built"
    );
    Ok(report)
}

/// Styles first, then markup. Markup is not touched if the asset step fails.
pub fn rebuild(config: &Config, pages: &[Page]) -> Result<BuildReport, RebuildError> {
    if let Some(pipeline) = AssetPipeline::from_config(&config.assets, &config.build.output) {
        pipeline.run().map_err(RebuildError::Assets)?;
        info!(output = %pipeline.output().display(), "styles compiled");
    }
    Ok(build_site(config, pages)?)
}
