pub mod assets;
pub mod build;
pub mod compiler;
pub mod config;
pub mod content;
pub mod markdown;
pub mod registry;
pub mod site;

// Re-export main types
pub use build::{BuildError, BuildReport, build};
pub use compiler::{CompileError, compile};
pub use content::{Page, Section};
pub use registry::{LoadError, Registry, RenderError, TemplateSources};
pub use site::{RebuildError, SiteError, build_site, rebuild};
