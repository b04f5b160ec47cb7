//! Name-indexed template registry.
//!
//! Tera only resolves templates referenced literally (`include`, `extends`).
//! Sections pick their renderer from data, so the registry keeps its own
//! name → template map, built once per load and checked eagerly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Renderer name of the mandatory page layout.
pub const BASE_LAYOUT: &str = "base";

const TEMPLATE_EXTENSION: &str = "html";
const COMPONENTS_DIR: &str = "components";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read template source {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse templates")]
    Parse(#[source] tera::Error),
    #[error("renderer `{name}` is defined by both {} and {}", .first.display(), .second.display())]
    Duplicate {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("layout `base.html` not found in {}", .root.display())]
    MissingLayout { root: PathBuf },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no renderer named `{name}`")]
    NotFound { name: String },
    #[error("renderer `{name}` failed")]
    ExecutionFailed {
        name: String,
        #[source]
        source: tera::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Layout,
    Component,
}

#[derive(Debug, Clone)]
pub struct RendererEntry {
    pub name: String,
    /// Key of the compiled template inside tera, e.g. `components/hero.html`
    pub template: String,
    pub source: PathBuf,
    pub kind: TemplateKind,
}

/// Where templates live on disk.
///
/// Layouts are `<root>/*.html` and must include `base.html`. Components are
/// `<root>/components/*.html`; the directory may be missing or empty.
#[derive(Debug, Clone)]
pub struct TemplateSources {
    root: PathBuf,
}

impl TemplateSources {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All template files, layouts first, each group sorted by file name.
    pub fn discover(&self) -> Vec<(PathBuf, TemplateKind)> {
        let layouts = html_files_in(&self.root)
            .into_iter()
            .map(|p| (p, TemplateKind::Layout));
        let components = html_files_in(self.root.join(COMPONENTS_DIR))
            .into_iter()
            .map(|p| (p, TemplateKind::Component));

        layouts.chain(components).collect()
    }

    /// Paths only, for change detection.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.discover().into_iter().map(|(p, _)| p).collect()
    }
}

fn html_files_in<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == TEMPLATE_EXTENSION)
                    .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Template key relative to the sources root, always `/`-separated so
/// `{% include %}` paths work the same on every platform.
fn template_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct Registry {
    tera: Tera,
    entries: BTreeMap<String, RendererEntry>,
    globals: Context,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("renderers", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn load(sources: &TemplateSources) -> Result<Self, LoadError> {
        let mut entries: BTreeMap<String, RendererEntry> = BTreeMap::new();
        let mut raw = Vec::new();

        for (path, kind) in sources.discover() {
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };

            if let Some(existing) = entries.get(&name) {
                return Err(LoadError::Duplicate {
                    name,
                    first: existing.source.clone(),
                    second: path,
                });
            }

            let body = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            let template = template_key(sources.root(), &path);
            debug!(renderer = %name, template = %template, "registering template");

            raw.push((template.clone(), body));
            entries.insert(
                name.clone(),
                RendererEntry {
                    name,
                    template,
                    source: path,
                    kind,
                },
            );
        }

        let has_layout = entries
            .get(BASE_LAYOUT)
            .is_some_and(|e| e.kind == TemplateKind::Layout);
        if !has_layout {
            return Err(LoadError::MissingLayout {
                root: sources.root().to_path_buf(),
            });
        }

        // Keys end in `.html`, so tera's default autoescaping applies to all of them.
        let mut tera = Tera::default();
        tera.add_raw_templates(raw).map_err(LoadError::Parse)?;

        Ok(Self {
            tera,
            entries,
            globals: Context::new(),
        })
    }

    /// Make `value` available as `key` in every render.
    pub fn with_global<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.globals.insert(key, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<&RendererEntry> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Render the template registered as `name` with the fields of `data`
    /// (which must serialize to a map) on top of the globals.
    pub fn render<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        let entry = self.entries.get(name).ok_or_else(|| RenderError::NotFound {
            name: name.to_string(),
        })?;
        let failed = |source: tera::Error| RenderError::ExecutionFailed {
            name: name.to_string(),
            source,
        };

        let mut context = self.globals.clone();
        context.extend(Context::from_serialize(data).map_err(failed)?);

        self.tera.render(&entry.template, &context).map_err(failed)
    }
}
