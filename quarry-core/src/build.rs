//! Writes every page of a site into the output tree.
//!
//! All checks that can fail without touching the disk (path shape, path
//! collisions, unknown renderers) run before the first write. Pages are then
//! compiled and written one at a time, in content order, each through a
//! temp-file-and-rename so a concurrent reader never sees a partial file.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use crate::compiler::{CompileError, compile};
use crate::content::Page;
use crate::registry::{Registry, RenderError};

const DIRECTORY_INDEX: &str = "index.html";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid page path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("pages resolve to the same output file: {}", CollisionList(.0))]
    PathCollision(Vec<Collision>),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pages (by declared path) that resolve to the same destination, or where
/// one page's file would have to be a directory for the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub destination: PathBuf,
    pub pages: Vec<String>,
}

struct CollisionList<'a>(&'a [Collision]);

impl fmt::Display for CollisionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, collision) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(
                f,
                "{} <- {}",
                collision.destination.display(),
                collision.pages.join(", ")
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Written files, in content order
    pub pages: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Resolve a declared page path to a location relative to the output root.
pub fn relative_destination(path: &str) -> Result<PathBuf, BuildError> {
    let invalid = |reason| BuildError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain `..`")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the output root"));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(invalid("must name a file"));
    }
    if path.ends_with('/') || path.ends_with('\\') {
        relative.push(DIRECTORY_INDEX);
    }

    Ok(relative)
}

/// Validate the whole site and return each page's destination.
fn plan(pages: &[Page], registry: &Registry, output_root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut destinations = Vec::with_capacity(pages.len());
    let mut claimed: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();

    for page in pages {
        let relative = relative_destination(&page.path)?;
        claimed
            .entry(relative.clone())
            .or_default()
            .push(page.path.clone());
        destinations.push(output_root.join(relative));
    }

    let mut collisions: Vec<Collision> = claimed
        .iter()
        .filter(|(_, pages)| pages.len() > 1)
        .map(|(destination, pages)| Collision {
            destination: destination.clone(),
            pages: pages.clone(),
        })
        .collect();

    // A page file cannot also be the directory of another page
    for (destination, nested) in &claimed {
        for ancestor in destination.ancestors().skip(1) {
            if let Some(owners) = claimed.get(ancestor) {
                collisions.push(Collision {
                    destination: ancestor.to_path_buf(),
                    pages: owners.iter().chain(nested).cloned().collect(),
                });
            }
        }
    }
    if !collisions.is_empty() {
        return Err(BuildError::PathCollision(collisions));
    }

    for page in pages {
        for (index, section) in page.sections.iter().enumerate() {
            let name = section.renderer_name();
            if !registry.contains(name) {
                return Err(CompileError::Section {
                    page: page.path.clone(),
                    index,
                    renderer: name.to_string(),
                    source: RenderError::NotFound {
                        name: name.to_string(),
                    },
                }
                .into());
            }
        }
    }

    Ok(destinations)
}

/// Build every page into `output_root`.
pub fn build(pages: &[Page], registry: &Registry, output_root: &Path) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let destinations = plan(pages, registry, output_root)?;

    fs::create_dir_all(output_root).map_err(|source| BuildError::CreateDir {
        path: output_root.to_path_buf(),
        source,
    })?;

    let mut report = BuildReport::default();
    for (page, destination) in pages.iter().zip(destinations) {
        info!(page = %page.path, "generating");

        let html = compile(page, registry)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_atomic(&destination, html.as_bytes()).map_err(|source| BuildError::Write {
            path: destination.clone(),
            source,
        })?;

        report.pages.push(destination);
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let temp = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let result = fs::write(&temp, contents).and_then(|()| fs::rename(&temp, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}
