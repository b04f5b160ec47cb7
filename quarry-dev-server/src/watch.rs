//! Polling change detection over template sources.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::SystemTime;

use quarry_core::TemplateSources;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Modified(PathBuf),
    Added(PathBuf),
    Removed(PathBuf),
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Modified(p) => write!(f, "modified {}", p.display()),
            Change::Added(p) => write!(f, "added {}", p.display()),
            Change::Removed(p) => write!(f, "removed {}", p.display()),
        }
    }
}

/// Finds sources touched after a watermark.
///
/// The set of files seen at the last successful rebuild is kept too, so a
/// deleted or newly created template counts as a change even when no
/// remaining file has a newer timestamp.
pub struct ChangeDetector {
    sources: TemplateSources,
    extra: Vec<PathBuf>,
    known: BTreeSet<PathBuf>,
    pending: Option<BTreeSet<PathBuf>>,
}

impl ChangeDetector {
    pub fn new(sources: TemplateSources, extra: Vec<PathBuf>) -> Self {
        let mut detector = Self {
            sources,
            extra,
            known: BTreeSet::new(),
            pending: None,
        };
        detector.known = detector.current();
        detector
    }

    fn current(&self) -> BTreeSet<PathBuf> {
        self.sources
            .paths()
            .into_iter()
            .chain(self.extra.iter().filter(|p| p.exists()).cloned())
            .collect()
    }

    /// First change since `watermark`, if any.
    pub fn poll(&mut self, watermark: SystemTime) -> Option<Change> {
        let current = self.current();

        let change = current
            .iter()
            .find(|path| {
                std::fs::metadata(path)
                    .and_then(|m| m.modified())
                    .map(|modified| modified > watermark)
                    .unwrap_or(false)
            })
            .map(|p| Change::Modified(p.clone()))
            .or_else(|| {
                current
                    .difference(&self.known)
                    .next()
                    .map(|p| Change::Added(p.clone()))
            })
            .or_else(|| {
                self.known
                    .difference(&current)
                    .next()
                    .map(|p| Change::Removed(p.clone()))
            });

        if let Some(change) = &change {
            debug!(%change, "source change");
        }
        self.pending = Some(current);
        change
    }

    /// Accept the file set from the last poll as the new baseline.
    pub fn commit(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.known = pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn theme() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        fs::write(dir.path().join("base.html"), "base").unwrap();
        fs::write(dir.path().join("components/hero.html"), "hero").unwrap();
        dir
    }

    #[test]
    fn test_no_change_before_watermark() {
        let dir = theme();
        let mut detector = ChangeDetector::new(TemplateSources::new(dir.path()), vec![]);

        let later = SystemTime::now() + Duration::from_secs(60);
        assert_eq!(detector.poll(later), None);
    }

    #[test]
    fn test_newer_file_is_modified() {
        let dir = theme();
        let mut detector = ChangeDetector::new(TemplateSources::new(dir.path()), vec![]);

        let earlier = SystemTime::now() - Duration::from_secs(60);
        assert!(matches!(detector.poll(earlier), Some(Change::Modified(_))));
    }

    #[test]
    fn test_removed_file_until_committed() {
        let dir = theme();
        let mut detector = ChangeDetector::new(TemplateSources::new(dir.path()), vec![]);
        let later = SystemTime::now() + Duration::from_secs(60);

        fs::remove_file(dir.path().join("components/hero.html")).unwrap();
        let removed = dir.path().join("components/hero.html");
        assert_eq!(detector.poll(later), Some(Change::Removed(removed.clone())));
        // A failed rebuild does not commit, so the removal is reported again
        assert_eq!(detector.poll(later), Some(Change::Removed(removed)));

        detector.commit();
        assert_eq!(detector.poll(later), None);
    }

    #[test]
    fn test_added_file() {
        let dir = theme();
        let mut detector = ChangeDetector::new(TemplateSources::new(dir.path()), vec![]);
        let later = SystemTime::now() + Duration::from_secs(60);

        fs::write(dir.path().join("components/features.html"), "features").unwrap();
        assert!(matches!(detector.poll(later), Some(Change::Added(_))));
    }

    #[test]
    fn test_extra_paths_are_watched() {
        let dir = theme();
        let styles = dir.path().join("globals.css");
        fs::write(&styles, "body {}").unwrap();

        let mut detector =
            ChangeDetector::new(TemplateSources::new(dir.path().join("empty")), vec![styles.clone()]);
        let earlier = SystemTime::now() - Duration::from_secs(60);

        let change = detector.poll(earlier);
        assert!(matches!(change, Some(Change::Modified(p)) if p == styles));
    }
}
