use std::fs;
use std::path::{Path, PathBuf};

use quarry_core::config::Config;
use quarry_core::content::{self, HeroData, TextBlockData};
use quarry_core::{Page, Registry, Section, TemplateSources, build};

fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demo")
}

fn demo_config() -> Config {
    Config::read(demo_dir().join("quarry.toml")).unwrap()
}

fn demo_registry() -> Registry {
    let config = demo_config();
    Registry::load(&TemplateSources::new(demo_dir().join(&config.build.templates)))
        .unwrap()
        .with_global("site", &config.site)
}

fn html_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

#[test]
fn demo_config_points_at_demo_sources() {
    let config = demo_config();
    assert_eq!(config.site.title, "Quarry Demo");
    assert!(demo_dir().join(&config.build.templates).join("base.html").is_file());
    assert!(demo_dir().join(&config.build.content).is_file());
    assert!(!config.assets.enable);
}

#[test]
fn demo_content_builds_every_page() {
    let pages = content::load(demo_dir().join(demo_config().build.content)).unwrap();
    let out = tempfile::tempdir().unwrap();

    let report = build(&pages, &demo_registry(), out.path()).unwrap();

    assert_eq!(report.len(), pages.len());
    assert_eq!(
        html_files(out.path()),
        [
            PathBuf::from("about/index.html"),
            PathBuf::from("docs/index.html"),
            PathBuf::from("index.html"),
        ]
    );
    for file in &report.pages {
        assert!(fs::metadata(file).unwrap().len() > 0);
    }

    let home = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(home.contains("Quarry Demo"));

    let docs = fs::read_to_string(out.path().join("docs/index.html")).unwrap();
    assert!(docs.contains("<h2>Getting started</h2>"));
    assert!(docs.contains("Last section, injected as-is."));
    assert!(docs.find("Getting started") < docs.find("Last section"));
}

#[test]
fn two_page_site_keeps_sections_apart() {
    let pages = vec![
        Page::new("Home", "index.html").section(Section::Hero(HeroData {
            title: "Welcome".into(),
            subtitle: "The hero subtitle".into(),
            action: None,
        })),
        Page::new("About", "about/index.html").section(Section::TextBlock(TextBlockData {
            heading: "About the team".into(),
            body: "We make sites.".into(),
        })),
    ];
    let out = tempfile::tempdir().unwrap();

    build(&pages, &demo_registry(), out.path()).unwrap();

    assert_eq!(
        html_files(out.path()),
        [PathBuf::from("about/index.html"), PathBuf::from("index.html")]
    );
    let about = fs::read_to_string(out.path().join("about/index.html")).unwrap();
    assert!(about.contains("About the team"));
    assert!(!about.contains("The hero subtitle"));
}

#[test]
fn starter_site_builds_with_demo_theme() {
    let out = tempfile::tempdir().unwrap();
    let report = build(&content::starter_site(), &demo_registry(), out.path()).unwrap();
    assert_eq!(report.len(), 2);
}

#[test]
fn identical_sections_render_identically() {
    let registry = demo_registry();
    let section = Section::Hero(HeroData {
        title: "Same".into(),
        subtitle: "Every time".into(),
        action: None,
    });

    let first = quarry_core::compiler::render_section(&section, &registry).unwrap();
    let second = quarry_core::compiler::render_section(&section, &registry).unwrap();
    assert_eq!(first, second);
}
