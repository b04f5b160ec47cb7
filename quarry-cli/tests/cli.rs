use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::str::contains;

fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demo")
}

fn quarry(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quarry").unwrap();
    cmd.current_dir(dir).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn builds_demo_site() {
    let out = tempfile::tempdir().unwrap();

    quarry(&demo_dir())
        .env("QUARRY_BUILD__OUTPUT", out.path())
        .assert()
        .success()
        .stdout(contains("Built 3 pages"));

    for page in ["index.html", "about/index.html", "docs/index.html"] {
        assert!(out.path().join(page).is_file(), "{page} missing");
    }
}

#[test]
fn colliding_paths_fail_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("layouts")).unwrap();
    fs::write(dir.path().join("layouts/base.html"), "{{ page.title }}").unwrap();
    fs::write(
        dir.path().join("content.toml"),
        r#"
        [[pages]]
        title = "One"
        path = "index.html"

        [[pages]]
        title = "Two"
        path = "./index.html"
        "#,
    )
    .unwrap();

    quarry(dir.path())
        .assert()
        .failure()
        .stderr(contains("same output file"))
        .stderr(contains("index.html"));

    assert!(!dir.path().join("build/index.html").exists());
}

#[test]
fn missing_renderer_names_page_and_section() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("layouts")).unwrap();
    fs::write(dir.path().join("layouts/base.html"), "{{ page.title }}").unwrap();
    fs::write(
        dir.path().join("content.toml"),
        r#"
        [[pages]]
        title = "Home"
        path = "index.html"

        [[pages.sections]]
        renderer = "hero"
        title = "Hi"
        subtitle = "There"
        "#,
    )
    .unwrap();

    quarry(dir.path())
        .assert()
        .failure()
        .stderr(contains("page `index.html`: section 0 (`hero`)"))
        .stderr(contains("no renderer named `hero`"));
}
