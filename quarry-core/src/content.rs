//! Typed site description: pages made of ordered, renderer-tagged sections.
//!
//! A section's `renderer` tag picks both the payload type and the template
//! that renders it. Payloads reject unknown fields, so a malformed content
//! file fails when it is loaded rather than halfway through a build.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Output location relative to the output root, e.g. `about/index.html`.
    /// A trailing `/` means `<path>/index.html`.
    pub path: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Page {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            path: path.into(),
            sections: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "renderer", rename_all = "snake_case")]
pub enum Section {
    Hero(HeroData),
    TextBlock(TextBlockData),
    Features(FeaturesData),
    Markdown(MarkdownData),
    RawHtml(RawHtmlData),
}

impl Section {
    /// Name of the template this section is dispatched to.
    pub fn renderer_name(&self) -> &'static str {
        match self {
            Section::Hero(_) => "hero",
            Section::TextBlock(_) => "text_block",
            Section::Features(_) => "features",
            Section::Markdown(_) => "markdown",
            Section::RawHtml(_) => "raw_html",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeroData {
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub action: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TextBlockData {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesData {
    #[serde(default)]
    pub heading: Option<String>,
    pub items: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MarkdownData {
    pub source: String,
}

/// Trusted markup. Templates must opt in with `| safe` to emit it unescaped.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawHtmlData {
    pub html: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContentFile {
    #[serde(default)]
    pages: Vec<Page>,
}

/// Parse pages from a TOML string.
pub fn parse(source: &str) -> Result<Vec<Page>, toml::de::Error> {
    let file: ContentFile = toml::from_str(source)?;
    Ok(file.pages)
}

/// Load pages from a TOML content file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Page>, ContentError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&source).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Content used when a project has no content file yet.
pub fn starter_site() -> Vec<Page> {
    vec![
        Page::new("Home", "index.html")
            .description("Welcome to my new static site.")
            .section(Section::Hero(HeroData {
                title: "Welcome to My Awesome Site".into(),
                subtitle: "Built with Rust and Tailwind CSS".into(),
                action: Some(Link {
                    text: "About".into(),
                    href: "/about/".into(),
                }),
            }))
            .section(Section::Features(FeaturesData {
                heading: Some("Why Quarry".into()),
                items: vec![
                    Feature {
                        title: "Typed sections".into(),
                        description: "Every section is checked when content loads.".into(),
                    },
                    Feature {
                        title: "Fast rebuilds".into(),
                        description: "Edit a template and the dev server picks it up.".into(),
                    },
                ],
            })),
        Page::new("About", "about/index.html")
            .description("What this site is about.")
            .section(Section::TextBlock(TextBlockData {
                heading: "About".into(),
                body: "This site is assembled from reusable sections.".into(),
            })),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_sections() {
        let pages = parse(
            r#"
            [[pages]]
            title = "Home"
            path = "index.html"

            [[pages.sections]]
            renderer = "hero"
            title = "Hello"
            subtitle = "World"

            [[pages.sections]]
            renderer = "text_block"
            heading = "More"
            body = "Text"
            "#,
        )
        .unwrap();

        assert_eq!(pages.len(), 1);
        let names: Vec<_> = pages[0].sections.iter().map(Section::renderer_name).collect();
        assert_eq!(names, ["hero", "text_block"]);
        assert_eq!(pages[0].description, "");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        // `heading` belongs to text_block, not hero
        let err = parse(
            r#"
            [[pages]]
            title = "Home"
            path = "index.html"

            [[pages.sections]]
            renderer = "hero"
            heading = "Hello"
            "#,
        );
        assert!(err.is_err());

        let unknown = parse(
            r#"
            [[pages]]
            title = "Home"
            path = "index.html"

            [[pages.sections]]
            renderer = "carousel"
            "#,
        );
        assert!(unknown.is_err());

        // Every hero field present, plus one it does not have
        let extra = parse(
            r#"
            [[pages]]
            title = "Home"
            path = "index.html"

            [[pages.sections]]
            renderer = "hero"
            title = "Hello"
            subtitle = "World"
            extra = "x"
            "#,
        )
        .unwrap_err();
        assert!(extra.to_string().contains("unknown field `extra`"), "{extra}");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.toml");
        std::fs::write(&path, "[[pages]]\ntitle = 1\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
        assert!(err.to_string().contains("content.toml"));
    }

    #[test]
    fn test_starter_site_paths_are_unique() {
        let pages = starter_site();
        let mut paths: Vec<_> = pages.iter().map(|p| p.path.as_str()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), pages.len());
    }
}
