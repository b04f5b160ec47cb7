use serde::Serialize;
use thiserror::Error;

use crate::content::{Page, Section};
use crate::markdown;
use crate::registry::{BASE_LAYOUT, Registry, RenderError};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("page `{page}`: section {index} (`{renderer}`) failed to render")]
    Section {
        page: String,
        index: usize,
        renderer: String,
        #[source]
        source: RenderError,
    },
    #[error("page `{page}`: layout `base` failed to render")]
    Layout {
        page: String,
        #[source]
        source: RenderError,
    },
}

#[derive(Serialize)]
struct PageMeta<'a> {
    title: &'a str,
    description: &'a str,
    path: &'a str,
}

#[derive(Serialize)]
struct LayoutContext<'a> {
    page: PageMeta<'a>,
    /// Rendered fragments in declaration order. The layout emits them with
    /// `| safe`; they were escaped when their own templates ran.
    sections: Vec<String>,
}

#[derive(Serialize)]
struct MarkdownView {
    html: String,
}

/// Dispatch one section to the renderer its tag names.
pub fn render_section(section: &Section, registry: &Registry) -> Result<String, RenderError> {
    let name = section.renderer_name();
    match section {
        Section::Hero(data) => registry.render(name, data),
        Section::TextBlock(data) => registry.render(name, data),
        Section::Features(data) => registry.render(name, data),
        Section::Markdown(data) => registry.render(
            name,
            &MarkdownView {
                html: markdown::to_html(&data.source),
            },
        ),
        Section::RawHtml(data) => registry.render(name, data),
    }
}

/// Render every section of `page` in order, then place them in the base layout.
pub fn compile(page: &Page, registry: &Registry) -> Result<String, CompileError> {
    let sections = page
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            render_section(section, registry).map_err(|source| CompileError::Section {
                page: page.path.clone(),
                index,
                renderer: section.renderer_name().to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let context = LayoutContext {
        page: PageMeta {
            title: &page.title,
            description: &page.description,
            path: &page.path,
        },
        sections,
    };

    registry
        .render(BASE_LAYOUT, &context)
        .map_err(|source| CompileError::Layout {
            page: page.path.clone(),
            source,
        })
}
