use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

/// Convert markdown to HTML, highlighting fenced code blocks.
///
/// The result is trusted markup: it is handed to the `markdown` template,
/// which emits it with `| safe`.
pub fn to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::all());

    let mut events = Vec::new();
    let mut code: Option<(String, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                code = Some((lang.to_string(), String::new()));
            }
            Event::End(TagEnd::CodeBlock) if code.is_some() => {
                if let Some((lang, buf)) = code.take() {
                    events.push(Event::Html(highlight(&lang, &buf).into()));
                }
            }
            event => match code.as_mut() {
                // Only text survives inside a fenced block
                Some((_, buf)) => {
                    if let Event::Text(text) = event {
                        buf.push_str(&text);
                    }
                }
                None => events.push(event),
            },
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

fn highlight(lang: &str, code: &str) -> String {
    let plain = || format!("<pre><code>{}</code></pre>", html_escape::encode_text(code));

    let syntax = SYNTAX_SET.find_syntax_by_token(lang).or_else(|| match lang {
        "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
        _ => None,
    });
    let (Some(syntax), Some(theme)) = (syntax, THEME_SET.themes.get(CODE_THEME)) else {
        return plain();
    };

    highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme).unwrap_or_else(|_| plain())
}
