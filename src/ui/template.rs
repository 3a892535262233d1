//! HTML templates
//!
//! Templates are fetched by URL from a [`TemplateSource`] and split into
//! their top-level elements, which an application adopts into its target
//! surface. The splitter only tracks tag nesting; it is not an HTML parser
//! and assumes `>` does not appear inside attribute values.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

/// Response to a template fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateResponse {
    /// HTTP-like status, 200 on success
    pub status: u16,
    pub body: String,
}

impl TemplateResponse {
    pub const OK: u16 = 200;
    pub const NOT_FOUND: u16 = 404;

    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: Self::OK,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: Self::NOT_FOUND,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }
}

/// Where template content comes from
pub trait TemplateSource {
    fn fetch(&self, url: &str) -> io::Result<TemplateResponse>;
}

/// Templates read from a directory; URLs are relative paths below `root`
#[derive(Debug, Clone)]
pub struct FileTemplates {
    root: PathBuf,
}

impl FileTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.trim_start_matches("./"));
        // Keep lookups inside the root
        let escapes = relative
            .components()
            .any(|part| !matches!(part, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}

impl TemplateSource for FileTemplates {
    fn fetch(&self, url: &str) -> io::Result<TemplateResponse> {
        let Some(path) = self.resolve(url) else {
            return Ok(TemplateResponse::not_found());
        };

        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(TemplateResponse::ok(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(TemplateResponse::not_found()),
            Err(err) => Err(err),
        }
    }
}

/// Templates kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    templates: HashMap<String, String>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(url.into(), body.into());
        self
    }
}

impl TemplateSource for MemoryTemplates {
    fn fetch(&self, url: &str) -> io::Result<TemplateResponse> {
        Ok(self
            .templates
            .get(url)
            .map(|body| TemplateResponse::ok(body.as_str()))
            .unwrap_or_else(TemplateResponse::not_found))
    }
}

/// One top-level element of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNode {
    /// Lowercase tag name
    pub tag: String,
    /// The element's markup including its own tags
    pub markup: String,
}

impl TemplateNode {
    fn new(tag: &str, markup: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            markup: markup.to_owned(),
        }
    }
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Start tags that end an open `<p>`
const CLOSES_PARAGRAPH: [&str; 22] = [
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "section", "ul",
];

/// Open elements the start tag `tag` closes implicitly
fn implied_end_tags(tag: &str) -> &'static [&'static str] {
    match tag {
        "li" => &["li", "p"],
        "p" => &["p"],
        "dt" | "dd" => &["dt", "dd", "p"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "option" => &["option"],
        _ if CLOSES_PARAGRAPH.contains(&tag) => &["p"],
        _ => &[],
    }
}

/// Splits markup into its top-level elements
///
/// If the markup contains a `<body>`, only the body's children count.
/// Text between elements, comments and doctypes are dropped. End tags may
/// be omitted: a new `<li>`, `<p>`, `<td>` and the like closes an open
/// sibling, an end tag closes everything opened after its match, and an
/// element still open at the end of the input runs to the end. Stray end
/// tags are ignored.
pub fn parse_fragment(markup: &str) -> Vec<TemplateNode> {
    let markup = body_contents(markup).unwrap_or(markup);
    let mut nodes = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut element_start = 0;
    let mut cursor = 0;

    while let Some(offset) = markup[cursor..].find('<') {
        let start = cursor + offset;
        let rest = &markup[start..];

        if rest.starts_with("<!--") {
            cursor = rest
                .find("-->")
                .map_or(markup.len(), |end| start + end + "-->".len());
            continue;
        }

        let Some(close_offset) = rest.find('>') else {
            break;
        };
        let end = start + close_offset + 1;
        let inner = &markup[start + 1..end - 1];
        cursor = end;

        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }

        if let Some(closing) = inner.strip_prefix('/') {
            let tag = tag_name(closing).to_ascii_lowercase();
            let Some(position) = open.iter().rposition(|open_tag| *open_tag == tag) else {
                warn!(tag = %tag, "ignoring end tag without a matching start tag");
                continue;
            };
            open.truncate(position);
            if open.is_empty() {
                nodes.push(TemplateNode::new(&tag, &markup[element_start..end]));
            }
            continue;
        }

        let tag = tag_name(inner).to_ascii_lowercase();
        close_implied(&mut open, &tag, |closed| {
            nodes.push(TemplateNode::new(closed, markup[element_start..start].trim_end()));
        });

        let self_closing = inner.ends_with('/') || VOID_ELEMENTS.contains(&tag.as_str());
        match (open.is_empty(), self_closing) {
            (true, true) => nodes.push(TemplateNode::new(&tag, &markup[start..end])),
            (true, false) => {
                element_start = start;
                open.push(tag);
            }
            (false, true) => {}
            (false, false) => open.push(tag),
        }
    }

    if let Some(tag) = open.first() {
        nodes.push(TemplateNode::new(tag, markup[element_start..].trim_end()));
    }

    nodes
}

/// Pops the open elements a start tag `tag` ends implicitly
///
/// `on_top_level` is called with the tag of a top-level element closed this way.
fn close_implied(open: &mut Vec<String>, tag: &str, mut on_top_level: impl FnMut(&str)) {
    let closes = implied_end_tags(tag);
    while let Some(top) = open.last() {
        if !closes.contains(&top.as_str()) {
            break;
        }
        if let Some(closed) = open.pop() {
            if open.is_empty() {
                on_top_level(&closed);
            }
        }
    }
}

fn tag_name(inner: &str) -> &str {
    let inner = inner.trim_start();
    let end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    &inner[..end]
}

fn body_contents(markup: &str) -> Option<&str> {
    let lower = markup.to_ascii_lowercase();
    let open = lower.find("<body")?;
    let content_start = open + lower[open..].find('>')? + 1;
    let content_end = lower[content_start..]
        .find("</body")
        .map_or(markup.len(), |end| content_start + end);
    Some(&markup[content_start..content_end])
}
