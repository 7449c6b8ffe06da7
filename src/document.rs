use crate::{
    grid::{GridConfig, GridError},
    markdown::{
        annotation::AliasTable, blocks::BlockSplitter, elements::Element,
        parse::CustomBlockRegistry,
    },
};
use serde::Deserialize;
use std::collections::HashMap;

/// Document or slide front matter.
///
/// Unknown keys are ignored so that other layers can stash their own
/// concerns in the same block.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentMetadata {
    /// The document title.
    pub title: Option<String>,

    /// The grid dimensions as a `<cols>x<rows>` string.
    pub grid: Option<String>,

    /// Named regions usable in place of explicit grid references.
    pub aliases: HashMap<String, String>,
}

/// A parsed document: front matter plus its slides.
#[derive(Clone, Debug)]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub slides: Vec<Slide>,
}

/// One slide's metadata and elements, in source order.
#[derive(Clone, Debug)]
pub struct Slide {
    pub metadata: DocumentMetadata,
    pub elements: Vec<Element>,
}

/// Parses annotated markdown documents into slides.
#[derive(Clone, Debug, Default)]
pub struct DocumentParser {
    registry: CustomBlockRegistry,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that maps registered code block languages to custom elements.
    pub fn with_registry(registry: CustomBlockRegistry) -> Self {
        Self { registry }
    }

    pub fn parse(&self, contents: &str) -> Result<Document, GridError> {
        let (metadata, body) = parse_frontmatter(contents);
        let grid = metadata.grid.as_deref().map(GridConfig::parse).unwrap_or_default();
        let mut slides = Vec::new();
        for content in split_slides(body) {
            slides.push(self.parse_slide(&content, &metadata, grid)?);
        }
        log::debug!("parsed document with {} slide(s) on a {grid} grid", slides.len());
        Ok(Document { metadata, slides })
    }

    fn parse_slide(
        &self,
        content: &str,
        document: &DocumentMetadata,
        document_grid: GridConfig,
    ) -> Result<Slide, GridError> {
        let (metadata, body) = parse_frontmatter(content);
        let mut aliases: AliasTable = document.aliases.clone();
        aliases.extend(metadata.aliases.clone());
        let grid = metadata.grid.as_deref().map(GridConfig::parse).unwrap_or(document_grid);
        let splitter = BlockSplitter { aliases: &aliases, grid: &grid, registry: &self.registry };
        let elements = splitter.parse(body)?;
        Ok(Slide { metadata, elements })
    }
}

/// Parse a document with a default, plugin-free parser.
pub fn parse_document(contents: &str) -> Result<Document, GridError> {
    DocumentParser::new().parse(contents)
}

fn parse_frontmatter(contents: &str) -> (DocumentMetadata, &str) {
    let Some((yaml, body)) = split_frontmatter(contents) else {
        return (DocumentMetadata::default(), contents);
    };
    if yaml.trim().is_empty() {
        return (DocumentMetadata::default(), body);
    }
    match serde_yaml::from_str(yaml) {
        Ok(metadata) => (metadata, body),
        Err(e) => {
            // Not usable as front matter; leave the document untouched so
            // the delimiters act as slide breaks instead.
            log::warn!("ignoring malformed front matter: {e}");
            (DocumentMetadata::default(), contents)
        }
    }
}

/// Split a `---` fenced front matter block off the start of the input.
fn split_frontmatter(contents: &str) -> Option<(&str, &str)> {
    let first_line_end = contents.find('\n')?;
    if contents[..first_line_end].trim_end() != "---" {
        return None;
    }
    let yaml_start = first_line_end + 1;
    let mut offset = yaml_start;
    for line in contents[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &contents[yaml_start..offset];
            let body = &contents[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Split the body into slides at `---` delimiter lines. Blank slides are
/// dropped.
fn split_slides(body: &str) -> Vec<String> {
    let mut slides = Vec::new();
    let mut current = String::new();
    for line in body.lines() {
        let is_delimiter =
            line.strip_prefix("---").is_some_and(|rest| rest.trim().is_empty());
        if is_delimiter {
            push_slide(&mut slides, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_slide(&mut slides, &mut current);
    slides
}

fn push_slide(slides: &mut Vec<String>, current: &mut String) {
    let slide = current.trim();
    if !slide.is_empty() {
        slides.push(slide.to_string());
    }
    current.clear();
}
