use crate::{
    grid::{GridConfig, GridError},
    markdown::{
        annotation::{self, AliasTable},
        elements::{Element, ElementContent, ElementKind, ListItem, TableData},
    },
};
use comrak::{
    nodes::{AstNode, ListType, NodeCodeBlock, NodeHeading, NodeValue},
    parse_document, Arena, Options,
};
use std::collections::HashMap;

/// Maps fenced code block languages to plugin-registered element tags.
///
/// Consulted by the element extractor only; the placement engine stays
/// type-agnostic and sizes registered tags through
/// [`SizeHints`](crate::layout::SizeHints).
#[derive(Clone, Debug, Default)]
pub struct CustomBlockRegistry {
    tags: HashMap<String, String>,
}

impl CustomBlockRegistry {
    pub fn register<L: Into<String>, T: Into<String>>(&mut self, language: L, tag: T) {
        self.tags.insert(language.into(), tag.into());
    }

    fn lookup(&self, language: &str) -> Option<&str> {
        self.tags.get(language).map(String::as_str)
    }
}

/// Turns one segment of markdown into elements.
///
/// Annotations found inline on headings, paragraphs, images, and videos are
/// extracted and validated here; node kinds this engine has no use for are
/// skipped rather than rejected.
pub(crate) struct ElementParser<'a> {
    pub(crate) aliases: &'a AliasTable,
    pub(crate) grid: &'a GridConfig,
    pub(crate) registry: &'a CustomBlockRegistry,
}

impl ElementParser<'_> {
    pub(crate) fn parse(&self, contents: &str) -> Result<Vec<Element>, GridError> {
        let arena = Arena::new();
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        let root = parse_document(&arena, contents, &options);
        let mut elements = Vec::new();
        for node in root.children() {
            self.parse_node(node, &mut elements)?;
        }
        Ok(elements)
    }

    fn parse_node<'a>(&self, node: &'a AstNode<'a>, elements: &mut Vec<Element>) -> Result<(), GridError> {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Heading(heading) => elements.push(self.parse_heading(heading, node)?),
            NodeValue::Paragraph => elements.extend(self.parse_paragraph(node)?),
            NodeValue::List(_) => elements.push(Self::parse_list_element(node)),
            NodeValue::Table(_) => elements.push(Self::parse_table(node)),
            NodeValue::CodeBlock(block) => elements.push(self.parse_code_block(block)),
            NodeValue::BlockQuote => elements.push(Self::parse_block_quote(node)),
            other => log::debug!("skipping unsupported markdown node: {other:?}"),
        };
        Ok(())
    }

    fn parse_heading<'a>(&self, heading: &NodeHeading, node: &'a AstNode<'a>) -> Result<Element, GridError> {
        let text = collect_text(node);
        let extraction = annotation::extract_grid_and_style(&text, self.aliases, self.grid)?;
        let mut element = Element::text(ElementKind::Heading, extraction.clean_text);
        element.level = Some(heading.level);
        element.position = extraction.position;
        element.style = extraction.style;
        Ok(element)
    }

    fn parse_paragraph<'a>(&self, node: &'a AstNode<'a>) -> Result<Vec<Element>, GridError> {
        let children: Vec<_> = node.children().collect();

        // A paragraph led by an image is an image element; the text after it
        // only carries annotations.
        if let Some(first) = children.first() {
            let data = first.data.borrow();
            if let NodeValue::Image(link) = &data.value {
                let alt = collect_text(first);
                let rest = collect_all_text(&children[1..]);
                let extraction = annotation::extract_grid_and_style(&rest, self.aliases, self.grid)?;
                let mut element = Element::text(ElementKind::Image, link.url.clone());
                element.position = extraction.position;
                element.style = extraction.style;
                element.alt_text = (!alt.is_empty()).then_some(alt);
                return Ok(vec![element]);
            }
        }

        // The `!v[alt](src)` video shorthand tokenizes as the literal text
        // "!v" followed by a link.
        if children.len() >= 2 {
            let first = children[0].data.borrow();
            let second = children[1].data.borrow();
            if let (NodeValue::Text(marker), NodeValue::Link(link)) = (&first.value, &second.value) {
                if marker == "!v" {
                    let alt = collect_text(children[1]);
                    let rest = collect_all_text(&children[2..]);
                    let extraction = annotation::extract_grid_and_style(&rest, self.aliases, self.grid)?;
                    let mut element = Element::text(ElementKind::Video, link.url.clone());
                    element.position = extraction.position;
                    element.style = extraction.style;
                    element.alt_text = (!alt.is_empty()).then_some(alt);
                    return Ok(vec![element]);
                }
            }
        }

        let text = collect_text(node);
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let extraction = annotation::extract_grid_and_style(&text, self.aliases, self.grid)?;
        if extraction.clean_text.is_empty() && extraction.position.is_none() && extraction.style.is_none() {
            return Ok(Vec::new());
        }
        let mut element = Element::text(ElementKind::Paragraph, extraction.clean_text);
        element.position = extraction.position;
        element.style = extraction.style;
        Ok(vec![element])
    }

    fn parse_list_element<'a>(node: &'a AstNode<'a>) -> Element {
        let items = Self::parse_list(node, 0);
        Element {
            kind: ElementKind::List,
            content: ElementContent::List(items),
            level: None,
            position: None,
            style: None,
            alt_text: None,
        }
    }

    fn parse_list<'a>(root: &'a AstNode<'a>, depth: u8) -> Vec<ListItem> {
        let mut items = Vec::new();
        for node in root.children() {
            let data = node.data.borrow();
            let NodeValue::Item(item) = &data.value else { continue };
            let ordered = matches!(item.list_type, ListType::Ordered);
            let mut text = String::new();
            let mut children = Vec::new();
            for child in node.children() {
                let child_data = child.data.borrow();
                match &child_data.value {
                    NodeValue::Paragraph if text.is_empty() => text = collect_text(child),
                    NodeValue::List(_) => children.extend(Self::parse_list(child, depth + 1)),
                    _ => (),
                }
            }
            items.push(ListItem { text, depth, ordered, children });
        }
        items
    }

    fn parse_table<'a>(node: &'a AstNode<'a>) -> Element {
        let mut headers = Vec::new();
        let mut rows = Vec::new();
        for row in node.children() {
            let data = row.data.borrow();
            let NodeValue::TableRow(_) = &data.value else { continue };
            let cells: Vec<String> = row.children().map(collect_text).collect();
            if headers.is_empty() {
                headers = cells;
            } else {
                rows.push(cells);
            }
        }
        Element {
            kind: ElementKind::Table,
            content: ElementContent::Table(TableData { headers, rows }),
            level: None,
            position: None,
            style: None,
            alt_text: None,
        }
    }

    fn parse_code_block(&self, block: &NodeCodeBlock) -> Element {
        let language = block.info.split_whitespace().next().unwrap_or("");
        let contents = block.literal.clone();
        if language == "mermaid" {
            return Element::text(ElementKind::Mermaid, contents);
        }
        if let Some(tag) = self.registry.lookup(language) {
            return Element::text(ElementKind::Custom(tag.into()), contents);
        }
        Element::text(ElementKind::Code, contents)
    }

    fn parse_block_quote<'a>(node: &'a AstNode<'a>) -> Element {
        let mut lines = Vec::new();
        for child in node.children() {
            let text = collect_text(child);
            if !text.is_empty() {
                lines.push(text);
            }
        }
        Element::text(ElementKind::Blockquote, lines.join("\n"))
    }
}

/// Flatten a node to plain text: styled spans keep their text, soft breaks
/// become spaces, hard breaks newlines, links and images their visible text.
fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text_into(node, &mut text);
    text
}

fn collect_all_text<'a>(nodes: &[&'a AstNode<'a>]) -> String {
    let mut text = String::new();
    for node in nodes {
        collect_text_into(node, &mut text);
    }
    text
}

fn collect_text_into<'a>(node: &'a AstNode<'a>, output: &mut String) {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak => output.push(' '),
        NodeValue::LineBreak => output.push('\n'),
        _ => {
            for child in node.children() {
                collect_text_into(child, output);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::GridPosition;

    fn parse_all(input: &str) -> Vec<Element> {
        let aliases = AliasTable::new();
        let grid = GridConfig::default();
        let registry = CustomBlockRegistry::default();
        ElementParser { aliases: &aliases, grid: &grid, registry: &registry }
            .parse(input)
            .expect("parsing failed")
    }

    fn parse_single(input: &str) -> Element {
        let mut elements = parse_all(input);
        assert_eq!(elements.len(), 1, "more than one element: {elements:?}");
        elements.remove(0)
    }

    #[test]
    fn heading_with_annotation() {
        let element = parse_single("# Welcome [1-12, 1] {.center}");
        assert_eq!(element.kind, ElementKind::Heading);
        assert_eq!(element.level, Some(1));
        assert_eq!(element.content.as_text(), Some("Welcome"));
        assert_eq!(element.position, Some(GridPosition::new(1, 12, 1, 1)));
        assert_eq!(element.style.unwrap().classes, vec!["center"]);
    }

    #[test]
    fn paragraph_flattens_inline_styles() {
        let element = parse_single("some **bold**, _italics_ and `inline code`");
        assert_eq!(element.kind, ElementKind::Paragraph);
        assert_eq!(element.content.as_text(), Some("some bold, italics and inline code"));
    }

    #[test]
    fn paragraph_with_annotation() {
        let element = parse_single("hello there [1-6, 3-4]");
        assert_eq!(element.content.as_text(), Some("hello there"));
        assert_eq!(element.position, Some(GridPosition::new(1, 6, 3, 4)));
    }

    #[test]
    fn image_paragraph() {
        let element = parse_single("![architecture](assets/arch.png) [7-12, 2-5]");
        assert_eq!(element.kind, ElementKind::Image);
        assert_eq!(element.content.as_text(), Some("assets/arch.png"));
        assert_eq!(element.alt_text.as_deref(), Some("architecture"));
        assert_eq!(element.position, Some(GridPosition::new(7, 12, 2, 5)));
    }

    #[test]
    fn video_paragraph() {
        let element = parse_single("!v[demo](movie.mp4) [1-6, 3-6]");
        assert_eq!(element.kind, ElementKind::Video);
        assert_eq!(element.content.as_text(), Some("movie.mp4"));
        assert_eq!(element.alt_text.as_deref(), Some("demo"));
        assert_eq!(element.position, Some(GridPosition::new(1, 6, 3, 6)));
    }

    #[test]
    fn nested_list() {
        let element = parse_single(
            r"
* One
    * Sub1
    * Sub2
* Two",
        );
        let items = element.content.as_list().expect("not a list");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "One");
        assert_eq!(items[0].depth, 0);
        assert!(!items[0].ordered);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[0].children[1].text, "Sub2");
        assert_eq!(items[0].children[1].depth, 1);
    }

    #[test]
    fn ordered_list() {
        let element = parse_single("1. first\n2. second\n");
        let items = element.content.as_list().expect("not a list");
        assert!(items.iter().all(|item| item.ordered));
    }

    #[test]
    fn table() {
        let element = parse_single(
            r"
| Name | Taste |
| ------ | ------ |
| Potato | Great |
| Carrot | Yuck |
",
        );
        let table = element.content.as_table().expect("not a table");
        assert_eq!(table.headers, vec!["Name", "Taste"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Carrot", "Yuck"]);
    }

    #[test]
    fn code_block() {
        let element = parse_single("```rust\nlet q = 42;\n```\n");
        assert_eq!(element.kind, ElementKind::Code);
        assert_eq!(element.content.as_text(), Some("let q = 42;\n"));
    }

    #[test]
    fn mermaid_block() {
        let element = parse_single("```mermaid\ngraph TD;\n```\n");
        assert_eq!(element.kind, ElementKind::Mermaid);
    }

    #[test]
    fn registered_language_becomes_custom_element() {
        let aliases = AliasTable::new();
        let grid = GridConfig::default();
        let mut registry = CustomBlockRegistry::default();
        registry.register("chart", "chart");
        let parser = ElementParser { aliases: &aliases, grid: &grid, registry: &registry };
        let elements = parser.parse("```chart\n1,2,3\n```\n").expect("parsing failed");
        assert_eq!(elements[0].kind, ElementKind::Custom("chart".into()));
    }

    #[test]
    fn block_quote() {
        let element = parse_single("> bar\n> foo\n");
        assert_eq!(element.kind, ElementKind::Blockquote);
        assert_eq!(element.content.as_text(), Some("bar foo"));
    }

    #[test]
    fn out_of_bounds_inline_annotation_fails() {
        let aliases = AliasTable::new();
        let grid = GridConfig::default();
        let registry = CustomBlockRegistry::default();
        let parser = ElementParser { aliases: &aliases, grid: &grid, registry: &registry };
        parser.parse("# Title [13, 5]").expect_err("out of bounds accepted");
    }

    #[test]
    fn thematic_break_is_skipped() {
        let elements = parse_all("hello\n\n***\n\nbye\n");
        assert_eq!(elements.len(), 2);
        assert!(elements.iter().all(|e| e.kind == ElementKind::Paragraph));
    }
}
