use crate::grid::GridPosition;
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// The type tag of a slide element.
///
/// The fixed set mirrors the markdown constructs the parser understands;
/// `Custom` carries plugin-registered tags. Tags round-trip through their
/// lowercase names.
#[derive(Clone, Debug, Display, EnumString, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    Heading,
    Paragraph,
    List,
    Image,
    Video,
    Table,
    Code,
    Blockquote,
    Mermaid,

    /// A plugin-registered tag.
    #[strum(default)]
    Custom(String),
}

/// The payload of an element, keyed by its kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementContent {
    /// Plain text: heading/paragraph text, an image or video source, code or
    /// diagram contents.
    Text(String),

    /// The items of a list.
    List(Vec<ListItem>),

    /// Tabular data.
    Table(TableData),
}

impl ElementContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ListItem]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableData> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

/// A list item, possibly with nested children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,

    /// Nesting depth, increasing by one per nested list level.
    pub depth: u8,

    pub ordered: bool,
    pub children: Vec<ListItem>,
}

/// A table: a header row plus zero or more data rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Style directives attached to an element via a `{...}` annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// `.class` directives, in source order.
    pub classes: Vec<String>,

    /// `key=value` / `key:value` directives not claimed by the animation
    /// keys.
    pub properties: BTreeMap<String, String>,

    pub animation: Option<AnimationSpec>,
}

/// Animation directives extracted from a style annotation.
///
/// Durations and delays are given in seconds in the source text and stored
/// here in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationSpec {
    pub kind: Option<String>,
    pub duration_ms: Option<u64>,
    pub delay_ms: Option<u64>,
    pub direction: Option<String>,
    pub trigger: Option<String>,
    pub repeat: Option<u32>,
    pub speed: Option<String>,
}

impl AnimationSpec {
    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A slide element before placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub content: ElementContent,

    /// Heading depth, for headings.
    pub level: Option<u8>,

    /// The position spelled out in the source text, if any. Elements without
    /// one are positioned by the automatic placer.
    pub position: Option<GridPosition>,

    pub style: Option<Style>,

    /// Alternative text, for images and videos.
    pub alt_text: Option<String>,
}

impl Element {
    pub(crate) fn text(kind: ElementKind, content: String) -> Self {
        Self { kind, content: ElementContent::Text(content), level: None, position: None, style: None, alt_text: None }
    }
}

/// An element with its resolved grid position.
///
/// This is the sole unit handed downstream: renderers consume the placed
/// sequence in order and never re-derive positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedElement {
    pub kind: ElementKind,
    pub content: ElementContent,
    pub level: Option<u8>,
    pub position: GridPosition,
    pub style: Option<Style>,
    pub alt_text: Option<String>,
}

impl PlacedElement {
    pub(crate) fn new(element: Element, position: GridPosition) -> Self {
        let Element { kind, content, level, style, alt_text, .. } = element;
        Self { kind, content, level, position, style, alt_text }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_names_round_trip() {
        assert_eq!(ElementKind::Blockquote.to_string(), "blockquote");
        assert_eq!(ElementKind::from_str("table").unwrap(), ElementKind::Table);
        assert_eq!(ElementKind::from_str("chart").unwrap(), ElementKind::Custom("chart".into()));
        assert_eq!(ElementKind::Custom("chart".into()).to_string(), "chart");
    }

    #[test]
    fn content_accessors() {
        let content = ElementContent::Text("hello".into());
        assert_eq!(content.as_text(), Some("hello"));
        assert!(content.as_list().is_none());
        assert!(content.as_table().is_none());
    }
}
