//! A grid layout and placement engine for annotated markdown slide decks.
//!
//! Markdown elements carry optional grid annotations (`# Title [1-12, 1]
//! {.center}`) that pin them to regions of an `NxM` grid; everything left
//! unannotated is packed automatically around them. The output is a
//! deterministic, draw-ordered list of placed elements that a rendering
//! layer can project onto any canvas.
//!
//! ```
//! use slidegrid::{layout, parse_document};
//!
//! let document = parse_document("# Welcome [1-12, 1]\n\nSome text\n")?;
//! let layouts = layout::layout_document(&document, &layout::SizeHints::default())?;
//! assert_eq!(layouts.len(), 1);
//! # Ok::<_, slidegrid::GridError>(())
//! ```

pub mod document;
pub mod grid;
pub mod layout;
pub mod markdown;

pub use document::{parse_document, Document, DocumentMetadata, DocumentParser, Slide};
pub use grid::{GridConfig, GridError, GridErrorKind, GridPosition};
pub use layout::{layout_document, layout_slide, place, SizeHints, SlideLayout};
pub use markdown::elements::{Element, ElementKind, PlacedElement, Style};
pub use markdown::parse::CustomBlockRegistry;
