use crate::markdown::elements::{Element, ElementContent, ElementKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;

const FALLBACK_HEIGHT: u16 = 2;
const FALLBACK_WIDTH_RATIO: f64 = 1.0;
const MAX_CONTENT_HEIGHT: u16 = 6;

static DEFAULT_HEIGHTS: Lazy<HashMap<ElementKind, u16>> = Lazy::new(|| {
    use ElementKind::*;
    HashMap::from([
        (Heading, 1),
        (Paragraph, 2),
        (List, 3),
        (Image, 4),
        (Video, 4),
        (Table, 3),
        (Code, 3),
        (Blockquote, 2),
        (Mermaid, 4),
    ])
});

static DEFAULT_WIDTH_RATIOS: Lazy<HashMap<ElementKind, f64>> = Lazy::new(|| {
    use ElementKind::*;
    HashMap::from([(List, 0.75), (Image, 0.5), (Code, 0.8), (Blockquote, 0.6)])
});

/// The size estimates the placement engine uses for elements without an
/// explicit position.
///
/// Heights are in grid rows; widths are a ratio of the grid's columns.
/// Plugins register estimates for their custom element tags; kinds with no
/// entry estimate as a 2-row, full-width block.
#[derive(Clone, Debug)]
pub struct SizeHints {
    heights: HashMap<ElementKind, u16>,
    width_ratios: HashMap<ElementKind, f64>,
}

impl SizeHints {
    pub fn register(&mut self, kind: ElementKind, height: u16, width_ratio: f64) {
        self.heights.insert(kind.clone(), height);
        self.width_ratios.insert(kind, width_ratio);
    }

    /// Estimated (height, width) in grid cells for one element.
    pub(crate) fn estimate(&self, element: &Element, cols: u16) -> (u16, u16) {
        let height = match &element.content {
            // Lists grow with their item count, tables with their row count,
            // both capped so one element cannot claim a whole column.
            ElementContent::List(items) => {
                let items = u16::try_from(items.len()).unwrap_or(u16::MAX);
                (items.div_ceil(2) + 1).min(MAX_CONTENT_HEIGHT)
            }
            ElementContent::Table(table) => {
                let rows = u16::try_from(table.rows.len()).unwrap_or(u16::MAX);
                (rows + 1).min(MAX_CONTENT_HEIGHT)
            }
            ElementContent::Text(_) => {
                self.heights.get(&element.kind).copied().unwrap_or(FALLBACK_HEIGHT)
            }
        };
        let ratio =
            self.width_ratios.get(&element.kind).copied().unwrap_or(FALLBACK_WIDTH_RATIO);
        let width = ((f64::from(cols) * ratio).floor() as u16).max(1);
        (height, width)
    }
}

impl Default for SizeHints {
    fn default() -> Self {
        Self { heights: DEFAULT_HEIGHTS.clone(), width_ratios: DEFAULT_WIDTH_RATIOS.clone() }
    }
}
