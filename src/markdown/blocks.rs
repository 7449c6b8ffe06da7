use crate::{
    grid::{GridConfig, GridError, GridPosition},
    markdown::{
        annotation::{self, AliasTable},
        elements::{Element, Style},
        parse::{CustomBlockRegistry, ElementParser},
    },
};

/// Splits a slide's body into segments at block header lines and turns each
/// segment into elements.
///
/// A block header is a line whose first token is a grid annotation, e.g.
/// `[1-6, 2-8] {.card}`. It governs every element until the next header:
/// the region's rows are divided evenly among them, any leftovers go to the
/// last element, and the header's style fills in for elements without their
/// own. Content before the first header is left unpositioned for the
/// placement engine to deal with.
pub(crate) struct BlockSplitter<'a> {
    pub(crate) aliases: &'a AliasTable,
    pub(crate) grid: &'a GridConfig,
    pub(crate) registry: &'a CustomBlockRegistry,
}

impl BlockSplitter<'_> {
    pub(crate) fn parse(&self, content: &str) -> Result<Vec<Element>, GridError> {
        self.parse_region(content, None, None)
    }

    fn parse_region(
        &self,
        content: &str,
        region: Option<GridPosition>,
        inherited_style: Option<&Style>,
    ) -> Result<Vec<Element>, GridError> {
        let boundaries = self.boundaries(content)?;
        let mut elements = if boundaries.is_empty() {
            let parser =
                ElementParser { aliases: self.aliases, grid: self.grid, registry: self.registry };
            parser.parse(content)?
        } else {
            let mut elements = Vec::new();
            let leading = &content[..boundaries[0]];
            if !leading.trim().is_empty() {
                elements.extend(self.parse_region(leading, None, inherited_style)?);
            }
            let mut ends = boundaries[1..].to_vec();
            ends.push(content.len());
            for (&start, &end) in boundaries.iter().zip(&ends) {
                let segment = &content[start..end];
                let (header, body) = match segment.split_once('\n') {
                    Some((header, body)) => (header, body),
                    None => (segment, ""),
                };
                let header = header.trim_end_matches('\r');
                let Some((position, style)) =
                    annotation::parse_block_header(header, self.aliases, self.grid)?
                else {
                    continue;
                };
                let effective = style.as_ref().or(inherited_style);
                elements.extend(self.parse_region(body, Some(position), effective)?);
            }
            elements
        };
        if let Some(region) = region {
            distribute_rows(region, inherited_style, &mut elements);
        }
        Ok(elements)
    }

    /// Byte offsets of lines that open a block.
    fn boundaries(&self, content: &str) -> Result<Vec<usize>, GridError> {
        let mut offsets = Vec::new();
        let mut offset = 0;
        for line in content.split_inclusive('\n') {
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if annotation::parse_block_header(trimmed, self.aliases, self.grid)?.is_some() {
                offsets.push(offset);
            }
            offset += line.len();
        }
        Ok(offsets)
    }
}

/// Divide a region's rows evenly across its elements, in order. Each element
/// gets at least one row and the last one absorbs the remainder; inline
/// positions inside the region are overwritten. A region holding more
/// elements than rows produces inverted spans for the tail, which the
/// placement engine then rejects.
fn distribute_rows(region: GridPosition, style: Option<&Style>, elements: &mut [Element]) {
    if elements.is_empty() {
        return;
    }
    let total_rows = region.row_end - region.row_start + 1;
    let count = u16::try_from(elements.len()).unwrap_or(u16::MAX);
    let per_element = (total_rows / count).max(1);
    let last_index = elements.len() - 1;
    let mut current = region.row_start;
    for (index, element) in elements.iter_mut().enumerate() {
        let row_end = if index == last_index {
            region.row_end
        } else {
            (current + per_element - 1).min(region.row_end)
        };
        element.position =
            Some(GridPosition::new(region.col_start, region.col_end, current, row_end));
        if element.style.is_none() {
            element.style = style.cloned();
        }
        current = row_end + 1;
    }
}
