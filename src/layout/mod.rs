pub(crate) mod hints;
pub(crate) mod projection;

pub use hints::SizeHints;
pub use projection::{project, CanvasSize, Rect, DEFAULT_MARGIN};

use crate::{
    document::{Document, DocumentMetadata, Slide},
    grid::{map::GridMap, GridConfig, GridError, GridPosition},
    markdown::elements::{Element, PlacedElement},
};

/// The result of laying out one slide: its elements in draw order, plus a
/// cell map usable for occupancy diagnostics.
#[derive(Clone, Debug)]
pub struct SlideLayout {
    pub elements: Vec<PlacedElement>,
    pub grid_map: GridMap,
}

/// Lay out every slide in a document.
pub fn layout_document(
    document: &Document,
    hints: &SizeHints,
) -> Result<Vec<SlideLayout>, GridError> {
    let mut layouts = Vec::new();
    for (index, slide) in document.slides.iter().enumerate() {
        layouts.push(layout(slide, &document.metadata, hints, Some(index))?);
    }
    Ok(layouts)
}

/// Lay out a single slide against its document's metadata.
pub fn layout_slide(
    slide: &Slide,
    document: &DocumentMetadata,
    hints: &SizeHints,
) -> Result<SlideLayout, GridError> {
    layout(slide, document, hints, None)
}

fn layout(
    slide: &Slide,
    document: &DocumentMetadata,
    hints: &SizeHints,
    index: Option<usize>,
) -> Result<SlideLayout, GridError> {
    let grid = slide
        .metadata
        .grid
        .as_deref()
        .or(document.grid.as_deref())
        .map(GridConfig::parse)
        .unwrap_or_default();
    let elements = place(slide.elements.clone(), &grid, hints, index)?;
    let grid_map = GridMap::from_placed(&elements, &grid);
    Ok(SlideLayout { elements, grid_map })
}

/// Place a slide's elements on the grid.
///
/// Explicitly positioned elements are validated and written first, smallest
/// area first; overlaps between them are permitted. The rest are packed
/// first-fit in row-major order using the size hints, shrinking width then
/// height down to a single cell before giving up with [`Unplaceable`].
/// The output is sorted by (row, column, area), which fixes the draw order
/// for equal inputs.
///
/// [`Unplaceable`]: crate::grid::GridErrorKind::Unplaceable
pub fn place(
    elements: Vec<Element>,
    grid: &GridConfig,
    hints: &SizeHints,
    slide: Option<usize>,
) -> Result<Vec<PlacedElement>, GridError> {
    let mut map = GridMap::new(grid.cols, grid.rows);
    let (explicit, implicit): (Vec<_>, Vec<_>) =
        elements.into_iter().partition(|element| element.position.is_some());
    log::trace!(
        "placing {} explicit and {} implicit element(s) on a {grid} grid",
        explicit.len(),
        implicit.len()
    );
    let mut placed = Vec::new();

    let mut explicit = explicit;
    explicit.sort_by_key(|element| element.position.map(|p| p.area()).unwrap_or(0));
    for element in explicit {
        let Some(position) = element.position else { continue };
        position.validate(grid)?;
        map.place(&position, placed.len());
        placed.push(PlacedElement::new(element, position));
    }

    let mut sized: Vec<_> = implicit
        .into_iter()
        .map(|element| {
            let (height, width) = hints.estimate(&element, grid.cols);
            (element, height, width)
        })
        .collect();
    sized.sort_by(|a, b| {
        let area = |(_, h, w): &(Element, u16, u16)| u32::from(*h) * u32::from(*w);
        area(b).cmp(&area(a))
    });
    for (element, height, width) in sized {
        let Some(position) = find_slot(&map, grid, width, height) else {
            return Err(GridError::unplaceable(element.kind, slide));
        };
        map.place(&position, placed.len());
        placed.push(PlacedElement::new(element, position));
    }

    placed.sort_by_key(|element| {
        (element.position.row_start, element.position.col_start, element.position.area())
    });
    Ok(placed)
}

/// Find a free rectangle, shrinking the estimate if nothing fits: width from
/// the estimate down to 1 in the outer loop, height in the inner one, so a
/// narrower slot is preferred over a shorter one.
fn find_slot(map: &GridMap, grid: &GridConfig, width: u16, height: u16) -> Option<GridPosition> {
    let width = width.clamp(1, grid.cols);
    let height = height.clamp(1, grid.rows);
    for width in (1..=width).rev() {
        for height in (1..=height).rev() {
            if let Some(position) = first_fit(map, grid, width, height) {
                return Some(position);
            }
        }
    }
    None
}

/// Row-major scan for the first fully free `width`×`height` rectangle.
fn first_fit(map: &GridMap, grid: &GridConfig, width: u16, height: u16) -> Option<GridPosition> {
    for row in 1..=grid.rows - height + 1 {
        for col in 1..=grid.cols - width + 1 {
            let position = GridPosition::new(col, col + width - 1, row, row + height - 1);
            if map.is_area_available(&position) {
                return Some(position);
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        grid::GridErrorKind,
        markdown::elements::{ElementContent, ElementKind},
    };

    fn element(kind: ElementKind) -> Element {
        Element::text(kind, "contents".into())
    }

    fn positioned(kind: ElementKind, position: GridPosition) -> Element {
        let mut element = element(kind);
        element.position = Some(position);
        element
    }

    fn place_all(elements: Vec<Element>) -> Vec<PlacedElement> {
        place(elements, &GridConfig::default(), &SizeHints::default(), None)
            .expect("placement failed")
    }

    #[test]
    fn no_elements_is_fine() {
        assert!(place_all(vec![]).is_empty());
    }

    #[test]
    fn explicit_positions_are_kept_verbatim() {
        let position = GridPosition::new(3, 8, 2, 5);
        let placed = place_all(vec![positioned(ElementKind::Image, position)]);
        assert_eq!(placed[0].position, position);
    }

    #[test]
    fn explicit_positions_may_overlap() {
        let placed = place_all(vec![
            positioned(ElementKind::Image, GridPosition::new(1, 12, 1, 9)),
            positioned(ElementKind::Heading, GridPosition::new(1, 6, 1, 2)),
        ]);
        assert_eq!(placed.len(), 2);
        // Equal (row, col) keys, so the smaller area draws first.
        assert_eq!(placed[0].kind, ElementKind::Heading);
    }

    #[test]
    fn invalid_explicit_position_fails() {
        let error = place(
            vec![positioned(ElementKind::Heading, GridPosition::new(1, 13, 1, 1))],
            &GridConfig::default(),
            &SizeHints::default(),
            None,
        )
        .expect_err("out of bounds accepted");
        assert!(matches!(error.kind, GridErrorKind::ColumnEndOutOfRange { end: 13, cols: 12 }));
    }

    #[test]
    fn implicit_elements_avoid_occupied_cells() {
        let placed = place_all(vec![
            positioned(ElementKind::Image, GridPosition::new(1, 12, 1, 4)),
            element(ElementKind::Paragraph),
        ]);
        let paragraph =
            placed.iter().find(|e| e.kind == ElementKind::Paragraph).expect("missing paragraph");
        assert!(paragraph.position.row_start > 4);
    }

    #[test]
    fn implicit_cells_have_unique_owners() {
        let placed = place_all(vec![
            element(ElementKind::Heading),
            element(ElementKind::Paragraph),
            element(ElementKind::Code),
        ]);
        let map = GridMap::from_placed(&placed, &GridConfig::default());
        for (index, element) in placed.iter().enumerate() {
            let position = element.position;
            for row in position.row_start..=position.row_end {
                for col in position.col_start..=position.col_end {
                    let cell = map.cell(row, col).expect("out of bounds cell");
                    assert_eq!(cell.owner, Some(index), "cell ({row}, {col}) has a wrong owner");
                }
            }
        }
    }

    #[test]
    fn placement_is_deterministic() {
        let elements = vec![
            element(ElementKind::Heading),
            element(ElementKind::Paragraph),
            element(ElementKind::Image),
            positioned(ElementKind::Code, GridPosition::new(7, 12, 5, 9)),
        ];
        let first = place_all(elements.clone());
        let second = place_all(elements);
        assert_eq!(first, second);
    }

    #[test]
    fn output_is_in_draw_order() {
        let placed = place_all(vec![
            element(ElementKind::Paragraph),
            element(ElementKind::Heading),
            element(ElementKind::Image),
        ]);
        let keys: Vec<_> = placed
            .iter()
            .map(|e| (e.position.row_start, e.position.col_start, e.position.area()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn oversized_element_shrinks_to_fit() {
        let grid = GridConfig { cols: 2, rows: 2 };
        let placed = place(
            vec![element(ElementKind::Image)],
            &grid,
            &SizeHints::default(),
            None,
        )
        .expect("placement failed");
        let position = placed[0].position;
        assert!(position.col_end <= 2 && position.row_end <= 2);
    }

    #[test]
    fn full_grid_is_unplaceable() {
        let error = place(
            vec![
                positioned(ElementKind::Image, GridPosition::new(1, 12, 1, 9)),
                element(ElementKind::Paragraph),
            ],
            &GridConfig::default(),
            &SizeHints::default(),
            Some(3),
        )
        .expect_err("placement succeeded on a full grid");
        match error.kind {
            GridErrorKind::Unplaceable { kind, slide } => {
                assert_eq!(kind, ElementKind::Paragraph);
                assert_eq!(slide, Some(3));
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn single_free_cell_still_fits() {
        let grid = GridConfig { cols: 3, rows: 1 };
        let placed = place(
            vec![
                positioned(ElementKind::Image, GridPosition::new(1, 2, 1, 1)),
                element(ElementKind::Paragraph),
            ],
            &grid,
            &SizeHints::default(),
            None,
        )
        .expect("placement failed");
        let paragraph =
            placed.iter().find(|e| e.kind == ElementKind::Paragraph).expect("missing paragraph");
        assert_eq!(paragraph.position, GridPosition::new(3, 3, 1, 1));
    }

    #[test]
    fn larger_estimates_pack_first() {
        // The image (4 rows, half width) outranks the heading (1 row, full
        // width) and grabs the top-left corner.
        let placed = place_all(vec![
            element(ElementKind::Heading),
            element(ElementKind::Image),
        ]);
        let image = placed.iter().find(|e| e.kind == ElementKind::Image).expect("missing image");
        assert_eq!(image.position.row_start, 1);
        assert_eq!(image.position.col_start, 1);
    }

    #[test]
    fn layout_slide_uses_the_slide_grid() {
        let slide = Slide {
            metadata: DocumentMetadata { grid: Some("4x4".into()), ..Default::default() },
            elements: vec![positioned(ElementKind::Heading, GridPosition::new(1, 4, 1, 1))],
        };
        let layout =
            layout_slide(&slide, &DocumentMetadata::default(), &SizeHints::default())
                .expect("layout failed");
        assert_eq!(layout.grid_map.cols(), 4);
        assert_eq!(layout.grid_map.rows(), 4);
        assert!(layout.grid_map.cell(1, 1).expect("missing cell").occupied);
    }

    #[test]
    fn layout_document_reports_the_failing_slide() {
        let document = Document {
            metadata: DocumentMetadata::default(),
            slides: vec![
                Slide { metadata: DocumentMetadata::default(), elements: vec![] },
                Slide {
                    metadata: DocumentMetadata::default(),
                    elements: vec![
                        positioned(ElementKind::Image, GridPosition::new(1, 12, 1, 9)),
                        element(ElementKind::Paragraph),
                    ],
                },
            ],
        };
        let error = layout_document(&document, &SizeHints::default())
            .expect_err("layout succeeded on a full grid");
        assert!(matches!(error.kind, GridErrorKind::Unplaceable { slide: Some(1), .. }));
    }

    #[test]
    fn list_content_drives_its_estimate() {
        let items = vec![
            crate::markdown::elements::ListItem {
                text: "item".into(),
                depth: 0,
                ordered: false,
                children: vec![],
            };
            10
        ];
        let list = Element {
            kind: ElementKind::List,
            content: ElementContent::List(items),
            level: None,
            position: None,
            style: None,
            alt_text: None,
        };
        let placed = place_all(vec![list]);
        let position = placed[0].position;
        assert_eq!(position.row_end - position.row_start + 1, 6);
    }
}
