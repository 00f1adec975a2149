//! Grid template algebra
//!
//! Builds and edits the cell map of a grid-kind node. Cells are keyed by
//! 1-based `"row.col"` strings; a cell with a `span` covers the rectangle
//! starting at its key, and the cells inside that rectangle are hidden.
//!
//! Coverage is not inferred when instantiating a template: authors mark
//! covered cells `hide: true` themselves. Bounds and span overlaps are
//! validated.

use crate::error::GridError;
use crate::node::{LayoutNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 1-based cell coordinate, written `row.col`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellKey {
    /// Row, starting at 1
    pub row: u16,
    /// Column, starting at 1
    pub col: u16,
}

impl CellKey {
    /// Create cell key
    #[inline]
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.row, self.col)
    }
}

impl FromStr for CellKey {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidCellKey(s.to_string());
        let (row, col) = s.split_once('.').ok_or_else(invalid)?;
        let row: u16 = row.trim().parse().map_err(|_| invalid())?;
        let col: u16 = col.trim().parse().map_err(|_| invalid())?;
        if row == 0 || col == 0 {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }
}

impl TryFrom<String> for CellKey {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellKey> for String {
    fn from(key: CellKey) -> Self {
        key.to_string()
    }
}

/// Rows and columns covered by a cell, each at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Rows covered
    pub row: u16,
    /// Columns covered
    pub col: u16,
}

impl Span {
    /// Single cell
    pub const UNIT: Span = Span { row: 1, col: 1 };

    /// Create span
    #[inline]
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    fn is_valid(self) -> bool {
        self.row >= 1 && self.col >= 1
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.row, self.col)
    }
}

/// One entry of a grid's cell map
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridCell {
    /// Widget or container identifier placed in the cell
    pub component: Option<String>,
    /// Covered by another cell's span
    #[serde(default)]
    pub hide: bool,
    /// Region this cell covers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl GridCell {
    /// Empty visible cell
    #[must_use]
    pub fn visible() -> Self {
        Self::default()
    }

    /// Empty hidden cell
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hide: true,
            ..Self::default()
        }
    }

    fn effective_span(&self) -> Span {
        self.span.unwrap_or(Span::UNIT)
    }
}

/// Grid payload of a grid-kind node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Row count
    pub rows: u16,
    /// Column count
    pub cols: u16,
    /// Gap hint, opaque to this crate
    #[serde(default)]
    pub gap: u16,
    /// Cell map
    #[serde(default)]
    pub cells: BTreeMap<CellKey, GridCell>,
}

impl GridSpec {
    /// Grid with every cell present and visible
    ///
    /// # Errors
    /// `InvalidDimensions` if `rows` or `cols` is 0
    pub fn filled(rows: u16, cols: u16) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        let cells = (1..=rows)
            .flat_map(|r| (1..=cols).map(move |c| (CellKey::new(r, c), GridCell::visible())))
            .collect();
        Ok(Self {
            rows,
            cols,
            gap: 0,
            cells,
        })
    }

    /// Lookup cell
    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&GridCell> {
        self.cells.get(&key)
    }

    fn check_region(&self, key: CellKey, span: Span) -> Result<(), GridError> {
        if !span.is_valid() {
            return Err(GridError::InvalidDimensions {
                rows: span.row,
                cols: span.col,
            });
        }
        let last_row = u32::from(key.row) + u32::from(span.row) - 1;
        let last_col = u32::from(key.col) + u32::from(span.col) - 1;
        if key.row == 0
            || key.col == 0
            || last_row > u32::from(self.rows)
            || last_col > u32::from(self.cols)
        {
            return Err(GridError::SpanOutOfBounds {
                key,
                span,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Spanned anchors other than `except`, with their regions
    fn spanned_anchors(&self, except: Option<CellKey>) -> impl Iterator<Item = (CellKey, Span)> + '_ {
        self.cells.iter().filter_map(move |(key, cell)| match cell.span {
            Some(span) if !cell.hide && Some(*key) != except && span != Span::UNIT => {
                Some((*key, span))
            }
            _ => None,
        })
    }
}

/// Cells inside the rectangle anchored at `key`
pub fn region(key: CellKey, span: Span) -> impl Iterator<Item = CellKey> {
    (key.row..key.row.saturating_add(span.row)).flat_map(move |r| {
        (key.col..key.col.saturating_add(span.col)).map(move |c| CellKey::new(r, c))
    })
}

fn regions_intersect(a: CellKey, a_span: Span, b: CellKey, b_span: Span) -> bool {
    let a_rows = u32::from(a.row)..u32::from(a.row) + u32::from(a_span.row);
    let b_rows = u32::from(b.row)..u32::from(b.row) + u32::from(b_span.row);
    let a_cols = u32::from(a.col)..u32::from(a.col) + u32::from(a_span.col);
    let b_cols = u32::from(b.col)..u32::from(b.col) + u32::from(b_span.col);
    a_rows.start < b_rows.end
        && b_rows.start < a_rows.end
        && a_cols.start < b_cols.end
        && b_cols.start < a_cols.end
}

/// Validate dimensions, cell bounds and span overlaps
///
/// # Errors
/// - `InvalidDimensions` for a zero-sized grid or span
/// - `SpanOutOfBounds` for a key or span leaving the grid
/// - `SpanOverlap` when two spanned regions intersect
pub fn validate_grid(grid: &GridSpec) -> Result<(), GridError> {
    if grid.rows == 0 || grid.cols == 0 {
        return Err(GridError::InvalidDimensions {
            rows: grid.rows,
            cols: grid.cols,
        });
    }

    for (key, cell) in &grid.cells {
        grid.check_region(*key, cell.effective_span())?;
    }

    let anchors: Vec<(CellKey, Span)> = grid.spanned_anchors(None).collect();
    for (i, (key, span)) in anchors.iter().enumerate() {
        if let Some((other, _)) = anchors[i + 1..]
            .iter()
            .find(|(other, other_span)| regions_intersect(*key, *span, *other, *other_span))
        {
            return Err(GridError::SpanOverlap {
                key: *other,
                other: *key,
            });
        }
    }
    Ok(())
}

/// One declared cell of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCell {
    /// Cell position
    pub key: CellKey,
    /// Optional merge
    #[serde(default)]
    pub span: Option<Span>,
    /// Covered by another cell
    #[serde(default)]
    pub hide: Option<bool>,
}

impl TemplateCell {
    /// Plain cell
    #[must_use]
    pub fn new(row: u16, col: u16) -> Self {
        Self {
            key: CellKey::new(row, col),
            span: None,
            hide: None,
        }
    }

    /// With span
    #[must_use]
    pub fn spanning(mut self, rows: u16, cols: u16) -> Self {
        self.span = Some(Span::new(rows, cols));
        self
    }

    /// Mark hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hide = Some(true);
        self
    }
}

/// Declarative, static grid description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTemplate {
    /// Display name
    pub name: String,
    /// Row count
    pub rows: u16,
    /// Column count
    pub cols: u16,
    /// Gap hint
    #[serde(default)]
    pub gap: u16,
    /// Declared cells
    pub cells: Vec<TemplateCell>,
}

impl GridTemplate {
    /// Parse a template from JSON text
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Build the root grid node of a new workspace from a template
///
/// The node gets id 1 and parent 0. Every declared cell becomes an empty
/// cell carrying the template's `hide` (default false) and `span`.
///
/// # Errors
/// Any error from [`validate_grid`]
pub fn instantiate(template: &GridTemplate) -> Result<LayoutNode, GridError> {
    let cells = template
        .cells
        .iter()
        .map(|cell| {
            (
                cell.key,
                GridCell {
                    component: None,
                    hide: cell.hide.unwrap_or(false),
                    span: cell.span,
                },
            )
        })
        .collect();

    let grid = GridSpec {
        rows: template.rows,
        cols: template.cols,
        gap: template.gap,
        cells,
    };
    validate_grid(&grid)?;

    tracing::debug!(
        template = %template.name,
        rows = grid.rows,
        cols = grid.cols,
        cells = grid.cells.len(),
        "instantiated grid template"
    );
    Ok(LayoutNode::grid(NodeId(1), NodeId::ROOT_PARENT, grid))
}

fn grid_of(node: &LayoutNode) -> Result<LayoutNode, GridError> {
    if node.grid_spec().is_none() {
        return Err(GridError::NotAGrid(node.id));
    }
    Ok(node.clone())
}

/// Assign (or clear) the component of one cell
///
/// # Errors
/// `NotAGrid`, or `UnknownCell` if `key` is not in the cell map
pub fn set_cell_component(
    node: &LayoutNode,
    key: CellKey,
    component: Option<String>,
) -> Result<LayoutNode, GridError> {
    let mut next = grid_of(node)?;
    let cell = next
        .grid_spec_mut()
        .and_then(|grid| grid.cells.get_mut(&key))
        .ok_or(GridError::UnknownCell(key))?;
    cell.component = component;
    Ok(next)
}

/// Set a cell's span, hiding cells it newly covers and revealing cells it no
/// longer covers
///
/// Cells inside the new region that are missing from the map are inserted
/// hidden.
///
/// # Errors
/// `NotAGrid`, `UnknownCell`, `InvalidDimensions`, `SpanOutOfBounds`, or
/// `SpanOverlap` when the region would intersect another spanned cell
pub fn merge_span(node: &LayoutNode, key: CellKey, span: Span) -> Result<LayoutNode, GridError> {
    let mut next = grid_of(node)?;
    let grid = next.grid_spec_mut().ok_or(GridError::NotAGrid(node.id))?;

    let old_span = grid
        .cell(key)
        .ok_or(GridError::UnknownCell(key))?
        .effective_span();
    grid.check_region(key, span)?;

    if let Some((other, _)) = grid
        .spanned_anchors(Some(key))
        .find(|(other, other_span)| regions_intersect(key, span, *other, *other_span))
    {
        return Err(GridError::SpanOverlap { key, other });
    }

    for covered in region(key, old_span) {
        if covered != key {
            if let Some(cell) = grid.cells.get_mut(&covered) {
                cell.hide = false;
            }
        }
    }
    for covered in region(key, span) {
        if covered != key {
            grid.cells.entry(covered).or_insert_with(GridCell::hidden).hide = true;
        }
    }
    if let Some(anchor) = grid.cells.get_mut(&key) {
        anchor.span = (span != Span::UNIT).then_some(span);
        anchor.hide = false;
    }

    tracing::debug!(node = %node.id, cell = %key, %span, "merged grid cells");
    Ok(next)
}

/// Remove a cell's span and reveal every cell it covered
///
/// A cell without a span is returned unchanged.
///
/// # Errors
/// `NotAGrid` or `UnknownCell`
pub fn split_span(node: &LayoutNode, key: CellKey) -> Result<LayoutNode, GridError> {
    let mut next = grid_of(node)?;
    let grid = next.grid_spec_mut().ok_or(GridError::NotAGrid(node.id))?;

    let old_span = grid
        .cell(key)
        .ok_or(GridError::UnknownCell(key))?
        .effective_span();

    for covered in region(key, old_span) {
        if let Some(cell) = grid.cells.get_mut(&covered) {
            if covered == key {
                cell.span = None;
            } else {
                cell.hide = false;
            }
        }
    }

    tracing::debug!(node = %node.id, cell = %key, "split grid cell");
    Ok(next)
}
