//! Document store: the ordered rows of the page and the reducer that mutates them.
//!
//! All structural changes go through [`Document::apply`] as a [`Command`]
//! and come back as an [`Action`] describing what changed. Lookups by
//! identity scan the rows and then one level of columns; nesting never goes
//! deeper, so no general tree walk is needed.
//!
//! Row positions are kept in step with list order: after every mutation a
//! row's `y` equals its index.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{GRID_UNITS, ROW_HEIGHT, ROW_WIDTH};
use crate::error::{ErrorCode, ErrorKind};
use crate::widget::{LayoutItem, LeafWidget, Row, ShapeError, Widget, WidgetId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    #[error("Columns cannot be dropped inside other columns.")]
    RowInsideColumn,
    #[error("Please drop widgets inside a column.")]
    LeafOutsideColumn,
    #[error("row not found: {0}")]
    UnknownRow(WidgetId),
    #[error("row {row} has no column {column}")]
    UnknownColumn { row: WidgetId, column: usize },
    #[error("duplicate widget identity: {0}")]
    DuplicateId(WidgetId),
    #[error("invalid transfer payload: {0}")]
    Payload(String),
    #[error("invalid widget: {0}")]
    Shape(#[from] ShapeError),
}

impl ErrorCode for DocError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RowInsideColumn => "E_ROW_IN_COLUMN",
            Self::LeafOutsideColumn => "E_LEAF_OUTSIDE_COLUMN",
            Self::UnknownRow(_) => "E_ROW_NOT_FOUND",
            Self::UnknownColumn { .. } => "E_COLUMN_NOT_FOUND",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
            Self::Payload(_) => "E_BAD_PAYLOAD",
            Self::Shape(e) => e.error_code(),
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::RowInsideColumn | Self::LeafOutsideColumn | Self::DuplicateId(_) => ErrorKind::StructuralReject,
            Self::UnknownRow(_) | Self::UnknownColumn { .. } => ErrorKind::NotFound,
            Self::Payload(_) | Self::Shape(_) => ErrorKind::Payload,
        }
    }
}

/// A structural mutation to apply to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a new row. Its identity and its leaves' identities must be unused.
    InsertRow(Row),
    /// Move an existing row to the end of the document.
    ReorderRow { id: WidgetId },
    /// Append a new leaf to one column of a row.
    InsertLeaf { row: WidgetId, column: usize, leaf: LeafWidget },
    /// A drop that was refused at classification time. Applying it changes nothing.
    Reject(DocError),
    /// Replace the node whose identity matches the draft.
    CommitDraft(Widget),
    /// Remove a row (with its leaves) or a single leaf.
    DeleteWidget { id: WidgetId },
}

/// What a command changed, for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    RowInserted { id: WidgetId, index: usize },
    RowMoved { id: WidgetId, from: usize, to: usize },
    LeafInserted { row: WidgetId, column: usize, id: WidgetId },
    WidgetReplaced { id: WidgetId },
    WidgetDeleted { id: WidgetId, cascaded: Vec<WidgetId> },
}

/// Where an identity lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Row { index: usize },
    Leaf { row: usize, column: usize, index: usize },
}

/// Borrowed view of a node found by identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetRef<'a> {
    Row(&'a Row),
    Leaf(&'a LeafWidget),
}

impl WidgetRef<'_> {
    /// Deep copy of the referenced node.
    #[must_use]
    pub fn to_widget(self) -> Widget {
        match self {
            Self::Row(row) => Widget::Row(row.clone()),
            Self::Leaf(leaf) => Widget::Leaf(leaf.clone()),
        }
    }
}

/// A broken document invariant, as reported by [`Document::violations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateId(WidgetId),
    /// Row `y` disagrees with its index.
    OutOfOrder { id: WidgetId, y: u32, index: usize },
    /// Floored column widths do not add up to the grid.
    WidthGap { id: WidgetId, sum: u32 },
}

/// The composed page: an ordered list of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    rows: Vec<Row>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap rows, renumbering their positions to match list order.
    #[must_use]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut doc = Self { rows };
        doc.renumber();
        doc
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every identity in the document: each row followed by its leaves.
    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.rows
            .iter()
            .flat_map(|row| std::iter::once(&row.id).chain(row.leaves().map(|leaf| &leaf.id)))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    /// Find an identity: top-level rows first, then leaves inside columns.
    #[must_use]
    pub fn locate(&self, id: &str) -> Option<Location> {
        if let Some(index) = self.rows.iter().position(|r| r.id == id) {
            return Some(Location::Row { index });
        }
        for (row_index, row) in self.rows.iter().enumerate() {
            for (column_index, column) in row.columns.columns().iter().enumerate() {
                if let Some(index) = column.widgets.iter().position(|w| w.id == id) {
                    return Some(Location::Leaf { row: row_index, column: column_index, index });
                }
            }
        }
        None
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<WidgetRef<'_>> {
        match self.locate(id)? {
            Location::Row { index } => self.rows.get(index).map(WidgetRef::Row),
            Location::Leaf { row, column, index } => self
                .rows
                .get(row)
                .and_then(|r| r.columns.column(column))
                .and_then(|c| c.widgets.get(index))
                .map(WidgetRef::Leaf),
        }
    }

    /// Positional entries of every row, in order.
    #[must_use]
    pub fn layout_items(&self) -> Vec<LayoutItem> {
        self.rows.iter().map(Row::layout_item).collect()
    }

    /// Replace the whole document with a snapshot.
    pub fn load_snapshot(&mut self, snapshot: Document) {
        *self = Self::from_rows(snapshot.rows);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Check every document invariant, returning the ones that do not hold.
    ///
    /// Width gaps come from flooring percentages into grid units and are
    /// expected for layouts like `70-30`.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for id in self.ids() {
            if !seen.insert(id) {
                out.push(Violation::DuplicateId(id.clone()));
            }
        }
        for (index, row) in self.rows.iter().enumerate() {
            if usize::try_from(row.y).map_or(true, |y| y != index) {
                out.push(Violation::OutOfOrder { id: row.id.clone(), y: row.y, index });
            }
            let sum = row.columns.width_sum();
            if sum != GRID_UNITS {
                out.push(Violation::WidthGap { id: row.id.clone(), sum });
            }
        }
        out
    }

    // --- Reducer ---

    /// Apply one command. On error the document is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the rejection carried by `Command::Reject`, `UnknownRow` /
    /// `UnknownColumn` for missing targets, and `DuplicateId` when an insert
    /// would reuse an identity already in the document.
    pub fn apply(&mut self, command: Command) -> Result<Action, DocError> {
        match command {
            Command::InsertRow(row) => self.insert_row(row),
            Command::ReorderRow { id } => self.reorder_row(&id),
            Command::InsertLeaf { row, column, leaf } => self.insert_leaf(&row, column, leaf),
            Command::Reject(err) => {
                warn!(error = %err, "drop rejected");
                Err(err)
            }
            Command::CommitDraft(widget) => Ok(self.replace(widget)),
            Command::DeleteWidget { id } => Ok(self.remove(&id)),
        }
    }

    fn insert_row(&mut self, mut row: Row) -> Result<Action, DocError> {
        let mut incoming = HashSet::new();
        for id in std::iter::once(&row.id).chain(row.leaves().map(|leaf| &leaf.id)) {
            if !incoming.insert(id.as_str()) || self.contains(id) {
                return Err(DocError::DuplicateId(id.clone()));
            }
        }
        let index = self.rows.len();
        row.x = 0;
        row.w = ROW_WIDTH;
        row.h = ROW_HEIGHT;
        let id = row.id.clone();
        self.rows.push(row);
        self.renumber();
        debug!(%id, index, "row inserted");
        Ok(Action::RowInserted { id, index })
    }

    fn reorder_row(&mut self, id: &str) -> Result<Action, DocError> {
        let from = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DocError::UnknownRow(id.to_owned()))?;
        let row = self.rows.remove(from);
        self.rows.push(row);
        let to = self.rows.len() - 1;
        self.renumber();
        debug!(%id, from, to, "row moved");
        Ok(Action::RowMoved { id: id.to_owned(), from, to })
    }

    fn insert_leaf(&mut self, row_id: &str, column: usize, leaf: LeafWidget) -> Result<Action, DocError> {
        if self.contains(&leaf.id) {
            return Err(DocError::DuplicateId(leaf.id));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| DocError::UnknownRow(row_id.to_owned()))?;
        let target = row
            .columns
            .column_mut(column)
            .ok_or_else(|| DocError::UnknownColumn { row: row_id.to_owned(), column })?;
        let id = leaf.id.clone();
        target.widgets.push(leaf);
        debug!(row = %row_id, column, %id, "leaf inserted");
        Ok(Action::LeafInserted { row: row_id.to_owned(), column, id })
    }

    /// Swap in `widget` where its identity lives. Rows only replace rows and
    /// leaves only replace leaves; anything else is a no-op.
    fn replace(&mut self, widget: Widget) -> Action {
        let id = widget.id().clone();
        match (self.locate(&id), widget) {
            (Some(Location::Row { index }), Widget::Row(row)) => {
                if let Some(slot) = self.rows.get_mut(index) {
                    *slot = row;
                }
                self.renumber();
            }
            (Some(Location::Leaf { row, column, index }), Widget::Leaf(leaf)) => {
                if let Some(slot) = self
                    .rows
                    .get_mut(row)
                    .and_then(|r| r.columns.column_mut(column))
                    .and_then(|c| c.widgets.get_mut(index))
                {
                    *slot = leaf;
                }
            }
            (location, _) => {
                warn!(%id, ?location, "no matching widget for draft; nothing written");
                return Action::None;
            }
        }
        Action::WidgetReplaced { id }
    }

    /// Remove an identity wherever it lives. Removing a row removes its leaves.
    fn remove(&mut self, id: &str) -> Action {
        match self.locate(id) {
            Some(Location::Row { index }) => {
                let row = self.rows.remove(index);
                self.renumber();
                let cascaded = row.leaves().map(|leaf| leaf.id.clone()).collect();
                Action::WidgetDeleted { id: row.id, cascaded }
            }
            Some(Location::Leaf { row, column, index }) => {
                if let Some(c) = self.rows.get_mut(row).and_then(|r| r.columns.column_mut(column)) {
                    c.widgets.remove(index);
                }
                Action::WidgetDeleted { id: id.to_owned(), cascaded: Vec::new() }
            }
            None => Action::None,
        }
    }

    fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.y = u32::try_from(index).unwrap_or(u32::MAX);
        }
    }
}
