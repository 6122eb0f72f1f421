//! Document model: rows, columns, leaf widgets, and their wire records.
//!
//! A [`Row`] is a column container: a layout descriptor such as `"70-30"`
//! split into [`Column`]s, each holding an ordered list of [`LeafWidget`]s.
//! Leaves never appear at the top level and rows never appear inside a
//! column; [`Widget`] is the two-armed union used wherever either may occur
//! (drag payloads, inspector drafts).
//!
//! The serialized shape matches what the rendering layer stores and puts on
//! the drag transfer channel: identities travel as `i`, the discriminator as
//! `type`, and column lists and widths as parallel arrays under `content`.
//! The `*Record` types are that wire shape with an optional identity; the
//! typed structs convert from them and reject anything whose column count
//! disagrees with its layout.

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{GRID_UNITS, MAX_PERCENT, ROW_HEIGHT, ROW_TAG_PREFIX, ROW_WIDTH, TABLE_CELL};
use crate::error::{ErrorCode, ErrorKind};

/// Opaque unique identifier for a row or leaf widget.
pub type WidgetId = String;

/// Open-ended style properties of a leaf (`fontSize`, `backgroundColor`, ...).
pub type Style = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("widget has no identity")]
    MissingId,
    #[error("unknown widget type: {0:?}")]
    UnknownType(String),
    #[error("invalid layout descriptor: {0:?}")]
    BadLayout(String),
    #[error("layout {layout:?} has {parts} parts but {columns} columns and {widths} widths")]
    LayoutMismatch { layout: String, parts: usize, columns: usize, widths: usize },
    #[error("invalid {kind} content: {message}")]
    Content { kind: LeafKind, message: String },
}

impl ErrorCode for ShapeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingId => "E_MISSING_ID",
            Self::UnknownType(_) => "E_UNKNOWN_TYPE",
            Self::BadLayout(_) => "E_BAD_LAYOUT",
            Self::LayoutMismatch { .. } => "E_LAYOUT_MISMATCH",
            Self::Content { .. } => "E_BAD_CONTENT",
        }
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::Payload
    }
}

// =============================================================================
// LEAF WIDGETS
// =============================================================================

/// The content-bearing widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafKind {
    Text,
    Image,
    Button,
    Card,
    Table,
}

impl LeafKind {
    pub const ALL: [Self; 5] = [Self::Text, Self::Image, Self::Button, Self::Card, Self::Table];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Button => "Button",
            Self::Card => "Card",
            Self::Table => "Table",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ShapeError::UnknownType(s.to_owned()))
    }
}

/// Title and body of a card widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub title: String,
    pub description: String,
}

/// A grid of text cells. `rows` and `columns` track the dimensions of `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableContent {
    pub rows: usize,
    pub columns: usize,
    pub data: Vec<Vec<String>>,
}

impl TableContent {
    /// A `rows` x `columns` grid filled with the placeholder cell text.
    #[must_use]
    pub fn filled(rows: usize, columns: usize) -> Self {
        Self { rows, columns, data: vec![vec![TABLE_CELL.to_owned(); columns]; rows] }
    }

    /// Overwrite one cell. Returns false if the cell does not exist.
    pub fn set_cell(&mut self, row: usize, column: usize, value: String) -> bool {
        let Some(cell) = self.data.get_mut(row).and_then(|r| r.get_mut(column)) else {
            return false;
        };
        *cell = value;
        true
    }

    pub fn add_row(&mut self) {
        self.data.push(vec![TABLE_CELL.to_owned(); self.columns]);
        self.rows += 1;
    }

    /// Drop the last row. A table keeps at least one row; returns false when
    /// nothing was removed.
    pub fn remove_row(&mut self) -> bool {
        if self.rows <= 1 {
            return false;
        }
        self.data.pop();
        self.rows -= 1;
        true
    }

    pub fn add_column(&mut self) {
        for row in &mut self.data {
            row.push(TABLE_CELL.to_owned());
        }
        self.columns += 1;
    }

    /// Check that `rows` and `columns` describe `data`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first mismatch.
    pub fn check_dimensions(&self) -> Result<(), String> {
        if self.data.len() != self.rows {
            return Err(format!("rows is {} but data has {} rows", self.rows, self.data.len()));
        }
        if let Some((index, row)) = self.data.iter().enumerate().find(|(_, r)| r.len() != self.columns) {
            return Err(format!("columns is {} but data row {index} has {} cells", self.columns, row.len()));
        }
        Ok(())
    }

    /// Drop the last column. A table keeps at least one column.
    pub fn remove_column(&mut self) -> bool {
        if self.columns <= 1 {
            return false;
        }
        for row in &mut self.data {
            row.pop();
        }
        self.columns -= 1;
        true
    }
}

/// Type-specific content of a leaf widget.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafContent {
    Text(String),
    /// Image source URL or data URI; empty when no image is set.
    Image(String),
    /// Button label.
    Button(String),
    Card(CardContent),
    Table(TableContent),
}

impl LeafContent {
    #[must_use]
    pub fn kind(&self) -> LeafKind {
        match self {
            Self::Text(_) => LeafKind::Text,
            Self::Image(_) => LeafKind::Image,
            Self::Button(_) => LeafKind::Button,
            Self::Card(_) => LeafKind::Card,
            Self::Table(_) => LeafKind::Table,
        }
    }

    /// Decode the untyped `content` value of a leaf of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::Content` if the value does not fit the kind, or
    /// if a table's counters disagree with its grid.
    pub fn from_value(kind: LeafKind, value: Value) -> Result<Self, ShapeError> {
        let bad = |message: String| ShapeError::Content { kind, message };
        match kind {
            LeafKind::Text => string_content(value).map(Self::Text).map_err(bad),
            LeafKind::Image => string_content(value).map(Self::Image).map_err(bad),
            LeafKind::Button => string_content(value).map(Self::Button).map_err(bad),
            LeafKind::Card => serde_json::from_value(value)
                .map(Self::Card)
                .map_err(|e| bad(e.to_string())),
            LeafKind::Table => {
                let table: TableContent = serde_json::from_value(value).map_err(|e| bad(e.to_string()))?;
                table.check_dimensions().map_err(bad)?;
                Ok(Self::Table(table))
            }
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) | Self::Image(s) | Self::Button(s) => Value::String(s.clone()),
            Self::Card(card) => serde_json::json!({
                "title": card.title,
                "description": card.description,
            }),
            Self::Table(table) => serde_json::json!({
                "rows": table.rows,
                "columns": table.columns,
                "data": table.data,
            }),
        }
    }
}

fn string_content(value: Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        other => Err(format!("expected a string, found {other}")),
    }
}

/// A content widget placed inside a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LeafRecord", into = "LeafRecord")]
pub struct LeafWidget {
    pub id: WidgetId,
    pub content: LeafContent,
    pub style: Option<Style>,
}

impl LeafWidget {
    #[must_use]
    pub fn kind(&self) -> LeafKind {
        self.content.kind()
    }

    /// Typed read access to the style map.
    #[must_use]
    pub fn style_props(&self) -> StyleProps<'_> {
        StyleProps::new(self.style.as_ref())
    }

    /// Mutable style map, created empty if the leaf had none.
    pub fn style_mut(&mut self) -> &mut Style {
        self.style.get_or_insert_with(Map::new)
    }

    /// What clicking this widget does, if it is a button.
    #[must_use]
    pub fn button_action(&self) -> Option<ButtonAction<'_>> {
        if !matches!(self.content, LeafContent::Button(_)) {
            return None;
        }
        let props = self.style_props();
        let action = match (props.action_url(), props.alert_message()) {
            (url, _) if !url.is_empty() => ButtonAction::OpenUrl(url),
            (_, message) if !message.is_empty() => ButtonAction::Alert(message),
            _ => ButtonAction::Nothing,
        };
        Some(action)
    }
}

/// Click behavior of a button: a URL wins over the alert fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction<'a> {
    OpenUrl(&'a str),
    Alert(&'a str),
    Nothing,
}

/// Typed access to common style fields. Absent keys read as empty strings.
pub struct StyleProps<'a> {
    style: Option<&'a Style>,
}

impl<'a> StyleProps<'a> {
    #[must_use]
    pub fn new(style: Option<&'a Style>) -> Self {
        Self { style }
    }

    /// Raw string value of a style key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.style.and_then(|s| s.get(key)).and_then(Value::as_str)
    }

    fn field(&self, key: &str) -> &'a str {
        self.get(key).unwrap_or("")
    }

    #[must_use]
    pub fn font_size(&self) -> &'a str {
        self.field("fontSize")
    }

    #[must_use]
    pub fn text_align(&self) -> &'a str {
        self.field("textAlign")
    }

    #[must_use]
    pub fn width(&self) -> &'a str {
        self.field("width")
    }

    #[must_use]
    pub fn action_url(&self) -> &'a str {
        self.field("actionUrl")
    }

    #[must_use]
    pub fn alert_message(&self) -> &'a str {
        self.field("alertMessage")
    }
}

/// Wire shape of a leaf. Identity is absent on palette payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<WidgetId>,
    #[serde(rename = "type")]
    pub kind: LeafKind,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl LeafRecord {
    /// Build a typed leaf under the given identity, ignoring any carried `i`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::Content` if the content does not fit the type.
    pub fn into_leaf(self, id: WidgetId) -> Result<LeafWidget, ShapeError> {
        let content = LeafContent::from_value(self.kind, self.content)?;
        Ok(LeafWidget { id, content, style: self.style })
    }
}

impl TryFrom<LeafRecord> for LeafWidget {
    type Error = ShapeError;

    fn try_from(record: LeafRecord) -> Result<Self, Self::Error> {
        let id = record.i.clone().ok_or(ShapeError::MissingId)?;
        record.into_leaf(id)
    }
}

impl From<LeafWidget> for LeafRecord {
    fn from(leaf: LeafWidget) -> Self {
        Self { i: Some(leaf.id), kind: leaf.content.kind(), content: leaf.content.to_value(), style: leaf.style }
    }
}

// =============================================================================
// COLUMNS
// =============================================================================

/// Grid width of a column occupying `percent` of its row.
///
/// Floors, so the widths of a row need not sum to [`GRID_UNITS`]: `70-30`
/// yields 8 + 3 = 11. [`ColumnSet::has_width_gap`] reports such rows.
#[must_use]
pub fn grid_width(percent: u32) -> u32 {
    percent.saturating_mul(GRID_UNITS) / 100
}

/// A parsed layout descriptor: column percentages such as `70-30`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    percents: Vec<u32>,
}

impl LayoutSpec {
    /// Parse a dash-separated list of percentages.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::BadLayout` for empty or non-numeric parts and for
    /// parts above 100.
    pub fn parse(raw: &str) -> Result<Self, ShapeError> {
        let percents = raw
            .split('-')
            .map(|part| match part.trim().parse::<u32>() {
                Ok(percent) if percent <= MAX_PERCENT => Some(percent),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ShapeError::BadLayout(raw.to_owned()))?;
        Ok(Self { percents })
    }

    #[must_use]
    pub fn percents(&self) -> &[u32] {
        &self.percents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.percents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.percents.is_empty()
    }

    #[must_use]
    pub fn grid_widths(&self) -> Vec<u32> {
        self.percents.iter().map(|p| grid_width(*p)).collect()
    }
}

impl fmt::Display for LayoutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.percents.iter().map(u32::to_string).collect();
        f.write_str(&parts.join("-"))
    }
}

/// One compartment of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Width in grid units.
    pub width: u32,
    pub widgets: Vec<LeafWidget>,
}

/// The columns of a row. Column count always equals the layout's part count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColumnSetRecord", into = "ColumnSetRecord")]
pub struct ColumnSet {
    layout: LayoutSpec,
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Empty columns for `layout`, widths derived by [`grid_width`].
    #[must_use]
    pub fn new(layout: LayoutSpec) -> Self {
        let columns = layout
            .grid_widths()
            .into_iter()
            .map(|width| Column { width, widgets: Vec::new() })
            .collect();
        Self { layout, columns }
    }

    /// Empty columns for `layout` with explicit grid widths.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::LayoutMismatch` if `widths` has the wrong length.
    pub fn with_widths(layout: LayoutSpec, widths: &[u32]) -> Result<Self, ShapeError> {
        let columns = vec![Vec::new(); widths.len()];
        Self::from_parts(layout, columns, widths.to_vec())
    }

    /// Assemble from parallel lists as found on the wire.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::LayoutMismatch` unless the layout, column list and
    /// width list all have the same length.
    pub fn from_parts(layout: LayoutSpec, columns: Vec<Vec<LeafWidget>>, widths: Vec<u32>) -> Result<Self, ShapeError> {
        if columns.len() != layout.len() || widths.len() != layout.len() {
            return Err(ShapeError::LayoutMismatch {
                layout: layout.to_string(),
                parts: layout.len(),
                columns: columns.len(),
                widths: widths.len(),
            });
        }
        let columns = columns
            .into_iter()
            .zip(widths)
            .map(|(widgets, width)| Column { width, widgets })
            .collect();
        Ok(Self { layout, columns })
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutSpec {
        &self.layout
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to the columns. The slice cannot change the column count.
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn widths(&self) -> Vec<u32> {
        self.columns.iter().map(|c| c.width).collect()
    }

    #[must_use]
    pub fn width_sum(&self) -> u32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// True when the floored widths do not fill the grid.
    #[must_use]
    pub fn has_width_gap(&self) -> bool {
        self.width_sum() != GRID_UNITS
    }

    /// Every leaf in column order.
    pub fn leaves(&self) -> impl Iterator<Item = &LeafWidget> {
        self.columns.iter().flat_map(|c| c.widgets.iter())
    }

    pub fn leaves_mut(&mut self) -> impl Iterator<Item = &mut LeafWidget> {
        self.columns.iter_mut().flat_map(|c| c.widgets.iter_mut())
    }

    /// Switch to a new layout. Columns that still exist keep their leaves;
    /// the leaves of columns past the new count are returned.
    pub fn relayout(&mut self, layout: LayoutSpec) -> Vec<LeafWidget> {
        let mut next = Self::new(layout);
        let mut dropped = Vec::new();
        for (index, column) in std::mem::take(&mut self.columns).into_iter().enumerate() {
            match next.columns.get_mut(index) {
                Some(target) => target.widgets = column.widgets,
                None => dropped.extend(column.widgets),
            }
        }
        *self = next;
        dropped
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnWidth {
    width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnSetRecord {
    layout: String,
    columns: Vec<Vec<LeafWidget>>,
    #[serde(rename = "columnWidths")]
    column_widths: Vec<ColumnWidth>,
}

impl TryFrom<ColumnSetRecord> for ColumnSet {
    type Error = ShapeError;

    fn try_from(record: ColumnSetRecord) -> Result<Self, Self::Error> {
        let layout = LayoutSpec::parse(&record.layout)?;
        let widths = record.column_widths.into_iter().map(|w| w.width).collect();
        Self::from_parts(layout, record.columns, widths)
    }
}

impl From<ColumnSet> for ColumnSetRecord {
    fn from(set: ColumnSet) -> Self {
        let layout = set.layout.to_string();
        let (columns, column_widths) = set
            .columns
            .into_iter()
            .map(|c| (c.widgets, ColumnWidth { width: c.width }))
            .unzip();
        Self { layout, columns, column_widths }
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// Discriminator of top-level rows. Only column containers exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    ColumnContainer,
}

/// Whether a wire `type` tag names a row rather than a leaf.
#[must_use]
pub fn is_row_tag(tag: &str) -> bool {
    tag.starts_with(ROW_TAG_PREFIX)
}

/// A top-level horizontal band of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RowRecord", into = "RowRecord")]
pub struct Row {
    pub id: WidgetId,
    /// Preset tag such as `Column-2` or `Column-70-30`.
    pub tag: String,
    pub x: u32,
    /// Document position; equals the row's index once inside a document.
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub columns: ColumnSet,
}

impl Row {
    #[must_use]
    pub fn kind(&self) -> RowKind {
        RowKind::ColumnContainer
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LeafWidget> {
        self.columns.leaves()
    }

    #[must_use]
    pub fn layout_item(&self) -> LayoutItem {
        LayoutItem { i: self.id.clone(), x: self.x, y: self.y, w: self.w, h: self.h }
    }
}

fn default_row_width() -> u32 {
    ROW_WIDTH
}

fn default_row_height() -> u32 {
    ROW_HEIGHT
}

/// Wire shape of a row. Identity is absent on palette payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<WidgetId>,
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "default_row_width")]
    pub w: u32,
    #[serde(default = "default_row_height")]
    pub h: u32,
    pub content: ColumnSet,
}

impl RowRecord {
    /// Build a typed row under the given identity.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::UnknownType` if the tag is not a column-container tag.
    pub fn into_row(self, id: WidgetId) -> Result<Row, ShapeError> {
        if !is_row_tag(&self.tag) {
            return Err(ShapeError::UnknownType(self.tag));
        }
        Ok(Row { id, tag: self.tag, x: self.x, y: self.y, w: self.w, h: self.h, columns: self.content })
    }
}

impl TryFrom<RowRecord> for Row {
    type Error = ShapeError;

    fn try_from(record: RowRecord) -> Result<Self, Self::Error> {
        let id = record.i.clone().ok_or(ShapeError::MissingId)?;
        record.into_row(id)
    }
}

impl From<Row> for RowRecord {
    fn from(row: Row) -> Self {
        Self { i: Some(row.id), tag: row.tag, x: row.x, y: row.y, w: row.w, h: row.h, content: row.columns }
    }
}

/// Positional entry of a row as kept in the stored `layout` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub i: WidgetId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

// =============================================================================
// WIDGET
// =============================================================================

/// Either kind of document node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Widget {
    Row(Row),
    Leaf(LeafWidget),
}

impl Widget {
    #[must_use]
    pub fn id(&self) -> &WidgetId {
        match self {
            Self::Row(row) => &row.id,
            Self::Leaf(leaf) => &leaf.id,
        }
    }

    /// Human-readable type name (`Text`, `Column-2`, ...).
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Row(row) => &row.tag,
            Self::Leaf(leaf) => leaf.kind().as_str(),
        }
    }
}
