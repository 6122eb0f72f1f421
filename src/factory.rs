//! Widget factory: fresh identities, default content, and column presets.
//!
//! Every widget that enters the document gets its identity here, as a
//! random v4 UUID.

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;

use serde_json::{Map, Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::consts::{
    BUTTON_ALERT, BUTTON_LABEL, CARD_DESCRIPTION, CARD_TITLE, GRID_UNITS, ROW_HEIGHT, ROW_TAG_PREFIX, ROW_WIDTH,
    TABLE_SIZE, TEXT_PLACEHOLDER,
};
use crate::widget::{
    CardContent, ColumnSet, LayoutSpec, LeafContent, LeafKind, LeafRecord, LeafWidget, Row, RowRecord, ShapeError,
    Style, TableContent, WidgetId,
};

/// Generate a new widget identity.
#[must_use]
pub fn new_id() -> WidgetId {
    Uuid::new_v4().to_string()
}

/// A named column layout offered by one of the builder's pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPreset {
    /// Row `type` tag written into the document.
    pub tag: &'static str,
    /// Layout descriptor, e.g. `"70-30"`.
    pub layout: &'static str,
    pub label: &'static str,
    /// Fixed grid widths. `None` derives them from the layout by flooring.
    pub widths: Option<&'static [u32]>,
}

/// Presets in the element panel's column popup.
pub const PALETTE_PRESETS: [ColumnPreset; 5] = [
    ColumnPreset { tag: "Column-100", layout: "100", label: "100%", widths: None },
    ColumnPreset { tag: "Column-50-50", layout: "50-50", label: "50/50", widths: None },
    ColumnPreset { tag: "Column-70-30", layout: "70-30", label: "70/30", widths: None },
    ColumnPreset { tag: "Column-30-70", layout: "30-70", label: "30/70", widths: None },
    ColumnPreset { tag: "Column-33-33-33", layout: "33-33-33", label: "33/33/33", widths: None },
];

/// Presets offered on an empty canvas. Their widths always fill the grid.
pub const STARTER_PRESETS: [ColumnPreset; 3] = [
    ColumnPreset { tag: "Column-1", layout: "100", label: "1 Column", widths: Some(&[12]) },
    ColumnPreset { tag: "Column-2", layout: "50-50", label: "2 Columns", widths: Some(&[6, 6]) },
    ColumnPreset { tag: "Column-3", layout: "33-33-33", label: "3 Columns", widths: Some(&[4, 4, 4]) },
];

/// Presets the inspector can switch an existing row to.
pub const INSPECTOR_PRESETS: [ColumnPreset; 5] = [
    ColumnPreset { tag: "Column-1", layout: "100", label: "Full Width", widths: None },
    ColumnPreset { tag: "Column-2", layout: "50-50", label: "Two Equal Columns", widths: None },
    ColumnPreset { tag: "Column-3", layout: "33-33-33", label: "Three Equal Columns", widths: None },
    ColumnPreset { tag: "Column-2-uneven", layout: "70-30", label: "Two Columns (70:30)", widths: None },
    ColumnPreset { tag: "Column-2-uneven", layout: "30-70", label: "Two Columns (30:70)", widths: None },
];

/// Look up a preset by tag or layout descriptor across all pickers.
#[must_use]
pub fn find_preset(key: &str) -> Option<ColumnPreset> {
    PALETTE_PRESETS
        .iter()
        .chain(STARTER_PRESETS.iter())
        .chain(INSPECTOR_PRESETS.iter())
        .find(|p| p.tag == key || p.layout == key)
        .copied()
}

// =============================================================================
// LEAVES
// =============================================================================

/// Typography applied to text, and to any dropped leaf that carries no style.
#[must_use]
pub fn default_text_style() -> Style {
    style_map(json!({
        "fontSize": "16px",
        "fontWeight": "normal",
        "fontFamily": "Arial",
        "textAlign": "left",
        "color": "#000000",
        "lineHeight": "1.5",
        "letterSpacing": "0px",
        "padding": "16px",
    }))
}

#[must_use]
pub fn default_button_style() -> Style {
    style_map(json!({
        "backgroundColor": "#3B82F6",
        "textColor": "#FFFFFF",
        "borderRadius": "6px",
        "width": "auto",
        "actionUrl": "",
        "alertMessage": BUTTON_ALERT,
    }))
}

fn style_map(value: Value) -> Style {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[must_use]
pub fn default_content(kind: LeafKind) -> LeafContent {
    match kind {
        LeafKind::Text => LeafContent::Text(TEXT_PLACEHOLDER.to_owned()),
        LeafKind::Image => LeafContent::Image(String::new()),
        LeafKind::Button => LeafContent::Button(BUTTON_LABEL.to_owned()),
        LeafKind::Card => LeafContent::Card(CardContent {
            title: CARD_TITLE.to_owned(),
            description: CARD_DESCRIPTION.to_owned(),
        }),
        LeafKind::Table => LeafContent::Table(TableContent::filled(TABLE_SIZE, TABLE_SIZE)),
    }
}

/// Palette style for a kind. Image, card and table start unstyled.
#[must_use]
pub fn default_style(kind: LeafKind) -> Option<Style> {
    match kind {
        LeafKind::Text => Some(default_text_style()),
        LeafKind::Button => Some(default_button_style()),
        LeafKind::Image | LeafKind::Card | LeafKind::Table => None,
    }
}

/// A new leaf with default content and a fresh identity.
#[must_use]
pub fn create_leaf(kind: LeafKind) -> LeafWidget {
    LeafWidget { id: new_id(), content: default_content(kind), style: default_style(kind) }
}

/// The palette entry for a kind as it travels on the drag channel: no identity.
#[must_use]
pub fn leaf_template(kind: LeafKind) -> LeafRecord {
    LeafRecord { i: None, kind, content: default_content(kind).to_value(), style: default_style(kind) }
}

// =============================================================================
// ROWS
// =============================================================================

/// A new row of empty columns for a layout descriptor such as `"70-30"`.
///
/// The tag is `Column-<layout>`. Column widths are floored, so some layouts
/// leave part of the grid unused; the gap is logged, not corrected.
///
/// # Errors
///
/// Returns `ShapeError::BadLayout` if the descriptor does not parse.
pub fn create_column_row(layout: &str) -> Result<Row, ShapeError> {
    create_row(format!("{ROW_TAG_PREFIX}-{layout}"), layout)
}

/// A new row for one of the picker presets, using the preset's fixed widths
/// when it has them.
///
/// # Errors
///
/// Returns `ShapeError::BadLayout` if the preset's descriptor does not parse
/// and `ShapeError::LayoutMismatch` if its fixed widths do not match it.
pub fn create_preset_row(preset: &ColumnPreset) -> Result<Row, ShapeError> {
    Ok(build_row(preset.tag.to_owned(), preset_columns(preset)?))
}

fn create_row(tag: String, layout: &str) -> Result<Row, ShapeError> {
    Ok(build_row(tag, ColumnSet::new(LayoutSpec::parse(layout)?)))
}

fn preset_columns(preset: &ColumnPreset) -> Result<ColumnSet, ShapeError> {
    let layout = LayoutSpec::parse(preset.layout)?;
    match preset.widths {
        Some(widths) => ColumnSet::with_widths(layout, widths),
        None => Ok(ColumnSet::new(layout)),
    }
}

fn build_row(tag: String, columns: ColumnSet) -> Row {
    let layout = columns.layout().to_string();
    if columns.has_width_gap() {
        warn!(%layout, width_sum = columns.width_sum(), grid = GRID_UNITS, "column widths do not fill the grid");
    }
    Row { id: new_id(), tag, x: 0, y: 0, w: ROW_WIDTH, h: ROW_HEIGHT, columns }
}

/// The preset as it travels on the drag channel: empty columns, no identity.
///
/// # Errors
///
/// Same as [`create_preset_row`].
pub fn row_template(preset: &ColumnPreset) -> Result<RowRecord, ShapeError> {
    let columns = preset_columns(preset)?;
    Ok(RowRecord { i: None, tag: preset.tag.to_owned(), x: 0, y: 0, w: ROW_WIDTH, h: ROW_HEIGHT, content: columns })
}
