//! Drag-and-drop controller: transfer payloads and drop classification.
//!
//! The transfer channel carries a JSON copy of the dragged widget written at
//! drag start, so a drop never sees live objects: everything it inserts is a
//! deep copy of the payload. [`classify`] turns a decoded payload and a drop
//! target into a [`Command`]; [`drop_payload`] decodes, classifies and applies
//! in one step.
//!
//! | Payload | Identity | Target | Command |
//! |---|---|---|---|
//! | row | known | canvas | `ReorderRow` (moves to the end) |
//! | row | none | canvas | `InsertRow` with a fresh identity |
//! | row | any | column | `Reject(RowInsideColumn)` |
//! | leaf | ignored | column | `InsertLeaf` with a fresh identity |
//! | leaf | ignored | canvas | `Reject(LeafOutsideColumn)` |

#[cfg(test)]
#[path = "dnd_test.rs"]
mod dnd_test;

use serde_json::Value;
use tracing::debug;

use crate::doc::{Action, Command, DocError, Document};
use crate::factory::{self, ColumnPreset};
use crate::widget::{LeafKind, LeafRecord, RowRecord, Widget, WidgetId, is_row_tag};

/// Name of the transfer slot the payload is stored under.
pub const TRANSFER_SLOT: &str = "widget";

/// Where a payload was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The top-level canvas, including the area over an existing row.
    Canvas,
    /// The drop zone of one column of a row.
    Column { row: WidgetId, column: usize },
}

/// A decoded transfer payload.
#[derive(Debug, Clone)]
pub enum Payload {
    Row(RowRecord),
    Leaf(LeafRecord),
}

impl Payload {
    /// Decode a payload read back from the transfer slot. Rows are recognized
    /// by their `Column...` type tag; anything else must be a leaf.
    ///
    /// # Errors
    ///
    /// Returns `DocError::Payload` for malformed JSON, a missing type tag, or
    /// a shape that fits neither a row nor a known leaf type.
    pub fn decode(raw: &str) -> Result<Self, DocError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| DocError::Payload(e.to_string()))?;
        let Some(tag) = value.get("type").and_then(Value::as_str) else {
            return Err(DocError::Payload("missing widget type".to_owned()));
        };
        if is_row_tag(tag) {
            serde_json::from_value(value)
                .map(Self::Row)
                .map_err(|e| DocError::Payload(e.to_string()))
        } else {
            serde_json::from_value(value)
                .map(Self::Leaf)
                .map_err(|e| DocError::Payload(e.to_string()))
        }
    }
}

/// Serialize a placed widget for the transfer slot at drag start.
///
/// # Errors
///
/// Returns `DocError::Payload` if serialization fails.
pub fn encode_widget(widget: &Widget) -> Result<String, DocError> {
    serde_json::to_string(widget).map_err(|e| DocError::Payload(e.to_string()))
}

/// The payload of a palette leaf: default content, no identity.
///
/// # Errors
///
/// Returns `DocError::Payload` if serialization fails.
pub fn palette_leaf(kind: LeafKind) -> Result<String, DocError> {
    serde_json::to_string(&factory::leaf_template(kind)).map_err(|e| DocError::Payload(e.to_string()))
}

/// The payload of a column preset: empty columns, no identity.
///
/// # Errors
///
/// Returns `DocError::Shape` for an unparsable preset layout.
pub fn palette_row(preset: &ColumnPreset) -> Result<String, DocError> {
    let record = factory::row_template(preset)?;
    serde_json::to_string(&record).map_err(|e| DocError::Payload(e.to_string()))
}

/// Decide what a drop does. Never mutates; rejections come back as
/// `Command::Reject`.
#[must_use]
pub fn classify(doc: &Document, payload: Payload, target: &DropTarget) -> Command {
    match (payload, target) {
        (Payload::Row(_), DropTarget::Column { .. }) => Command::Reject(DocError::RowInsideColumn),
        (Payload::Leaf(_), DropTarget::Canvas) => Command::Reject(DocError::LeafOutsideColumn),
        (Payload::Row(record), DropTarget::Canvas) => match record.i.clone() {
            Some(id) if doc.row(&id).is_some() => Command::ReorderRow { id },
            Some(id) => Command::Reject(DocError::UnknownRow(id)),
            None => new_row(record),
        },
        (Payload::Leaf(mut record), DropTarget::Column { row, column }) => {
            if record.style.is_none() {
                record.style = Some(factory::default_text_style());
            }
            match record.into_leaf(factory::new_id()) {
                Ok(leaf) => Command::InsertLeaf { row: row.clone(), column: *column, leaf },
                Err(e) => Command::Reject(e.into()),
            }
        }
    }
}

/// A new row from a payload. Any leaves it carries are copies, so they get
/// fresh identities too.
fn new_row(record: RowRecord) -> Command {
    match record.into_row(factory::new_id()) {
        Ok(mut row) => {
            for leaf in row.columns.leaves_mut() {
                leaf.id = factory::new_id();
            }
            Command::InsertRow(row)
        }
        Err(e) => Command::Reject(e.into()),
    }
}

/// Handle a drop: decode the payload, classify it against `target`, and
/// apply the result.
///
/// # Errors
///
/// Returns the rejection when the drop breaks nesting rules, names a missing
/// row or column, or the payload cannot be decoded. The document is
/// unchanged in every error case.
pub fn drop_payload(doc: &mut Document, raw: &str, target: &DropTarget) -> Result<Action, DocError> {
    let command = match Payload::decode(raw) {
        Ok(payload) => classify(doc, payload, target),
        Err(e) => Command::Reject(e),
    };
    debug!(?target, "drop classified");
    doc.apply(command)
}
