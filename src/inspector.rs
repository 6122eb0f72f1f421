//! Inspector: the draft/commit workflow for editing one widget.
//!
//! Selecting a widget opens a draft, a deep copy that every edit mutates
//! while the document stays as it was. Each edit recomputes the validation
//! message. Save commits the draft through [`Command::CommitDraft`] only when
//! it validates; cancel discards it; delete removes the selected identity
//! regardless of validation. Save, cancel and delete all close the inspector.
//!
//! ```text
//!            open(id)                  edit(..)
//!  Closed ───────────────▶ Open ◀────────────────┐
//!    ▲                      │ │                   │
//!    │   save / cancel /    │ └───────────────────┘
//!    └──── delete ──────────┘   (save with an error stays Open)
//! ```

#[cfg(test)]
#[path = "inspector_test.rs"]
mod inspector_test;

use serde_json::Value;
use tracing::{debug, warn};

use crate::doc::{Action, Command, Document};
use crate::error::{ErrorCode, ErrorKind};
use crate::factory::{self, ColumnPreset};
use crate::widget::{LayoutSpec, LeafContent, LeafWidget, ShapeError, Widget, WidgetId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("no widget is being edited")]
    NotOpen,
    #[error("widget not found: {0}")]
    NotFound(WidgetId),
    #[error("{0}")]
    Invalid(String),
    #[error("{edit} does not apply to {widget} widgets")]
    NotApplicable { edit: &'static str, widget: String },
    #[error("table has no cell at row {row}, column {column}")]
    NoSuchCell { row: usize, column: usize },
    #[error("invalid layout: {0}")]
    Layout(#[from] ShapeError),
}

impl ErrorCode for EditorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotOpen => "E_EDITOR_CLOSED",
            Self::NotFound(_) => "E_WIDGET_NOT_FOUND",
            Self::Invalid(_) => "E_VALIDATION",
            Self::NotApplicable { .. } => "E_EDIT_NOT_APPLICABLE",
            Self::NoSuchCell { .. } => "E_NO_SUCH_CELL",
            Self::Layout(e) => e.error_code(),
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Validation,
            Self::NotFound(_) | Self::NoSuchCell { .. } => ErrorKind::NotFound,
            Self::NotOpen | Self::NotApplicable { .. } => ErrorKind::InvalidState,
            Self::Layout(_) => ErrorKind::Payload,
        }
    }
}

/// One change made through the inspector controls.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    /// Text content of a text widget.
    SetText(String),
    /// Set one style key of a leaf (`fontSize`, `textAlign`, `actionUrl`, ...).
    SetStyle { key: String, value: Value },
    /// Source URL or data URI of an image. Empty clears the image.
    SetImageSource(String),
    SetButtonLabel(String),
    SetCardTitle(String),
    SetCardDescription(String),
    SetTableCell { row: usize, column: usize, value: String },
    AddTableRow,
    RemoveTableRow,
    AddTableColumn,
    RemoveTableColumn,
    /// Switch a row to another column preset.
    ChangeColumnLayout(ColumnPreset),
}

impl DraftEdit {
    fn name(&self) -> &'static str {
        match self {
            Self::SetText(_) => "SetText",
            Self::SetStyle { .. } => "SetStyle",
            Self::SetImageSource(_) => "SetImageSource",
            Self::SetButtonLabel(_) => "SetButtonLabel",
            Self::SetCardTitle(_) => "SetCardTitle",
            Self::SetCardDescription(_) => "SetCardDescription",
            Self::SetTableCell { .. } => "SetTableCell",
            Self::AddTableRow => "AddTableRow",
            Self::RemoveTableRow => "RemoveTableRow",
            Self::AddTableColumn => "AddTableColumn",
            Self::RemoveTableColumn => "RemoveTableColumn",
            Self::ChangeColumnLayout(_) => "ChangeColumnLayout",
        }
    }
}

/// Blocking validation message for a widget, if any.
#[must_use]
pub fn validate(widget: &Widget) -> Option<String> {
    let Widget::Leaf(leaf) = widget else {
        return None;
    };
    match &leaf.content {
        LeafContent::Text(text) if text.trim().is_empty() => Some("Text content cannot be empty".to_owned()),
        LeafContent::Card(card) => {
            let title = card.title.trim().is_empty();
            let description = card.description.trim().is_empty();
            match (title, description) {
                (true, true) => Some("Title and description cannot be empty".to_owned()),
                (true, false) => Some("Title cannot be empty".to_owned()),
                (false, true) => Some("Description cannot be empty".to_owned()),
                (false, false) => None,
            }
        }
        _ => None,
    }
}

/// The working copy of the selected widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    widget: Widget,
    error: Option<String>,
}

impl Draft {
    #[must_use]
    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InspectorState {
    #[default]
    Closed,
    Open(Draft),
}

/// The side inspector. At most one draft is open at a time.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    state: InspectorState,
}

impl Inspector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &InspectorState {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, InspectorState::Open(_))
    }

    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            InspectorState::Open(draft) => Some(draft),
            InspectorState::Closed => None,
        }
    }

    /// Identity of the widget being edited.
    #[must_use]
    pub fn selected_id(&self) -> Option<&WidgetId> {
        self.draft().map(|d| d.widget.id())
    }

    /// Current validation message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.draft().and_then(Draft::error)
    }

    /// Whether save is enabled: a draft is open and shows no error.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.draft().is_some_and(|d| d.error.is_none())
    }

    /// Select a widget, replacing any open draft. The draft starts with no
    /// validation message.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotFound` if the identity is not in the document.
    pub fn open(&mut self, doc: &Document, id: &str) -> Result<(), EditorError> {
        let widget = doc
            .find(id)
            .ok_or_else(|| EditorError::NotFound(id.to_owned()))?
            .to_widget();
        debug!(%id, kind = widget.type_name(), "draft opened");
        self.state = InspectorState::Open(Draft { widget, error: None });
        Ok(())
    }

    /// Apply an edit to the draft and recompute validation. The document is
    /// not touched.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` without a draft, `NotApplicable` when the edit does
    /// not fit the draft's type, `NoSuchCell` for an out-of-range table cell,
    /// and `Layout` for an unparsable column preset.
    pub fn edit(&mut self, edit: DraftEdit) -> Result<(), EditorError> {
        let InspectorState::Open(draft) = &mut self.state else {
            return Err(EditorError::NotOpen);
        };
        apply_edit(&mut draft.widget, edit)?;
        draft.error = validate(&draft.widget);
        Ok(())
    }

    /// Commit the draft into the document and close.
    ///
    /// The draft's identity is looked up as a row first, then as a leaf. If
    /// it matches nothing (the document was replaced meanwhile) nothing is
    /// written and the result is `Action::None`.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` without a draft and `Invalid` when the draft fails
    /// validation; the draft then stays open and the document is unchanged.
    pub fn save(&mut self, doc: &mut Document) -> Result<Action, EditorError> {
        let InspectorState::Open(draft) = &mut self.state else {
            return Err(EditorError::NotOpen);
        };
        if let Some(message) = validate(&draft.widget) {
            draft.error = Some(message.clone());
            return Err(EditorError::Invalid(message));
        }
        let InspectorState::Open(draft) = std::mem::take(&mut self.state) else {
            return Err(EditorError::NotOpen);
        };
        // Replacing a node never fails; an unmatched identity yields Action::None.
        let action = doc
            .apply(Command::CommitDraft(draft.widget))
            .unwrap_or(Action::None);
        if action == Action::None {
            warn!("draft identity no longer in document; save discarded");
        }
        Ok(action)
    }

    /// Discard the draft. The document is left exactly as it was.
    pub fn cancel(&mut self) {
        if let InspectorState::Open(draft) = std::mem::take(&mut self.state) {
            debug!(id = %draft.widget.id(), "draft discarded");
        }
    }

    /// Delete the selected widget from the document and close, whatever the
    /// draft's validation state.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` without a draft.
    pub fn delete(&mut self, doc: &mut Document) -> Result<Action, EditorError> {
        let InspectorState::Open(draft) = std::mem::take(&mut self.state) else {
            return Err(EditorError::NotOpen);
        };
        let id = draft.widget.id().clone();
        Ok(doc.apply(Command::DeleteWidget { id }).unwrap_or(Action::None))
    }
}

fn apply_edit(widget: &mut Widget, edit: DraftEdit) -> Result<(), EditorError> {
    match widget {
        Widget::Leaf(leaf) => edit_leaf(leaf, edit),
        Widget::Row(row) => match edit {
            DraftEdit::ChangeColumnLayout(preset) => {
                let dropped = row.columns.relayout(LayoutSpec::parse(preset.layout)?);
                if !dropped.is_empty() {
                    warn!(id = %row.id, dropped = dropped.len(), "layout change dropped widgets from removed columns");
                }
                row.tag = preset.tag.to_owned();
                Ok(())
            }
            other => Err(EditorError::NotApplicable { edit: other.name(), widget: row.tag.clone() }),
        },
    }
}

fn edit_leaf(leaf: &mut LeafWidget, edit: DraftEdit) -> Result<(), EditorError> {
    let edit = match edit {
        DraftEdit::SetStyle { key, value } => {
            leaf.style_mut().insert(key, value);
            return Ok(());
        }
        other => other,
    };
    match (&mut leaf.content, edit) {
        (LeafContent::Text(text), DraftEdit::SetText(value)) => {
            *text = value;
            if leaf.style.is_none() {
                leaf.style = Some(factory::default_text_style());
            }
        }
        (LeafContent::Image(source), DraftEdit::SetImageSource(value)) => *source = value,
        (LeafContent::Button(label), DraftEdit::SetButtonLabel(value)) => *label = value,
        (LeafContent::Card(card), DraftEdit::SetCardTitle(value)) => card.title = value,
        (LeafContent::Card(card), DraftEdit::SetCardDescription(value)) => card.description = value,
        (LeafContent::Table(table), DraftEdit::SetTableCell { row, column, value }) => {
            if !table.set_cell(row, column, value) {
                return Err(EditorError::NoSuchCell { row, column });
            }
        }
        (LeafContent::Table(table), DraftEdit::AddTableRow) => table.add_row(),
        (LeafContent::Table(table), DraftEdit::RemoveTableRow) => {
            table.remove_row();
        }
        (LeafContent::Table(table), DraftEdit::AddTableColumn) => table.add_column(),
        (LeafContent::Table(table), DraftEdit::RemoveTableColumn) => {
            table.remove_column();
        }
        (content, edit) => {
            return Err(EditorError::NotApplicable { edit: edit.name(), widget: content.kind().to_string() });
        }
    }
    Ok(())
}
