//! The builder facade: the one object the rendering layer drives.
//!
//! `Builder` owns the document, the inspector and the name of the layout
//! last loaded. Gesture handlers map one-to-one onto methods here; each
//! returns the [`Action`] describing the document change so the host knows
//! what to redraw.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{info, warn};

use crate::dnd::{self, DropTarget};
use crate::doc::{Action, Command, DocError, Document};
use crate::factory::{self, ColumnPreset};
use crate::inspector::{DraftEdit, EditorError, Inspector};
use crate::persistence::{LayoutStore, PersistenceError, Storage};
use crate::widget::WidgetId;

#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub doc: Document,
    pub inspector: Inspector,
    selected_layout: Option<String>,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the layout last loaded, if any.
    #[must_use]
    pub fn selected_layout(&self) -> Option<&str> {
        self.selected_layout.as_deref()
    }

    // --- Composition ---

    /// Append a row for a preset, as if it had been dropped on the canvas.
    ///
    /// # Errors
    ///
    /// Returns `DocError::Shape` if the preset's layout does not parse.
    pub fn add_row(&mut self, preset: &ColumnPreset) -> Result<Action, DocError> {
        let row = factory::create_preset_row(preset)?;
        self.doc.apply(Command::InsertRow(row))
    }

    /// Serialize a placed widget for the transfer slot.
    ///
    /// # Errors
    ///
    /// Returns `DocError::Payload` if the identity is not in the document.
    pub fn drag_start(&self, id: &str) -> Result<String, DocError> {
        let widget = self
            .doc
            .find(id)
            .ok_or_else(|| DocError::Payload(format!("widget not found: {id}")))?
            .to_widget();
        dnd::encode_widget(&widget)
    }

    /// Handle a drop of a raw transfer payload on `target`.
    ///
    /// # Errors
    ///
    /// Returns the structural rejection or decode failure; the document is
    /// unchanged in that case.
    pub fn drop_payload(&mut self, raw: &str, target: &DropTarget) -> Result<Action, DocError> {
        dnd::drop_payload(&mut self.doc, raw, target)
    }

    /// Delete a widget outside the inspector (the row delete button). Any
    /// open draft is closed.
    pub fn delete_widget(&mut self, id: &str) -> Action {
        self.inspector.cancel();
        self.doc
            .apply(Command::DeleteWidget { id: id.to_owned() })
            .unwrap_or(Action::None)
    }

    /// Empty the canvas and forget the selected layout.
    pub fn clear(&mut self) {
        self.inspector.cancel();
        self.doc.clear();
        self.selected_layout = None;
        info!("canvas cleared");
    }

    // --- Inspector ---

    /// Open a draft of the widget with this identity.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotFound` for an unknown identity.
    pub fn select(&mut self, id: &str) -> Result<(), EditorError> {
        self.inspector.open(&self.doc, id)
    }

    /// The identity being edited, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&WidgetId> {
        self.inspector.selected_id()
    }

    /// Apply an edit to the open draft.
    ///
    /// # Errors
    ///
    /// See [`Inspector::edit`].
    pub fn edit(&mut self, edit: DraftEdit) -> Result<(), EditorError> {
        self.inspector.edit(edit)
    }

    /// Commit the open draft.
    ///
    /// # Errors
    ///
    /// See [`Inspector::save`].
    pub fn save_draft(&mut self) -> Result<Action, EditorError> {
        self.inspector.save(&mut self.doc)
    }

    pub fn cancel_draft(&mut self) {
        self.inspector.cancel();
    }

    /// Delete the widget the inspector has open.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotOpen` without a draft.
    pub fn delete_selected(&mut self) -> Result<Action, EditorError> {
        self.inspector.delete(&mut self.doc)
    }

    // --- Layouts ---

    /// Save the current document under `name`.
    ///
    /// # Errors
    ///
    /// See [`LayoutStore::save`].
    pub fn save_layout<S: Storage>(&self, store: &mut LayoutStore<S>, name: &str) -> Result<u64, PersistenceError> {
        store.save(name, &self.doc)
    }

    /// Replace the document with the layout saved under `name` and record it
    /// as the selected layout. An open draft stays open.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` for an unknown name; the document
    /// is unchanged.
    pub fn load_layout<S: Storage>(&mut self, store: &LayoutStore<S>, name: &str) -> Result<usize, PersistenceError> {
        let snapshot = store.load(name)?;
        if self.inspector.is_open() {
            warn!(%name, "layout loaded while a draft is open");
        }
        self.doc.load_snapshot(snapshot);
        self.selected_layout = Some(name.to_owned());
        info!(%name, rows = self.doc.len(), "layout loaded");
        Ok(self.doc.len())
    }
}
