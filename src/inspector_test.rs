use serde_json::json;

use super::*;
use crate::factory::INSPECTOR_PRESETS;
use crate::widget::{CardContent, LeafKind, Row};

const ROW: &str = "r1";

/// A 33-33-33 row holding a text leaf `t` and a card `c` in column 0, a
/// table `tb` in column 1 and a button `b` in column 2.
fn sample() -> Document {
    let mut row = factory::create_column_row("33-33-33").unwrap();
    row.id = ROW.to_owned();
    let mut doc = Document::new();
    doc.apply(Command::InsertRow(row)).unwrap();
    let leaves = [
        (0, "t", LeafContent::Text("Hello".into()), None),
        (0, "c", factory::default_content(LeafKind::Card), None),
        (1, "tb", factory::default_content(LeafKind::Table), None),
        (2, "b", factory::default_content(LeafKind::Button), factory::default_style(LeafKind::Button)),
    ];
    for (column, id, content, style) in leaves {
        let leaf = LeafWidget { id: id.to_owned(), content, style };
        doc.apply(Command::InsertLeaf { row: ROW.into(), column, leaf }).unwrap();
    }
    doc
}

fn leaf<'a>(doc: &'a Document, id: &str) -> &'a LeafWidget {
    match doc.find(id) {
        Some(crate::doc::WidgetRef::Leaf(leaf)) => leaf,
        other => panic!("expected leaf {id}, got {other:?}"),
    }
}

fn draft_leaf(inspector: &Inspector) -> &LeafWidget {
    match inspector.draft().map(Draft::widget) {
        Some(Widget::Leaf(leaf)) => leaf,
        other => panic!("expected leaf draft, got {other:?}"),
    }
}

fn draft_row(inspector: &Inspector) -> &Row {
    match inspector.draft().map(Draft::widget) {
        Some(Widget::Row(row)) => row,
        other => panic!("expected row draft, got {other:?}"),
    }
}

fn opened(doc: &Document, id: &str) -> Inspector {
    let mut inspector = Inspector::new();
    inspector.open(doc, id).unwrap();
    inspector
}

// =============================================================
// Validation
// =============================================================

fn card(title: &str, description: &str) -> Widget {
    Widget::Leaf(LeafWidget {
        id: "c".into(),
        content: LeafContent::Card(CardContent { title: title.into(), description: description.into() }),
        style: None,
    })
}

#[test]
fn validate_text() {
    let blank = Widget::Leaf(LeafWidget { id: "t".into(), content: LeafContent::Text("  ".into()), style: None });
    assert_eq!(validate(&blank).as_deref(), Some("Text content cannot be empty"));
    let ok = Widget::Leaf(LeafWidget { id: "t".into(), content: LeafContent::Text("x".into()), style: None });
    assert_eq!(validate(&ok), None);
}

#[test]
fn validate_card_messages() {
    assert_eq!(validate(&card("", "")).as_deref(), Some("Title and description cannot be empty"));
    assert_eq!(validate(&card(" ", "d")).as_deref(), Some("Title cannot be empty"));
    assert_eq!(validate(&card("t", "")).as_deref(), Some("Description cannot be empty"));
    assert_eq!(validate(&card("t", "d")), None);
}

#[test]
fn validate_accepts_other_kinds() {
    let doc = sample();
    for id in [ROW, "tb", "b"] {
        assert_eq!(validate(&doc.find(id).unwrap().to_widget()), None, "{id}");
    }
    let empty_image = Widget::Leaf(LeafWidget { id: "i".into(), content: LeafContent::Image(String::new()), style: None });
    assert_eq!(validate(&empty_image), None);
}

// =============================================================
// Open / cancel
// =============================================================

#[test]
fn starts_closed() {
    let inspector = Inspector::new();
    assert_eq!(inspector.state(), &InspectorState::Closed);
    assert!(!inspector.can_save());
    assert_eq!(inspector.selected_id(), None);
}

#[test]
fn open_unknown_identity_fails() {
    let doc = sample();
    let mut inspector = Inspector::new();
    let err = inspector.open(&doc, "nope").unwrap_err();
    assert_eq!(err, EditorError::NotFound("nope".into()));
    assert!(!inspector.is_open());
}

#[test]
fn open_starts_without_error() {
    let doc = sample();
    let inspector = opened(&doc, "t");
    assert!(inspector.is_open());
    assert_eq!(inspector.selected_id().map(String::as_str), Some("t"));
    assert_eq!(inspector.error(), None);
    assert!(inspector.can_save());
}

#[test]
fn edits_do_not_touch_document() {
    let doc = sample();
    let before = doc.clone();
    let mut inspector = opened(&doc, "t");
    inspector.edit(DraftEdit::SetText("Changed".into())).unwrap();
    assert_eq!(draft_leaf(&inspector).content, LeafContent::Text("Changed".into()));
    assert_eq!(doc, before);
}

#[test]
fn cancel_discards_draft() {
    let mut doc = sample();
    let before = doc.clone();
    let mut inspector = opened(&doc, "t");
    inspector.edit(DraftEdit::SetText("Changed".into())).unwrap();
    inspector.cancel();
    assert!(!inspector.is_open());
    assert_eq!(inspector.save(&mut doc), Err(EditorError::NotOpen));
    assert_eq!(doc, before);
}

#[test]
fn reopening_replaces_draft() {
    let doc = sample();
    let mut inspector = opened(&doc, "t");
    inspector.edit(DraftEdit::SetText(String::new())).unwrap();
    inspector.open(&doc, "b").unwrap();
    assert_eq!(inspector.selected_id().map(String::as_str), Some("b"));
    assert_eq!(inspector.error(), None);
}

#[test]
fn edit_without_draft_fails() {
    let mut inspector = Inspector::new();
    assert_eq!(inspector.edit(DraftEdit::AddTableRow), Err(EditorError::NotOpen));
}

// =============================================================
// Save
// =============================================================

#[test]
fn save_commits_and_closes() {
    let mut doc = sample();
    let mut inspector = opened(&doc, "t");
    inspector.edit(DraftEdit::SetText("World".into())).unwrap();
    let action = inspector.save(&mut doc).unwrap();
    assert_eq!(action, Action::WidgetReplaced { id: "t".into() });
    assert!(!inspector.is_open());
    assert_eq!(leaf(&doc, "t").content, LeafContent::Text("World".into()));
}

#[test]
fn invalid_draft_blocks_save() {
    let mut doc = sample();
    let before = doc.clone();
    let mut inspector = opened(&doc, "c");
    inspector.edit(DraftEdit::SetCardTitle(String::new())).unwrap();
    assert_eq!(inspector.error(), Some("Title cannot be empty"));
    assert!(!inspector.can_save());

    let err = inspector.save(&mut doc).unwrap_err();
    assert_eq!(err, EditorError::Invalid("Title cannot be empty".into()));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(inspector.is_open());
    assert_eq!(doc, before);
}

#[test]
fn fixing_the_error_reenables_save() {
    let mut doc = sample();
    let mut inspector = opened(&doc, "c");
    inspector.edit(DraftEdit::SetCardTitle(String::new())).unwrap();
    inspector.edit(DraftEdit::SetCardDescription(String::new())).unwrap();
    assert_eq!(inspector.error(), Some("Title and description cannot be empty"));
    inspector.edit(DraftEdit::SetCardTitle("New".into())).unwrap();
    inspector.edit(DraftEdit::SetCardDescription("Body".into())).unwrap();
    assert!(inspector.can_save());
    inspector.save(&mut doc).unwrap();
    assert_eq!(
        leaf(&doc, "c").content,
        LeafContent::Card(CardContent { title: "New".into(), description: "Body".into() })
    );
}

#[test]
fn save_after_document_replaced_is_noop() {
    let mut doc = sample();
    let mut inspector = opened(&doc, "t");
    doc.clear();
    assert_eq!(inspector.save(&mut doc), Ok(Action::None));
    assert!(!inspector.is_open());
    assert!(doc.is_empty());
}

// =============================================================
// Delete
// =============================================================

#[test]
fn delete_ignores_validation() {
    let mut doc = sample();
    let mut inspector = opened(&doc, "c");
    inspector.edit(DraftEdit::SetCardTitle(String::new())).unwrap();
    let action = inspector.delete(&mut doc).unwrap();
    assert_eq!(action, Action::WidgetDeleted { id: "c".into(), cascaded: Vec::new() });
    assert!(!doc.contains("c"));
    assert!(!inspector.is_open());
}

#[test]
fn deleting_row_draft_cascades() {
    let mut doc = sample();
    let mut inspector = opened(&doc, ROW);
    inspector.delete(&mut doc).unwrap();
    assert!(doc.is_empty());
    for id in ["t", "c", "tb", "b"] {
        assert!(!doc.contains(id), "{id}");
    }
}

#[test]
fn delete_without_draft_fails() {
    let mut doc = sample();
    assert_eq!(Inspector::new().delete(&mut doc), Err(EditorError::NotOpen));
}

// =============================================================
// Per-type edits
// =============================================================

#[test]
fn set_text_installs_default_style_once() {
    let doc = sample();
    let mut inspector = opened(&doc, "t");
    assert_eq!(draft_leaf(&inspector).style, None);
    inspector.edit(DraftEdit::SetText("Styled".into())).unwrap();
    assert_eq!(draft_leaf(&inspector).style_props().font_size(), "16px");

    inspector
        .edit(DraftEdit::SetStyle { key: "fontSize".into(), value: json!("24px") })
        .unwrap();
    inspector.edit(DraftEdit::SetText("Again".into())).unwrap();
    assert_eq!(draft_leaf(&inspector).style_props().font_size(), "24px");
}

#[test]
fn empty_text_sets_error() {
    let doc = sample();
    let mut inspector = opened(&doc, "t");
    inspector.edit(DraftEdit::SetText(String::new())).unwrap();
    assert_eq!(inspector.error(), Some("Text content cannot be empty"));
}

#[test]
fn button_label_and_action() {
    let mut doc = sample();
    let mut inspector = opened(&doc, "b");
    inspector.edit(DraftEdit::SetButtonLabel("Buy".into())).unwrap();
    inspector
        .edit(DraftEdit::SetStyle { key: "actionUrl".into(), value: json!("https://shop.test") })
        .unwrap();
    inspector.save(&mut doc).unwrap();
    let button = leaf(&doc, "b");
    assert_eq!(button.content, LeafContent::Button("Buy".into()));
    assert_eq!(button.button_action(), Some(crate::widget::ButtonAction::OpenUrl("https://shop.test")));
}

#[test]
fn image_source_and_alignment() {
    let mut doc = sample();
    let image = LeafWidget { id: "img".into(), content: LeafContent::Image(String::new()), style: None };
    doc.apply(Command::InsertLeaf { row: ROW.into(), column: 2, leaf: image }).unwrap();
    let mut inspector = opened(&doc, "img");
    inspector.edit(DraftEdit::SetImageSource("data:image/png;base64,AAAA".into())).unwrap();
    inspector
        .edit(DraftEdit::SetStyle { key: "textAlign".into(), value: json!("center") })
        .unwrap();
    inspector.save(&mut doc).unwrap();
    let saved = leaf(&doc, "img");
    assert_eq!(saved.content, LeafContent::Image("data:image/png;base64,AAAA".into()));
    assert_eq!(saved.style_props().text_align(), "center");
}

#[test]
fn table_edits() {
    let mut doc = sample();
    let mut inspector = opened(&doc, "tb");
    inspector.edit(DraftEdit::AddTableRow).unwrap();
    inspector.edit(DraftEdit::RemoveTableColumn).unwrap();
    inspector
        .edit(DraftEdit::SetTableCell { row: 3, column: 1, value: "last".into() })
        .unwrap();
    assert_eq!(
        inspector.edit(DraftEdit::SetTableCell { row: 0, column: 2, value: "x".into() }),
        Err(EditorError::NoSuchCell { row: 0, column: 2 })
    );
    inspector.save(&mut doc).unwrap();

    let LeafContent::Table(table) = &leaf(&doc, "tb").content else {
        panic!("expected table");
    };
    assert_eq!((table.rows, table.columns), (4, 2));
    assert_eq!(table.data[3][1], "last");
}

#[test]
fn table_removal_stops_at_one() {
    let doc = sample();
    let mut inspector = opened(&doc, "tb");
    for _ in 0..5 {
        inspector.edit(DraftEdit::RemoveTableRow).unwrap();
        inspector.edit(DraftEdit::RemoveTableColumn).unwrap();
    }
    let LeafContent::Table(table) = &draft_leaf(&inspector).content else {
        panic!("expected table");
    };
    assert_eq!((table.rows, table.columns), (1, 1));
}

#[test]
fn mismatched_edit_is_refused() {
    let doc = sample();
    let mut inspector = opened(&doc, "b");
    let err = inspector.edit(DraftEdit::SetText("x".into())).unwrap_err();
    assert_eq!(err, EditorError::NotApplicable { edit: "SetText", widget: "Button".into() });
    assert_eq!(draft_leaf(&inspector).content, LeafContent::Button("Click Me".into()));
}

// =============================================================
// Row layout
// =============================================================

#[test]
fn change_layout_keeps_surviving_columns() {
    let mut doc = sample();
    let mut inspector = opened(&doc, ROW);
    inspector.edit(DraftEdit::ChangeColumnLayout(INSPECTOR_PRESETS[3])).unwrap();

    let row = draft_row(&inspector);
    assert_eq!(row.tag, "Column-2-uneven");
    assert_eq!(row.columns.widths(), vec![8, 3]);

    inspector.save(&mut doc).unwrap();
    assert!(doc.contains("t"));
    assert!(doc.contains("c"));
    assert!(doc.contains("tb"));
    assert!(!doc.contains("b"), "leaves of removed columns are dropped");
    assert_eq!(doc.row(ROW).unwrap().y, 0);
}

#[test]
fn row_draft_refuses_leaf_edits() {
    let doc = sample();
    let mut inspector = opened(&doc, ROW);
    let err = inspector.edit(DraftEdit::AddTableRow).unwrap_err();
    assert_eq!(err, EditorError::NotApplicable { edit: "AddTableRow", widget: "Column-33-33-33".into() });
    assert_eq!(err.error_code(), "E_EDIT_NOT_APPLICABLE");
}
