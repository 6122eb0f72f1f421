use serde_json::json;

use super::*;
use crate::factory;
use crate::widget::LeafContent;

fn row(layout: &str) -> Row {
    factory::create_column_row(layout).unwrap()
}

fn row_with_id(id: &str, layout: &str) -> Row {
    let mut row = row(layout);
    row.id = id.to_owned();
    row
}

fn text(id: &str, body: &str) -> LeafWidget {
    LeafWidget { id: id.to_owned(), content: LeafContent::Text(body.to_owned()), style: None }
}

/// Rows `a`, `b`, `c` (50-50) with leaf `a0` in row `a` column 0 and `a1`
/// in row `a` column 1.
fn sample() -> Document {
    let mut doc = Document::new();
    for id in ["a", "b", "c"] {
        doc.apply(Command::InsertRow(row_with_id(id, "50-50"))).unwrap();
    }
    doc.apply(Command::InsertLeaf { row: "a".into(), column: 0, leaf: text("a0", "zero") }).unwrap();
    doc.apply(Command::InsertLeaf { row: "a".into(), column: 1, leaf: text("a1", "one") }).unwrap();
    doc
}

fn order(doc: &Document) -> Vec<(&str, u32)> {
    doc.rows().iter().map(|r| (r.id.as_str(), r.y)).collect()
}

// =============================================================
// InsertRow
// =============================================================

#[test]
fn insert_row_appends_at_previous_count() {
    let mut doc = Document::new();
    for expected in 0..4 {
        let action = doc.apply(Command::InsertRow(row("50-50"))).unwrap();
        let Action::RowInserted { id, index } = action else {
            panic!("expected RowInserted");
        };
        assert_eq!(index, expected);
        assert_eq!(doc.row(&id).unwrap().y, u32::try_from(expected).unwrap());
    }
    assert_eq!(doc.len(), 4);
    assert!(doc.violations().is_empty());
}

#[test]
fn insert_row_normalizes_geometry() {
    let mut doc = Document::new();
    let mut incoming = row_with_id("r", "100");
    incoming.x = 5;
    incoming.w = 3;
    incoming.h = 9;
    incoming.y = 42;
    doc.apply(Command::InsertRow(incoming)).unwrap();
    let placed = doc.row("r").unwrap();
    assert_eq!((placed.x, placed.y, placed.w, placed.h), (0, 0, 12, 4));
}

#[test]
fn insert_row_rejects_duplicate_identity() {
    let mut doc = sample();
    let before = doc.clone();
    let err = doc.apply(Command::InsertRow(row_with_id("b", "100"))).unwrap_err();
    assert_eq!(err, DocError::DuplicateId("b".into()));
    assert_eq!(doc, before);
}

#[test]
fn insert_row_rejects_leaf_identity_already_placed() {
    let mut doc = sample();
    let mut incoming = row_with_id("d", "100");
    incoming.columns.column_mut(0).unwrap().widgets.push(text("a0", "dup"));
    let err = doc.apply(Command::InsertRow(incoming)).unwrap_err();
    assert_eq!(err, DocError::DuplicateId("a0".into()));
    assert_eq!(doc.len(), 3);
}

// =============================================================
// ReorderRow
// =============================================================

#[test]
fn reorder_moves_row_to_end() {
    let mut doc = sample();
    let action = doc.apply(Command::ReorderRow { id: "a".into() }).unwrap();
    assert_eq!(action, Action::RowMoved { id: "a".into(), from: 0, to: 2 });
    assert_eq!(order(&doc), vec![("b", 0), ("c", 1), ("a", 2)]);
    assert!(doc.contains("a0"), "leaves travel with their row");
}

#[test]
fn reorder_last_row_is_stable() {
    let mut doc = sample();
    doc.apply(Command::ReorderRow { id: "c".into() }).unwrap();
    assert_eq!(order(&doc), vec![("a", 0), ("b", 1), ("c", 2)]);
}

#[test]
fn reorder_unknown_row_fails() {
    let mut doc = sample();
    let err = doc.apply(Command::ReorderRow { id: "zz".into() }).unwrap_err();
    assert_eq!(err, DocError::UnknownRow("zz".into()));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================
// InsertLeaf
// =============================================================

#[test]
fn insert_leaf_appends_to_column() {
    let mut doc = sample();
    let action = doc
        .apply(Command::InsertLeaf { row: "a".into(), column: 0, leaf: text("n", "new") })
        .unwrap();
    assert_eq!(action, Action::LeafInserted { row: "a".into(), column: 0, id: "n".into() });
    let column = doc.row("a").unwrap().columns.column(0).unwrap();
    let ids: Vec<&str> = column.widgets.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["a0", "n"]);
}

#[test]
fn insert_leaf_unknown_targets() {
    let mut doc = sample();
    let before = doc.clone();
    assert_eq!(
        doc.apply(Command::InsertLeaf { row: "zz".into(), column: 0, leaf: text("n", "x") }),
        Err(DocError::UnknownRow("zz".into()))
    );
    assert_eq!(
        doc.apply(Command::InsertLeaf { row: "a".into(), column: 2, leaf: text("n", "x") }),
        Err(DocError::UnknownColumn { row: "a".into(), column: 2 })
    );
    assert_eq!(doc, before);
}

#[test]
fn insert_leaf_rejects_duplicate_identity() {
    let mut doc = sample();
    let err = doc
        .apply(Command::InsertLeaf { row: "b".into(), column: 0, leaf: text("a", "clash") })
        .unwrap_err();
    assert_eq!(err, DocError::DuplicateId("a".into()));
}

// =============================================================
// Reject
// =============================================================

#[test]
fn reject_leaves_document_untouched() {
    let mut doc = sample();
    let before = doc.clone();
    let err = doc.apply(Command::Reject(DocError::RowInsideColumn)).unwrap_err();
    assert_eq!(err.to_string(), "Columns cannot be dropped inside other columns.");
    assert_eq!(err.kind(), ErrorKind::StructuralReject);
    assert_eq!(doc, before);
}

#[test]
fn reject_messages() {
    assert_eq!(DocError::LeafOutsideColumn.to_string(), "Please drop widgets inside a column.");
    assert_eq!(DocError::LeafOutsideColumn.error_code(), "E_LEAF_OUTSIDE_COLUMN");
}

// =============================================================
// Lookup
// =============================================================

#[test]
fn locate_finds_rows_and_leaves() {
    let doc = sample();
    assert_eq!(doc.locate("b"), Some(Location::Row { index: 1 }));
    assert_eq!(doc.locate("a1"), Some(Location::Leaf { row: 0, column: 1, index: 0 }));
    assert_eq!(doc.locate("missing"), None);
}

#[test]
fn find_returns_borrowed_node() {
    let doc = sample();
    let Some(WidgetRef::Leaf(leaf)) = doc.find("a0") else {
        panic!("expected leaf");
    };
    assert_eq!(leaf.content, LeafContent::Text("zero".into()));
    assert!(matches!(doc.find("c"), Some(WidgetRef::Row(r)) if r.id == "c"));
}

#[test]
fn ids_lists_rows_then_their_leaves() {
    let doc = sample();
    let ids: Vec<&str> = doc.ids().map(String::as_str).collect();
    assert_eq!(ids, vec!["a", "a0", "a1", "b", "c"]);
}

#[test]
fn layout_items_follow_row_order() {
    let doc = sample();
    let items = doc.layout_items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2], LayoutItem { i: "c".into(), x: 0, y: 2, w: 12, h: 4 });
}

// =============================================================
// CommitDraft
// =============================================================

#[test]
fn commit_replaces_leaf_in_place() {
    let mut doc = sample();
    let action = doc.apply(Command::CommitDraft(Widget::Leaf(text("a1", "edited")))).unwrap();
    assert_eq!(action, Action::WidgetReplaced { id: "a1".into() });
    assert_eq!(doc.locate("a1"), Some(Location::Leaf { row: 0, column: 1, index: 0 }));
    let Some(WidgetRef::Leaf(leaf)) = doc.find("a1") else {
        panic!("expected leaf");
    };
    assert_eq!(leaf.content, LeafContent::Text("edited".into()));
}

#[test]
fn commit_replaces_row_and_keeps_position() {
    let mut doc = sample();
    let mut replacement = row_with_id("b", "100");
    replacement.y = 99;
    doc.apply(Command::CommitDraft(Widget::Row(replacement))).unwrap();
    let placed = doc.row("b").unwrap();
    assert_eq!(placed.y, 1);
    assert_eq!(placed.columns.widths(), vec![12]);
}

#[test]
fn commit_unknown_identity_is_noop() {
    let mut doc = sample();
    let before = doc.clone();
    let action = doc.apply(Command::CommitDraft(Widget::Leaf(text("gone", "x")))).unwrap();
    assert_eq!(action, Action::None);
    assert_eq!(doc, before);
}

#[test]
fn commit_kind_mismatch_is_noop() {
    let mut doc = sample();
    let before = doc.clone();
    let action = doc.apply(Command::CommitDraft(Widget::Leaf(text("b", "not a row")))).unwrap();
    assert_eq!(action, Action::None);
    assert_eq!(doc, before);
}

// =============================================================
// DeleteWidget
// =============================================================

#[test]
fn delete_row_cascades_to_leaves() {
    let mut doc = sample();
    let action = doc.apply(Command::DeleteWidget { id: "a".into() }).unwrap();
    assert_eq!(action, Action::WidgetDeleted { id: "a".into(), cascaded: vec!["a0".into(), "a1".into()] });
    assert!(!doc.contains("a"));
    assert!(!doc.contains("a0"));
    assert!(!doc.contains("a1"));
    assert_eq!(order(&doc), vec![("b", 0), ("c", 1)]);
}

#[test]
fn delete_leaf_keeps_row() {
    let mut doc = sample();
    let action = doc.apply(Command::DeleteWidget { id: "a0".into() }).unwrap();
    assert_eq!(action, Action::WidgetDeleted { id: "a0".into(), cascaded: Vec::new() });
    assert!(doc.contains("a"));
    assert!(doc.row("a").unwrap().columns.column(0).unwrap().widgets.is_empty());
}

#[test]
fn delete_unknown_is_noop() {
    let mut doc = sample();
    let before = doc.clone();
    assert_eq!(doc.apply(Command::DeleteWidget { id: "nope".into() }), Ok(Action::None));
    assert_eq!(doc, before);
}

// =============================================================
// Snapshots and invariants
// =============================================================

#[test]
fn document_serializes_as_row_array() {
    let doc = sample();
    let value = serde_json::to_value(&doc).unwrap();
    assert!(value.is_array());
    assert_eq!(value[0]["i"], json!("a"));
    assert_eq!(value[0]["content"]["columns"][1][0]["content"], json!("one"));
}

#[test]
fn load_snapshot_replaces_and_renumbers() {
    let raw = json!([
        { "i": "x", "type": "Column-1", "y": 7, "content": { "layout": "100", "columns": [[]], "columnWidths": [{ "width": 12 }] } },
        { "i": "y", "type": "Column-1", "y": 3, "content": { "layout": "100", "columns": [[]], "columnWidths": [{ "width": 12 }] } }
    ]);
    let snapshot: Document = serde_json::from_value(raw).unwrap();
    assert_eq!(
        snapshot.violations(),
        vec![
            Violation::OutOfOrder { id: "x".into(), y: 7, index: 0 },
            Violation::OutOfOrder { id: "y".into(), y: 3, index: 1 },
        ]
    );

    let mut doc = sample();
    doc.load_snapshot(snapshot);
    assert_eq!(order(&doc), vec![("x", 0), ("y", 1)]);
    assert!(doc.violations().is_empty());
}

#[test]
fn violations_flag_duplicates_and_width_gaps() {
    let mut dup = row_with_id("r2", "70-30");
    dup.columns.column_mut(0).unwrap().widgets.push(text("r1", "same id as row"));
    let doc = Document::from_rows(vec![row_with_id("r1", "50-50"), dup]);
    assert_eq!(
        doc.violations(),
        vec![Violation::DuplicateId("r1".into()), Violation::WidthGap { id: "r2".into(), sum: 11 }]
    );
}

#[test]
fn clear_empties_document() {
    let mut doc = sample();
    doc.clear();
    assert!(doc.is_empty());
    assert!(!doc.contains("a0"));
}
