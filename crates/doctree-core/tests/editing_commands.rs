//! Command dispatch end to end: locality, ancestor fallback, range
//! reduction and the document-level block insertions.

use doctree_core::manager::DocManager;
use doctree_core::Command;
use doctree_store::{Cursor, Key, LocalBackend, Point};
use serde_json::{json, Value};

fn manager_with(blocks: Value) -> DocManager {
    DocManager::from_value(
        Box::new(LocalBackend::new()),
        &json!({"kind": "doc", "content": blocks}),
    )
    .unwrap()
}

fn paragraphs(texts: &[&str]) -> Value {
    Value::Array(
        texts
            .iter()
            .map(|t| json!({"kind": "paragraph", "content": t}))
            .collect(),
    )
}

/// Key of the text leaf inside the paragraph at `block`.
fn paragraph_text(manager: &DocManager, block: usize) -> Key {
    let root = manager.root().unwrap();
    manager.store().entry(root.children()[block]).child()
}

fn doc_texts(manager: &DocManager) -> Vec<String> {
    match manager.read() {
        Value::Object(doc) => doc["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["content"].as_str().unwrap_or("<block>").to_string())
            .collect(),
        _ => panic!("document must read as an object"),
    }
}

#[test]
fn insert_text_resolves_at_the_leaf() {
    let mut manager = manager_with(paragraphs(&["ab"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(text, 1))));

    assert!(manager.dispatch(Command::InsertText("x".into())));
    assert_eq!(doc_texts(&manager), ["axb"]);
    // Resolved in place: same leaf key, caret right after the insertion.
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(text, 2)))
    );
    assert_eq!(manager.root().unwrap().children().len(), 1);
}

#[test]
fn backspace_at_block_start_merges_with_previous_paragraph() {
    let mut manager = manager_with(paragraphs(&["ab", "cd"]));
    let second = paragraph_text(&manager, 1);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(second, 0))));

    assert!(manager.dispatch(Command::DeleteBackward));
    assert_eq!(doc_texts(&manager), ["abcd"]);
    let first = paragraph_text(&manager, 0);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(first, 2))),
        "caret lands on the junction"
    );
}

#[test]
fn delete_forward_at_block_end_merges_with_next_paragraph() {
    let mut manager = manager_with(paragraphs(&["ab", "cd"]));
    let first = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(first, 2))));

    assert!(manager.dispatch(Command::DeleteForward));
    assert_eq!(doc_texts(&manager), ["abcd"]);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(first, 2)))
    );
}

#[test]
fn delete_forward_at_document_end_declines() {
    let mut manager = manager_with(paragraphs(&["ab"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(text, 2))));

    let before = manager.read();
    assert!(!manager.dispatch(Command::DeleteForward));
    assert_eq!(manager.read(), before, "a failed dispatch leaves the tree alone");
}

#[test]
fn insert_new_element_splits_the_paragraph() {
    let mut manager = manager_with(paragraphs(&["hello"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(text, 2))));

    assert!(manager.dispatch(Command::InsertNewElement));
    assert_eq!(doc_texts(&manager), ["he", "llo"]);
    let second = paragraph_text(&manager, 1);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(second, 0)))
    );
}

#[test]
fn delete_range_within_one_leaf() {
    let mut manager = manager_with(paragraphs(&["hello"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::new(
        Point::offset(text, 1),
        Point::offset(text, 4),
    )));

    assert!(manager.dispatch(Command::DeleteRange));
    assert_eq!(doc_texts(&manager), ["ho"]);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(text, 1)))
    );
}

#[test]
fn delete_range_across_paragraphs_merges_the_remainders() {
    let mut manager = manager_with(paragraphs(&["ab", "cd", "ef"]));
    let first = paragraph_text(&manager, 0);
    let last = paragraph_text(&manager, 2);
    manager.set_cursor(Some(Cursor::new(
        Point::offset(first, 1),
        Point::offset(last, 1),
    )));

    assert!(manager.dispatch(Command::DeleteRange));
    assert_eq!(doc_texts(&manager), ["af"]);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(first, 1)))
    );
}

#[test]
fn emptying_delete_range_backfills_one_empty_child() {
    let mut manager = manager_with(paragraphs(&["ab", "cd"]));
    let root = manager.root().unwrap();
    // Node-level points spanning every child consume the whole list.
    manager.set_cursor(Some(Cursor::new(
        Point::node(root.children()[0]),
        Point::node(root.children()[1]),
    )));

    assert!(manager.dispatch(Command::DeleteRange));
    assert_eq!(
        manager.read(),
        json!({"kind": "doc", "content": [{"kind": "paragraph", "content": ""}]}),
    );
    let fresh = paragraph_text(&manager, 0);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(fresh, 0)))
    );
}

#[test]
fn degenerate_delete_range_declines_at_every_level() {
    let mut manager = manager_with(paragraphs(&["ab"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(text, 1))));

    let before = manager.read();
    assert!(!manager.dispatch(Command::DeleteRange));
    assert_eq!(manager.read(), before);
}

#[test]
fn backward_delete_of_a_range_only_deletes_the_range() {
    let mut manager = manager_with(paragraphs(&["abcd"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::new(
        Point::offset(text, 1),
        Point::offset(text, 3),
    )));

    assert!(manager.dispatch(Command::DeleteBackward));
    assert_eq!(doc_texts(&manager), ["ad"], "no extra character is removed");
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(text, 1)))
    );
}

#[test]
fn typing_over_a_range_replaces_it() {
    let mut manager = manager_with(paragraphs(&["abcd"]));
    let text = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::new(
        Point::offset(text, 1),
        Point::offset(text, 3),
    )));

    assert!(manager.dispatch(Command::InsertText("X".into())));
    assert_eq!(doc_texts(&manager), ["aXd"]);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(text, 2)))
    );
}

#[test]
fn dispatch_without_a_cursor_is_a_noop_success() {
    let mut manager = manager_with(paragraphs(&["ab"]));
    let before = manager.read();
    assert!(manager.dispatch(Command::InsertText("x".into())));
    assert_eq!(manager.read(), before);
}

#[test]
fn add_paragraph_inserts_after_the_cursor_block() {
    let mut manager = manager_with(paragraphs(&["ab", "cd"]));
    let first = paragraph_text(&manager, 0);
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(first, 1))));

    assert!(manager.dispatch(Command::AddParagraph));
    assert_eq!(doc_texts(&manager), ["ab", "", "cd"]);
    let fresh = paragraph_text(&manager, 1);
    assert_eq!(
        manager.cursor(),
        Some(Cursor::collapsed(Point::offset(fresh, 0)))
    );
}

#[test]
fn add_multiple_choice_provisions_a_whole_block() {
    let mut manager = manager_with(paragraphs(&["ab"]));
    assert!(manager.dispatch(Command::AddMultipleChoice));
    assert_eq!(
        manager.read()["content"][1],
        json!({
            "kind": "multiple_choice",
            "task": {"kind": "paragraph", "content": ""},
            "answers": {"kind": "answers", "content": [
                {"kind": "answer", "checked": false, "label": ""},
            ]},
        }),
    );
}

#[test]
fn enter_inside_an_unsplittable_block_adds_an_empty_paragraph_after_it() {
    let mut manager = manager_with(json!([{
        "kind": "multiple_choice",
        "task": {"kind": "paragraph", "content": "qq"},
        "answers": {"kind": "answers", "content": [
            {"kind": "answer", "checked": false, "label": "a"},
        ]},
    }]));
    let root = manager.root().unwrap();
    let mc = manager.store().entry(root.children()[0]);
    let task = manager.store().entry(*mc.slots().get("task").unwrap());
    let task_text = task.child();
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(task_text, 1))));

    assert!(manager.dispatch(Command::InsertNewElement));
    let doc = manager.read();
    assert_eq!(doc["content"].as_array().unwrap().len(), 2);
    assert_eq!(doc["content"][0]["task"]["content"], json!("qq"));
    assert_eq!(
        doc["content"][1],
        json!({"kind": "paragraph", "content": ""})
    );
}

#[test]
fn enter_inside_an_answer_adds_a_fresh_answer() {
    let mut manager = manager_with(json!([{
        "kind": "multiple_choice",
        "task": {"kind": "paragraph", "content": "q"},
        "answers": {"kind": "answers", "content": [
            {"kind": "answer", "checked": true, "label": "one"},
        ]},
    }]));
    let root = manager.root().unwrap();
    let mc = manager.store().entry(root.children()[0]);
    let answers = manager.store().entry(*mc.slots().get("answers").unwrap());
    let answer = manager.store().entry(answers.children()[0]);
    let label = *answer.slots().get("label").unwrap();
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(label, 1))));

    // The answer object cannot split, so its list provisions a fresh one.
    assert!(manager.dispatch(Command::InsertNewElement));
    assert_eq!(
        manager.read()["content"][0]["answers"]["content"],
        json!([
            {"kind": "answer", "checked": true, "label": "one"},
            {"kind": "answer", "checked": false, "label": ""},
        ]),
    );
}

#[test]
fn backspace_at_answer_start_declines_all_the_way_up() {
    let mut manager = manager_with(json!([{
        "kind": "multiple_choice",
        "task": {"kind": "paragraph", "content": "q"},
        "answers": {"kind": "answers", "content": [
            {"kind": "answer", "checked": false, "label": "one"},
            {"kind": "answer", "checked": false, "label": "two"},
        ]},
    }]));
    let root = manager.root().unwrap();
    let mc = manager.store().entry(root.children()[0]);
    let answers = manager.store().entry(*mc.slots().get("answers").unwrap());
    let second = manager.store().entry(answers.children()[1]);
    let label = *second.slots().get("label").unwrap();
    manager.set_cursor(Some(Cursor::collapsed(Point::offset(label, 0))));

    let before = manager.read();
    // Answer objects do not merge, and the single multiple-choice block
    // has no previous sibling: every level declines.
    assert!(!manager.dispatch(Command::DeleteBackward));
    assert_eq!(manager.read(), before);
}
