use pretty_assertions::assert_eq;
use text_engine::{Buffer, BufferConfig, EventKind};

#[test]
fn test_undo_redo_round_trip() {
    let mut buffer = Buffer::from_text("base");
    buffer.insert(4, " one");
    buffer.del(0, 1);
    buffer.replace(0, 3, "BAS");
    let edited = buffer.text();
    assert_eq!(edited, "BAS one");

    for _ in 0..3 {
        assert!(buffer.undo());
    }
    assert_eq!(buffer.text(), "base");
    assert!(!buffer.undo());

    for _ in 0..3 {
        assert!(buffer.redo());
    }
    assert_eq!(buffer.text(), edited);
    assert!(!buffer.redo());
}

#[test]
fn test_undo_bumps_version_and_does_not_record() {
    let mut buffer = Buffer::from_text("hello");
    buffer.del(0, 2);
    assert_eq!(buffer.text(), "llo");
    assert_eq!(buffer.version(), 1);

    buffer.undo();
    assert_eq!(buffer.text(), "hello");
    assert_eq!(buffer.version(), 2);
    assert_eq!(buffer.undo_log().len(), 1);
    assert_eq!(buffer.undo_depth(), 0);
    assert!(buffer.can_redo());
}

#[test]
fn test_edit_after_undo_truncates_redo_branch() {
    let mut buffer = Buffer::new();
    buffer.insert(0, "a");
    buffer.insert(1, "b");
    buffer.insert(2, "c");
    buffer.undo();
    buffer.undo();
    assert_eq!(buffer.text(), "a");

    buffer.insert(1, "z");
    assert_eq!(buffer.text(), "az");
    assert_eq!(buffer.undo_log().len(), 2);
    assert!(!buffer.can_redo());
    assert!(!buffer.redo());

    let recorded: Vec<&str> = buffer
        .undo_log()
        .events()
        .iter()
        .map(|event| event.insert())
        .collect();
    assert_eq!(recorded, vec!["a", "z"]);
}

#[test]
fn test_replace_undoes_in_one_step() {
    let mut buffer = Buffer::from_text("let x = 1;");
    buffer.replace(4, 1, "value");
    assert_eq!(buffer.text(), "let value = 1;");
    buffer.undo();
    assert_eq!(buffer.text(), "let x = 1;");
    assert!(!buffer.can_undo());
    buffer.redo();
    assert_eq!(buffer.text(), "let value = 1;");
}

#[test]
fn test_undo_of_multiline_delete_restores_lines() {
    let mut buffer = Buffer::from_text("one\ntwo\nthree");
    buffer.del(2, 6);
    assert_eq!(buffer.text(), "onhree");
    assert_eq!(buffer.line_count(), 1);
    buffer.undo();
    assert_eq!(buffer.line_count(), 3);
    assert_eq!(buffer.line_text(1).as_deref(), Some("two"));
}

#[test]
fn test_undo_limit_keeps_most_recent_edits() {
    let config = BufferConfig {
        max_undo: Some(2),
        ..BufferConfig::default()
    };
    let mut buffer = Buffer::with_config(config);
    buffer.insert(0, "a");
    buffer.insert(1, "b");
    buffer.insert(2, "c");
    assert_eq!(buffer.undo_log().len(), 2);

    while buffer.undo() {}
    assert_eq!(buffer.text(), "a");
}

#[test]
fn test_inverse_events_carry_original_text() {
    let mut buffer = Buffer::from_text("abcdef");
    buffer.del(1, 3);
    let inverse = buffer.undo_log().events()[0].revert().unwrap();
    assert_eq!(inverse.kind, EventKind::Insert("bcd".to_string()));
    assert_eq!(inverse.position, 1);
}
