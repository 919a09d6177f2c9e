use pretty_assertions::assert_eq;
use std::sync::Arc;
use text_engine::{Buffer, BufferConfig, BufferError, LocalFileSystem, Session};
use text_engine_lang::PlainTextLexer;

#[test]
fn test_open_edit_save_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# Title\n\nbody ünïcode\n").unwrap();

    let mut buffer = Buffer::open_path(
        &path,
        Arc::new(LocalFileSystem),
        Box::new(PlainTextLexer::new()),
        BufferConfig::default(),
    )
    .unwrap();
    assert_eq!(buffer.line_count(), 4);
    assert_eq!(buffer.line_text(2).as_deref(), Some("body ünïcode"));

    let end = buffer.position_to_index(2, 12);
    buffer.insert(end, "!");
    buffer.save().unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# Title\n\nbody ünïcode!\n"
    );
    assert!(!buffer.is_modified());
}

#[test]
fn test_open_missing_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.txt");
    let mut buffer = Buffer::new();
    let err = buffer.open(&path).unwrap_err();
    match &err {
        BufferError::Io { path: failed, .. } => assert_eq!(failed, &path),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "gone.txt: file not found");
    assert!(err.os_error_code().is_some());
}

#[test]
fn test_save_as_into_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut buffer = Buffer::from_text("x");
    buffer.insert(1, "y");
    assert!(buffer.save_as(dir.path()).is_err());
    assert_eq!(buffer.name(), None);
    assert!(buffer.is_modified());
}

#[test]
fn test_session_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(&path, "pub fn f() {}\n").unwrap();

    let mut session = Session::new();
    let id = session.open(&path).unwrap();
    let buffer = session.buffer_mut(id).unwrap();
    buffer.replace(7, 1, "g");
    assert_eq!(session.modified_buffers(), vec![id]);

    session.active_buffer_mut().unwrap().save().unwrap();
    assert!(session.modified_buffers().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "pub fn g() {}\n");
    session.close(id).unwrap();
    assert!(session.is_empty());
}
