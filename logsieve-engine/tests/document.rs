use logsieve_engine::{
    ApplyOutcome, DocumentEvent, EngineConfig, EngineError, LineSource, LoadState, OperationKind,
    Panel, Session, SourceKind, TextOperation,
};
use std::{io::Write, sync::mpsc::Receiver};

fn drain(rx: &Receiver<DocumentEvent>) -> Vec<DocumentEvent> {
    rx.try_iter().collect()
}

fn filtered_contents(session: &Session) -> Vec<String> {
    let state = session.pages()[0].read();
    state
        .store()
        .filtered()
        .map(|l| l.content().to_string())
        .collect()
}

#[test]
fn test_pasted_text_loads_in_background() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::PastedText("abc\nxyz\na".to_string()));
    doc.wait_idle().unwrap();

    assert_eq!(doc.source_kind(), SourceKind::PastedText);
    assert_eq!(doc.name(), "abc\nxyz\na");
    assert_eq!(doc.read().store().state(), LoadState::Ready);
    assert_eq!(doc.read().store().whole().len(), 3);
    assert!(doc.render_version() > 0);

    assert_eq!(
        drain(&events),
        vec![DocumentEvent::Loaded {
            page: doc.id(),
            lines: 3
        }]
    );
}

#[test]
fn test_file_source_loads_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "first\r\nsecond\n\nfourth\n").unwrap();

    let mut session = Session::default();
    let doc = session.open(LineSource::File(file.path().to_path_buf()));
    doc.wait_idle().unwrap();

    let state = doc.read();
    let contents: Vec<&str> = state.store().whole().iter().map(|l| l.content()).collect();
    assert_eq!(contents, vec!["first", "second", "", "fourth"]);
}

#[test]
fn test_missing_file_reports_failure() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::File("/nonexistent/logsieve/app.log".into()));
    doc.wait_idle().unwrap();

    assert_eq!(doc.read().store().state(), LoadState::Empty);
    match drain(&events).as_slice() {
        [DocumentEvent::IngestionFailed { page, message }] => {
            assert_eq!(*page, doc.id());
            assert!(message.contains("app.log"));
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[test]
fn test_apply_operations_publishes_new_view() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::PastedText("abc\nxyz\na".to_string()));
    doc.wait_idle().unwrap();
    drain(&events);

    let before = doc.render_version();
    doc.apply_operations(vec![TextOperation::new("a", OperationKind::Shield)])
        .unwrap();
    doc.wait_idle().unwrap();

    assert!(doc.render_version() > before);
    assert_eq!(filtered_contents(&session), vec!["xyz"]);

    let doc = &session.pages()[0];
    assert_eq!(
        drain(&events),
        vec![DocumentEvent::OperationsApplied {
            page: doc.id(),
            outcome: ApplyOutcome::Changed {
                filtered_rebuilt: true,
                pattern_errors: Vec::new(),
            },
        }]
    );
}

#[test]
fn test_same_operations_twice_is_unchanged() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::PastedText("abc\nxyz".to_string()));
    let ops = vec![
        TextOperation::new("a", OperationKind::Filter),
        TextOperation::new("z", OperationKind::Highlight),
    ];
    doc.apply_operations(ops.clone()).unwrap();
    doc.wait_idle().unwrap();
    drain(&events);

    let version = doc.render_version();
    doc.apply_operations(ops.into_iter().rev().collect()).unwrap();
    doc.wait_idle().unwrap();

    assert_eq!(doc.render_version(), version);
    assert_eq!(
        drain(&events),
        vec![DocumentEvent::OperationsApplied {
            page: doc.id(),
            outcome: ApplyOutcome::Unchanged,
        }]
    );
}

#[test]
fn test_invalid_regex_is_reported_and_skipped() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::PastedText("a(b\nplain".to_string()));
    doc.wait_idle().unwrap();
    drain(&events);

    doc.apply_operations(vec![TextOperation::new("(", OperationKind::RegexFilter)])
        .unwrap();
    doc.wait_idle().unwrap();

    let received = drain(&events);
    assert_eq!(received.len(), 2);
    match &received[0] {
        DocumentEvent::PatternRejected { error, .. } => assert_eq!(error.text, "("),
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(matches!(
        received[1],
        DocumentEvent::OperationsApplied { .. }
    ));
    // an uncompilable filter matches nothing
    assert!(doc.read().store().filtered_indices().is_empty());
}

#[test]
fn test_search_found_and_navigation() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::PastedText("error one\nok\nerror two".to_string()));
    doc.search("error", 1).unwrap();
    doc.wait_idle().unwrap();

    let received = drain(&events);
    assert_eq!(
        received.last(),
        Some(&DocumentEvent::SearchFinished {
            page: doc.id(),
            total: 2,
            jump_index: 0,
            first_visible: 1,
        })
    );

    doc.search_next();
    {
        let state = doc.read();
        assert_eq!(state.search().current_ordinal(), Some(1));
        assert_eq!(state.search().jump_index(), Some(2));
    }

    doc.stop_search();
    assert!(!doc.read().search().is_active());
}

#[test]
fn test_search_not_found_keeps_previous_results() {
    let mut session = Session::default();
    let events = session.subscribe();
    let doc = session.open(LineSource::PastedText("abc\nabd".to_string()));
    doc.search("ab", 0).unwrap();
    doc.wait_idle().unwrap();
    drain(&events);

    doc.search("zzz", 0).unwrap();
    doc.wait_idle().unwrap();

    assert_eq!(
        drain(&events),
        vec![DocumentEvent::SearchNotFound {
            page: doc.id(),
            query: "zzz".to_string(),
        }]
    );
    assert_eq!(doc.read().search().total(), 2);
}

#[test]
fn test_search_rejects_bad_queries_before_queueing() {
    let mut session = Session::default();
    let doc = session.open(LineSource::PastedText("abc".to_string()));
    assert!(matches!(doc.search("", 0), Err(EngineError::EmptyQuery)));
    assert!(matches!(
        doc.search("a\nb", 0),
        Err(EngineError::UnsupportedQuery(_))
    ));
}

#[test]
fn test_changing_operations_stops_search() {
    let mut session = Session::default();
    let doc = session.open(LineSource::PastedText("abc\nxyz".to_string()));
    doc.search("x", 0).unwrap();
    doc.wait_idle().unwrap();
    assert!(doc.read().search().is_active());

    doc.apply_operations(vec![TextOperation::new("b", OperationKind::Highlight)])
        .unwrap();
    doc.wait_idle().unwrap();
    assert!(!doc.read().search().is_active());
}

#[test]
fn test_marks_and_render_version() {
    let mut session = Session::default();
    let doc = session.open(LineSource::PastedText("a\nb\nc".to_string()));
    doc.wait_idle().unwrap();

    let version = doc.render_version();
    assert!(doc.set_mark(2, true));
    assert!(doc.toggle_mark(0));
    assert!(!doc.set_mark(9, true));
    assert!(doc.render_version() > version);

    {
        let state = doc.read();
        let marked: Vec<usize> = state.store().marked().map(|l| l.line_number()).collect();
        assert_eq!(marked, vec![0, 2]);
        assert_eq!(state.store().jump_index(Panel::Marked, 1), 0);
    }

    doc.clear_marks();
    assert_eq!(doc.read().store().panel_len(Panel::Marked), 0);
}

#[test]
fn test_parallel_threshold_does_not_change_results() {
    let text: String = (0..50)
        .map(|i| format!("line {i} {}\n", if i % 3 == 0 { "keep" } else { "drop" }))
        .collect();
    let ops = vec![TextOperation::new("keep", OperationKind::Filter)];

    let mut sequential = Session::new(EngineConfig {
        parallel_threshold: usize::MAX,
    });
    let mut parallel = Session::new(EngineConfig {
        parallel_threshold: 0,
    });
    for session in [&mut sequential, &mut parallel] {
        let doc = session.open(LineSource::PastedText(text.clone()));
        doc.apply_operations(ops.clone()).unwrap();
        doc.wait_idle().unwrap();
    }

    let a = sequential.pages()[0].read().store().filtered_indices().to_vec();
    let b = parallel.pages()[0].read().store().filtered_indices().to_vec();
    assert_eq!(a.len(), 17);
    assert_eq!(a, b);
}

#[test]
fn test_session_close() {
    let mut session = Session::default();
    let id = session.open(LineSource::PastedText("a".to_string())).id();
    session.open(LineSource::PastedText("b".to_string()));
    assert_eq!(session.len(), 2);

    assert!(session.close(id));
    assert!(!session.close(id));
    assert!(session.get(id).is_none());
    assert_eq!(session.len(), 1);
}

#[test]
fn test_close_with_queued_work_leaves_other_pages_working() {
    let text: String = (0..2000).map(|i| format!("entry {i}\n")).collect();
    let mut session = Session::default();
    let busy = session.open(LineSource::PastedText(text));
    for i in 0..20 {
        busy.apply_operations(vec![TextOperation::new(
            format!("entry {i}"),
            OperationKind::Filter,
        )])
        .unwrap();
    }
    let busy = busy.id();
    let other = session.open(LineSource::PastedText("x\ny".to_string())).id();

    assert!(session.close(busy));

    let doc = session.get(other).unwrap();
    doc.apply_operations(vec![TextOperation::new("y", OperationKind::Filter)])
        .unwrap();
    doc.wait_idle().unwrap();
    assert_eq!(doc.read().store().filtered_indices(), &[1]);
    assert_eq!(session.len(), 1);
}
