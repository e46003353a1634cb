use std::fs;
use std::sync::Arc;

use hybrid_context::communication::CommunicationError;
use hybrid_context::context::StoreError;
use hybrid_context::config::Settings;
use hybrid_context::reporting::{report, ErrorKind, ErrorLog, ErrorReporter, Failure, ReportExt};
use hybrid_context::{AgentRegistry, KeywordStrategy};
use tempfile::tempdir;

#[test]
fn records_are_appended_with_kind_context_message_and_causes() {
    let dir = tempdir().unwrap();
    let log = ErrorLog::new(dir.path().join("logs/error_log.txt")).with_echo(false);

    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = StoreError::Persistence {
        path: "ctx.json".into(),
        source: io,
    };
    report(&log, &error, "context persist of ctx.json");
    report(&log, &CommunicationError::NotConnected, "");

    let written = fs::read_to_string(log.path()).unwrap();
    let records: Vec<&str> = written
        .split("\n\n")
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();
    assert_eq!(records.len(), 2);

    let first = records[0];
    assert!(first.starts_with("ERROR: PersistenceError occurred at "));
    assert!(first.contains("\nContext: context persist of ctx.json\n"));
    assert!(first.contains("\nMessage: IO error on context file ctx.json: denied\n"));
    assert!(first.contains("Traceback:\n  caused by: denied"));

    let second = records[1];
    assert!(second.starts_with("ERROR: CommunicationError occurred at "));
    assert!(!second.contains("Context:"));
}

#[test]
fn failure_captures_the_source_chain() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error = StoreError::Serialization {
        path: "x.json".into(),
        source: parse_err,
    };

    let failure = Failure::new(&error, Some("restore"));

    assert_eq!(failure.kind, ErrorKind::SerializationError);
    assert_eq!(failure.context.as_deref(), Some("restore"));
    assert_eq!(failure.causes.len(), 1);
    assert!(failure.render().contains("caused by: EOF while parsing"));
}

#[test]
fn error_log_is_usable_as_a_shared_reporter() {
    let dir = tempdir().unwrap();
    let log = Arc::new(ErrorLog::new(dir.path().join("e.txt")).with_echo(false));
    let sink: Arc<dyn ErrorReporter> = log.clone();

    sink.report(Failure::new(&CommunicationError::Closed, None));

    assert!(fs::read_to_string(log.path()).unwrap().contains("Transport closed"));
}

#[test]
fn missing_manifest_is_written_to_the_log() {
    let dir = tempdir().unwrap();
    let settings = Settings::rooted_at(dir.path());
    let log = Arc::new(ErrorLog::new(&settings.error_log).with_echo(false));
    let sink: Arc<dyn ErrorReporter> = log.clone();

    let result = AgentRegistry::load(&settings, KeywordStrategy, sink.clone())
        .reported(sink.as_ref(), "loading agents");
    assert!(result.is_err());

    let written = fs::read_to_string(log.path()).unwrap();
    assert!(written.starts_with("ERROR: PersistenceError occurred at "));
    assert!(written.contains("\nContext: loading agents\n"));
    assert!(written.contains("Cannot read agent manifest"));
}
