use contact_dedup::{
    load_csv, run_and_report, ContactId, ContactRecord, ContactSource, DuplicateResolver,
    MemoryContactSource, ResolutionOutcome, SourceError, SqliteContactStore,
};
use std::io::Write;

#[test]
fn test_csv_import_then_dedupe() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "display_name,phone_number,phone_type,photo_uri").unwrap();
    writeln!(csv, "Bob,777,mobile,").unwrap();
    writeln!(csv, "Alice,555,mobile,").unwrap();
    writeln!(csv, "Alice,555,work,").unwrap();
    writeln!(csv, "bob,777,,").unwrap();
    writeln!(csv, "Alice,555-0000,,").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteContactStore::open(&dir.path().join("contacts.db")).unwrap();
    store.insert_contacts(&load_csv(csv.path()).unwrap()).unwrap();

    let report = run_and_report(&mut store);
    assert_eq!(report.status, 0);

    let remaining = store.list_all().unwrap();
    assert_eq!(remaining.len(), 4);
    // The "mobile" Alice was inserted first and survives
    let alice: Vec<&ContactRecord> = remaining
        .iter()
        .filter(|r| r.display_name == "Alice" && r.phone_number == "555")
        .collect();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].phone_type.as_deref(), Some("mobile"));

    let report = run_and_report(&mut store);
    assert_eq!(report.status, 1);
    assert_eq!(report.message, "No duplicate contacts found");
}

/// Store that refuses every delete
struct ReadOnlySource(MemoryContactSource);

impl ContactSource for ReadOnlySource {
    fn list_all(&mut self) -> Result<Vec<ContactRecord>, SourceError> {
        self.0.list_all()
    }

    fn delete_by_id(&mut self, id: ContactId) -> Result<(), SourceError> {
        Err(SourceError::DeleteFailed {
            id,
            reason: "read-only".to_string(),
        })
    }
}

#[test]
fn test_delete_failure_reports_error() {
    let mut source = ReadOnlySource(MemoryContactSource::new(vec![
        ContactRecord::new(1, "Alice", "555"),
        ContactRecord::new(2, "Alice", "555"),
    ]));

    let run = DuplicateResolver::new().run(&mut source);
    assert_eq!(run.outcome, ResolutionOutcome::Failed);
    assert!(run.deleted.is_empty());

    let report = run_and_report(&mut source);
    assert_eq!(report.status, 2);
    assert_eq!(report.message, "Error occurred while deleting duplicates");
}

#[test]
fn test_read_only_source_without_duplicates_is_none_found() {
    let mut source = ReadOnlySource(MemoryContactSource::new(vec![
        ContactRecord::new(1, "Alice", "555"),
        ContactRecord::new(2, "Bob", "555"),
    ]));

    assert_eq!(run_and_report(&mut source).status, 1);
}
