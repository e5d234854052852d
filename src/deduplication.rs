// 🔍 Deduplication Engine - Detect and remove duplicate contact entries
// One strategy: exact match on display name + phone number, first occurrence wins

use crate::contact::{ContactId, ContactRecord};
use crate::source::ContactSource;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Separator placed between name and number in the equivalence key
pub const KEY_SEPARATOR: &str = "|";

// ============================================================================
// RESOLUTION OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// One or more duplicates removed
    Deleted,

    /// No equivalence key appeared twice
    NoneFound,

    /// The read or a delete could not complete
    Failed,
}

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Result of the pure classification pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Ids of every record after the first in its group, in encounter order
    pub ids_to_delete: Vec<ContactId>,

    /// Number of records kept (one per distinct key)
    pub kept: usize,

    /// `Deleted` when anything is marked, `NoneFound` otherwise
    pub outcome: ResolutionOutcome,
}

/// A set of records sharing one equivalence key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub key: String,

    /// First record in input order - never deleted
    pub keeper: ContactId,

    /// Every later record with the same key
    pub duplicates: Vec<ContactId>,
}

/// Result of a full read/resolve/delete run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeduplicationRun {
    pub outcome: ResolutionOutcome,

    /// Deletes that committed, including those before a failure
    pub deleted: Vec<ContactId>,
}

// ============================================================================
// DUPLICATE RESOLVER
// ============================================================================

/// Stateless resolver: every call reads fresh input and keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct DuplicateResolver;

impl DuplicateResolver {
    pub fn new() -> Self {
        DuplicateResolver
    }

    /// Exact, case-sensitive key: `name|number`, no normalization.
    pub fn equivalence_key(record: &ContactRecord) -> String {
        format!("{}{}{}", record.display_name, KEY_SEPARATOR, record.phone_number)
    }

    /// Classify records in a single pass.
    ///
    /// The earliest record per key is kept; every later record sharing the
    /// key is marked. Callers control the survivor through input order.
    pub fn resolve(&self, records: &[ContactRecord]) -> Resolution {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        let mut ids_to_delete = Vec::new();

        for record in records {
            let key = Self::equivalence_key(record);
            if seen.contains(&key) {
                debug!(id = %record.id, key = %key, "duplicate contact");
                ids_to_delete.push(record.id);
            } else {
                seen.insert(key);
            }
        }

        let outcome = if ids_to_delete.is_empty() {
            ResolutionOutcome::NoneFound
        } else {
            ResolutionOutcome::Deleted
        };

        Resolution {
            ids_to_delete,
            kept: seen.len(),
            outcome,
        }
    }

    /// Preview: groups with more than one member, in order of first appearance
    pub fn duplicate_groups(&self, records: &[ContactRecord]) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        // key -> position in `groups`
        let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());

        for record in records {
            let key = Self::equivalence_key(record);
            match index.get(&key) {
                Some(&pos) => groups[pos].duplicates.push(record.id),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(DuplicateGroup {
                        key,
                        keeper: record.id,
                        duplicates: Vec::new(),
                    });
                }
            }
        }

        groups.retain(|g| !g.duplicates.is_empty());
        groups
    }

    /// Read everything from the source, resolve, then delete the duplicates.
    ///
    /// Any source error collapses to `Failed`. The first failing delete stops
    /// the loop; earlier deletes stay committed.
    pub fn run<S: ContactSource + ?Sized>(&self, source: &mut S) -> DeduplicationRun {
        let records = match source.list_all() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to read contacts");
                return DeduplicationRun {
                    outcome: ResolutionOutcome::Failed,
                    deleted: Vec::new(),
                };
            }
        };

        let resolution = self.resolve(&records);
        info!(
            total = records.len(),
            duplicates = resolution.ids_to_delete.len(),
            "scanned contacts"
        );

        if resolution.outcome == ResolutionOutcome::NoneFound {
            return DeduplicationRun {
                outcome: ResolutionOutcome::NoneFound,
                deleted: Vec::new(),
            };
        }

        let mut deleted = Vec::with_capacity(resolution.ids_to_delete.len());
        for id in resolution.ids_to_delete {
            if let Err(e) = source.delete_by_id(id) {
                warn!(error = %e, deleted = deleted.len(), "stopping deduplication");
                return DeduplicationRun {
                    outcome: ResolutionOutcome::Failed,
                    deleted,
                };
            }
            deleted.push(id);
        }

        info!(deleted = deleted.len(), "duplicate contacts deleted");
        DeduplicationRun {
            outcome: ResolutionOutcome::Deleted,
            deleted,
        }
    }
}

/// Run a full deduplication against `source` with a fresh resolver
pub fn run_deduplication<S: ContactSource + ?Sized>(source: &mut S) -> ResolutionOutcome {
    DuplicateResolver::new().run(source).outcome
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemoryContactSource, SourceError};

    fn create_test_contact(id: i64, name: &str, phone: &str) -> ContactRecord {
        ContactRecord::new(id, name, phone)
    }

    /// Source that serves records as given and can fail on demand
    struct FlakySource {
        records: Vec<ContactRecord>,
        fail_list: bool,
        fail_delete_on: Option<ContactId>,
        delete_calls: Vec<ContactId>,
    }

    impl FlakySource {
        fn new(records: Vec<ContactRecord>) -> Self {
            FlakySource {
                records,
                fail_list: false,
                fail_delete_on: None,
                delete_calls: Vec::new(),
            }
        }
    }

    impl ContactSource for FlakySource {
        fn list_all(&mut self) -> Result<Vec<ContactRecord>, SourceError> {
            if self.fail_list {
                return Err(SourceError::SourceUnavailable("offline".to_string()));
            }
            Ok(self.records.clone())
        }

        fn delete_by_id(&mut self, id: ContactId) -> Result<(), SourceError> {
            self.delete_calls.push(id);
            if self.fail_delete_on == Some(id) {
                return Err(SourceError::DeleteFailed {
                    id,
                    reason: "rejected".to_string(),
                });
            }
            self.records.retain(|r| r.id != id);
            Ok(())
        }
    }

    #[test]
    fn test_no_duplicates() {
        let resolver = DuplicateResolver::new();

        let records = vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Alice", "556"),
            create_test_contact(3, "Bob", "555"),
        ];

        let resolution = resolver.resolve(&records);

        assert_eq!(resolution.outcome, ResolutionOutcome::NoneFound);
        assert!(resolution.ids_to_delete.is_empty());
        assert_eq!(resolution.kept, 3);
    }

    #[test]
    fn test_empty_input() {
        let resolution = DuplicateResolver::new().resolve(&[]);

        assert_eq!(resolution.outcome, ResolutionOutcome::NoneFound);
        assert!(resolution.ids_to_delete.is_empty());

        let mut source = FlakySource::new(Vec::new());
        assert_eq!(run_deduplication(&mut source), ResolutionOutcome::NoneFound);
        assert!(source.delete_calls.is_empty());
    }

    #[test]
    fn test_key_repeated_n_times_keeps_first() {
        let resolver = DuplicateResolver::new();

        let records = vec![
            create_test_contact(10, "Alice", "555"),
            create_test_contact(11, "Bob", "777"),
            create_test_contact(12, "Alice", "555"),
            create_test_contact(13, "Alice", "555"),
            create_test_contact(14, "Alice", "555"),
        ];

        let resolution = resolver.resolve(&records);

        assert_eq!(resolution.outcome, ResolutionOutcome::Deleted);
        assert_eq!(
            resolution.ids_to_delete,
            vec![ContactId(12), ContactId(13), ContactId(14)]
        );
        assert!(!resolution.ids_to_delete.contains(&ContactId(10)));
        assert_eq!(resolution.kept, 2);
    }

    #[test]
    fn test_order_sensitivity() {
        let resolver = DuplicateResolver::new();

        let forward = vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Alice", "555"),
        ];
        assert_eq!(resolver.resolve(&forward).ids_to_delete, vec![ContactId(2)]);

        let reversed: Vec<ContactRecord> = forward.into_iter().rev().collect();
        assert_eq!(resolver.resolve(&reversed).ids_to_delete, vec![ContactId(1)]);
    }

    #[test]
    fn test_case_sensitive_keys() {
        let records = vec![
            create_test_contact(1, "Bob", "555"),
            create_test_contact(2, "bob", "555"),
        ];

        let resolution = DuplicateResolver::new().resolve(&records);
        assert_eq!(resolution.outcome, ResolutionOutcome::NoneFound);
    }

    #[test]
    fn test_no_phone_normalization() {
        let records = vec![
            create_test_contact(1, "Alice", "555-1234"),
            create_test_contact(2, "Alice", "5551234"),
            create_test_contact(3, "Alice ", "555-1234"),
        ];

        let resolution = DuplicateResolver::new().resolve(&records);
        assert_eq!(resolution.outcome, ResolutionOutcome::NoneFound);
    }

    #[test]
    fn test_empty_fields_still_compare() {
        let records = vec![
            create_test_contact(1, "", ""),
            create_test_contact(2, "", ""),
        ];

        let resolution = DuplicateResolver::new().resolve(&records);
        assert_eq!(resolution.ids_to_delete, vec![ContactId(2)]);
    }

    #[test]
    fn test_equivalence_key_format() {
        let record = create_test_contact(1, "Alice", "555");
        assert_eq!(DuplicateResolver::equivalence_key(&record), "Alice|555");
    }

    #[test]
    fn test_resolve_is_idempotent_after_deletion() {
        let mut source = MemoryContactSource::new(vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Alice", "555"),
            create_test_contact(3, "Bob", "777"),
            create_test_contact(4, "Bob", "777"),
        ]);

        assert_eq!(run_deduplication(&mut source), ResolutionOutcome::Deleted);
        assert_eq!(source.len(), 2);

        let remaining = source.list_all().unwrap();
        let resolution = DuplicateResolver::new().resolve(&remaining);
        assert_eq!(resolution.outcome, ResolutionOutcome::NoneFound);
        assert_eq!(run_deduplication(&mut source), ResolutionOutcome::NoneFound);
    }

    #[test]
    fn test_duplicate_groups_match_resolve() {
        let resolver = DuplicateResolver::new();

        let records = vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Bob", "777"),
            create_test_contact(3, "Alice", "555"),
            create_test_contact(4, "Carol", "999"),
            create_test_contact(5, "Bob", "777"),
        ];

        let groups = resolver.duplicate_groups(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].keeper, ContactId(1));
        assert_eq!(groups[0].duplicates, vec![ContactId(3)]);
        assert_eq!(groups[1].keeper, ContactId(2));
        assert_eq!(groups[1].duplicates, vec![ContactId(5)]);

        let mut from_groups: Vec<ContactId> =
            groups.iter().flat_map(|g| g.duplicates.iter().copied()).collect();
        from_groups.sort();
        let mut from_resolve = resolver.resolve(&records).ids_to_delete;
        from_resolve.sort();
        assert_eq!(from_groups, from_resolve);
    }

    #[test]
    fn test_duplicate_groups_large_distinct_input() {
        let resolver = DuplicateResolver::new();

        let mut records: Vec<ContactRecord> = (0..60_000)
            .map(|i| create_test_contact(i, &format!("Contact {}", i), "555"))
            .collect();

        let started = std::time::Instant::now();
        assert!(resolver.duplicate_groups(&records).is_empty());
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        // One late duplicate of the very first record
        records.push(create_test_contact(60_000, "Contact 0", "555"));
        let groups = resolver.duplicate_groups(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keeper, ContactId(0));
        assert_eq!(groups[0].duplicates, vec![ContactId(60_000)]);
    }

    #[test]
    fn test_list_failure_reports_failed() {
        let mut source = FlakySource::new(vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Alice", "555"),
        ]);
        source.fail_list = true;

        assert_eq!(run_deduplication(&mut source), ResolutionOutcome::Failed);
        assert!(source.delete_calls.is_empty());
    }

    #[test]
    fn test_delete_failure_stops_and_reports_failed() {
        let mut source = FlakySource::new(vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Alice", "555"),
            create_test_contact(3, "Alice", "555"),
            create_test_contact(4, "Alice", "555"),
        ]);
        source.fail_delete_on = Some(ContactId(3));

        let run = DuplicateResolver::new().run(&mut source);

        assert_eq!(run.outcome, ResolutionOutcome::Failed);
        assert_eq!(run.deleted, vec![ContactId(2)]);
        // Nothing attempted after the failing delete
        assert_eq!(source.delete_calls, vec![ContactId(2), ContactId(3)]);
    }

    #[test]
    fn test_successful_run_deletes_every_duplicate() {
        let mut source = FlakySource::new(vec![
            create_test_contact(1, "Alice", "555"),
            create_test_contact(2, "Alice", "555"),
            create_test_contact(3, "Bob", "777"),
        ]);

        let run = DuplicateResolver::new().run(&mut source);

        assert_eq!(run.outcome, ResolutionOutcome::Deleted);
        assert_eq!(run.deleted, vec![ContactId(2)]);
        assert_eq!(source.records.len(), 2);
    }
}
