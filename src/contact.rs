// 📇 Contact Records - One phone entry per record
// A contact with several numbers shows up as several records

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONTACT ID
// ============================================================================

/// Opaque identifier of one stored phone entry.
/// Unique enough to target a single delete, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CONTACT RECORD
// ============================================================================

/// One phone-number entry as delivered by a contact source.
///
/// Records are read fresh for every operation and never mutated afterwards:
/// the resolver only borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,

    /// Free-form display name (may be empty)
    pub display_name: String,

    /// Phone number exactly as the source stores it (may be empty)
    pub phone_number: String,

    /// Label such as "mobile" or "work" - listing only
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,

    /// Avatar location - listing only
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
}

impl ContactRecord {
    /// Create a record with only the fields that matter for deduplication
    pub fn new(id: i64, display_name: &str, phone_number: &str) -> Self {
        ContactRecord {
            id: ContactId(id),
            display_name: display_name.to_string(),
            phone_number: phone_number.to_string(),
            phone_type: None,
            photo_uri: None,
        }
    }

    /// Letter the record is listed under: uppercased first char, '#' when unnamed
    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('#')
    }
}

/// A contact entry that has not been stored yet (no id assigned)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub phone_number: String,

    #[serde(default)]
    pub phone_type: Option<String>,

    #[serde(default)]
    pub photo_uri: Option<String>,
}

impl NewContact {
    pub fn new(display_name: &str, phone_number: &str) -> Self {
        NewContact {
            display_name: display_name.to_string(),
            phone_number: phone_number.to_string(),
            phone_type: None,
            photo_uri: None,
        }
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// Bucket records by initial letter for display.
/// Buckets come out sorted by letter; members keep their input order.
pub fn group_by_initial(records: &[ContactRecord]) -> Vec<(char, Vec<&ContactRecord>)> {
    let mut groups: Vec<(char, Vec<&ContactRecord>)> = Vec::new();

    for record in records {
        let letter = record.initial();
        match groups.iter_mut().find(|(l, _)| *l == letter) {
            Some((_, members)) => members.push(record),
            None => groups.push((letter, vec![record])),
        }
    }

    // Stable sort keeps member order inside each bucket
    groups.sort_by_key(|(letter, _)| *letter);
    groups
}
