use crate::contact::{ContactId, ContactRecord, NewContact};
use crate::source::{ContactSource, SourceError};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Event for the audit trail: every insert and delete is recorded
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // ==========================================================================
    // Contacts Table (one row per phone entry)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            display_name TEXT,
            phone_number TEXT,
            phone_type TEXT,
            photo_uri TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_display_name ON contacts(display_name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
                })?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

// ============================================================================
// SQLITE CONTACT STORE
// ============================================================================

/// Contact store backed by a SQLite database
pub struct SqliteContactStore {
    conn: Connection,
}

impl SqliteContactStore {
    /// Open (or create) a database file, with WAL mode for crash recovery
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        setup_database(&conn)?;
        debug!(path = %path.display(), "opened contact store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_contact(&mut self, contact: &NewContact) -> Result<ContactId> {
        let id = insert_row(&self.conn, contact)?;
        Ok(id)
    }

    /// Insert many contacts inside one SQLite transaction
    pub fn insert_contacts(&mut self, contacts: &[NewContact]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for contact in contacts {
            insert_row(&tx, contact)?;
        }
        tx.commit()?;

        info!(inserted = contacts.len(), "imported contacts");
        Ok(contacts.len())
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;

        Ok(count)
    }

    pub fn events_for_contact(&self, id: ContactId) -> Result<Vec<Event>> {
        get_events_for_entity(&self.conn, "contact", &id.to_string())
    }

    fn query_all(&self) -> rusqlite::Result<Vec<ContactRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, phone_number, phone_type, photo_uri
             FROM contacts
             ORDER BY display_name ASC, id ASC",
        )?;

        let records = stmt
            .query_map([], |row| {
                let display_name: Option<String> = row.get(1)?;
                let phone_number: Option<String> = row.get(2)?;

                Ok(ContactRecord {
                    id: ContactId(row.get(0)?),
                    display_name: display_name.unwrap_or_default(),
                    phone_number: phone_number.unwrap_or_default(),
                    phone_type: row.get(3)?,
                    photo_uri: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Row delete and its audit event commit together or not at all
    fn delete_row(&mut self, id: ContactId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM contacts WHERE id = ?1", params![id.0])?;

        if removed > 0 {
            let event = Event::new(
                "contact_deleted",
                "contact",
                &id.to_string(),
                serde_json::json!({ "reason": "duplicate" }),
                "deduplicator",
            );
            insert_event(&tx, &event)?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn insert_row(conn: &Connection, contact: &NewContact) -> Result<ContactId> {
    conn.execute(
        "INSERT INTO contacts (display_name, phone_number, phone_type, photo_uri)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            contact.display_name,
            contact.phone_number,
            contact.phone_type,
            contact.photo_uri,
        ],
    )?;
    let id = ContactId(conn.last_insert_rowid());

    let event = Event::new(
        "contact_added",
        "contact",
        &id.to_string(),
        serde_json::json!({
            "display_name": contact.display_name,
            "phone_number": contact.phone_number,
        }),
        "importer",
    );
    insert_event(conn, &event)?;

    Ok(id)
}

impl ContactSource for SqliteContactStore {
    fn list_all(&mut self) -> std::result::Result<Vec<ContactRecord>, SourceError> {
        self.query_all()
            .map_err(|e| SourceError::SourceUnavailable(e.to_string()))
    }

    fn delete_by_id(&mut self, id: ContactId) -> std::result::Result<(), SourceError> {
        self.delete_row(id).map_err(|e| SourceError::DeleteFailed {
            id,
            reason: e.to_string(),
        })
    }
}
