// Contact Deduplicator - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod contact;
pub mod db;
pub mod deduplication;
pub mod import;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use config::{
    init_logging, Cli, Command, Config, ServerCli, CLI_LOG_FILTER, SERVER_LOG_FILTER,
};
pub use contact::{group_by_initial, ContactId, ContactRecord, NewContact};
pub use db::{get_events_for_entity, insert_event, setup_database, Event, SqliteContactStore};
pub use deduplication::{
    run_deduplication, DeduplicationRun, DuplicateGroup, DuplicateResolver, Resolution,
    ResolutionOutcome,
};
pub use import::{load_csv, read_contacts};
pub use report::{run_and_report, OperationReport};
pub use source::{ContactSource, MemoryContactSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
