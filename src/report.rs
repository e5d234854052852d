// Tri-state operation report handed back to whoever triggered a dedupe run

use crate::deduplication::{run_deduplication, ResolutionOutcome};
use crate::source::ContactSource;
use serde::{Deserialize, Serialize};

pub const STATUS_DELETED: u8 = 0;
pub const STATUS_NONE_FOUND: u8 = 1;
pub const STATUS_ERROR: u8 = 2;

/// `{status, message}` - 0 deleted, 1 none found, 2 error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    pub status: u8,
    pub message: String,
}

impl OperationReport {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_DELETED
    }
}

impl From<ResolutionOutcome> for OperationReport {
    fn from(outcome: ResolutionOutcome) -> Self {
        let (status, message) = match outcome {
            ResolutionOutcome::Deleted => {
                (STATUS_DELETED, "Duplicate contacts deleted successfully")
            }
            ResolutionOutcome::NoneFound => (STATUS_NONE_FOUND, "No duplicate contacts found"),
            ResolutionOutcome::Failed => {
                (STATUS_ERROR, "Error occurred while deleting duplicates")
            }
        };

        OperationReport {
            status,
            message: message.to_string(),
        }
    }
}

/// Blocking entry point: deduplicate `source` and report the outcome
pub fn run_and_report<S: ContactSource + ?Sized>(source: &mut S) -> OperationReport {
    run_deduplication(source).into()
}
