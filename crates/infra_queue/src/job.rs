//! Print jobs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, PrintJobId};

/// What kind of ticket a job prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintJobKind {
    /// Customer-facing receipt
    Receipt,
    /// Kitchen order ticket
    KitchenOrder,
}

/// Lifecycle state of a print job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Waiting in the tenant's FIFO
    Pending,
    /// Leased to a consumer; not yet settled
    InProgress,
    /// Printed successfully
    Done,
    /// Settlement reported a failure
    Error,
}

/// One unit of print work
///
/// The payload is an already-rendered ticket; this crate never interprets
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    /// Unique identifier
    pub id: PrintJobId,
    /// Owning company; jobs never cross tenants
    pub company_id: CompanyId,
    /// Ticket kind, for routing to the right device
    pub kind: PrintJobKind,
    /// Rendered ticket content, opaque to the queue
    pub payload: String,
    /// Current lifecycle state
    pub state: JobState,
    /// Times the job has been leased
    pub attempts: u32,
    /// Failure message from the last settlement, if any
    pub last_error: Option<String>,
    /// When the job was enqueued
    pub submitted_at: DateTime<Utc>,
    /// When the job was last leased
    pub leased_at: Option<DateTime<Utc>>,
}

impl PrintJob {
    /// Creates a pending job
    pub fn new(company_id: CompanyId, kind: PrintJobKind, payload: impl Into<String>) -> Self {
        Self {
            id: PrintJobId::new_v7(),
            company_id,
            kind,
            payload: payload.into(),
            state: JobState::Pending,
            attempts: 0,
            last_error: None,
            submitted_at: Utc::now(),
            leased_at: None,
        }
    }
}
