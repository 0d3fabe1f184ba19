//! Print Job Infrastructure
//!
//! An explicit, tenant-keyed queue for print work (receipts, kitchen
//! tickets). Producers enqueue rendered payloads; relay consumers poll for
//! the oldest pending job of their company, then settle it as done or
//! failed.
//!
//! # Delivery model
//!
//! At-least-once via polling. [`PrintQueue::poll`] leases the head job by
//! moving it to `InProgress`; a consumer that dies without settling leaves
//! the job leased until [`PrintQueue::requeue_stalled`] returns it to
//! `Pending` for redelivery. Consumers must tolerate printing a job twice.
//!
//! # Isolation
//!
//! Each company has its own bounded FIFO guarded by its own lock; one
//! tenant's backlog never blocks another's. Job state is queryable by id
//! for the lifetime of the queue.

pub mod job;
pub mod queue;
pub mod error;

pub use job::{JobState, PrintJob, PrintJobKind};
pub use queue::{PrintQueue, QueueConfig};
pub use error::QueueError;
