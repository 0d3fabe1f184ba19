//! The per-company print queue
//!
//! A map of bounded FIFOs, one per company, each behind its own lock. The
//! map itself is only locked long enough to find or create a tenant entry,
//! so tenants never contend with each other on the hot path.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use core_kernel::{CompanyId, PrintJobId};

use crate::error::QueueError;
use crate::job::{JobState, PrintJob, PrintJobKind};

/// Queue tuning parameters
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum pending jobs per company; enqueue fails fast beyond this
    pub capacity_per_company: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity_per_company: 128,
        }
    }
}

#[derive(Debug, Default)]
struct TenantQueue {
    pending: VecDeque<PrintJobId>,
    jobs: HashMap<PrintJobId, PrintJob>,
}

/// Tenant-keyed print queue with polling delivery
#[derive(Debug, Default)]
pub struct PrintQueue {
    config: QueueConfig,
    tenants: RwLock<HashMap<CompanyId, Arc<Mutex<TenantQueue>>>>,
}

impl PrintQueue {
    /// Creates a queue with the given configuration
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            tenants: RwLock::new(HashMap::new()),
        }
    }

    /// Enqueues a rendered ticket for a company
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when the company's pending backlog is at
    /// capacity; producers are request-scoped and must not block.
    pub async fn enqueue(
        &self,
        company_id: CompanyId,
        kind: PrintJobKind,
        payload: impl Into<String>,
    ) -> Result<PrintJobId, QueueError> {
        let tenant = self.tenant(company_id).await;
        let mut tenant = tenant.lock().await;

        if tenant.pending.len() >= self.config.capacity_per_company {
            warn!(company = %company_id, "print queue full");
            return Err(QueueError::Full {
                capacity: self.config.capacity_per_company,
            });
        }

        let job = PrintJob::new(company_id, kind, payload);
        let job_id = job.id;
        tenant.pending.push_back(job_id);
        tenant.jobs.insert(job_id, job);

        debug!(company = %company_id, job = %job_id, "print job enqueued");
        Ok(job_id)
    }

    /// Leases the oldest pending job for a company
    ///
    /// The job moves to `InProgress` and stays leased until settled with
    /// [`complete`](Self::complete) or [`fail`](Self::fail), or returned to
    /// the queue by [`requeue_stalled`](Self::requeue_stalled).
    pub async fn poll(&self, company_id: CompanyId) -> Option<PrintJob> {
        let tenant = self.tenant(company_id).await;
        let mut tenant = tenant.lock().await;

        let job_id = tenant.pending.pop_front()?;
        let job = tenant
            .jobs
            .get_mut(&job_id)
            .expect("pending id always has a job entry");
        job.state = JobState::InProgress;
        job.attempts += 1;
        job.leased_at = Some(Utc::now());

        Some(job.clone())
    }

    /// Settles a leased job as printed
    pub async fn complete(
        &self,
        company_id: CompanyId,
        job_id: PrintJobId,
    ) -> Result<(), QueueError> {
        self.settle(company_id, job_id, JobState::Done, None).await
    }

    /// Settles a leased job as failed
    pub async fn fail(
        &self,
        company_id: CompanyId,
        job_id: PrintJobId,
        reason: impl Into<String>,
    ) -> Result<(), QueueError> {
        self.settle(company_id, job_id, JobState::Error, Some(reason.into()))
            .await
    }

    /// Returns leased-but-unsettled jobs older than `max_lease` to pending
    ///
    /// Redelivery resets nothing else: the attempt counter keeps growing, so
    /// consumers can spot jobs that stall repeatedly. Returns how many jobs
    /// were requeued.
    pub async fn requeue_stalled(&self, company_id: CompanyId, max_lease: Duration) -> usize {
        let tenant = self.tenant(company_id).await;
        let mut tenant = tenant.lock().await;
        let cutoff = Utc::now() - max_lease;

        let mut stalled: Vec<(PrintJobId, chrono::DateTime<Utc>)> = tenant
            .jobs
            .values()
            .filter(|j| j.state == JobState::InProgress)
            .filter_map(|j| j.leased_at.filter(|t| *t <= cutoff).map(|_| (j.id, j.submitted_at)))
            .collect();
        stalled.sort_by_key(|(_, submitted_at)| *submitted_at);

        for (job_id, _) in &stalled {
            if let Some(job) = tenant.jobs.get_mut(job_id) {
                job.state = JobState::Pending;
                job.leased_at = None;
            }
            tenant.pending.push_back(*job_id);
            warn!(company = %company_id, job = %job_id, "stalled print job requeued");
        }

        stalled.len()
    }

    /// Returns a job's current state
    pub async fn status(&self, company_id: CompanyId, job_id: PrintJobId) -> Option<JobState> {
        let tenant = self.tenant(company_id).await;
        let tenant = tenant.lock().await;
        tenant.jobs.get(&job_id).map(|j| j.state)
    }

    /// Returns the company's pending backlog size
    pub async fn pending_count(&self, company_id: CompanyId) -> usize {
        let tenant = self.tenant(company_id).await;
        let tenant = tenant.lock().await;
        tenant.pending.len()
    }

    async fn settle(
        &self,
        company_id: CompanyId,
        job_id: PrintJobId,
        state: JobState,
        error: Option<String>,
    ) -> Result<(), QueueError> {
        let tenant = self.tenant(company_id).await;
        let mut tenant = tenant.lock().await;

        let job = tenant
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| QueueError::JobNotFound(job_id.to_string()))?;
        if job.state != JobState::InProgress {
            return Err(QueueError::InvalidTransition { from: job.state });
        }

        job.state = state;
        job.last_error = error;
        debug!(company = %company_id, job = %job_id, state = ?state, "print job settled");
        Ok(())
    }

    async fn tenant(&self, company_id: CompanyId) -> Arc<Mutex<TenantQueue>> {
        if let Some(tenant) = self.tenants.read().await.get(&company_id) {
            return tenant.clone();
        }
        self.tenants
            .write()
            .await
            .entry(company_id)
            .or_default()
            .clone()
    }
}
