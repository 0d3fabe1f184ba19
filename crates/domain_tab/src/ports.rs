//! Tab Domain Ports
//!
//! This module defines the port interfaces the tab ledger consumes from its
//! surroundings: the transactional store holding tabs, payments, and sales,
//! and the cash-register sessions that gate settlement.
//!
//! Every public service operation is expected to execute as one atomic unit
//! against the store (read current state, compute, write). The ledger itself
//! takes no locks and keeps no version counters; isolation beyond that is
//! the adapter's concern, and concurrent writers to the same tab are
//! last-write-wins.
//!
//! ```rust,ignore
//! use domain_tab::ports::TabStore;
//! use std::sync::Arc;
//!
//! pub struct TabService {
//!     store: Arc<dyn TabStore>,
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{BranchId, DomainPort, PortError, TabId};

use crate::payment::PaymentRecord;
use crate::sale::Sale;
use crate::tab::Tab;

/// Port for the transactional store backing the tab ledger
#[async_trait]
pub trait TabStore: DomainPort {
    /// Retrieves a tab by ID
    async fn find_tab(&self, id: TabId) -> Result<Tab, PortError>;

    /// Persists a tab and its lines
    async fn save_tab(&self, tab: &Tab) -> Result<(), PortError>;

    /// Removes a tab and everything it owns
    async fn delete_tab(&self, id: TabId) -> Result<(), PortError>;

    /// Returns all payment records for a tab, oldest first
    async fn payments_for_tab(&self, id: TabId) -> Result<Vec<PaymentRecord>, PortError>;

    /// Appends a payment record
    async fn save_payment(&self, payment: &PaymentRecord) -> Result<(), PortError>;

    /// Persists a finalized sale
    async fn save_sale(&self, sale: &Sale) -> Result<(), PortError>;
}

/// Port for cash-register sessions
///
/// Settlement requires an open session for the tab's branch; the session
/// lifecycle itself is managed elsewhere.
#[async_trait]
pub trait CashSessionPort: DomainPort {
    /// Returns true if the branch currently has an open cash session
    async fn open_session_exists(&self, branch_id: BranchId) -> Result<bool, PortError>;
}

/// In-memory mock adapters for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock store backed by in-memory maps
    #[derive(Debug, Default)]
    pub struct MockTabStore {
        tabs: Arc<RwLock<HashMap<TabId, Tab>>>,
        payments: Arc<RwLock<HashMap<TabId, Vec<PaymentRecord>>>>,
        sales: Arc<RwLock<Vec<Sale>>>,
    }

    impl MockTabStore {
        /// Creates a new empty mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns all persisted sales
        pub async fn sales(&self) -> Vec<Sale> {
            self.sales.read().await.clone()
        }
    }

    impl DomainPort for MockTabStore {}

    #[async_trait]
    impl TabStore for MockTabStore {
        async fn find_tab(&self, id: TabId) -> Result<Tab, PortError> {
            self.tabs
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Tab", id))
        }

        async fn save_tab(&self, tab: &Tab) -> Result<(), PortError> {
            self.tabs.write().await.insert(tab.id, tab.clone());
            Ok(())
        }

        async fn delete_tab(&self, id: TabId) -> Result<(), PortError> {
            if self.tabs.write().await.remove(&id).is_none() {
                return Err(PortError::not_found("Tab", id));
            }
            self.payments.write().await.remove(&id);
            Ok(())
        }

        async fn payments_for_tab(&self, id: TabId) -> Result<Vec<PaymentRecord>, PortError> {
            Ok(self
                .payments
                .read()
                .await
                .get(&id)
                .cloned()
                .unwrap_or_default())
        }

        async fn save_payment(&self, payment: &PaymentRecord) -> Result<(), PortError> {
            self.payments
                .write()
                .await
                .entry(payment.tab_id)
                .or_default()
                .push(payment.clone());
            Ok(())
        }

        async fn save_sale(&self, sale: &Sale) -> Result<(), PortError> {
            self.sales.write().await.push(sale.clone());
            Ok(())
        }
    }

    /// Mock cash-session registry
    #[derive(Debug, Default)]
    pub struct MockCashSessions {
        open: Arc<RwLock<HashSet<BranchId>>>,
    }

    impl MockCashSessions {
        /// Creates a registry with no open sessions
        pub fn new() -> Self {
            Self::default()
        }

        /// Opens a session for a branch
        pub async fn open_session(&self, branch_id: BranchId) {
            self.open.write().await.insert(branch_id);
        }

        /// Closes a branch's session
        pub async fn close_session(&self, branch_id: BranchId) {
            self.open.write().await.remove(&branch_id);
        }
    }

    impl DomainPort for MockCashSessions {}

    #[async_trait]
    impl CashSessionPort for MockCashSessions {
        async fn open_session_exists(&self, branch_id: BranchId) -> Result<bool, PortError> {
            Ok(self.open.read().await.contains(&branch_id))
        }
    }
}
