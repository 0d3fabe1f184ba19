//! Tab service
//!
//! Orchestrates the ledger operations over the store, catalog, and
//! cash-session ports. Every public method is one read-compute-write unit:
//! failures are detected before anything is written, and the adapters are
//! trusted to make each call atomic. Authorization happens upstream; the
//! service receives an already-resolved caller and only enforces scope
//! (a tab outside the caller's branch behaves as not found).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use core_kernel::{BranchId, CompanyId, Currency, LineId, Money, ProductId, TabId, UserId};
use domain_catalog::CatalogPort;

use crate::error::TabError;
use crate::payment::{PaymentRecord, PaymentStatus};
use crate::ports::{CashSessionPort, TabStore};
use crate::receipt::Receipt;
use crate::sale::Sale;
use crate::split::{split_status, SplitStatus};
use crate::tab::Tab;

/// A verified caller identity with resolved scope and display labels
///
/// Produced by the authentication layer; the service trusts it as-is.
#[derive(Debug, Clone)]
pub struct CallerContext {
    /// Acting user
    pub user_id: UserId,
    /// Acting user's display name
    pub user_name: String,
    /// Company scope
    pub company_id: CompanyId,
    /// Branch scope
    pub branch_id: BranchId,
    /// Company display label for receipts
    pub company_label: String,
    /// Branch display label for receipts
    pub branch_label: String,
}

/// Application service for the tab ledger
pub struct TabService {
    store: Arc<dyn TabStore>,
    catalog: Arc<dyn CatalogPort>,
    sessions: Arc<dyn CashSessionPort>,
}

impl TabService {
    /// Creates a service over the given ports
    pub fn new(
        store: Arc<dyn TabStore>,
        catalog: Arc<dyn CatalogPort>,
        sessions: Arc<dyn CashSessionPort>,
    ) -> Self {
        Self {
            store,
            catalog,
            sessions,
        }
    }

    /// Opens a new empty tab under the caller's branch
    pub async fn open_tab(
        &self,
        caller: &CallerContext,
        label: impl Into<String>,
        currency: Currency,
    ) -> Result<Tab, TabError> {
        let tab = Tab::new(caller.branch_id, label, currency);
        self.store.save_tab(&tab).await?;
        debug!(tab = %tab.id, branch = %caller.branch_id, "opened tab");
        Ok(tab)
    }

    /// Adds units of a product to a tab, capturing the catalog price
    pub async fn add_item(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
        product_id: ProductId,
        quantity: u32,
        customizations: BTreeSet<String>,
    ) -> Result<Tab, TabError> {
        let mut tab = self.load_scoped(caller, tab_id).await?;
        let product = self
            .catalog
            .find_product(caller.company_id, product_id)
            .await?;
        if !product.active {
            return Err(TabError::validation(format!(
                "product {} is not available",
                product.name
            )));
        }

        tab.add_line(product.id, quantity, product.price, customizations)?;
        self.store.save_tab(&tab).await?;
        debug!(tab = %tab.id, product = %product_id, quantity, "added item");
        Ok(tab)
    }

    /// Removes a line from a tab
    pub async fn remove_item(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
        line_id: LineId,
    ) -> Result<Tab, TabError> {
        let mut tab = self.load_scoped(caller, tab_id).await?;
        tab.remove_line(line_id)?;
        self.store.save_tab(&tab).await?;
        Ok(tab)
    }

    /// Sets a line's quantity, purging unpaid duplicates of its product
    pub async fn set_item_quantity(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
        line_id: LineId,
        quantity: u32,
    ) -> Result<Tab, TabError> {
        let mut tab = self.load_scoped(caller, tab_id).await?;
        tab.set_line_quantity(line_id, quantity)?;
        self.store.save_tab(&tab).await?;
        Ok(tab)
    }

    /// Divides the tab's remaining balance into equal shares
    pub async fn init_or_update_split(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
        shares: u32,
    ) -> Result<Tab, TabError> {
        let mut tab = self.load_scoped(caller, tab_id).await?;
        tab.init_or_update_split(shares)?;
        self.store.save_tab(&tab).await?;
        Ok(tab)
    }

    /// Pays for specific units of specific lines
    ///
    /// Repeating a line id means paying that many separate units of the
    /// line; units are fungible within a line. The whole batch is validated
    /// before anything changes, and exactly one payment record is appended
    /// for it, always `PartiallyPaid`: this path never closes the tab, even
    /// when the batch happens to cover the remaining balance.
    ///
    /// Returns the total amount charged, for the payer's receipt.
    pub async fn pay_items(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
        line_ids: &[LineId],
        payer: Option<String>,
    ) -> Result<Money, TabError> {
        if line_ids.is_empty() {
            return Err(TabError::validation("no lines targeted for payment"));
        }

        let mut tab = self.load_scoped(caller, tab_id).await?;
        let units = group_units(line_ids);
        let charged = tab.settle_units(&units)?;

        let record =
            PaymentRecord::new(tab.id, charged, payer, PaymentStatus::PartiallyPaid)?;
        self.store.save_tab(&tab).await?;
        self.store.save_payment(&record).await?;

        info!(tab = %tab.id, amount = %charged, payer = %record.payer, "item payment recorded");
        Ok(charged)
    }

    /// Records a money-amount payment, e.g. one share of a split
    ///
    /// The payment's status compares the cumulative paid amount against the
    /// tab's current total. A `PaidInFull` payment closes the tab only when
    /// `close_after` is set; the close here is a terminal state flip, not a
    /// sale-producing settlement. An active split loses exactly one share
    /// per call, whatever the amount: callers are expected to pass the
    /// computed share value, and the ledger does not enforce it.
    pub async fn add_payment(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
        amount: Money,
        payer: Option<String>,
        close_after: bool,
    ) -> Result<PaymentRecord, TabError> {
        let mut tab = self.load_scoped(caller, tab_id).await?;
        if tab.closed {
            return Err(TabError::invalid_state(format!("tab {tab_id} is closed")));
        }
        if amount.currency() != tab.currency {
            return Err(TabError::validation(format!(
                "payment currency {} does not match tab currency {}",
                amount.currency(),
                tab.currency
            )));
        }

        let payments = self.store.payments_for_tab(tab.id).await?;
        let paid_so_far = payments
            .iter()
            .fold(Money::zero(tab.currency), |acc, p| acc + p.amount);
        let tab_total = tab.calculate_total();
        let cumulative = paid_so_far.checked_add(&amount)?;

        let status = if cumulative >= tab_total {
            PaymentStatus::PaidInFull
        } else {
            PaymentStatus::PartiallyPaid
        };
        let record = PaymentRecord::new(tab.id, amount, payer, status)?;

        if status == PaymentStatus::PaidInFull && close_after {
            tab.mark_closed();
        }
        tab.consume_split_share();

        self.store.save_tab(&tab).await?;
        self.store.save_payment(&record).await?;

        info!(
            tab = %tab.id,
            amount = %amount,
            status = ?status,
            closed = tab.closed,
            "payment recorded"
        );
        Ok(record)
    }

    /// Closes a tab, materializing its lines into a finalized sale
    ///
    /// Requires an open cash session for the tab's branch. The sale total is
    /// the full tab value; partial payments already collected are not
    /// subtracted. One-way: a closed tab stays closed.
    pub async fn close_tab(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
    ) -> Result<Sale, TabError> {
        let mut tab = self.load_scoped(caller, tab_id).await?;
        if tab.closed {
            return Err(TabError::conflict(format!("tab {tab_id} is already closed")));
        }
        if !self.sessions.open_session_exists(tab.branch_id).await? {
            return Err(TabError::invalid_state(format!(
                "no open cash session for branch {}",
                tab.branch_id
            )));
        }

        let sale = Sale::materialize(&tab, caller.user_id);
        tab.mark_closed();

        self.store.save_sale(&sale).await?;
        self.store.save_tab(&tab).await?;

        info!(tab = %tab.id, sale = %sale.id, total = %sale.total, "tab closed");
        Ok(sale)
    }

    /// Administratively removes a tab that is still open
    pub async fn delete_tab(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
    ) -> Result<(), TabError> {
        let tab = self.load_scoped(caller, tab_id).await?;
        if tab.closed {
            return Err(TabError::invalid_state(format!(
                "tab {tab_id} is settled and cannot be deleted"
            )));
        }
        self.store.delete_tab(tab.id).await?;
        info!(tab = %tab_id, "tab deleted");
        Ok(())
    }

    /// Returns the tab's current split and payment snapshot
    pub async fn split_status(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
    ) -> Result<SplitStatus, TabError> {
        let tab = self.load_scoped(caller, tab_id).await?;
        let payments = self.store.payments_for_tab(tab.id).await?;
        Ok(split_status(&tab, &payments))
    }

    /// Assembles the customer-facing receipt projection for a tab
    pub async fn receipt(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
    ) -> Result<Receipt, TabError> {
        let tab = self.load_scoped(caller, tab_id).await?;
        let payments = self.store.payments_for_tab(tab.id).await?;

        let product_ids: Vec<ProductId> = tab.lines.iter().map(|l| l.product_id).collect();
        let product_names: HashMap<ProductId, String> = self
            .catalog
            .find_products(caller.company_id, product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(Receipt::assemble(
            caller.company_label.clone(),
            caller.branch_label.clone(),
            caller.user_name.clone(),
            &tab,
            &payments,
            &product_names,
        ))
    }

    /// Loads a tab, treating one outside the caller's branch as not found
    async fn load_scoped(
        &self,
        caller: &CallerContext,
        tab_id: TabId,
    ) -> Result<Tab, TabError> {
        let tab = self.store.find_tab(tab_id).await?;
        if tab.branch_id != caller.branch_id {
            return Err(TabError::not_found(format!("Tab {tab_id}")));
        }
        Ok(tab)
    }
}

/// Counts occurrences of each line id in a payment request
fn group_units(line_ids: &[LineId]) -> HashMap<LineId, u32> {
    let mut units: HashMap<LineId, u32> = HashMap::new();
    for id in line_ids {
        *units.entry(*id).or_insert(0) += 1;
    }
    units
}
