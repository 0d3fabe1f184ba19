//! Tab Domain - Split-Bill Ledger
//!
//! This crate implements the open-tab ledger at the center of the system:
//! a tab of ordered lines, payments against it, and the split-share
//! bookkeeping that answers "what remains to be paid, and by how much per
//! remaining share" at any time.
//!
//! # Model
//!
//! - A [`Tab`] owns its ordered [`TabLine`]s and the split counters
//! - [`PaymentRecord`]s are append-only money transactions against a tab
//! - [`SplitStatus`] is a read-side projection; which units count as
//!   "covered" is reconstructed greedily in stored line order, never stored
//!   per unit
//! - Closing materializes an immutable [`Sale`]
//!
//! # Boundaries
//!
//! Persistence and cash sessions are consumed through the port traits in
//! [`ports`]; authorization happens upstream and arrives as a resolved
//! [`CallerContext`]. Each [`TabService`] operation is one atomic
//! read-compute-write unit against the store, with no additional locking:
//! concurrent writers to the same tab are last-write-wins.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_tab::{TabService, CallerContext};
//!
//! let service = TabService::new(store, catalog, sessions);
//! let tab = service.open_tab(&caller, "Table 4", Currency::USD).await?;
//! service.add_item(&caller, tab.id, espresso, 2, Default::default()).await?;
//! service.init_or_update_split(&caller, tab.id, 2).await?;
//! let status = service.split_status(&caller, tab.id).await?;
//! ```

pub mod tab;
pub mod line;
pub mod payment;
pub mod split;
pub mod sale;
pub mod ports;
pub mod service;
pub mod receipt;
pub mod error;

pub use tab::Tab;
pub use line::TabLine;
pub use payment::{PaymentRecord, PaymentStatus, DEFAULT_PAYER};
pub use split::{split_status, CoveredLine, SplitStatus};
pub use sale::{Sale, SaleLine};
pub use ports::{CashSessionPort, TabStore};
pub use service::{CallerContext, TabService};
pub use receipt::{Receipt, ReceiptLine};
pub use error::TabError;
