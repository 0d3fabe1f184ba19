//! Payment records
//!
//! A payment record is an append-only money transaction against a tab.
//! Corrections happen via new records, never edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PaymentRecordId, TabId};

use crate::error::TabError;

/// Payer label recorded when the caller supplies none
pub const DEFAULT_PAYER: &str = "guest";

/// Settlement status of a payment, decided at recording time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Cumulative paid amount was below the tab total when recorded
    PartiallyPaid,
    /// Cumulative paid amount reached the tab total when recorded
    PaidInFull,
}

/// A money transaction against a tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier
    pub id: PaymentRecordId,
    /// Owning tab
    pub tab_id: TabId,
    /// Amount collected; always positive
    pub amount: Money,
    /// Who paid; free text
    pub payer: String,
    /// Status at recording time
    pub status: PaymentStatus,
    /// When the payment was recorded
    pub paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Creates a new payment record
    ///
    /// An absent or blank payer is recorded as [`DEFAULT_PAYER`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount.
    pub fn new(
        tab_id: TabId,
        amount: Money,
        payer: Option<String>,
        status: PaymentStatus,
    ) -> Result<Self, TabError> {
        if !amount.is_positive() {
            return Err(TabError::validation(format!(
                "payment amount must be positive, got {amount}"
            )));
        }

        let payer = payer
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAYER.to_string());

        Ok(Self {
            id: PaymentRecordId::new_v7(),
            tab_id,
            amount,
            payer,
            status,
            paid_at: Utc::now(),
        })
    }
}
