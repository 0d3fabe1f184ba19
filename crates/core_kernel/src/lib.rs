//! Core Kernel - Foundational types and utilities for the tab ledger
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for domain entities
//! - Port abstractions for external collaborators (store, catalog, cash sessions)

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    TabId, LineId, PaymentRecordId, SaleId,
    ProductId, CategoryId,
    CompanyId, BranchId, UserId, SessionId,
    PrintJobId,
};
pub use ports::{PortError, DomainPort, OperationMetadata};
