//! Catalog Domain - Products and Categories
//!
//! This crate holds the sellable-item reference data the tab ledger prices
//! lines from: products with their current list price, and the categories
//! they are grouped under. A line on a tab captures the product's price at
//! add time; later catalog edits never re-price existing lines.
//!
//! Every company gets an implicit "Uncategorized" bucket for products created
//! without a category. The bucket is materialized lazily through an
//! idempotent get-or-create operation keyed by company, never as a global.

pub mod product;
pub mod category;
pub mod ports;
pub mod error;

pub use product::Product;
pub use category::{Category, DEFAULT_CATEGORY_NAME};
pub use ports::{CatalogPort, CreateProductRequest};
pub use error::CatalogError;
