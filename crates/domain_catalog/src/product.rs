//! Sellable products
//!
//! A product carries the current list price. Tabs copy that price onto their
//! lines at add time; price edits here never touch lines already ordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CategoryId, CompanyId, Money, ProductId};

use crate::error::CatalogError;

/// A sellable product within a company's catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Owning company
    pub company_id: CompanyId,
    /// Display name
    pub name: String,
    /// Current list price per unit
    pub price: Money,
    /// Category this product is grouped under
    pub category_id: CategoryId,
    /// Whether the product can currently be ordered
    pub active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or a non-positive price
    pub fn new(
        company_id: CompanyId,
        name: impl Into<String>,
        price: Money,
        category_id: CategoryId,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::validation("product name must not be empty"));
        }
        if !price.is_positive() {
            return Err(CatalogError::validation(format!(
                "product price must be positive, got {price}"
            )));
        }

        Ok(Self {
            id: ProductId::new_v7(),
            company_id,
            name,
            price,
            category_id,
            active: true,
            created_at: Utc::now(),
        })
    }

    /// Marks the product as no longer orderable
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
