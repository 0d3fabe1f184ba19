//! Product categories
//!
//! Categories group products for menu display and kitchen routing. Products
//! created without an explicit category land in the company's default bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CategoryId, CompanyId};

use crate::error::CatalogError;

/// Name of the implicit bucket for products created without a category
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorized";

/// A product category within a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Owning company
    pub company_id: CompanyId,
    /// Display name
    pub name: String,
    /// Whether this is the company's implicit default bucket
    pub is_default: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Creates a new named category
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name
    pub fn new(company_id: CompanyId, name: impl Into<String>) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::validation("category name must not be empty"));
        }

        Ok(Self {
            id: CategoryId::new_v7(),
            company_id,
            name,
            is_default: false,
            created_at: Utc::now(),
        })
    }

    /// Creates the default bucket for a company
    pub fn default_bucket(company_id: CompanyId) -> Self {
        Self {
            id: CategoryId::new_v7(),
            company_id,
            name: DEFAULT_CATEGORY_NAME.to_string(),
            is_default: true,
            created_at: Utc::now(),
        }
    }
}
