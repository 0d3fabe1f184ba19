//! Catalog Domain Ports
//!
//! This module defines the port interface for catalog lookups, enabling
//! swappable implementations (internal database, external menu service,
//! mock, etc.). The tab ledger consumes this port to price lines at add
//! time and to label receipt lines.

use async_trait::async_trait;

use core_kernel::{CategoryId, CompanyId, DomainPort, Money, PortError, ProductId};

use crate::category::Category;
use crate::product::Product;

/// Request for creating a new product
///
/// When `category_id` is absent the product lands in the company's default
/// bucket, which the adapter materializes on first use.
#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    /// Display name
    pub name: String,
    /// List price per unit
    pub price: Money,
    /// Target category; None selects the default bucket
    pub category_id: Option<CategoryId>,
}

/// The port trait for catalog operations
///
/// All methods are async and return `Result<T, PortError>` for consistent
/// error handling across adapter implementations. Every operation is scoped
/// by the calling company: entities owned by another company behave as not
/// found.
#[async_trait]
pub trait CatalogPort: DomainPort {
    /// Retrieves a product by ID within a company's scope
    async fn find_product(
        &self,
        company_id: CompanyId,
        id: ProductId,
    ) -> Result<Product, PortError>;

    /// Retrieves multiple products by their IDs
    ///
    /// Returns the products that were found; missing ids are skipped.
    async fn find_products(
        &self,
        company_id: CompanyId,
        ids: Vec<ProductId>,
    ) -> Result<Vec<Product>, PortError>;

    /// Creates a new product
    ///
    /// A request without a category places the product in the company's
    /// default bucket, creating the bucket first if it does not exist yet.
    async fn create_product(
        &self,
        company_id: CompanyId,
        request: CreateProductRequest,
    ) -> Result<Product, PortError>;

    /// Retrieves a category by ID within a company's scope
    async fn find_category(
        &self,
        company_id: CompanyId,
        id: CategoryId,
    ) -> Result<Category, PortError>;

    /// Returns the company's default bucket, creating it if absent
    ///
    /// Idempotent: repeated calls for the same company return the same
    /// category.
    async fn get_or_create_default_category(
        &self,
        company_id: CompanyId,
    ) -> Result<Category, PortError>;
}

/// In-memory mock implementation of CatalogPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock catalog adapter backed by in-memory maps
    #[derive(Debug, Default)]
    pub struct MockCatalog {
        products: Arc<RwLock<HashMap<ProductId, Product>>>,
        categories: Arc<RwLock<HashMap<CategoryId, Category>>>,
    }

    impl MockCatalog {
        /// Creates a new mock catalog
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a product directly, bypassing creation validation
        pub async fn insert_product(&self, product: Product) {
            self.products.write().await.insert(product.id, product);
        }

        /// Returns all categories currently known for a company
        pub async fn categories_for(&self, company_id: CompanyId) -> Vec<Category> {
            self.categories
                .read()
                .await
                .values()
                .filter(|c| c.company_id == company_id)
                .cloned()
                .collect()
        }
    }

    impl DomainPort for MockCatalog {}

    #[async_trait]
    impl CatalogPort for MockCatalog {
        async fn find_product(
            &self,
            company_id: CompanyId,
            id: ProductId,
        ) -> Result<Product, PortError> {
            self.products
                .read()
                .await
                .get(&id)
                .filter(|p| p.company_id == company_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Product", id))
        }

        async fn find_products(
            &self,
            company_id: CompanyId,
            ids: Vec<ProductId>,
        ) -> Result<Vec<Product>, PortError> {
            let products = self.products.read().await;
            Ok(ids
                .into_iter()
                .filter_map(|id| {
                    products
                        .get(&id)
                        .filter(|p| p.company_id == company_id)
                        .cloned()
                })
                .collect())
        }

        async fn create_product(
            &self,
            company_id: CompanyId,
            request: CreateProductRequest,
        ) -> Result<Product, PortError> {
            let category_id = match request.category_id {
                Some(id) => self.find_category(company_id, id).await?.id,
                None => self.get_or_create_default_category(company_id).await?.id,
            };

            let product = Product::new(company_id, request.name, request.price, category_id)
                .map_err(|e| PortError::validation(e.to_string()))?;

            self.products.write().await.insert(product.id, product.clone());
            Ok(product)
        }

        async fn find_category(
            &self,
            company_id: CompanyId,
            id: CategoryId,
        ) -> Result<Category, PortError> {
            self.categories
                .read()
                .await
                .get(&id)
                .filter(|c| c.company_id == company_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Category", id))
        }

        async fn get_or_create_default_category(
            &self,
            company_id: CompanyId,
        ) -> Result<Category, PortError> {
            let mut categories = self.categories.write().await;

            if let Some(existing) = categories
                .values()
                .find(|c| c.company_id == company_id && c.is_default)
            {
                return Ok(existing.clone());
            }

            let bucket = Category::default_bucket(company_id);
            categories.insert(bucket.id, bucket.clone());
            Ok(bucket)
        }
    }
}
