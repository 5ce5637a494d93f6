//! Product catalog trait and in-memory implementation.
//!
//! Checkout snapshots product name and unit price into the order at
//! creation time; later catalog edits never touch existing orders.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId};

use crate::error::ServiceError;

/// A product as the catalog currently sells it.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub active: bool,
}

/// Trait for product lookups during checkout.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetches a product by id, `None` when the catalog has no such
    /// product.
    async fn get(&self, product_id: &ProductId) -> Result<Option<CatalogProduct>, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, CatalogProduct>,
    fail_on_get: bool,
}

/// In-memory product catalog for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn add(&self, product: CatalogProduct) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.product_id.clone(), product);
    }

    /// Configures the catalog to fail on the next lookup.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state.write().unwrap().fail_on_get = fail;
    }

    /// Returns the number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get(&self, product_id: &ProductId) -> Result<Option<CatalogProduct>, ServiceError> {
        let state = self.state.read().unwrap();

        if state.fail_on_get {
            return Err(ServiceError::Catalog("catalog unavailable".to_string()));
        }

        Ok(state.products.get(product_id).cloned())
    }
}
