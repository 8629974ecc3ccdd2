//! Product service: repository contract, in-memory store, and event handling.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CompositeError, Product};
use messaging::EventHandler;
use tokio::sync::RwLock;

use crate::error::RepositoryError;

/// Storage contract for products. Uniqueness is per `product_id`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_product_id(&self, product_id: i32)
    -> Result<Option<Product>, RepositoryError>;

    /// Inserts a product, failing with [`RepositoryError::DuplicateKey`]
    /// when the id is already taken.
    async fn insert(&self, product: Product) -> Result<(), RepositoryError>;

    /// Removes the product if present. Removing an absent product is Ok.
    async fn delete_by_product_id(&self, product_id: i32) -> Result<(), RepositoryError>;
}

/// In-memory product store.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<i32, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_product_id(
        &self,
        product_id: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.product_id) {
            return Err(RepositoryError::DuplicateKey {
                key: product.product_id.to_string(),
            });
        }
        products.insert(product.product_id, product);
        Ok(())
    }

    async fn delete_by_product_id(&self, product_id: i32) -> Result<(), RepositoryError> {
        self.products.write().await.remove(&product_id);
        Ok(())
    }
}

/// Owns all product state transitions.
///
/// Create and delete arrive as events (at-least-once), so both are
/// idempotent: a CREATE whose content matches the stored product is a
/// no-op success, and a DELETE of an absent product succeeds. A CREATE
/// colliding on the id with different content is a duplicate-key error.
#[derive(Clone)]
pub struct ProductService<R> {
    repository: R,
    service_address: String,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, service_address: impl Into<String>) -> Self {
        Self {
            repository,
            service_address: service_address.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: i32) -> Result<Product, CompositeError> {
        if product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {product_id}"
            )));
        }

        let mut product = self
            .repository
            .find_by_product_id(product_id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| {
                CompositeError::NotFound(format!("No product found for productId: {product_id}"))
            })?;

        product.service_address = self.service_address.clone();
        Ok(product)
    }

    #[tracing::instrument(skip(self, body), fields(product_id = body.product_id))]
    pub async fn create_product(&self, body: Product) -> Result<(), CompositeError> {
        if body.product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {}",
                body.product_id
            )));
        }

        if let Some(existing) = self
            .repository
            .find_by_product_id(body.product_id)
            .await
            .map_err(storage_error)?
        {
            if existing.same_content(&body) {
                tracing::debug!(product_id = body.product_id, "create already applied, no-op");
                return Ok(());
            }
            return Err(CompositeError::InvalidInput(format!(
                "Duplicate key, Product Id: {}",
                body.product_id
            )));
        }

        let product_id = body.product_id;
        self.repository.insert(body).await.map_err(|e| match e {
            RepositoryError::DuplicateKey { .. } => {
                CompositeError::InvalidInput(format!("Duplicate key, Product Id: {product_id}"))
            }
            other => storage_error(other),
        })?;

        tracing::debug!(product_id, "product created");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i32) -> Result<(), CompositeError> {
        self.repository
            .delete_by_product_id(product_id)
            .await
            .map_err(storage_error)
    }
}

#[async_trait]
impl<R> EventHandler for ProductService<R>
where
    R: ProductRepository + Clone + 'static,
{
    type Payload = Product;

    async fn on_create(&self, _key: i32, payload: Product) -> Result<(), CompositeError> {
        self.create_product(payload).await
    }

    async fn on_delete(&self, key: i32) -> Result<(), CompositeError> {
        self.delete_product(key).await
    }
}

pub(crate) fn storage_error(e: RepositoryError) -> CompositeError {
    CompositeError::Unexpected(e.to_string())
}
