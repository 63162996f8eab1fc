//! Product and customer maintenance.

mod customer;
mod product;

pub use customer::{CUSTOMER_PARTITION, Customer};
pub use product::{DEFAULT_LOW_STOCK_THRESHOLD, PRODUCT_PARTITION, Product};

use record_store::{EntityTag, RecordStore, RecordStoreError, RecordStoreExt, Stored};

use crate::error::DomainError;
use crate::value_objects::{CustomerId, ProductId};

/// Maintains the product and customer records that orders reference.
pub struct Catalog<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Catalog<S> {
    /// Creates a new catalog over the given record store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds a product.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_product(&self, product: Product) -> Result<Stored<Product>, DomainError> {
        validate_product(&product)?;
        let etag = self.store.save(&product).await?;
        tracing::info!(name = %product.name, stock = product.stock_quantity, "product added");
        Ok(Stored {
            entity: product,
            etag,
        })
    }

    /// Loads a product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Stored<Product>>, DomainError> {
        Ok(self.store.load(PRODUCT_PARTITION, id.as_str()).await?)
    }

    /// Replaces a product if it is unchanged since `etag` was read.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update_product(
        &self,
        product: &Product,
        etag: EntityTag,
    ) -> Result<EntityTag, DomainError> {
        validate_product(product)?;
        self.store
            .save_if_match(product, etag)
            .await
            .map_err(|e| match e {
                RecordStoreError::NotFound(_) => DomainError::ProductNotFound(product.id.clone()),
                other => other.into(),
            })
    }

    /// Deletes a product. Returns whether it existed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<bool, DomainError> {
        Ok(self.store.delete(PRODUCT_PARTITION, id.as_str()).await?)
    }

    /// Adds a customer.
    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id))]
    pub async fn add_customer(&self, customer: Customer) -> Result<Stored<Customer>, DomainError> {
        validate_customer(&customer)?;
        let etag = self.store.save(&customer).await?;
        tracing::info!("customer added");
        Ok(Stored {
            entity: customer,
            etag,
        })
    }

    /// Loads a customer.
    #[tracing::instrument(skip(self))]
    pub async fn get_customer(
        &self,
        id: &CustomerId,
    ) -> Result<Option<Stored<Customer>>, DomainError> {
        Ok(self.store.load(CUSTOMER_PARTITION, id.as_str()).await?)
    }

    /// Replaces a customer if it is unchanged since `etag` was read.
    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id))]
    pub async fn update_customer(
        &self,
        customer: &Customer,
        etag: EntityTag,
    ) -> Result<EntityTag, DomainError> {
        validate_customer(customer)?;
        self.store
            .save_if_match(customer, etag)
            .await
            .map_err(|e| match e {
                RecordStoreError::NotFound(_) => {
                    DomainError::CustomerNotFound(customer.id.clone())
                }
                other => other.into(),
            })
    }

    /// Deletes a customer. Orders keep their (now dangling) reference.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: &CustomerId) -> Result<bool, DomainError> {
        Ok(self.store.delete(CUSTOMER_PARTITION, id.as_str()).await?)
    }
}

fn validate_product(product: &Product) -> Result<(), DomainError> {
    if product.name.trim().is_empty() {
        return Err(DomainError::Validation("Product name is required".to_string()));
    }
    if product.price_rand < 0 || !(0..100).contains(&product.price_cents) {
        return Err(DomainError::Validation(
            "Price must be non-negative with cents between 0 and 99".to_string(),
        ));
    }
    if product.stock_quantity < 0 {
        return Err(DomainError::Validation(
            "Stock quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_customer(customer: &Customer) -> Result<(), DomainError> {
    if customer.name.trim().is_empty() {
        return Err(DomainError::Validation("Customer name is required".to_string()));
    }
    if !customer.email.contains('@') {
        return Err(DomainError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}
