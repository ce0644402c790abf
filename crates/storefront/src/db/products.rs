//! Product repository.

use mystery_sack_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

/// Catalog table. Iteration order is insertion order, which is the listing
/// order shoppers see.
#[derive(Debug, Default)]
pub struct ProductRepository {
    rows: Vec<Product>,
}

impl ProductRepository {
    /// Create an empty product repository.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Get a product by its ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.rows.iter().find(|p| p.id == id)
    }

    /// Get a product by its ID, or a `NotFound` error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    pub fn require(&self, id: ProductId) -> Result<&Product, RepositoryError> {
        self.get(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))
    }

    /// Mutable access to a product.
    pub fn get_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.rows.iter_mut().find(|p| p.id == id)
    }

    /// All products in listing order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The ID one past the highest ID in use.
    #[must_use]
    pub fn next_id(&self) -> ProductId {
        let max = self.rows.iter().map(|p| p.id.as_i32()).max().unwrap_or(0);
        ProductId::new(max + 1)
    }

    /// Insert a new product or replace the one with the same ID in place.
    ///
    /// Returns `true` if an existing product was replaced.
    pub fn upsert(&mut self, product: Product) -> bool {
        if let Some(existing) = self.get_mut(product.id) {
            *existing = product;
            true
        } else {
            self.rows.push(product);
            false
        }
    }

    /// Delete a product.
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    pub fn delete(&mut self, id: ProductId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|p| p.id != id);
        self.rows.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut repo = ProductRepository::new();
        for product in seed::products() {
            repo.upsert(product);
        }
        let first_id = repo.all().first().map(|p| p.id);

        let mut edited = seed::products().swap_remove(0);
        edited.name = "Renamed".to_string();
        assert!(repo.upsert(edited));
        assert_eq!(repo.all().first().map(|p| p.id), first_id);
        assert_eq!(
            repo.get(ProductId::new(1)).map(|p| p.name.as_str()),
            Some("Renamed")
        );
    }

    #[test]
    fn test_require_and_delete() {
        let mut repo = ProductRepository::new();
        repo.upsert(seed::products().swap_remove(0));
        let id = ProductId::new(1);
        assert!(repo.require(id).is_ok());
        assert!(repo.delete(id));
        assert!(!repo.delete(id));
        assert_eq!(
            repo.require(id).map(|p| p.id),
            Err(RepositoryError::NotFound("product 1".to_string()))
        );
    }

    #[test]
    fn test_next_id() {
        let mut repo = ProductRepository::new();
        assert_eq!(repo.next_id(), ProductId::new(1));
        for product in seed::products() {
            repo.upsert(product);
        }
        assert_eq!(repo.next_id(), ProductId::new(repo.len() as i32 + 1));
    }
}
