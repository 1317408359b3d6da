use async_trait::async_trait;

use super::domain::{NewProduct, Product};
use super::errors::ProductError;
use crate::pagination::Pagination;

/// Persistence contract for products.
///
/// Every call is its own atomic unit; the service sequences them and
/// compensates when a later external step fails.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_number(&self, number: i32) -> Result<Option<Product>, ProductError>;
    /// Persist a new product and return it with its assigned number.
    async fn insert(&self, product: NewProduct) -> Result<Product, ProductError>;
    /// Persist every field of an existing product.
    async fn save(&self, product: Product) -> Result<Product, ProductError>;
    async fn delete(&self, product: &Product) -> Result<(), ProductError>;
    async fn list(&self, page: Pagination) -> Result<Vec<Product>, ProductError>;
}

/// Simple in-memory mock store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryProductStore {
        rows: Mutex<BTreeMap<i32, Product>>, // key: number
        last_number: Mutex<i32>,
        fail_saves: AtomicBool,
        fail_deletes: AtomicBool,
    }

    impl InMemoryProductStore {
        /// Make `save` fail; `insert` keeps working.
        pub fn set_fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_deletes(&self, fail: bool) {
            self.fail_deletes.store(fail, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn get(&self, number: i32) -> Option<Product> {
            self.rows.lock().unwrap().get(&number).cloned()
        }
    }

    #[async_trait]
    impl ProductStore for InMemoryProductStore {
        async fn find_by_number(&self, number: i32) -> Result<Option<Product>, ProductError> {
            Ok(self.get(number))
        }

        async fn insert(&self, product: NewProduct) -> Result<Product, ProductError> {
            let number = {
                let mut last = self.last_number.lock().unwrap();
                *last += 1;
                *last
            };
            let p = Product::from_new(number, product);
            self.rows.lock().unwrap().insert(number, p.clone());
            Ok(p)
        }

        async fn save(&self, product: Product) -> Result<Product, ProductError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(ProductError::Repository("save rejected".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&product.number) {
                Some(row) => {
                    *row = product.clone();
                    Ok(product)
                }
                None => Err(ProductError::ProductNotFound(product.number)),
            }
        }

        async fn delete(&self, product: &Product) -> Result<(), ProductError> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(ProductError::Repository("delete rejected".into()));
            }
            self.rows.lock().unwrap().remove(&product.number);
            Ok(())
        }

        async fn list(&self, page: Pagination) -> Result<Vec<Product>, ProductError> {
            let (_, per_page) = page.normalize();
            let rows = self.rows.lock().unwrap();
            Ok(rows.values().skip(page.offset()).take(per_page as usize).cloned().collect())
        }
    }
}
