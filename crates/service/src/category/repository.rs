use async_trait::async_trait;

use super::domain::Category;
use crate::errors::ServiceError;

/// Read-only lookup of categories by code.
#[async_trait]
pub trait CategoryLookup: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Category>, ServiceError>;
}

/// Full category persistence used by the management endpoints.
#[async_trait]
pub trait CategoryRepository: CategoryLookup {
    async fn list(&self) -> Result<Vec<Category>, ServiceError>;
    async fn create(&self, code: &str, name: &str) -> Result<Category, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryCategoryRepository {
        categories: Mutex<BTreeMap<String, Category>>, // key: code
    }

    impl InMemoryCategoryRepository {
        pub fn with_categories<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
            let repo = Self::default();
            {
                let mut map = repo.categories.lock().unwrap();
                for (code, name) in items {
                    map.insert(code.to_string(), Category { code: code.to_string(), name: name.to_string() });
                }
            }
            repo
        }
    }

    #[async_trait]
    impl CategoryLookup for InMemoryCategoryRepository {
        async fn find_by_code(&self, code: &str) -> Result<Option<Category>, ServiceError> {
            Ok(self.categories.lock().unwrap().get(code).cloned())
        }
    }

    #[async_trait]
    impl CategoryRepository for InMemoryCategoryRepository {
        async fn list(&self) -> Result<Vec<Category>, ServiceError> {
            Ok(self.categories.lock().unwrap().values().cloned().collect())
        }

        async fn create(&self, code: &str, name: &str) -> Result<Category, ServiceError> {
            let mut map = self.categories.lock().unwrap();
            if map.contains_key(code) {
                return Err(ServiceError::Conflict(format!("category {code} already exists")));
            }
            let c = Category { code: code.to_string(), name: name.to_string() };
            map.insert(code.to_string(), c.clone());
            Ok(c)
        }
    }
}
