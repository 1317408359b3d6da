use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{Category, CreateCategoryInput};
use super::repository::CategoryRepository;
use crate::errors::ServiceError;

/// Category management independent of web framework
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self { Self { repo } }

    /// Create a category with a unique code.
    ///
    /// # Examples
    /// ```
    /// use service::category::{CategoryService, domain::CreateCategoryInput, repository::mock::InMemoryCategoryRepository};
    /// use std::sync::Arc;
    /// let svc = CategoryService::new(Arc::new(InMemoryCategoryRepository::default()));
    /// let c = tokio_test::block_on(svc.create(CreateCategoryInput { code: "ENG".into(), name: "Engine".into() })).unwrap();
    /// assert_eq!(c.code, "ENG");
    /// ```
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, ServiceError> {
        let code = input.code.trim();
        let name = input.name.trim();
        models::category::validate_code(code)?;
        if name.is_empty() {
            return Err(ServiceError::Validation("category name required".into()));
        }
        if self.repo.find_by_code(code).await?.is_some() {
            return Err(ServiceError::Conflict(format!("category {code} already exists")));
        }
        let created = self.repo.create(code, name).await?;
        info!(code = %created.code, "category_created");
        Ok(created)
    }

    pub async fn get(&self, code: &str) -> Result<Category, ServiceError> {
        self.repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::not_found("category"))
    }

    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> { self.repo.list().await }
}
