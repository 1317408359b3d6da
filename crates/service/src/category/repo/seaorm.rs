use sea_orm::DatabaseConnection;

use crate::category::domain::Category;
use crate::category::repository::{CategoryLookup, CategoryRepository};
use crate::errors::ServiceError;

pub struct SeaOrmCategoryRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: models::category::Model) -> Category {
    Category { code: m.code, name: m.name }
}

#[async_trait::async_trait]
impl CategoryLookup for SeaOrmCategoryRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Category>, ServiceError> {
        let found = models::category::find_by_code(&self.db, code).await?;
        Ok(found.map(to_domain))
    }
}

#[async_trait::async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        let rows = models::category::list(&self.db).await?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn create(&self, code: &str, name: &str) -> Result<Category, ServiceError> {
        let created = models::category::create(&self.db, code, name).await?;
        Ok(to_domain(created))
    }
}
