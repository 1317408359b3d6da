use sea_orm::DatabaseConnection;

use models::errors::ModelError;
use models::product::ProductRow;

use crate::category::Category;
use crate::pagination::Pagination;
use crate::product::domain::{NewProduct, Product};
use crate::product::errors::ProductError;
use crate::product::repository::ProductStore;

pub struct SeaOrmProductStore {
    pub db: DatabaseConnection,
}

fn to_domain(p: models::product::Model, c: models::category::Model) -> Product {
    Product {
        number: p.no,
        category: Category { code: c.code, name: c.name },
        name: p.name,
        price: p.price,
        cost: p.cost,
        stock: p.stock,
        min_stock: p.min_stock,
        receiving_date: p.receiving_date,
        code: p.code,
        location: p.location,
        img_url: p.img_url,
    }
}

fn map_err(number: Option<i32>, e: ModelError) -> ProductError {
    match e {
        ModelError::Validation(msg) => ProductError::Validation(msg),
        ModelError::NotFound(msg) => match number {
            Some(n) => ProductError::ProductNotFound(n),
            None => ProductError::Repository(msg),
        },
        ModelError::Db(msg) => ProductError::Repository(msg),
    }
}

#[async_trait::async_trait]
impl ProductStore for SeaOrmProductStore {
    async fn find_by_number(&self, number: i32) -> Result<Option<Product>, ProductError> {
        let found = models::product::find_with_category(&self.db, number)
            .await
            .map_err(|e| map_err(Some(number), e))?;
        Ok(found.map(|(p, c)| to_domain(p, c)))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, ProductError> {
        let row = ProductRow {
            category_code: product.category.code.clone(),
            name: product.name.clone(),
            price: product.price,
            cost: product.cost,
            stock: product.stock,
            min_stock: product.min_stock,
            receiving_date: product.receiving_date,
            code: product.code.clone(),
            location: product.location.clone(),
            img_url: None,
        };
        let created = models::product::create(&self.db, row)
            .await
            .map_err(|e| map_err(None, e))?;
        Ok(Product::from_new(created.no, product))
    }

    async fn save(&self, product: Product) -> Result<Product, ProductError> {
        let row = ProductRow {
            category_code: product.category.code.clone(),
            name: product.name.clone(),
            price: product.price,
            cost: product.cost,
            stock: product.stock,
            min_stock: product.min_stock,
            receiving_date: product.receiving_date,
            code: product.code.clone(),
            location: product.location.clone(),
            img_url: product.img_url.clone(),
        };
        models::product::update(&self.db, product.number, row)
            .await
            .map_err(|e| map_err(Some(product.number), e))?;
        Ok(product)
    }

    async fn delete(&self, product: &Product) -> Result<(), ProductError> {
        let removed = models::product::delete(&self.db, product.number)
            .await
            .map_err(|e| map_err(Some(product.number), e))?;
        if !removed {
            return Err(ProductError::ProductNotFound(product.number));
        }
        Ok(())
    }

    async fn list(&self, page: Pagination) -> Result<Vec<Product>, ProductError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::product::list_with_category(&self.db, page_idx, per_page)
            .await
            .map_err(|e| map_err(None, e))?;
        Ok(rows.into_iter().map(|(p, c)| to_domain(p, c)).collect())
    }
}
