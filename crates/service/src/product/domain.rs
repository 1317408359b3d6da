use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::ProductError;
use crate::category::Category;
use crate::storage::ImageUpload;

/// Format accepted for `receiving_date`.
pub const RECEIVING_DATE_FORMAT: &str = "%Y-%m-%d";

/// Root prefix of every product image key.
pub const STORAGE_ROOT: &str = "products";

/// Directory holding the images of one category: `products/{category_code}`.
pub fn storage_dir(category_code: &str) -> String {
    format!("{STORAGE_ROOT}/{category_code}")
}

pub fn parse_receiving_date(raw: &str) -> Result<NaiveDate, ProductError> {
    NaiveDate::parse_from_str(raw.trim(), RECEIVING_DATE_FORMAT)
        .map_err(|_| ProductError::InvalidDateFormat(raw.to_string()))
}

/// Mutable product fields as sent by a client; the date is still raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: String,
    pub code: String,
    pub location: String,
}

/// Fields after validation.
struct Checked {
    name: String,
    receiving_date: NaiveDate,
    code: String,
    location: String,
}

impl ProductFields {
    fn check(&self) -> Result<Checked, ProductError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductError::Validation("name required".into()));
        }
        let code = self.code.trim();
        if code.is_empty() {
            return Err(ProductError::Validation("code required".into()));
        }
        for (field, value) in [("price", self.price), ("cost", self.cost), ("stock", self.stock), ("min_stock", self.min_stock)] {
            if value < 0 {
                return Err(ProductError::Validation(format!("{field} must be >= 0")));
            }
        }
        let receiving_date = parse_receiving_date(&self.receiving_date)?;
        Ok(Checked {
            name: name.to_string(),
            receiving_date,
            code: code.to_string(),
            location: self.location.trim().to_string(),
        })
    }
}

/// A product that has not been persisted yet: no number, no image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub category: Category,
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: NaiveDate,
    pub code: String,
    pub location: String,
}

impl NewProduct {
    /// Validate `fields` and bind them to `category`.
    pub fn create(category: Category, fields: &ProductFields) -> Result<Self, ProductError> {
        let checked = fields.check()?;
        Ok(Self {
            category,
            name: checked.name,
            price: fields.price,
            cost: fields.cost,
            stock: fields.stock,
            min_stock: fields.min_stock,
            receiving_date: checked.receiving_date,
            code: checked.code,
            location: checked.location,
        })
    }
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub number: i32,
    pub category: Category,
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: NaiveDate,
    pub code: String,
    pub location: String,
    /// Set only once an image upload for this product succeeded.
    pub img_url: Option<String>,
}

impl Product {
    /// Attach the number assigned by the store.
    pub fn from_new(number: i32, new: NewProduct) -> Self {
        Self {
            number,
            category: new.category,
            name: new.name,
            price: new.price,
            cost: new.cost,
            stock: new.stock,
            min_stock: new.min_stock,
            receiving_date: new.receiving_date,
            code: new.code,
            location: new.location,
            img_url: None,
        }
    }

    /// Replace every mutable field at once. Number, category and image stay.
    pub fn update(self, fields: &ProductFields) -> Result<Self, ProductError> {
        let checked = fields.check()?;
        Ok(Self {
            name: checked.name,
            price: fields.price,
            cost: fields.cost,
            stock: fields.stock,
            min_stock: fields.min_stock,
            receiving_date: checked.receiving_date,
            code: checked.code,
            location: checked.location,
            ..self
        })
    }

    pub fn with_image(self, stored_key: String) -> Self {
        Self { img_url: Some(stored_key), ..self }
    }

    pub fn storage_dir(&self) -> String {
        storage_dir(&self.category.code)
    }

    /// Key the image of this product is stored under.
    pub fn storage_key(&self) -> String {
        format!("{}/{}", self.storage_dir(), self.number)
    }
}

/// Input of [`ProductService::save`](super::ProductService::save).
#[derive(Debug, Clone)]
pub struct SaveProductInput {
    pub category_code: String,
    pub fields: ProductFields,
    pub image: ImageUpload,
}

/// Input of [`ProductService::update`](super::ProductService::update).
/// An absent or empty image leaves the stored one untouched.
#[derive(Debug, Clone)]
pub struct UpdateProductInput {
    pub fields: ProductFields,
    pub image: Option<ImageUpload>,
}

/// Response view of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub number: i32,
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: NaiveDate,
    pub code: String,
    pub location: String,
    pub img_url: Option<String>,
    pub category_code: String,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            number: p.number,
            name: p.name.clone(),
            price: p.price,
            cost: p.cost,
            stock: p.stock,
            min_stock: p.min_stock,
            receiving_date: p.receiving_date,
            code: p.code.clone(),
            location: p.location.clone(),
            img_url: p.img_url.clone(),
            category_code: p.category.code.clone(),
        }
    }
}
