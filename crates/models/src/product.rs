use sea_orm::{entity::prelude::*, Set, NotSet, DatabaseConnection, QueryOrder, PaginatorTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::category;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub no: i32,
    pub category_code: String,
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: Date,
    pub code: String,
    pub location: String,
    pub img_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryCode)
                .to(category::Column::Code)
                .into(),
        }
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values written on insert and on full-row update.
#[derive(Clone, Debug)]
pub struct ProductRow {
    pub category_code: String,
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: Date,
    pub code: String,
    pub location: String,
    pub img_url: Option<String>,
}

pub fn validate(row: &ProductRow) -> Result<(), ModelError> {
    if row.name.trim().is_empty() { return Err(ModelError::Validation("product name required".into())); }
    if row.code.trim().is_empty() { return Err(ModelError::Validation("product code required".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, row: ProductRow) -> Result<Model, ModelError> {
    validate(&row)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        no: NotSet,
        category_code: Set(row.category_code),
        name: Set(row.name),
        price: Set(row.price),
        cost: Set(row.cost),
        stock: Set(row.stock),
        min_stock: Set(row.min_stock),
        receiving_date: Set(row.receiving_date),
        code: Set(row.code),
        location: Set(row.location),
        img_url: Set(row.img_url),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Overwrite every mutable column of an existing row.
pub async fn update(db: &DatabaseConnection, no: i32, row: ProductRow) -> Result<Model, ModelError> {
    validate(&row)?;
    let mut am: ActiveModel = Entity::find_by_id(no)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::NotFound(format!("product {no}")))?
        .into();
    am.category_code = Set(row.category_code);
    am.name = Set(row.name);
    am.price = Set(row.price);
    am.cost = Set(row.cost);
    am.stock = Set(row.stock);
    am.min_stock = Set(row.min_stock);
    am.receiving_date = Set(row.receiving_date);
    am.code = Set(row.code);
    am.location = Set(row.location);
    am.img_url = Set(row.img_url);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn find_with_category(db: &DatabaseConnection, no: i32) -> Result<Option<(Model, category::Model)>, ModelError> {
    let found = Entity::find_by_id(no)
        .find_also_related(category::Entity)
        .one(db)
        .await?;
    Ok(found.and_then(|(p, c)| c.map(|c| (p, c))))
}

/// One page of products ordered by number. `page` is 0-based.
pub async fn list_with_category(db: &DatabaseConnection, page: u64, per_page: u64) -> Result<Vec<(Model, category::Model)>, ModelError> {
    let rows = Entity::find()
        .find_also_related(category::Entity)
        .order_by_asc(Column::No)
        .paginate(db, per_page)
        .fetch_page(page)
        .await?;
    Ok(rows.into_iter().filter_map(|(p, c)| c.map(|c| (p, c))).collect())
}

/// Hard delete; returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, no: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(no).exec(db).await?;
    Ok(res.rows_affected > 0)
}
