use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_code(code: &str) -> Result<(), ModelError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ModelError::Validation("category code required".into()));
    }
    if code.len() > 32 || code.contains('/') || code == "." || code == ".." {
        return Err(ModelError::Validation("category code must be a path segment of at most 32 chars".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, code: &str, name: &str) -> Result<Model, ModelError> {
    validate_code(code)?;
    if name.trim().is_empty() { return Err(ModelError::Validation("category name required".into())); }
    let am = ActiveModel {
        code: Set(code.trim().to_string()),
        name: Set(name.trim().to_string()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_code(db: &DatabaseConnection, code: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Code.eq(code)).one(db).await?)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::Code).all(db).await?)
}
