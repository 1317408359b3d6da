//! Create `product` table with FK to `category.code`.
//!
//! `img_url` stays NULL until the image upload for the row succeeded.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(pk_auto(Product::No))
                    .col(string_len(Product::CategoryCode, 32).not_null())
                    .col(string_len(Product::Name, 128).not_null())
                    .col(integer(Product::Price).not_null())
                    .col(integer(Product::Cost).not_null())
                    .col(integer(Product::Stock).not_null())
                    .col(integer(Product::MinStock).not_null())
                    .col(date(Product::ReceivingDate).not_null())
                    .col(string_len(Product::Code, 64).not_null())
                    .col(string_len(Product::Location, 128).not_null())
                    .col(
                        ColumnDef::new(Product::ImgUrl)
                            .string_len(255)
                            .null(),
                    )
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Product::Table, Product::CategoryCode)
                            .to(Category::Table, Category::Code)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    No,
    CategoryCode,
    Name,
    Price,
    Cost,
    Stock,
    MinStock,
    ReceivingDate,
    Code,
    Location,
    ImgUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Category { Table, Code }
