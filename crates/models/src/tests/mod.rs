//! DB-backed tests. Each test skips when no PostgreSQL is reachable at
//! `DATABASE_URL`.


use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    let db = match crate::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}
