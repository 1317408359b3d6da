use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend, StorageConfig};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::{
    auth::{repo::SeaOrmAuthRepository, AuthConfig, AuthService},
    category::{repo::seaorm::SeaOrmCategoryRepository, CategoryService},
    product::{repo::seaorm::SeaOrmProductStore, ProductService},
    storage::{BlobUploader, LocalBlobUploader},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

async fn build_uploader(cfg: &StorageConfig) -> Result<Arc<dyn BlobUploader>, StartupError> {
    match cfg.backend {
        StorageBackend::Local => {
            common::env::ensure_blob_root(&cfg.local_root).await?;
            let local = LocalBlobUploader::new(cfg.local_root.clone())
                .await
                .map_err(|e| StartupError::Storage(e.to_string()))?;
            info!(root = %cfg.local_root, "local blob storage ready");
            Ok(Arc::new(local))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            let s3 = service::storage::S3BlobUploader::new(&cfg.bucket, &cfg.region, cfg.endpoint.as_deref()).await;
            info!(bucket = %cfg.bucket, region = %cfg.region, "s3 blob storage ready");
            Ok(Arc::new(s3))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(StartupError::InvalidConfig(
            "storage.backend = \"s3\" needs the server built with the `s3` feature".into(),
        )),
    }
}

/// Wire repositories, storage and services into the router state.
pub fn build_state(cfg: &AppConfig, db: DatabaseConnection, uploader: Arc<dyn BlobUploader>) -> ServerState {
    let categories = Arc::new(SeaOrmCategoryRepository { db: db.clone() });
    let products = Arc::new(SeaOrmProductStore { db: db.clone() });
    let auth_repo = Arc::new(SeaOrmAuthRepository::new(db));

    ServerState {
        auth: Arc::new(AuthService::new(auth_repo, AuthConfig::from(&cfg.auth))),
        categories: Arc::new(CategoryService::new(categories.clone())),
        products: Arc::new(ProductService::new(categories, products, uploader)),
    }
}

/// Build the app from a validated config and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        Migrator::up(&db, None).await?;
        info!("migrations applied");
    } else {
        warn!("database.auto_migrate disabled; assuming schema is current");
    }

    let uploader = build_uploader(&cfg.storage).await?;
    let state = build_state(&cfg, db, uploader);
    let app: Router = routes::build_router(state, build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
