//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the blob root exists when the local storage backend is used.
pub async fn ensure_blob_root(blob_root: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(blob_root).await.is_err() {
        warn!(%blob_root, "blob root not found; creating it");
    }
    tokio::fs::create_dir_all(blob_root)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {blob_root}: {e}"))?;
    info!(%blob_root, "blob root ready");
    Ok(())
}
