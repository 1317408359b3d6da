use axum::{extract::{Path, State}, Json};
use tracing::info;

use service::category::{Category, domain::CreateCategoryInput};

use crate::{errors::JsonApiError, routes::auth::ServerState};

#[utoipa::path(
    get, path = "/categories", tag = "category",
    responses((status = 200, description = "List OK", body = [crate::openapi::CategoryDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Category>>, JsonApiError> {
    let all = state.categories.list().await?;
    info!(count = all.len(), "list categories");
    Ok(Json(all))
}

#[utoipa::path(
    post, path = "/categories", tag = "category",
    request_body = crate::openapi::CategoryDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::CategoryDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Conflict")
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<CreateCategoryInput>) -> Result<Json<Category>, JsonApiError> {
    Ok(Json(state.categories.create(input).await?))
}

#[utoipa::path(
    get, path = "/categories/{code}", tag = "category",
    params(("code" = String, Path, description = "category code")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::CategoryDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(code): Path<String>) -> Result<Json<Category>, JsonApiError> {
    Ok(Json(state.categories.get(&code).await?))
}
