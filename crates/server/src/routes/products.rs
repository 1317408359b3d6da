use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::info;

use service::auth::domain::Claims;
use service::pagination::Pagination;
use service::product::domain::{ProductFields, ProductResponse, SaveProductInput, UpdateProductInput};
use service::storage::ImageUpload;

use crate::{errors::JsonApiError, routes::auth::ServerState};

/// Multipart bodies may carry an image of up to this many bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<ListQuery> for Pagination {
    fn from(q: ListQuery) -> Self {
        let d = Pagination::default();
        Pagination { page: q.page.unwrap_or(d.page), per_page: q.per_page.unwrap_or(d.per_page) }
    }
}

/// Text fields and the optional `img` part of a product form.
#[derive(Debug, Default)]
struct ProductForm {
    text: HashMap<String, String>,
    img: Option<ImageUpload>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self, JsonApiError> {
        let mut form = ProductForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| JsonApiError::bad_request(format!("malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else { continue };
            if name == "img" {
                let file_name = field.file_name().unwrap_or("img").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("cannot read img: {e}")))?;
                form.img = Some(ImageUpload::new(file_name, content_type, bytes));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("cannot read {name}: {e}")))?;
                form.text.insert(name, value);
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> Result<String, JsonApiError> {
        self.text
            .get(name)
            .cloned()
            .ok_or_else(|| JsonApiError::bad_request(format!("missing field: {name}")))
    }

    fn int(&self, name: &str) -> Result<i32, JsonApiError> {
        self.text(name)?
            .trim()
            .parse::<i32>()
            .map_err(|_| JsonApiError::bad_request(format!("{name} must be an integer")))
    }

    fn fields(&self) -> Result<ProductFields, JsonApiError> {
        Ok(ProductFields {
            name: self.text("name")?,
            price: self.int("price")?,
            cost: self.int("cost")?,
            stock: self.int("stock")?,
            min_stock: self.int("min_stock")?,
            receiving_date: self.text("receiving_date")?,
            code: self.text("code")?,
            location: self.text("location").unwrap_or_default(),
        })
    }
}

#[utoipa::path(
    get, path = "/products", tag = "product",
    params(ListQuery),
    responses((status = 200, description = "List OK", body = [crate::openapi::ProductDoc]))
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<ProductResponse>>, JsonApiError> {
    let items = state.products.list(q.into()).await?;
    Ok(Json(items))
}

#[utoipa::path(
    get, path = "/products/{number}", tag = "product",
    params(("number" = i32, Path, description = "product number")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ProductDoc),
        (status = 400, description = "Invalid Product Number"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(number), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<ProductResponse>, JsonApiError> {
    Ok(Json(state.products.get(number).await?))
}

#[utoipa::path(
    post, path = "/products", tag = "product",
    request_body(content = crate::openapi::CreateProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Category Not Found"),
        (status = 502, description = "Image Upload Failed")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, JsonApiError> {
    let form = ProductForm::read(multipart).await?;
    let input = SaveProductInput {
        category_code: form.text("category_code")?,
        fields: form.fields()?,
        image: form.img.clone().unwrap_or_default(),
    };
    let saved = state.products.save(input).await?;
    info!(number = saved.number, user = %claims.sub, "product_create_request");
    Ok(Json(saved))
}

#[utoipa::path(
    put, path = "/products/{number}", tag = "product",
    params(("number" = i32, Path, description = "product number")),
    request_body(content = crate::openapi::UpdateProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 502, description = "Image Upload Failed")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(number), _): WithRejection<Path<i32>, JsonApiError>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, JsonApiError> {
    let form = ProductForm::read(multipart).await?;
    let input = UpdateProductInput { fields: form.fields()?, image: form.img.clone() };
    let updated = state.products.update(number, input).await?;
    info!(number, user = %claims.sub, "product_update_request");
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/products/{number}", tag = "product",
    params(("number" = i32, Path, description = "product number")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid Product Number"),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Image Delete Failed")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(number), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    state.products.remove(number).await?;
    info!(number, user = %claims.sub, "product_delete_request");
    Ok(StatusCode::NO_CONTENT)
}
