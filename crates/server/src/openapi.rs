use chrono::NaiveDate;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SignupRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct SigninRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct CategoryDoc { pub code: String, pub name: String }

#[derive(ToSchema)]
pub struct ProductDoc {
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

/// `multipart/form-data` body of `POST /products`.
#[derive(ToSchema)]
pub struct CreateProductForm {
    pub category_code: String,
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    /// YYYY-MM-DD
    pub receiving_date: String,
    pub code: String,
    pub location: String,
    #[schema(value_type = String, format = Binary)]
    pub img: Vec<u8>,
}

/// `multipart/form-data` body of `PUT /products/{number}`; `img` may be left out.
#[derive(ToSchema)]
pub struct UpdateProductForm {
    pub name: String,
    pub price: i32,
    pub cost: i32,
    pub stock: i32,
    pub min_stock: i32,
    pub receiving_date: String,
    pub code: String,
    pub location: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub img: Option<Vec<u8>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::signin,
        crate::routes::categories::list,
        crate::routes::categories::create,
        crate::routes::categories::get,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            SigninRequest,
            CategoryDoc,
            ProductDoc,
            CreateProductForm,
            UpdateProductForm,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "category"),
        (name = "product")
    )
)]
pub struct ApiDoc;
