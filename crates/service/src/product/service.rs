use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::domain::{storage_dir, NewProduct, ProductResponse, SaveProductInput, UpdateProductInput};
use super::errors::ProductError;
use super::repository::ProductStore;
use crate::category::CategoryLookup;
use crate::pagination::Pagination;
use crate::storage::BlobUploader;

/// Product business service independent of web framework.
///
/// Row writes go through [`ProductStore`]; the image goes to a
/// [`BlobUploader`] that no database rollback can undo, so every failure
/// after a write cleans up explicitly.
pub struct ProductService {
    categories: Arc<dyn CategoryLookup>,
    products: Arc<dyn ProductStore>,
    uploader: Arc<dyn BlobUploader>,
}

impl ProductService {
    pub fn new(
        categories: Arc<dyn CategoryLookup>,
        products: Arc<dyn ProductStore>,
        uploader: Arc<dyn BlobUploader>,
    ) -> Self {
        Self { categories, products, uploader }
    }

    /// Register a product and store its image under `products/{category}/{number}`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::category::repository::mock::InMemoryCategoryRepository;
    /// use service::product::{ProductService, domain::{ProductFields, SaveProductInput}, repository::mock::InMemoryProductStore};
    /// use service::storage::{ImageUpload, InMemoryBlobUploader};
    /// let svc = ProductService::new(
    ///     Arc::new(InMemoryCategoryRepository::with_categories([("ENG", "Engine")])),
    ///     Arc::new(InMemoryProductStore::default()),
    ///     Arc::new(InMemoryBlobUploader::default()),
    /// );
    /// let fields = ProductFields { name: "Bolt".into(), price: 100, cost: 60, stock: 10, min_stock: 2,
    ///     receiving_date: "2024-03-01".into(), code: "B-001".into(), location: "A1".into() };
    /// let input = SaveProductInput { category_code: "ENG".into(), fields, image: ImageUpload::new("bolt.png", None, vec![1u8]) };
    /// let saved = tokio_test::block_on(svc.save(input)).unwrap();
    /// assert_eq!(saved.img_url.as_deref(), Some("products/ENG/1"));
    /// ```
    #[instrument(skip(self, input), fields(category_code = %input.category_code))]
    pub async fn save(&self, input: SaveProductInput) -> Result<ProductResponse, ProductError> {
        let category = self
            .categories
            .find_by_code(&input.category_code)
            .await?
            .ok_or_else(|| ProductError::CategoryNotFound(input.category_code.clone()))?;
        if input.image.is_empty() {
            return Err(ProductError::Validation("product image required".into()));
        }

        let new_product = NewProduct::create(category, &input.fields)?;
        let product = self.products.insert(new_product).await?;

        let dir_name = product.storage_dir();
        let stored_key = match self.uploader.upload(&input.image, &dir_name, &product.number.to_string()).await {
            Ok(key) => key,
            Err(e) => {
                warn!(number = product.number, error = %e, "image upload failed, removing inserted product");
                if let Err(cleanup) = self.products.delete(&product).await {
                    error!(number = product.number, error = %cleanup, "compensating delete failed, product row left behind");
                }
                return Err(ProductError::ImageUploadFailed(e));
            }
        };

        let with_image = product.clone().with_image(stored_key.clone());
        let saved = match self.products.save(with_image).await {
            Ok(p) => p,
            Err(e) => {
                warn!(number = product.number, error = %e, "final save failed, removing image and product");
                if let Err(cleanup) = self.uploader.delete(&stored_key).await {
                    error!(key = %stored_key, error = %cleanup, "compensating image delete failed");
                }
                if let Err(cleanup) = self.products.delete(&product).await {
                    error!(number = product.number, error = %cleanup, "compensating delete failed, product row left behind");
                }
                return Err(e);
            }
        };

        info!(number = saved.number, img_url = %stored_key, "product_saved");
        Ok(ProductResponse::from(&saved))
    }

    /// Replace the fields of an existing product; re-upload the image only if one is given.
    ///
    /// A failed upload leaves the stored row untouched.
    #[instrument(skip(self, input), fields(number = number))]
    pub async fn update(&self, number: i32, input: UpdateProductInput) -> Result<ProductResponse, ProductError> {
        let product = self
            .products
            .find_by_number(number)
            .await?
            .ok_or(ProductError::ProductNotFound(number))?;
        let dir_name = storage_dir(&product.category.code);

        let mut updated = product.update(&input.fields)?;

        if let Some(image) = input.image.as_ref().filter(|img| !img.is_empty()) {
            let stored_key = self
                .uploader
                .upload(image, &dir_name, &number.to_string())
                .await
                .map_err(|e| {
                    warn!(number, error = %e, "image re-upload failed, keeping existing product");
                    ProductError::ImageUploadFailed(e)
                })?;
            updated = updated.with_image(stored_key);
        }

        let saved = self.products.save(updated).await?;
        info!(number = saved.number, "product_updated");
        Ok(ProductResponse::from(&saved))
    }

    /// Delete a product together with its image.
    ///
    /// Both deletes are attempted; a failed image delete is reported after
    /// the row is gone.
    #[instrument(skip(self), fields(number = number))]
    pub async fn remove(&self, number: i32) -> Result<(), ProductError> {
        let product = self
            .products
            .find_by_number(number)
            .await?
            .ok_or(ProductError::ForbiddenDelete(number))?;

        let blob_result = match product.img_url.as_deref() {
            Some(key) => self.uploader.delete(key).await,
            None => Ok(()),
        };
        if let Err(e) = &blob_result {
            warn!(number, error = %e, "image delete failed, deleting product row anyway");
        }

        self.products.delete(&product).await?;
        blob_result.map_err(ProductError::ImageDeleteFailed)?;

        info!(number, "product_removed");
        Ok(())
    }

    pub async fn get(&self, number: i32) -> Result<ProductResponse, ProductError> {
        let product = self
            .products
            .find_by_number(number)
            .await?
            .ok_or(ProductError::ProductNotFound(number))?;
        Ok(ProductResponse::from(&product))
    }

    pub async fn list(&self, page: Pagination) -> Result<Vec<ProductResponse>, ProductError> {
        let products = self.products.list(page).await?;
        Ok(products.iter().map(ProductResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::repository::mock::InMemoryCategoryRepository;
    use crate::product::domain::ProductFields;
    use crate::product::repository::mock::InMemoryProductStore;
    use crate::storage::{ImageUpload, InMemoryBlobUploader};

    struct Fixture {
        svc: ProductService,
        store: Arc<InMemoryProductStore>,
        blobs: Arc<InMemoryBlobUploader>,
    }

    fn fixture() -> Fixture {
        let categories = Arc::new(InMemoryCategoryRepository::with_categories([("ENG", "Engine"), ("BRK", "Brake")]));
        let store = Arc::new(InMemoryProductStore::default());
        let blobs = Arc::new(InMemoryBlobUploader::default());
        let svc = ProductService::new(categories, store.clone(), blobs.clone());
        Fixture { svc, store, blobs }
    }

    fn fields(price: i32) -> ProductFields {
        ProductFields {
            name: "Bolt".into(),
            price,
            cost: 60,
            stock: 10,
            min_stock: 2,
            receiving_date: "2024-03-01".into(),
            code: "B-001".into(),
            location: "A1".into(),
        }
    }

    fn image(bytes: &[u8]) -> ImageUpload {
        ImageUpload::new("bolt.png", Some("image/png".into()), bytes.to_vec())
    }

    fn save_input(category_code: &str) -> SaveProductInput {
        SaveProductInput { category_code: category_code.into(), fields: fields(100), image: image(b"png") }
    }

    #[tokio::test]
    async fn save_persists_row_and_image() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();

        let expected_key = format!("products/ENG/{}", saved.number);
        assert_eq!(saved.img_url.as_deref(), Some(expected_key.as_str()));
        assert_eq!(f.store.len(), 1);
        assert_eq!(f.store.get(saved.number).unwrap().img_url, Some(expected_key.clone()));
        assert_eq!(f.blobs.get(&expected_key).unwrap().as_ref(), b"png");
        assert_eq!(saved.category_code, "ENG");
    }

    #[tokio::test]
    async fn save_unknown_category_has_no_effects() {
        let f = fixture();
        let err = f.svc.save(save_input("NOPE")).await.unwrap_err();
        assert!(matches!(err, ProductError::CategoryNotFound(ref c) if c == "NOPE"));
        assert!(f.store.is_empty());
        assert!(f.blobs.is_empty());
        assert_eq!(f.blobs.upload_count(), 0);
    }

    #[tokio::test]
    async fn save_bad_date_persists_nothing() {
        let f = fixture();
        let mut input = save_input("ENG");
        input.fields.receiving_date = "03/01/2024".into();
        let err = f.svc.save(input).await.unwrap_err();
        assert!(matches!(err, ProductError::InvalidDateFormat(_)));
        assert!(f.store.is_empty());
        assert_eq!(f.blobs.upload_count(), 0);
    }

    #[tokio::test]
    async fn save_upload_failure_removes_inserted_row() {
        let f = fixture();
        f.blobs.set_fail_uploads(true);
        let err = f.svc.save(save_input("ENG")).await.unwrap_err();
        assert!(matches!(err, ProductError::ImageUploadFailed(_)));
        assert!(f.store.is_empty());
        assert!(f.blobs.is_empty());
        assert_eq!(f.blobs.upload_count(), 1);
    }

    #[tokio::test]
    async fn save_upload_failure_still_reported_when_cleanup_fails() {
        let f = fixture();
        f.blobs.set_fail_uploads(true);
        f.store.set_fail_deletes(true);
        let err = f.svc.save(save_input("ENG")).await.unwrap_err();
        assert!(matches!(err, ProductError::ImageUploadFailed(_)));
    }

    #[tokio::test]
    async fn save_unknown_category_wins_over_missing_image() {
        let f = fixture();
        let mut input = save_input("NOPE");
        input.image = ImageUpload::default();
        let err = f.svc.save(input).await.unwrap_err();
        assert!(matches!(err, ProductError::CategoryNotFound(ref c) if c == "NOPE"));
        assert!(f.store.is_empty());
        assert_eq!(f.blobs.upload_count(), 0);
    }

    #[tokio::test]
    async fn save_final_save_failure_removes_image_and_row() {
        let f = fixture();
        f.store.set_fail_saves(true);
        let err = f.svc.save(save_input("ENG")).await.unwrap_err();
        assert!(matches!(err, ProductError::Repository(_)));
        assert_eq!(f.blobs.upload_count(), 1);
        assert!(f.blobs.is_empty());
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn remove_reports_row_delete_failure_after_blob_delete() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        f.store.set_fail_deletes(true);
        let err = f.svc.remove(saved.number).await.unwrap_err();
        assert!(matches!(err, ProductError::Repository(_)));
        assert!(f.blobs.is_empty());
        assert!(f.store.get(saved.number).is_some());
    }

    #[tokio::test]
    async fn save_requires_image() {
        let f = fixture();
        let mut input = save_input("ENG");
        input.image = ImageUpload::default();
        let err = f.svc.save(input).await.unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn update_without_image_skips_upload() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        let uploads = f.blobs.upload_count();

        for image in [None, Some(ImageUpload::default())] {
            let updated = f
                .svc
                .update(saved.number, UpdateProductInput { fields: fields(150), image })
                .await
                .unwrap();
            assert_eq!(updated.price, 150);
            assert_eq!(updated.img_url, saved.img_url);
        }
        assert_eq!(f.blobs.upload_count(), uploads);
        assert_eq!(f.store.get(saved.number).unwrap().price, 150);
    }

    #[tokio::test]
    async fn update_with_image_overwrites_same_key() {
        let f = fixture();
        let saved = f.svc.save(save_input("BRK")).await.unwrap();
        let key = saved.img_url.clone().unwrap();

        let updated = f
            .svc
            .update(saved.number, UpdateProductInput { fields: fields(120), image: Some(image(b"new")) })
            .await
            .unwrap();
        assert_eq!(updated.img_url.as_deref(), Some(key.as_str()));
        assert_eq!(f.blobs.get(&key).unwrap().as_ref(), b"new");
        assert_eq!(f.blobs.len(), 1);
        assert_eq!(f.store.get(saved.number).unwrap().price, 120);
    }

    #[tokio::test]
    async fn update_upload_failure_keeps_existing_row() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        f.blobs.set_fail_uploads(true);

        let err = f
            .svc
            .update(saved.number, UpdateProductInput { fields: fields(999), image: Some(image(b"new")) })
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::ImageUploadFailed(_)));
        let row = f.store.get(saved.number).unwrap();
        assert_eq!(row.price, 100);
        assert_eq!(row.img_url, saved.img_url);
    }

    #[tokio::test]
    async fn update_missing_product_not_found() {
        let f = fixture();
        let err = f.svc.update(77, UpdateProductInput { fields: fields(1), image: None }).await.unwrap_err();
        assert!(matches!(err, ProductError::ProductNotFound(77)));
    }

    #[tokio::test]
    async fn update_bad_date_persists_nothing() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        let mut bad = fields(500);
        bad.receiving_date = "yesterday".into();
        let err = f.svc.update(saved.number, UpdateProductInput { fields: bad, image: Some(image(b"x")) }).await.unwrap_err();
        assert!(matches!(err, ProductError::InvalidDateFormat(_)));
        assert_eq!(f.store.get(saved.number).unwrap().price, 100);
        assert_eq!(f.blobs.upload_count(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_blob_and_row() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        f.svc.remove(saved.number).await.unwrap();
        assert!(f.store.is_empty());
        assert!(f.blobs.is_empty());
    }

    #[tokio::test]
    async fn remove_missing_product_is_forbidden() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        let err = f.svc.remove(saved.number + 1).await.unwrap_err();
        assert!(matches!(err, ProductError::ForbiddenDelete(_)));
        assert_eq!(f.store.len(), 1);
        assert_eq!(f.blobs.len(), 1);
    }

    #[tokio::test]
    async fn remove_reports_blob_failure_after_deleting_row() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        f.blobs.set_fail_deletes(true);
        let err = f.svc.remove(saved.number).await.unwrap_err();
        assert!(matches!(err, ProductError::ImageDeleteFailed(_)));
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn create_update_remove_walkthrough() {
        let f = fixture();
        let saved = f.svc.save(save_input("ENG")).await.unwrap();
        assert_eq!(saved.img_url, Some(format!("products/ENG/{}", saved.number)));

        let updated = f
            .svc
            .update(saved.number, UpdateProductInput { fields: fields(150), image: None })
            .await
            .unwrap();
        assert_eq!(updated.price, 150);
        assert_eq!(updated.img_url, saved.img_url);

        f.svc.remove(saved.number).await.unwrap();
        assert!(!f.blobs.contains(saved.img_url.as_deref().unwrap()));
        assert!(f.store.get(saved.number).is_none());

        let again = f.svc.remove(saved.number).await.unwrap_err();
        assert!(matches!(again, ProductError::ForbiddenDelete(_)));
    }

    #[tokio::test]
    async fn get_and_list() {
        let f = fixture();
        let a = f.svc.save(save_input("ENG")).await.unwrap();
        let b = f.svc.save(save_input("BRK")).await.unwrap();

        assert_eq!(f.svc.get(a.number).await.unwrap(), a);
        assert!(matches!(f.svc.get(99).await, Err(ProductError::ProductNotFound(99))));

        let all = f.svc.list(Pagination::default()).await.unwrap();
        assert_eq!(all, vec![a.clone(), b]);
        let second_page = f.svc.list(Pagination { page: 2, per_page: 1 }).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].category_code, "BRK");
    }
}
