//! Category operations that keep records and derivative files consistent.
//!
//! Every mutation is a two-step saga over the record store and the upload
//! directory:
//!
//! - create: write the derivative set, then insert the record. A failed
//!   insert deletes the new set.
//! - update with image: write the new set, then update the record. A failed
//!   update deletes the new set; a committed one deletes the old set.
//! - delete: delete the record, then its derivative set.
//!
//! Files are always written before the record commits and deleted only after
//! it commits. Deleting an obsolete set never fails the request.

use std::sync::Arc;

use catalog_core::{
    Category, CategoryChanges, CategoryId, CategoryRepository, Error, ImageResizer, NewCategory,
    Result,
};
use catalog_images::DerivativeStore;

use crate::form::{CategoryForm, Upload};

/// Per-request values threaded through every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

/// Coordinates the record store, the resizer and the derivative store.
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    resizer: Arc<dyn ImageResizer>,
    store: Arc<DerivativeStore>,
}

impl CategoryService {
    pub fn new(
        repo: Arc<dyn CategoryRepository>,
        resizer: Arc<dyn ImageResizer>,
        store: Arc<DerivativeStore>,
    ) -> Self {
        Self {
            repo,
            resizer,
            store,
        }
    }

    pub fn store(&self) -> &DerivativeStore {
        &self.store
    }

    /// All categories in id order.
    pub async fn list(&self, rc: &RequestContext) -> Result<Vec<Category>> {
        self.blocking(rc, |svc, _| svc.repo.list()).await
    }

    pub async fn get(&self, rc: &RequestContext, id: CategoryId) -> Result<Category> {
        self.blocking(rc, move |svc, _| svc.find(id)).await
    }

    pub async fn create(&self, rc: &RequestContext, form: CategoryForm) -> Result<Category> {
        self.blocking(rc, move |svc, rc| svc.create_blocking(rc, form))
            .await
    }

    pub async fn update(
        &self,
        rc: &RequestContext,
        id: CategoryId,
        form: CategoryForm,
    ) -> Result<Category> {
        self.blocking(rc, move |svc, rc| svc.update_blocking(rc, id, form))
            .await
    }

    pub async fn delete(&self, rc: &RequestContext, id: CategoryId) -> Result<()> {
        self.blocking(rc, move |svc, rc| svc.delete_blocking(rc, id))
            .await
    }

    /// Run `f` on the blocking pool; image codecs and SQLite both block.
    async fn blocking<T, F>(&self, rc: &RequestContext, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Self, &RequestContext) -> Result<T> + Send + 'static,
    {
        let svc = self.clone();
        let rc = rc.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| f(&svc, &rc)))
            .await
            .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }

    fn find(&self, id: CategoryId) -> Result<Category> {
        self.repo
            .get(id)?
            .ok_or_else(|| Error::not_found("category", id))
    }

    fn create_blocking(&self, rc: &RequestContext, form: CategoryForm) -> Result<Category> {
        let input = form.into_create()?;
        let image = self.write_set(&input.image)?;

        let new = NewCategory {
            name: input.name,
            description: input.description,
            image: image.clone(),
        };

        match self.repo.insert(&new) {
            Ok(category) => {
                tracing::info!(
                    request_id = %rc.request_id,
                    id = %category.id,
                    image = %image,
                    "Created category"
                );
                Ok(category)
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %rc.request_id,
                    image = %image,
                    "Insert failed, removing new derivatives: {e}"
                );
                self.discard_set(rc, &image);
                Err(e)
            }
        }
    }

    fn update_blocking(
        &self,
        rc: &RequestContext,
        id: CategoryId,
        form: CategoryForm,
    ) -> Result<Category> {
        // Existence first: an unknown id is 404 even with an invalid form.
        self.find(id)?;
        let input = form.into_update()?;

        let new_image = input
            .image
            .as_ref()
            .map(|upload| self.write_set(upload))
            .transpose()?;

        let changes = CategoryChanges {
            name: input.name,
            description: input.description,
            image: new_image.clone(),
        };

        let updated = match self.repo.update(id, &changes) {
            Ok(Some(updated)) => updated,
            outcome => {
                if let Some(image) = &new_image {
                    self.discard_set(rc, image);
                }
                return Err(match outcome {
                    Err(e) => e,
                    Ok(_) => Error::not_found("category", id),
                });
            }
        };

        if let Some(image) = &new_image {
            if *image != updated.previous_image {
                self.discard_set(rc, &updated.previous_image);
            }
        }

        tracing::info!(
            request_id = %rc.request_id,
            id = %id,
            image_replaced = new_image.is_some(),
            "Updated category"
        );
        Ok(updated.category)
    }

    fn delete_blocking(&self, rc: &RequestContext, id: CategoryId) -> Result<()> {
        let deleted = self
            .repo
            .delete(id)?
            .ok_or_else(|| Error::not_found("category", id))?;
        self.discard_set(rc, &deleted.image);

        tracing::info!(request_id = %rc.request_id, id = %id, "Deleted category");
        Ok(())
    }

    fn write_set(&self, upload: &Upload) -> Result<String> {
        self.store.store(
            self.resizer.as_ref(),
            &upload.bytes,
            upload.file_name.as_deref(),
        )
    }

    /// Best-effort removal of a derivative set; problems are only logged.
    fn discard_set(&self, rc: &RequestContext, image: &str) {
        let report = self.store.remove(image);
        if !report.is_clean() {
            tracing::warn!(
                request_id = %rc.request_id,
                image = %image,
                failed = report.failed.len(),
                "Some derivatives could not be removed"
            );
        }
    }
}
