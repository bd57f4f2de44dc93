//! Category domain model and the persistence capability behind it.

use serde::{Deserialize, Serialize};

use crate::ids::CategoryId;
use crate::Result;

/// A product category as stored and as returned by the API.
///
/// `image` holds only the base filename; the derivative files on disk are
/// named `{width}_{image}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Values for a category that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Changes applied to an existing category.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Result of a committed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedCategory {
    pub category: Category,
    /// The image base filename the row held before the update, read in the
    /// same transaction as the write.
    pub previous_image: String,
}

/// Record-store capability for categories.
///
/// Implementations must return `list` in id order.
pub trait CategoryRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Category>>;

    fn get(&self, id: CategoryId) -> Result<Option<Category>>;

    fn insert(&self, new: &NewCategory) -> Result<Category>;

    /// Apply `changes`, returning the updated row together with the image it
    /// replaced, or `None` if `id` is absent.
    fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Option<UpdatedCategory>>;

    /// Remove the row, returning it as it was, or `None` if `id` is absent.
    fn delete(&self, id: CategoryId) -> Result<Option<Category>>;
}
