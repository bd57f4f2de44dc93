//! [`CategoryRepository`] backed by the SQLite pool.

use catalog_core::{
    Category, CategoryChanges, CategoryId, CategoryRepository, NewCategory, Result,
    UpdatedCategory,
};

use crate::pool::{get_conn, DbPool};
use crate::queries::categories;

/// Category record store over an r2d2 SQLite pool.
#[derive(Clone)]
pub struct SqliteCategoryRepository {
    pool: DbPool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CategoryRepository for SqliteCategoryRepository {
    fn list(&self) -> Result<Vec<Category>> {
        let conn = get_conn(&self.pool)?;
        categories::list_categories(&conn)
    }

    fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        let conn = get_conn(&self.pool)?;
        categories::get_category(&conn, id)
    }

    fn insert(&self, new: &NewCategory) -> Result<Category> {
        let conn = get_conn(&self.pool)?;
        categories::create_category(&conn, new)
    }

    fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Option<UpdatedCategory>> {
        let conn = get_conn(&self.pool)?;
        categories::update_category(&conn, id, changes)
    }

    fn delete(&self, id: CategoryId) -> Result<Option<Category>> {
        let conn = get_conn(&self.pool)?;
        categories::delete_category(&conn, id)
    }
}
