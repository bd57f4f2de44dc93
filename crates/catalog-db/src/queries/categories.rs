//! Category CRUD operations.

use catalog_core::{
    Category, CategoryChanges, CategoryId, Error, NewCategory, Result, UpdatedCategory,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

const COLUMNS: &str = "id, name, description, image, created_at, updated_at";

/// Build a [`Category`] from a row selected with [`COLUMNS`].
fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: CategoryId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        image: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Insert a new category and return the stored row.
pub fn create_category(conn: &Connection, new: &NewCategory) -> Result<Category> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO categories (name, description, image, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        rusqlite::params![new.name, new.description, new.image, now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Category {
        id: CategoryId::from(conn.last_insert_rowid()),
        name: new.name.clone(),
        description: new.description.clone(),
        image: new.image.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Get a category by ID.
pub fn get_category(conn: &Connection, id: CategoryId) -> Result<Option<Category>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM categories WHERE id = ?1"),
        [id.get()],
        from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all categories in id (insertion) order.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM categories ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Apply `changes` to a category. Returns the updated row and the image it
/// held before, or `None` if the category does not exist.
///
/// The previous image is read inside the same transaction as the write, so
/// a concurrent update cannot slip between the two.
pub fn update_category(
    conn: &Connection,
    id: CategoryId,
    changes: &CategoryChanges,
) -> Result<Option<UpdatedCategory>> {
    let now = Utc::now().to_rfc3339();

    // IMMEDIATE takes the write lock before the read.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| Error::database(e.to_string()))?;

    let previous_image: Option<String> = tx
        .query_row(
            "SELECT image FROM categories WHERE id = ?1",
            [id.get()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;
    let Some(previous_image) = previous_image else {
        return Ok(None);
    };

    let category = tx
        .query_row(
            &format!(
                "UPDATE categories
                 SET name = ?1,
                     description = COALESCE(?2, description),
                     image = COALESCE(?3, image),
                     updated_at = ?4
                 WHERE id = ?5
                 RETURNING {COLUMNS}"
            ),
            rusqlite::params![
                changes.name,
                changes.description,
                changes.image,
                now,
                id.get()
            ],
            from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Some(UpdatedCategory {
        category,
        previous_image,
    }))
}

/// Delete a category. Returns the removed row, or `None` if it did not exist.
pub fn delete_category(conn: &Connection, id: CategoryId) -> Result<Option<Category>> {
    conn.query_row(
        &format!("DELETE FROM categories WHERE id = ?1 RETURNING {COLUMNS}"),
        [id.get()],
        from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}
