//! Category business logic.
//!
//! Categories group products for browsing. Mutations are administrator-only;
//! listing is public. A category that still has products cannot be deleted.

use crate::auth::guard::AuthContext;
use crate::entities::{Category, Product, category, product};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new category with a unique, non-empty name. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `Validation` for an empty or
/// duplicate name.
pub async fn create_category(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    name: String,
) -> Result<category::Model> {
    ctx.require_admin()?;

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "category name cannot be empty".to_string(),
        });
    }

    let existing = Category::find()
        .filter(category::Column::Name.eq(&name))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Validation {
            message: format!("category {name} already exists"),
        });
    }

    category::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves all categories, ordered alphabetically by name. Public.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Renames a category. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `Validation` for an empty
/// name, `CategoryNotFound` if the id does not exist.
pub async fn update_category(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    category_id: i64,
    name: String,
) -> Result<category::Model> {
    ctx.require_admin()?;

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "category name cannot be empty".to_string(),
        });
    }

    let existing = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(name);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a category that no product references. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `CategoryNotFound` if the id
/// does not exist, `Validation` while products still reference it.
pub async fn delete_category(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    category_id: i64,
) -> Result<()> {
    ctx.require_admin()?;

    let existing = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let referenced = Product::find()
        .filter(product::Column::CategoryId.eq(category_id))
        .one(db)
        .await?;
    if referenced.is_some() {
        return Err(Error::Validation {
            message: "category still has products".to_string(),
        });
    }

    existing.delete(db).await?;
    Ok(())
}
