//! Catalog business logic - product management and public discovery.
//!
//! Product mutations are administrator-only and always re-validate the
//! referenced category. Listing, lookup, and exploration are public.
//! The best-selling ranking is derived from invoice history at query time
//! rather than kept as a counter, so it cannot drift from what was invoiced.

use crate::auth::guard::AuthContext;
use crate::entities::{Category, InvoiceItem, Product, product};
use crate::errors::{Error, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;

/// Arguments shared by product creation and update.
#[derive(Debug, Clone)]
pub struct ProductArgs {
    /// Name of the product
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price, non-negative and finite
    pub price: f64,
    /// Units on hand, non-negative
    pub stock: i64,
    /// Category the product belongs to; must exist
    pub category_id: i64,
}

fn validate_product_args(args: &ProductArgs) -> Result<()> {
    if args.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "product name cannot be empty".to_string(),
        });
    }
    if args.price < 0.0 || !args.price.is_finite() {
        return Err(Error::Validation {
            message: format!("invalid price: {}", args.price),
        });
    }
    if args.stock < 0 {
        return Err(Error::Validation {
            message: format!("invalid stock count: {}", args.stock),
        });
    }
    Ok(())
}

async fn ensure_category_exists(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(Error::CategoryNotFound { id: category_id })
}

/// Creates a new product. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `Validation` for bad
/// arguments, `CategoryNotFound` if the referenced category is missing.
pub async fn create_product(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    args: ProductArgs,
) -> Result<product::Model> {
    ctx.require_admin()?;
    validate_product_args(&args)?;
    ensure_category_exists(db, args.category_id).await?;

    let now = chrono::Utc::now();
    product::ActiveModel {
        name: Set(args.name.trim().to_string()),
        description: Set(args.description),
        price: Set(args.price),
        stock: Set(args.stock),
        category_id: Set(args.category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Updates an existing product. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `Validation` for bad
/// arguments, `CategoryNotFound` if the referenced category is missing,
/// `ProductNotFound` if the product does not exist.
pub async fn update_product(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    product_id: i64,
    args: ProductArgs,
) -> Result<product::Model> {
    ctx.require_admin()?;
    validate_product_args(&args)?;
    ensure_category_exists(db, args.category_id).await?;

    let mut existing: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    existing.name = Set(args.name.trim().to_string());
    existing.description = Set(args.description);
    existing.price = Set(args.price);
    existing.stock = Set(args.stock);
    existing.category_id = Set(args.category_id);
    existing.updated_at = Set(chrono::Utc::now());
    existing.update(db).await.map_err(Into::into)
}

/// Deletes a product. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `ProductNotFound` if the
/// product does not exist.
pub async fn delete_product(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    product_id: i64,
) -> Result<()> {
    ctx.require_admin()?;

    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    existing.delete(db).await?;
    Ok(())
}

/// Retrieves all products, ordered alphabetically by name. Public.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a single product by id. Public.
///
/// # Errors
/// Returns `ProductNotFound` if the id does not exist.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Filters for public catalog exploration; both filters compose (AND).
#[derive(Debug, Clone, Default)]
pub struct ExploreFilter {
    /// Restrict results to one category
    pub category_id: Option<i64>,
    /// Case-insensitive substring match on the product name
    pub search: Option<String>,
}

/// Explores the catalog with an optional category filter and an optional
/// case-insensitive name search. Public.
pub async fn explore_products(
    db: &DatabaseConnection,
    filter: ExploreFilter,
) -> Result<Vec<product::Model>> {
    let mut query = Product::find();

    if let Some(category_id) = filter.category_id {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }

    if let Some(search) = filter.search.as_deref() {
        let search = search.trim();
        if !search.is_empty() {
            // lower() on both sides keeps the match case-insensitive
            // regardless of the store's collation rules
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern),
            );
        }
    }

    query
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One row of the best-selling ranking.
#[derive(Debug, Clone)]
pub struct ProductSales {
    /// The ranked product
    pub product: product::Model,
    /// Units sold across all invoices still on record
    pub units_sold: i64,
}

/// Ranks products by units sold, derived from invoice history.
/// Administrator only.
///
/// The ordering among products with equal sales is stable but otherwise
/// unspecified. Products that never sold rank last with a count of zero.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, or an error if a query fails.
pub async fn best_selling(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    limit: usize,
) -> Result<Vec<ProductSales>> {
    ctx.require_admin()?;

    let items = InvoiceItem::find().all(db).await?;
    let mut sold: HashMap<i64, i64> = HashMap::new();
    for item in items {
        *sold.entry(item.product_id).or_insert(0) += item.quantity;
    }

    let mut ranked: Vec<ProductSales> = Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|p| ProductSales {
            units_sold: sold.get(&p.id).copied().unwrap_or(0),
            product: p,
        })
        .collect();

    ranked.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    ranked.truncate(limit);
    Ok(ranked)
}

/// Result of an admin stock check. Nothing is mutated.
#[derive(Debug, Clone)]
pub struct StockCheck {
    /// The checked product
    pub product_id: i64,
    /// Quantity the caller asked about
    pub requested: i64,
    /// Units currently on hand
    pub stock: i64,
    /// Whether `stock >= requested`
    pub sufficient: bool,
}

/// Reports whether a product has at least the requested quantity on hand.
/// Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `ProductNotFound` if the
/// product does not exist.
pub async fn check_stock(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    product_id: i64,
    quantity: i64,
) -> Result<StockCheck> {
    ctx.require_admin()?;

    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    Ok(StockCheck {
        product_id,
        requested: quantity,
        stock: product.stock,
        sufficient: product.stock >= quantity,
    })
}
