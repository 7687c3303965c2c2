//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Cart, CartItem, Category, Invoice, InvoiceItem, Product, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
///
/// The URL comes from [`crate::config::settings::AppConfig`], which falls back
/// to a local `SQLite` file when `DATABASE_URL` is not set.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct
/// definitions. It creates tables for users, categories, products, carts, cart lines,
/// invoices, and invoice lines.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User);
    let category_table = schema.create_table_from_entity(Category);
    let product_table = schema.create_table_from_entity(Product);
    let cart_table = schema.create_table_from_entity(Cart);
    let cart_item_table = schema.create_table_from_entity(CartItem);
    let invoice_table = schema.create_table_from_entity(Invoice);
    let invoice_item_table = schema.create_table_from_entity(InvoiceItem);

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&cart_table)).await?;
    db.execute(builder.build(&cart_item_table)).await?;
    db.execute(builder.build(&invoice_table)).await?;
    db.execute(builder.build(&invoice_item_table)).await?;

    Ok(())
}
