//! Shared test utilities for `storefront`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::auth::guard::AuthContext;
use crate::auth::password;
use crate::auth::token::Claims;
use crate::entities::{Role, category, product, user};
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with the given email and role.
///
/// The stored credential is an Argon2 hash of `"password123"`; the account
/// starts active.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
) -> Result<user::Model> {
    let now = chrono::Utc::now();
    user::ActiveModel {
        name: Set("Test User".to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password::hash_password("password123")?),
        role: Set(role),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Flips a user's `active` flag off.
pub async fn deactivate_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let user = crate::entities::User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(crate::errors::Error::UserNotFound { id: user_id })?;
    let mut active_model: user::ActiveModel = user.into();
    active_model.active = Set(false);
    active_model.update(db).await?;
    Ok(())
}

/// Builds the auth context a given user would authenticate into.
#[must_use]
pub fn ctx_for(user: &user::Model) -> AuthContext {
    AuthContext {
        user_id: user.id,
        role: user.role.clone(),
    }
}

/// Mints a signed bearer token for guard tests.
///
/// Token issuance is out of scope for the crate itself, so only tests know
/// how to encode.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn mint_test_token(user_id: i64, role: &str, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + 3600,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Creates a test category.
pub async fn create_test_category(db: &DatabaseConnection, name: &str) -> Result<category::Model> {
    category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test product with custom price and stock.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    stock: i64,
    category_id: i64,
) -> Result<product::Model> {
    let now = chrono::Utc::now();
    product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name} description")),
        price: Set(price),
        stock: Set(stock),
        category_id: Set(category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sets up a complete test environment with a category.
/// Returns (db, category) for catalog test scenarios.
pub async fn setup_with_category() -> Result<(DatabaseConnection, category::Model)> {
    let db = setup_test_db().await?;
    let cat = create_test_category(&db, "General").await?;
    Ok((db, cat))
}

/// Sets up a complete test environment with a category and a product.
/// Returns (db, category, product) for cart and invoice tests.
pub async fn setup_with_product() -> Result<(DatabaseConnection, category::Model, product::Model)> {
    let db = setup_test_db().await?;
    let cat = create_test_category(&db, "General").await?;
    let prod = create_test_product(&db, "Coffee", 4.5, 10, cat.id).await?;
    Ok((db, cat, prod))
}
