//! Seed data loading from config.toml.
//!
//! This module provides functionality to load initial catalog categories and
//! the bootstrap administrator account from a TOML configuration file. The
//! entries defined in config.toml are used to seed the database on first run
//! or when rows are missing; seeding is idempotent.

use crate::auth::password;
use crate::entities::{Category, Role, User, category, user};
use crate::errors::{Error, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// List of catalog categories to seed
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Bootstrap administrator account, if any
    pub admin: Option<AdminConfig>,
}

/// Configuration for a single catalog category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
}

/// Configuration for the bootstrap administrator
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Display name of the administrator
    pub name: String,
    /// Login email of the administrator
    pub email: String,
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Inserts any categories and the bootstrap administrator that are missing.
///
/// The administrator's password comes from the environment, never from the
/// config file, and is stored only as an Argon2 hash. When the password is
/// unset the admin seed is skipped with a warning so a fresh deployment is
/// still usable for catalog browsing.
pub async fn seed_database(
    db: &DatabaseConnection,
    config: &SeedConfig,
    admin_password: Option<&str>,
) -> Result<()> {
    for entry in &config.categories {
        let existing = Category::find()
            .filter(category::Column::Name.eq(&entry.name))
            .one(db)
            .await?;
        if existing.is_none() {
            category::ActiveModel {
                name: Set(entry.name.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(name = %entry.name, "seeded category");
        }
    }

    let Some(admin) = &config.admin else {
        return Ok(());
    };

    let existing = User::find()
        .filter(user::Column::Email.eq(&admin.email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let Some(admin_password) = admin_password else {
        warn!("SEED_ADMIN_PASSWORD not set, skipping bootstrap admin seed");
        return Ok(());
    };

    let now = chrono::Utc::now();
    user::ActiveModel {
        name: Set(admin.name.clone()),
        email: Set(admin.email.clone()),
        password_hash: Set(password::hash_password(admin_password)?),
        role: Set(Role::Admin),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(email = %admin.email, "seeded bootstrap admin");

    Ok(())
}
