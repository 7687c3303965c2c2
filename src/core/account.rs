//! Account business logic - user administration and self-service profile
//! operations.
//!
//! Listing, lookup, and role changes are administrator-only. Profile updates
//! and account deletion are allowed for the user themself or an
//! administrator; the ownership comparison lives in the access guard's
//! `require_self_or_admin` gate. Passwords are stored only as Argon2 hashes.

use crate::auth::guard::AuthContext;
use crate::auth::password;
use crate::entities::{Role, User, user};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all user accounts, ordered by id. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, or an error if the query fails.
pub async fn list_users(db: &DatabaseConnection, ctx: &AuthContext) -> Result<Vec<user::Model>> {
    ctx.require_admin()?;
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a single user account by id. Administrator only.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `UserNotFound` if the id does
/// not exist.
pub async fn get_user(db: &DatabaseConnection, ctx: &AuthContext, user_id: i64) -> Result<user::Model> {
    ctx.require_admin()?;
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Changes a user's role. Administrator only.
///
/// The new role arrives as text and must spell a known role. Assigning ADMIN
/// is always rejected: every caller that reaches this point is an
/// administrator, and an administrator cannot promote anyone - including
/// themself - to ADMIN.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `Validation` for unknown role
/// values or an ADMIN assignment, `UserNotFound` if the target is missing.
pub async fn update_role(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    user_id: i64,
    new_role: &str,
) -> Result<user::Model> {
    ctx.require_admin()?;

    let role = Role::parse(new_role).ok_or_else(|| Error::Validation {
        message: format!("invalid role value: {new_role}"),
    })?;
    if role == Role::Admin {
        return Err(Error::Validation {
            message: "the ADMIN role cannot be assigned".to_string(),
        });
    }

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let mut user: user::ActiveModel = user.into();
    user.role = Set(role);
    user.updated_at = Set(chrono::Utc::now());
    user.update(db).await.map_err(Into::into)
}

/// Arguments for a profile update. Every field is optional; a password
/// change requires `new_password` and `confirm_password` to match.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileArgs {
    /// New display name
    pub name: Option<String>,
    /// New login email
    pub email: Option<String>,
    /// Current password; required when a non-admin changes their own password
    pub current_password: Option<String>,
    /// New password to store (hashed)
    pub new_password: Option<String>,
    /// Confirmation that must match `new_password`
    pub confirm_password: Option<String>,
}

/// Updates a user's profile fields and optionally their password.
///
/// Allowed for the user themself or an administrator. A self-service
/// password change must prove the current password; an administrator
/// resetting someone's password skips that proof.
///
/// # Errors
/// Returns `Forbidden` when the caller is neither the target nor an admin,
/// `Validation` for empty fields, mismatched confirmation, or a wrong
/// current password, `UserNotFound` if the target is missing.
pub async fn update_profile(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    target_user_id: i64,
    args: UpdateProfileArgs,
) -> Result<user::Model> {
    ctx.require_self_or_admin(target_user_id)?;

    let user = User::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: target_user_id })?;

    let mut active: user::ActiveModel = user.clone().into();

    if let Some(name) = args.name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "name cannot be empty".to_string(),
            });
        }
        active.name = Set(name.trim().to_string());
    }

    if let Some(email) = args.email {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::Validation {
                message: "invalid email address".to_string(),
            });
        }
        active.email = Set(email.to_string());
    }

    if let Some(new_password) = args.new_password {
        if args.confirm_password.as_deref() != Some(new_password.as_str()) {
            return Err(Error::Validation {
                message: "passwords do not match".to_string(),
            });
        }

        // Self-service changes prove the current password; admin resets skip it.
        if ctx.role != Role::Admin {
            let current = args.current_password.as_deref().ok_or_else(|| Error::Validation {
                message: "current password is required".to_string(),
            })?;
            if !password::verify_password(current, &user.password_hash)? {
                return Err(Error::Validation {
                    message: "current password is incorrect".to_string(),
                });
            }
        }

        active.password_hash = Set(password::hash_password(&new_password)?);
    }

    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a user account. Allowed for the user themself or an administrator.
///
/// # Errors
/// Returns `Forbidden` when the caller is neither the target nor an admin,
/// `UserNotFound` if the target is missing.
pub async fn delete_user(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    target_user_id: i64,
) -> Result<()> {
    ctx.require_self_or_admin(target_user_id)?;

    let user = User::find_by_id(target_user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: target_user_id })?;

    user.delete(db).await?;
    Ok(())
}
