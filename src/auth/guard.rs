//! Access guard - resolves the caller's identity and gates operations.
//!
//! Every guarded operation takes an [`AuthContext`] and evaluates one of the
//! capability gates before its body runs, so role and ownership checks live
//! in exactly one place instead of being scattered through the handlers.

use super::token::TokenVerifier;
use crate::entities::{Role, User};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, EntityTrait};

/// The authenticated caller attached to every guarded operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Id of the user record the token resolved to
    pub user_id: i64,
    /// Effective role, read from the user record at authentication time
    pub role: Role,
}

impl AuthContext {
    /// Gate: the caller must hold the ADMIN role.
    ///
    /// # Errors
    /// Returns `Forbidden` for any other role.
    pub fn require_admin(&self) -> Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "administrator role required".to_string(),
            })
        }
    }

    /// Gate: the caller must hold the CLIENT role.
    ///
    /// # Errors
    /// Returns `Forbidden` for any other role.
    pub fn require_client(&self) -> Result<()> {
        if self.role == Role::Client {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "client role required".to_string(),
            })
        }
    }

    /// Gate: the caller must be the target user, or an administrator.
    ///
    /// # Errors
    /// Returns `Forbidden` when the caller is neither.
    pub fn require_self_or_admin(&self, target_user_id: i64) -> Result<()> {
        if self.role == Role::Admin || self.user_id == target_user_id {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "not the owner of this resource".to_string(),
            })
        }
    }
}

/// Authenticates a request from its `Authorization` header value.
///
/// Verifies the bearer token, then confirms the referenced user still exists
/// and is active. The effective role comes from the user record rather than
/// the token claim, so a demotion takes effect on the caller's next request
/// instead of at token expiry.
///
/// # Errors
/// - `Unauthenticated` when the header is absent or not a bearer credential
/// - `InvalidToken` when verification fails, the subject is not a user id,
///   the user no longer exists, or the account is deactivated
pub async fn authenticate(
    db: &DatabaseConnection,
    verifier: &TokenVerifier,
    authorization: Option<&str>,
) -> Result<AuthContext> {
    let header = authorization.ok_or_else(|| Error::Unauthenticated {
        message: "Authorization header required".to_string(),
    })?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthenticated {
            message: "Authorization header must carry a bearer token".to_string(),
        })?;

    let claims = verifier.verify(token)?;
    let user_id: i64 = claims.sub.parse().map_err(|_| Error::InvalidToken {
        message: "token subject is not a user id".to_string(),
    })?;

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::InvalidToken {
            message: "token subject no longer exists".to_string(),
        })?;

    if !user.active {
        return Err(Error::InvalidToken {
            message: "account is deactivated".to_string(),
        });
    }

    Ok(AuthContext {
        user_id: user.id,
        role: user.role,
    })
}
