//! Authorization guard.
//!
//! Every workflow in [`crate::core`] receives an explicit [`Principal`] and calls
//! [`authorize`] before touching the store. Principals are produced from bearer
//! tokens by [`resolve_principal`], which always reads the role from the stored user
//! so that promotions and demotions take effect immediately.

/// Argon2 password hashing
pub mod password;
/// Bearer token issuing and verification
pub mod token;

use crate::{
    entities::{Role, User},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::Serialize;
use tracing::debug;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService, bearer_token};

/// The authenticated identity making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Id of the resolved user
    pub user_id: i64,
    /// Role as currently stored for that user
    pub role: Role,
}

impl Principal {
    /// Creates a principal for a known user id and role.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether this principal is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Permits the call iff the principal's role is one of `required`.
///
/// # Errors
/// Returns [`Error::Forbidden`] when the role is not in the set.
pub fn authorize(principal: &Principal, required: &[Role]) -> Result<()> {
    if required.contains(&principal.role) {
        Ok(())
    } else {
        debug!(
            user_id = principal.user_id,
            role = ?principal.role,
            "Rejected call requiring {:?}",
            required
        );
        Err(Error::forbidden("Insufficient role for this operation"))
    }
}

/// Resolves a bearer token to a principal.
///
/// # Errors
/// Returns [`Error::Unauthorized`] when the token is missing or invalid, or when its
/// subject is not an existing user.
pub async fn resolve_principal<C>(
    db: &C,
    tokens: &TokenService,
    bearer: Option<&str>,
) -> Result<Principal>
where
    C: ConnectionTrait,
{
    let token = bearer.ok_or_else(|| Error::unauthorized("Missing bearer token"))?;
    let claims = tokens.verify(token)?;
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| Error::unauthorized("Invalid token subject"))?;

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::unauthorized("User no longer exists"))?;

    Ok(Principal::new(user.id, user.role))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::ErrorKind;
    use crate::test_utils::*;

    #[test]
    fn test_authorize_accepts_member_role() {
        let donor = Principal::new(1, Role::Donor);
        assert!(authorize(&donor, &[Role::Donor, Role::Admin]).is_ok());
    }

    #[test]
    fn test_authorize_rejects_other_roles() {
        let donor = Principal::new(1, Role::Donor);
        let err = authorize(&donor, &[Role::Charity]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let charity = Principal::new(2, Role::Charity);
        let err = authorize(&charity, &[Role::Admin]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_resolve_principal_reads_stored_role() -> Result<()> {
        let db = setup_test_db().await?;
        let tokens = test_tokens();
        let user = create_test_user(&db, "alice@example.com", Role::Donor).await?;
        let token = tokens.issue(&user)?;

        // Promote after the token was issued
        crate::core::users::set_role(&db, user.id, Role::Charity).await?;

        let principal = resolve_principal(&db, &tokens, Some(&token)).await?;
        assert_eq!(principal, Principal::new(user.id, Role::Charity));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_principal_unauthorized_cases() -> Result<()> {
        let db = setup_test_db().await?;
        let tokens = test_tokens();

        let err = resolve_principal(&db, &tokens, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = resolve_principal(&db, &tokens, Some("not-a-jwt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        // Valid signature, but the user does not exist
        let ghost = crate::entities::UserModel {
            id: 999,
            name: "Ghost".to_string(),
            email: "ghost@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            created_at: chrono::Utc::now(),
        };
        let token = tokens.issue(&ghost)?;
        let err = resolve_principal(&db, &tokens, Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        Ok(())
    }
}
