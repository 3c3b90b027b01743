//! Authentication helpers shared by the resource handlers.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};

use crate::domain::user::{User, UserRole};
use crate::domain::{Error, Viewer};

use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the session to a live user record, or `401`.
pub(crate) async fn current_user(
    state: &HttpState,
    session: &SessionContext,
) -> Result<User, Error> {
    let id = session.require_user_id()?;
    state
        .users
        .find(id)
        .await?
        .ok_or_else(|| Error::unauthorized("login required"))
}

/// Resolve the session to a viewer for visibility-scoped queries.
pub(crate) async fn current_viewer(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Viewer, Error> {
    Ok(Viewer::of(&current_user(state, session).await?))
}

/// Require the admin role, or `403`.
pub(crate) fn require_admin(user: &User) -> Result<(), Error> {
    if user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(Error::forbidden("admin access required"))
    }
}

/// Hash a plaintext password into a PHC-format argon2id string.
pub(crate) fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| Error::internal(format!("password hashing failed: {error}")))
}

/// Verify a plaintext password against a stored PHC string.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
