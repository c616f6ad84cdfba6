//! User records created on first login.

use chrono::Utc;
use store::{NewUser, Role, Upsert, User, UserStore};

use crate::error::{DomainError, validate_email};

/// Service for user records and roles.
#[derive(Clone)]
pub struct UserService<S: UserStore> {
    store: S,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saves a user the first time an email is seen.
    ///
    /// New users get the `customer` role. If the email is already known the
    /// stored record is returned unchanged, whatever the profile says.
    #[tracing::instrument(skip(self, profile))]
    pub async fn save_user(
        &self,
        email: &str,
        profile: NewUser,
    ) -> Result<Upsert<User>, DomainError> {
        validate_email(email)?;

        let user = User {
            email: email.to_string(),
            name: profile.name,
            image: profile.image,
            role: Role::default(),
            created_at: Utc::now(),
        };

        let result = self.store.insert_user_if_absent(user).await?;
        if result.is_inserted() {
            tracing::info!(email, "user created");
        }
        Ok(result)
    }

    /// Fetches a user by email.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.store.get_user(email).await?)
    }

    /// Looks up the role of a user.
    pub async fn get_role(&self, email: &str) -> Result<Option<Role>, DomainError> {
        Ok(self.get_user(email).await?.map(|user| user.role))
    }
}
