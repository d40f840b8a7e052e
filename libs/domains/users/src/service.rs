use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{SetClaims, UpdateUser, UpsertUser, User, UserFilter, UserPage, UserStatus};
use crate::repository::UserRepository;

/// Business logic for admin-side user records.
///
/// Users are keyed by the identity provider's uid. Profile data flows in
/// through [`UserService::upsert_user`]; role and permissions are set only
/// through [`UserService::set_claims`].
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<UserPage> {
        let (items, total) = futures::try_join!(
            self.repository.list(filter.clone()),
            self.repository.count(filter.clone()),
        )?;

        Ok(UserPage {
            items,
            total,
            limit: filter.limit(),
            offset: filter.offset,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<User> {
        self.repository
            .get_by_id(id.to_string())
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    /// Record of the token subject
    #[instrument(skip(self))]
    pub async fn me(&self, subject: &str) -> UserResult<User> {
        self.get_user(subject).await
    }

    /// Create the user, or refresh its profile if the uid is known.
    /// Returns whether a record was created.
    #[instrument(skip(self, input), fields(user_id = %input.id))]
    pub async fn upsert_user(&self, input: UpsertUser) -> UserResult<(User, bool)> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let existing = self.repository.get_by_id(input.id.clone()).await?;
        if let Some(email) = input.email.as_deref() {
            self.ensure_email_free(email, Some(input.id.clone())).await?;
        }

        match existing {
            Some(mut user) => {
                user.apply_upsert(input);
                Ok((self.repository.update(user).await?, false))
            }
            None => Ok((self.repository.create(User::new(input)).await?, true)),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self.get_user(id).await?;

        if let Some(email) = input
            .email
            .as_ref()
            .and_then(|e| e.as_deref())
            .filter(|e| user.email.as_deref() != Some(*e))
        {
            self.ensure_email_free(email, Some(user.id.clone())).await?;
        }

        user.apply_update(input);
        self.repository.update(user).await
    }

    #[instrument(skip(self, input), fields(role = %input.role))]
    pub async fn set_claims(&self, id: &str, input: SetClaims) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self.get_user(id).await?;
        user.apply_claims(input);
        let user = self.repository.update(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User claims updated");
        Ok(user)
    }

    /// Disable, or remove when `hard`
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str, hard: bool) -> UserResult<()> {
        if hard {
            if !self.repository.delete(id.to_string()).await? {
                return Err(UserError::NotFound(id.to_string()));
            }
            return Ok(());
        }

        let mut user = self.get_user(id).await?;
        user.status = UserStatus::Disabled;
        user.updated_at = chrono::Utc::now();
        self.repository.update(user).await?;
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, exclude: Option<String>) -> UserResult<()> {
        if self
            .repository
            .email_exists(email.to_string(), exclude)
            .await?
        {
            return Err(UserError::Conflict(format!(
                "Email '{email}' is already registered"
            )));
        }
        Ok(())
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
