use crate::error::{IdentityError, IdentityErrorExt};
use crate::hash;
use crate::models::{CreateUser, EmailChangeRow, PasswordResetRow, UserInviteRow, UserRow};
use atelier_database::Database;
use atelier_kernel::safe_nanoid;
use chrono::Utc;
use surrealdb::types::SurrealValue;

/// Projection used everywhere a [`UserRow`] is read.
const USER_FIELDS: &str = "record::id(id) AS id, username, email, password, \
     oauth_external_id, roles, locked, landing_url";

/// Account persistence. Cloning shares the underlying connection.
#[derive(Debug, Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates an account after uniqueness checks, hashing the password
    /// when one is supplied.
    ///
    /// # Errors
    /// [`IdentityError::Conflict`] when the username or email is taken.
    pub async fn create(&self, input: CreateUser) -> Result<UserRow, IdentityError> {
        if !self.is_username_available(&input.username).await? {
            return Err(IdentityError::Conflict {
                message: "username: already taken".into(),
                context: None,
            });
        }
        if let Some(email) = &input.email {
            if self.is_email_registered(email).await? {
                return Err(IdentityError::Conflict {
                    message: "email: already registered".into(),
                    context: None,
                });
            }
        }

        let id = safe_nanoid!();
        let password = input.password.as_deref().map(hash::hash_password).transpose()?;

        let row = self
            .db
            .query(format!(
                "CREATE type::thing('user', $id) SET username = $username, email = $email, \
                 password = $password, oauth_external_id = $oauth, roles = $roles, \
                 locked = false, landing_url = $landing;
                 SELECT {USER_FIELDS} FROM ONLY type::thing('user', $id);"
            ))
            .bind(("id", id.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("password", password))
            .bind(("oauth", input.oauth_external_id))
            .bind(("roles", input.roles.names().iter().map(ToString::to_string).collect::<Vec<String>>()))
            .bind(("landing", input.landing_url))
            .await
            .context("Creating user")?
            .take::<Option<UserRow>>(1)
            .context("Reading created user")?;

        row.ok_or_else(|| IdentityError::Internal {
            message: "Created user not readable".into(),
            context: Some(id.into()),
        })
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRow>, IdentityError> {
        self.find_one("SELECT {F} FROM user WHERE id = type::thing('user', $v) LIMIT 1", user_id)
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, IdentityError> {
        self.find_one("SELECT {F} FROM user WHERE username = $v LIMIT 1", username).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, IdentityError> {
        self.find_one("SELECT {F} FROM user WHERE email = $v LIMIT 1", email).await
    }

    pub async fn find_by_oauth(&self, external_id: &str) -> Result<Option<UserRow>, IdentityError> {
        self.find_one("SELECT {F} FROM user WHERE oauth_external_id = $v LIMIT 1", external_id)
            .await
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool, IdentityError> {
        Ok(self.find_by_username(username).await?.is_none())
    }

    pub async fn is_email_registered(&self, email: &str) -> Result<bool, IdentityError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Profile record IDs joined in by user reference, for the session
    /// snapshot.
    pub async fn profile_ids(
        &self,
        user_id: &str,
    ) -> Result<(Option<String>, Option<String>), IdentityError> {
        #[derive(Debug, SurrealValue)]
        struct IdRow {
            id: String,
        }

        let mut response = self
            .db
            .query(
                "SELECT record::id(id) AS id FROM artist WHERE user = type::thing('user', $id) LIMIT 1;
                 SELECT record::id(id) AS id FROM provider WHERE user = type::thing('user', $id) LIMIT 1;",
            )
            .bind(("id", user_id.to_owned()))
            .await
            .context("Loading profile ids")?;

        let artist = response.take::<Vec<IdRow>>(0).context("Parsing artist id")?;
        let provider = response.take::<Vec<IdRow>>(1).context("Parsing provider id")?;

        Ok((
            artist.into_iter().next().map(|r| r.id),
            provider.into_iter().next().map(|r| r.id),
        ))
    }

    pub async fn set_password(&self, user_id: &str, plain: &str) -> Result<(), IdentityError> {
        let password = hash::hash_password(plain)?;
        self.db
            .query(
                "UPDATE type::thing('user', $id) SET password = $password, updated_at = time::now();",
            )
            .bind(("id", user_id.to_owned()))
            .bind(("password", password))
            .await
            .context("Updating password")?;
        Ok(())
    }

    pub async fn set_email(&self, current: &str, next: &str) -> Result<(), IdentityError> {
        self.db
            .query("UPDATE user SET email = $next, updated_at = time::now() WHERE email = $current;")
            .bind(("current", current.to_owned()))
            .bind(("next", next.to_owned()))
            .await
            .context("Updating email")?;
        Ok(())
    }

    pub async fn set_locked(&self, user_id: &str, locked: bool) -> Result<(), IdentityError> {
        self.db
            .query("UPDATE type::thing('user', $id) SET locked = $locked, updated_at = time::now();")
            .bind(("id", user_id.to_owned()))
            .bind(("locked", locked))
            .await
            .context("Updating lock state")?;
        Ok(())
    }

    /// Links an OAuth identity to an existing artist invite by email.
    pub async fn link_invite_oauth(
        &self,
        email: &str,
        external_id: &str,
    ) -> Result<bool, IdentityError> {
        #[derive(Debug, SurrealValue)]
        struct IdRow {
            id: String,
        }

        let updated = self
            .db
            .query(
                "UPDATE artist_invite SET oauth_external_id = $oauth WHERE email = $email \
                 RETURN record::id(id) AS id;",
            )
            .bind(("email", email.to_owned()))
            .bind(("oauth", external_id.to_owned()))
            .await
            .context("Linking invite to OAuth identity")?
            .take::<Vec<IdRow>>(0)
            .context("Parsing linked invites")?;

        Ok(!updated.is_empty())
    }

    /// Finds an artist invite by its linked OAuth identity.
    pub async fn find_invite_by_oauth(
        &self,
        external_id: &str,
    ) -> Result<Option<String>, IdentityError> {
        #[derive(Debug, SurrealValue)]
        struct IdRow {
            id: String,
        }

        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id FROM artist_invite \
                 WHERE oauth_external_id = $oauth LIMIT 1;",
            )
            .bind(("oauth", external_id.to_owned()))
            .await
            .context("Loading invite by OAuth identity")?
            .take::<Vec<IdRow>>(0)
            .context("Parsing invite id")?;

        Ok(rows.into_iter().next().map(|r| r.id))
    }

    /// Creates a fresh artist invite for an OAuth signup without an
    /// existing account or invitation.
    pub async fn create_oauth_invite(
        &self,
        email: &str,
        external_id: &str,
    ) -> Result<String, IdentityError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE type::thing('artist_invite', $id) SET email = $email, \
                 oauth_external_id = $oauth, created_by_artist = true, sent_at = time::now();",
            )
            .bind(("id", id.clone()))
            .bind(("email", email.to_owned()))
            .bind(("oauth", external_id.to_owned()))
            .await
            .context("Creating OAuth artist invite")?;
        Ok(id)
    }

    /// Clears and returns the one-shot post-login redirect.
    pub async fn take_landing_url(&self, user_id: &str) -> Result<Option<String>, IdentityError> {
        #[derive(Debug, SurrealValue)]
        struct LandingRow {
            landing_url: Option<String>,
        }

        let row = self
            .db
            .query(
                "SELECT landing_url FROM ONLY type::thing('user', $id);
                 UPDATE type::thing('user', $id) SET landing_url = NONE;",
            )
            .bind(("id", user_id.to_owned()))
            .await
            .context("Taking landing url")?
            .take::<Option<LandingRow>>(0)
            .context("Parsing landing url")?;

        Ok(row.and_then(|r| r.landing_url))
    }

    // --- user invites ---

    pub async fn find_user_invite(&self, id: &str) -> Result<Option<UserInviteRow>, IdentityError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, organization_name, subject, message, roles, \
                 time::unix(created_at) AS created_at \
                 FROM user_invite WHERE id = type::thing('user_invite', $id) LIMIT 1;",
            )
            .bind(("id", id.to_owned()))
            .await
            .context("Loading user invite")?
            .take::<Vec<UserInviteRow>>(0)
            .context("Parsing user invite")?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete_user_invite(&self, id: &str) -> Result<(), IdentityError> {
        self.db
            .query("DELETE type::thing('user_invite', $id);")
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting user invite")?;
        Ok(())
    }

    // --- password reset ---

    /// Replaces any previous reset request for the email, enforcing the
    /// cooldown against the most recent one.
    ///
    /// # Errors
    /// [`IdentityError::Conflict`] with the remaining time while the
    /// cooldown is still running.
    pub async fn create_password_reset(
        &self,
        email: &str,
        cooldown_seconds: i64,
    ) -> Result<PasswordResetRow, IdentityError> {
        let existing = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, time::unix(created_at) AS created_at \
                 FROM password_reset WHERE email = $email LIMIT 1;",
            )
            .bind(("email", email.to_owned()))
            .await
            .context("Loading reset request")?
            .take::<Vec<PasswordResetRow>>(0)
            .context("Parsing reset request")?;

        if let Some(previous) = existing.first() {
            let elapsed = Utc::now().timestamp() - previous.created_at;
            if elapsed < cooldown_seconds {
                let remaining = cooldown_seconds - elapsed;
                return Err(IdentityError::Conflict {
                    message: format!("reset already requested, retry in {remaining}s").into(),
                    context: None,
                });
            }
        }

        let id = safe_nanoid!();
        self.db
            .query(
                "DELETE password_reset WHERE email = $email;
                 CREATE type::thing('password_reset', $id) SET email = $email;",
            )
            .bind(("email", email.to_owned()))
            .bind(("id", id.clone()))
            .await
            .context("Creating reset request")?;

        Ok(PasswordResetRow { id, email: email.to_owned(), created_at: Utc::now().timestamp() })
    }

    pub async fn find_password_reset(
        &self,
        id: &str,
    ) -> Result<Option<PasswordResetRow>, IdentityError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, time::unix(created_at) AS created_at \
                 FROM password_reset WHERE id = type::thing('password_reset', $id) LIMIT 1;",
            )
            .bind(("id", id.to_owned()))
            .await
            .context("Loading reset request")?
            .take::<Vec<PasswordResetRow>>(0)
            .context("Parsing reset request")?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete_password_reset(&self, id: &str) -> Result<(), IdentityError> {
        self.db
            .query("DELETE type::thing('password_reset', $id);")
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting reset request")?;
        Ok(())
    }

    // --- email change ---

    pub async fn create_email_change(
        &self,
        current_email: &str,
        new_email: &str,
    ) -> Result<EmailChangeRow, IdentityError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "DELETE email_change WHERE new_email = $new;
                 CREATE type::thing('email_change', $id) SET current_email = $current, new_email = $new;",
            )
            .bind(("id", id.clone()))
            .bind(("current", current_email.to_owned()))
            .bind(("new", new_email.to_owned()))
            .await
            .context("Creating email change request")?;

        Ok(EmailChangeRow {
            id,
            current_email: current_email.to_owned(),
            new_email: new_email.to_owned(),
            created_at: Utc::now().timestamp(),
        })
    }

    pub async fn find_email_change(
        &self,
        id: &str,
    ) -> Result<Option<EmailChangeRow>, IdentityError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, current_email, new_email, \
                 time::unix(created_at) AS created_at \
                 FROM email_change WHERE id = type::thing('email_change', $id) LIMIT 1;",
            )
            .bind(("id", id.to_owned()))
            .await
            .context("Loading email change request")?
            .take::<Vec<EmailChangeRow>>(0)
            .context("Parsing email change request")?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete_email_change(&self, id: &str) -> Result<(), IdentityError> {
        self.db
            .query("DELETE type::thing('email_change', $id);")
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting email change request")?;
        Ok(())
    }

    async fn find_one(
        &self,
        template: &str,
        value: &str,
    ) -> Result<Option<UserRow>, IdentityError> {
        let statement = template.replace("{F}", USER_FIELDS);
        let rows = self
            .db
            .query(statement)
            .bind(("v", value.to_owned()))
            .await
            .context("Loading user")?
            .take::<Vec<UserRow>>(0)
            .context("Parsing user")?;
        Ok(rows.into_iter().next())
    }
}
