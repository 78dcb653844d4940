//! Identity feature slice: credentials, JWT sessions, and the account
//! lifecycle (registration by invitation, password reset, email change,
//! lock enforcement).

mod error;
mod hash;
mod models;
mod routes;
mod session;
mod store;
mod validate;

pub use error::{IdentityError, IdentityErrorExt};
pub use models::{CreateUser, EmailChangeRow, PasswordResetRow, UserInviteRow, UserRow};
pub use routes::router;
pub use session::{JwtKeys, Session, SessionSnapshot};
pub use store::UserStore;
pub use validate::{email as validate_email, password as validate_password, username as validate_username};

use atelier_database::{Database, Migration};
use atelier_domain::config::ApiConfig;
use atelier_domain::registry::InitializedSlice;
use session::SNAPSHOT_TTL_SECONDS;
use std::fmt;
use std::time::Duration;

/// Schema owned by this slice. `user_invite` lives here because invite
/// redemption is a registration concern; the admin slice only manages the
/// rows.
const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS user SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS username ON user TYPE string;
    DEFINE FIELD IF NOT EXISTS email ON user TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS password ON user TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS oauth_external_id ON user TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS roles ON user TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS locked ON user TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS landing_url ON user TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS created_at ON user TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON user TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;

    DEFINE TABLE IF NOT EXISTS user_invite SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS email ON user_invite TYPE string;
    DEFINE FIELD IF NOT EXISTS organization_name ON user_invite TYPE string;
    DEFINE FIELD IF NOT EXISTS subject ON user_invite TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS message ON user_invite TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS roles ON user_invite TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS created_at ON user_invite TYPE datetime DEFAULT time::now();

    DEFINE TABLE IF NOT EXISTS password_reset SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS email ON password_reset TYPE string;
    DEFINE FIELD IF NOT EXISTS created_at ON password_reset TYPE datetime DEFAULT time::now();

    DEFINE TABLE IF NOT EXISTS email_change SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS current_email ON email_change TYPE string;
    DEFINE FIELD IF NOT EXISTS new_email ON email_change TYPE string;
    DEFINE FIELD IF NOT EXISTS created_at ON email_change TYPE datetime DEFAULT time::now();
";

/// Migrations contributed by the identity slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("identity", "0001", SCHEMA)]
}

/// Session snapshot cache with a short TTL so lock-outs propagate fast.
#[derive(Clone)]
struct SessionCache(moka::sync::Cache<String, SessionSnapshot>);

impl fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache").field("entries", &self.0.entry_count()).finish()
    }
}

/// Identity feature state.
#[atelier_derive::feature_slice]
pub struct Identity {
    users: UserStore,
    jwt: JwtKeys,
    sessions: SessionCache,
}

impl Identity {
    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    #[must_use]
    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    /// Validates a bearer token and returns the caller's session.
    ///
    /// # Errors
    /// [`IdentityError::Unauthorized`] for invalid tokens, unknown or
    /// locked accounts.
    pub async fn authenticate(&self, token: &str) -> Result<Session, IdentityError> {
        let user_id = self.jwt.subject(token)?;

        if let Some(snapshot) = self.sessions.0.get(&user_id) {
            return Ok(Session::from_snapshot(snapshot));
        }

        let snapshot = self.load_snapshot(&user_id).await?;
        self.sessions.0.insert(user_id, snapshot.clone());
        Ok(Session::from_snapshot(snapshot))
    }

    /// Drops the cached snapshot, forcing a reload on the next request.
    pub fn invalidate_session(&self, user_id: &str) {
        self.sessions.0.invalidate(&user_id.to_owned());
    }

    async fn load_snapshot(&self, user_id: &str) -> Result<SessionSnapshot, IdentityError> {
        let user = self.users.find_by_id(user_id).await?.ok_or(IdentityError::Unauthorized {
            message: "unknown account".into(),
            context: None,
        })?;
        if user.locked {
            return Err(IdentityError::Unauthorized {
                message: "account locked".into(),
                context: None,
            });
        }

        let (artist_id, provider_id) = self.users.profile_ids(user_id).await?;

        Ok(SessionSnapshot { roles: user.role_set(), user_id: user.id, artist_id, provider_id })
    }
}

/// Initialize the identity feature.
///
/// # Errors
/// Propagates configuration problems from the JWT setup.
pub fn init(config: &ApiConfig, database: &Database) -> Result<InitializedSlice, IdentityError> {
    let jwt_config = &config.security.jwt;
    let jwt = JwtKeys::new(
        &jwt_config.secret,
        jwt_config.issuer.clone(),
        jwt_config.ttl_seconds,
        jwt_config.clock_skew_seconds,
    );

    let sessions = SessionCache(
        moka::sync::Cache::builder()
            .max_capacity(config.security.session_cache_capacity)
            .time_to_live(Duration::from_secs(SNAPSHOT_TTL_SECONDS))
            .build(),
    );

    let inner = IdentityInner { users: UserStore::new(database.clone()), jwt, sessions };

    tracing::info!("Identity slice initialized");
    Ok(InitializedSlice::new(Identity::new(inner)))
}
