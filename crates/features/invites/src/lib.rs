//! Invites feature slice: opportunity invitations for registered and
//! unregistered artists, self-service registration invitations, and the
//! token-guarded deadline notification sweep.

mod error;
mod models;
pub mod notify;
mod routes;
mod store;

pub use error::{InviteError, InviteErrorExt};
pub use models::{
    BatchArtistInvites, BatchOpportunityInvites, BatchUnregisteredInvites, InviteRow,
    SelfInviteRequest,
};
pub use routes::router;
pub use store::{InviteStore, SweepCandidate, UnregisteredDetail};

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS invite SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS artist ON invite TYPE record<artist>;
    DEFINE FIELD IF NOT EXISTS opportunity ON invite TYPE record<opportunity>;
    DEFINE FIELD IF NOT EXISTS message ON invite TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS status ON invite TYPE string DEFAULT 'pending';
    DEFINE FIELD IF NOT EXISTS created_at ON invite TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS invite_artist ON invite FIELDS artist;
    DEFINE INDEX IF NOT EXISTS invite_opportunity ON invite FIELDS opportunity;

    DEFINE TABLE IF NOT EXISTS artist_invite SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS email ON artist_invite TYPE string;
    DEFINE FIELD IF NOT EXISTS oauth_external_id ON artist_invite TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS created_by_artist ON artist_invite TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS sent_at ON artist_invite TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS created_at ON artist_invite TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS artist_invite_email ON artist_invite FIELDS email UNIQUE;

    DEFINE TABLE IF NOT EXISTS unregistered_invite SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS artist_invite ON unregistered_invite TYPE record<artist_invite>;
    DEFINE FIELD IF NOT EXISTS email ON unregistered_invite TYPE string;
    DEFINE FIELD IF NOT EXISTS opportunity ON unregistered_invite TYPE record<opportunity>;
    DEFINE FIELD IF NOT EXISTS message ON unregistered_invite TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS created_at ON unregistered_invite TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS unregistered_invite_parent ON unregistered_invite FIELDS artist_invite;

    DEFINE TABLE IF NOT EXISTS invite_notice SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS invite ON invite_notice TYPE record<invite>;
    DEFINE FIELD IF NOT EXISTS created_at ON invite_notice TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS invite_notice_invite ON invite_notice FIELDS invite;
";

/// Migrations contributed by the invites slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("invites", "0001", SCHEMA)]
}

/// Invites feature state.
#[atelier_derive::feature_slice]
pub struct Invites {
    store: InviteStore,
}

impl Invites {
    #[must_use]
    pub fn store(&self) -> &InviteStore {
        &self.store
    }
}

/// Initialize the invites feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = InvitesInner { store: InviteStore::new(database.clone()) };
    tracing::info!("Invites slice initialized");
    InitializedSlice::new(Invites::new(inner))
}
