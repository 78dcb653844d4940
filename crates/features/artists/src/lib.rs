//! Artists feature slice: registration by invitation, profile upkeep,
//! relevance-ranked search, and the hand-off into moderation.

mod error;
mod models;
mod routes;
mod store;
mod validate;

pub use error::{ArtistError, ArtistErrorExt};
pub use models::{
    ArtistHit, ArtistProfileUpdate, ArtistRegistration, ArtistRow, ArtistSearchFilter,
    profile_completeness,
};
pub use routes::router;
pub use store::{ArtistInviteRow, ArtistStore, PendingOpportunityInvite, Viewer, search_query};

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE ANALYZER IF NOT EXISTS fuzzy_text TOKENIZERS class FILTERS lowercase, ascii, snowball(english);

    DEFINE TABLE IF NOT EXISTS artist SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS user ON artist TYPE record<user>;
    DEFINE FIELD IF NOT EXISTS artist_name ON artist TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS first_name ON artist TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS last_name ON artist TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS phone ON artist TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS birth_day ON artist TYPE string;
    DEFINE FIELD IF NOT EXISTS country_residence ON artist TYPE string;
    DEFINE FIELD IF NOT EXISTS country_citizenship ON artist TYPE string;
    DEFINE FIELD IF NOT EXISTS languages ON artist TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS industries ON artist TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS title ON artist TYPE string;
    DEFINE FIELD IF NOT EXISTS themes ON artist TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS bio ON artist TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS statement ON artist TYPE string;
    DEFINE FIELD IF NOT EXISTS links ON artist TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS active ON artist TYPE bool DEFAULT true;
    DEFINE FIELD IF NOT EXISTS moderation ON artist TYPE string;
    DEFINE FIELD IF NOT EXISTS moderation_comment ON artist TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS moderator ON artist TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS admin_mark ON artist TYPE string DEFAULT 'none';
    DEFINE FIELD IF NOT EXISTS search_text ON artist TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS created_at ON artist TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON artist TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS artist_user ON artist FIELDS user;
    DEFINE INDEX IF NOT EXISTS artist_search ON artist FIELDS search_text SEARCH ANALYZER fuzzy_text BM25;
";

/// Migrations contributed by the artists slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("artists", "0001", SCHEMA)]
}

/// Artists feature state.
#[atelier_derive::feature_slice]
pub struct Artists {
    store: ArtistStore,
}

impl Artists {
    #[must_use]
    pub fn store(&self) -> &ArtistStore {
        &self.store
    }
}

/// Initialize the artists feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = ArtistsInner { store: ArtistStore::new(database.clone()) };
    tracing::info!("Artists slice initialized");
    InitializedSlice::new(Artists::new(inner))
}
