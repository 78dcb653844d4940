//! Content feature slice: news posts managed by content managers, with
//! public listings for the home and news pages.

mod error;
mod models;
mod routes;
mod store;

pub use error::{ContentError, ContentErrorExt};
pub use models::{NewsPayload, NewsRow};
pub use routes::router;
pub use store::NewsStore;

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS news SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS author ON news TYPE record<user>;
    DEFINE FIELD IF NOT EXISTS title ON news TYPE string;
    DEFINE FIELD IF NOT EXISTS body ON news TYPE string;
    DEFINE FIELD IF NOT EXISTS main_picture ON news FLEXIBLE TYPE option<object>;
    DEFINE FIELD IF NOT EXISTS attachments ON news FLEXIBLE TYPE array<object> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS show_at_home ON news TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS show_at_news ON news TYPE bool DEFAULT true;
    DEFINE FIELD IF NOT EXISTS created_at ON news TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON news TYPE datetime DEFAULT time::now();
";

/// Migrations contributed by the content slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("content", "0001", SCHEMA)]
}

/// Content feature state.
#[atelier_derive::feature_slice]
pub struct Content {
    store: NewsStore,
}

impl Content {
    #[must_use]
    pub fn store(&self) -> &NewsStore {
        &self.store
    }
}

/// Initialize the content feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = ContentInner { store: NewsStore::new(database.clone()) };
    tracing::info!("Content slice initialized");
    InitializedSlice::new(Content::new(inner))
}
