//! Applications feature slice: the submission lifecycle between artists
//! and providers, with invite-status synchronization around withdrawals.

mod error;
mod models;
mod routes;
mod store;

pub use error::{ApplicationError, ApplicationErrorExt};
pub use models::{
    ApplicationPayload, ApplicationRow, MyApplicationHit, MyApplicationsFilter,
    ProviderApplicationHit, ProviderApplicationsFilter,
};
pub use routes::router;
pub use store::{ApplicationStore, AttachableProject, provider_search_query};

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS application SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS artist ON application TYPE record<artist>;
    DEFINE FIELD IF NOT EXISTS opportunity ON application TYPE record<opportunity>;
    DEFINE FIELD IF NOT EXISTS project ON application TYPE option<record<project>>;
    DEFINE FIELD IF NOT EXISTS message ON application TYPE string;
    DEFINE FIELD IF NOT EXISTS attachments ON application FLEXIBLE TYPE array<object> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS status ON application TYPE string DEFAULT 'new';
    DEFINE FIELD IF NOT EXISTS created_at ON application TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON application TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS application_artist ON application FIELDS artist;
    DEFINE INDEX IF NOT EXISTS application_opportunity ON application FIELDS opportunity;
";

/// Migrations contributed by the applications slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("applications", "0001", SCHEMA)]
}

/// Applications feature state.
#[atelier_derive::feature_slice]
pub struct Applications {
    store: ApplicationStore,
}

impl Applications {
    #[must_use]
    pub fn store(&self) -> &ApplicationStore {
        &self.store
    }
}

/// Initialize the applications feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = ApplicationsInner { store: ApplicationStore::new(database.clone()) };
    tracing::info!("Applications slice initialized");
    InitializedSlice::new(Applications::new(inner))
}
