//! Providers feature slice: organization profiles, onboarding requests,
//! and the blocked-artists list.

mod error;
mod models;
mod routes;
mod store;
mod validate;

pub use error::{ProviderError, ProviderErrorExt};
pub use models::{BlockedArtistCard, ProviderProfilePayload, ProviderRegistration, ProviderRow};
pub use routes::router;
pub use store::ProviderStore;

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS provider SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS user ON provider TYPE record<user>;
    DEFINE FIELD IF NOT EXISTS organization_name ON provider TYPE string;
    DEFINE FIELD IF NOT EXISTS representative_name ON provider TYPE string;
    DEFINE FIELD IF NOT EXISTS website ON provider TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS information ON provider TYPE string;
    DEFINE FIELD IF NOT EXISTS phone ON provider TYPE string;
    DEFINE FIELD IF NOT EXISTS blocked_artists ON provider TYPE array<record<artist>> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS created_at ON provider TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON provider TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS provider_user ON provider FIELDS user;
";

/// Migrations contributed by the providers slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("providers", "0001", SCHEMA)]
}

/// Providers feature state.
#[atelier_derive::feature_slice]
pub struct Providers {
    store: ProviderStore,
}

impl Providers {
    #[must_use]
    pub fn store(&self) -> &ProviderStore {
        &self.store
    }
}

/// Initialize the providers feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = ProvidersInner { store: ProviderStore::new(database.clone()) };
    tracing::info!("Providers slice initialized");
    InitializedSlice::new(Providers::new(inner))
}
