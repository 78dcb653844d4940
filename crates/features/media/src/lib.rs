//! Media feature slice: authenticated attachment upload, public download,
//! and the owner-scoped cleanup used by attachment-diffing flows.

mod error;
mod models;
mod routes;
mod store;

pub use error::{MediaError, MediaErrorExt};
pub use models::{AttachmentRef, AttachmentRow, MAX_ATTACHMENT_LABEL_LENGTH};
pub use routes::router;
pub use store::MediaStore;

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;
use atelier_storage::Storage;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS attachment SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS owner ON attachment TYPE string;
    DEFINE FIELD IF NOT EXISTS file_name ON attachment TYPE string;
    DEFINE FIELD IF NOT EXISTS content_type ON attachment TYPE string;
    DEFINE FIELD IF NOT EXISTS length ON attachment TYPE int;
    DEFINE FIELD IF NOT EXISTS created_at ON attachment TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS attachment_owner ON attachment FIELDS owner;
";

/// Migrations contributed by the media slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("media", "0001", SCHEMA)]
}

/// Media feature state.
#[atelier_derive::feature_slice]
pub struct Media {
    store: MediaStore,
}

impl Media {
    #[must_use]
    pub fn store(&self) -> &MediaStore {
        &self.store
    }
}

/// Initialize the media feature.
pub fn init(database: &Database, storage: &Storage) -> InitializedSlice {
    let inner = MediaInner { store: MediaStore::new(database.clone(), storage.clone()) };
    tracing::info!("Media slice initialized");
    InitializedSlice::new(Media::new(inner))
}
