//! Moderation feature slice: the review queue over artist profiles and
//! projects, and the decisions that move them through it.
//!
//! The moderated tables belong to the artists and projects slices; this
//! slice only reads the queue and writes decisions, so it contributes no
//! schema of its own.

mod error;
mod models;
mod routes;
mod store;

pub use error::{ModerationError, ModerationErrorExt};
pub use models::{ArtistDossier, DecisionRequest, ProjectDossier, QueueEntity, QueueFilter, QueueOrder, QueuedArtist, QueuedProject};
pub use routes::router;
pub use store::ModerationStore;

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

/// Migrations contributed by the moderation slice (none).
#[must_use]
pub fn migrations() -> Vec<Migration> {
    Vec::new()
}

/// Moderation feature state.
#[atelier_derive::feature_slice]
pub struct Moderation {
    store: ModerationStore,
}

impl Moderation {
    #[must_use]
    pub fn store(&self) -> &ModerationStore {
        &self.store
    }
}

/// Initialize the moderation feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = ModerationInner { store: ModerationStore::new(database.clone()) };
    tracing::info!("Moderation slice initialized");
    InitializedSlice::new(Moderation::new(inner))
}
