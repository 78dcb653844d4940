//! Admin feature slice: registration invitations, account management,
//! artist marks and locks, and the overview dashboards.
//!
//! The managed tables belong to other slices (`user` and `user_invite`
//! to identity, `artist` to artists); this slice only manages rows and
//! aggregates, so it contributes no schema of its own.

mod error;
mod models;
mod routes;
mod store;

pub use error::{AdminError, AdminErrorExt};
pub use models::{Breakdown, UserInvitePayload, UserInviteSummary, UserSummary, UsersFilter};
pub use routes::router;
pub use store::{AdminStore, month_bounds};

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

/// Migrations contributed by the admin slice (none).
#[must_use]
pub fn migrations() -> Vec<Migration> {
    Vec::new()
}

/// Admin feature state.
#[atelier_derive::feature_slice]
pub struct Admin {
    store: AdminStore,
}

impl Admin {
    #[must_use]
    pub fn store(&self) -> &AdminStore {
        &self.store
    }
}

/// Initialize the admin feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = AdminInner { store: AdminStore::new(database.clone()) };
    tracing::info!("Admin slice initialized");
    InitializedSlice::new(Admin::new(inner))
}
