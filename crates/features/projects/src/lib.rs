//! Projects feature slice: artist project CRUD with attachment cleanup
//! and the moderation hand-off.

mod error;
mod models;
mod routes;
mod store;
mod validate;

pub use error::{ProjectError, ProjectErrorExt};
pub use models::{ProjectPayload, ProjectRow};
pub use routes::router;
pub use store::{ProjectStore, orphaned_attachments};

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS project SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS artist ON project TYPE record<artist>;
    DEFINE FIELD IF NOT EXISTS title ON project TYPE string;
    DEFINE FIELD IF NOT EXISTS description ON project TYPE string;
    DEFINE FIELD IF NOT EXISTS tags ON project TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS link ON project TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS budget ON project TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS reach ON project TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS exclusive_support ON project TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS hidden ON project TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS banned ON project TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS attachments ON project FLEXIBLE TYPE array<object> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS poster_image ON project FLEXIBLE TYPE option<object>;
    DEFINE FIELD IF NOT EXISTS moderation ON project TYPE string;
    DEFINE FIELD IF NOT EXISTS moderation_comment ON project TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS moderator ON project TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS search_text ON project TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS created_at ON project TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON project TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS project_artist ON project FIELDS artist;
    DEFINE INDEX IF NOT EXISTS project_search ON project FIELDS search_text SEARCH ANALYZER fuzzy_text BM25;
";

/// Migrations contributed by the projects slice. Depends on the artists
/// slice for the `fuzzy_text` analyzer.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("projects", "0001", SCHEMA)]
}

/// Projects feature state.
#[atelier_derive::feature_slice]
pub struct Projects {
    store: ProjectStore,
}

impl Projects {
    #[must_use]
    pub fn store(&self) -> &ProjectStore {
        &self.store
    }
}

/// Initialize the projects feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = ProjectsInner { store: ProjectStore::new(database.clone()) };
    tracing::info!("Projects slice initialized");
    InitializedSlice::new(Projects::new(inner))
}
