//! Facade crate for the Atelier platform features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature
//! initialization, migrations, and routing. Keep this crate thin: it
//! composes other crates, not business logic.

use atelier_database::{Database, Migration};
use atelier_domain::config::ApiConfig;
use atelier_domain::registry::InitializedSlice;
pub use atelier_domain as domain;
pub use atelier_kernel as kernel;
use atelier_kernel::server::ApiState;
use atelier_storage::Storage;
use utoipa_axum::router::OpenApiRouter;

pub mod server {
    pub mod router {
        pub use atelier_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use atelier_admin as admin;
    pub use atelier_applications as applications;
    pub use atelier_artists as artists;
    pub use atelier_content as content;
    pub use atelier_identity as identity;
    pub use atelier_invites as invites;
    pub use atelier_media as media;
    pub use atelier_moderation as moderation;
    pub use atelier_opportunities as opportunities;
    pub use atelier_projects as projects;
    pub use atelier_providers as providers;

    /// Enabled feature slices.
    pub const ENABLED: &[&str] = &[
        "identity",
        "media",
        "artists",
        "providers",
        "projects",
        "opportunities",
        "applications",
        "invites",
        "moderation",
        "admin",
        "content",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Slice migrations in dependency order. Identity seeds the account
/// tables, artists defines the shared search analyzer, and everything
/// referencing records comes after its referents.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    let mut migrations = Vec::new();
    migrations.extend(features::identity::migrations());
    migrations.extend(features::media::migrations());
    migrations.extend(features::artists::migrations());
    migrations.extend(features::providers::migrations());
    migrations.extend(features::projects::migrations());
    migrations.extend(features::opportunities::migrations());
    migrations.extend(features::applications::migrations());
    migrations.extend(features::invites::migrations());
    migrations.extend(features::moderation::migrations());
    migrations.extend(features::admin::migrations());
    migrations.extend(features::content::migrations());
    migrations
}

/// Initialize all enabled features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    storage: &Storage,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error>> {
    let slices = vec![
        features::identity::init(config, database)?,
        features::media::init(database, storage),
        features::artists::init(database),
        features::providers::init(database),
        features::projects::init(database),
        features::opportunities::init(database),
        features::applications::init(database),
        features::invites::init(database),
        features::moderation::init(database),
        features::admin::init(database),
        features::content::init(database),
    ];

    Ok(slices)
}

/// The merged API router across every feature slice.
#[must_use]
pub fn api_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .merge(features::identity::router())
        .merge(features::media::router())
        .merge(features::artists::router())
        .merge(features::providers::router())
        .merge(features::projects::router())
        .merge(features::opportunities::router())
        .merge(features::applications::router())
        .merge(features::invites::router())
        .merge(features::moderation::router())
        .merge(features::admin::router())
        .merge(features::content::router())
}
