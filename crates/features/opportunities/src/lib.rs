//! Opportunities feature slice: provider listings with eligibility
//! filters, visibility rules, and the filtered relevance search.

mod error;
mod models;
mod routes;
mod store;
mod validate;

pub use error::{OpportunityError, OpportunityErrorExt};
pub use models::{
    InviteRelation, OpportunityFilter, OpportunityHit, OpportunityPayload, OpportunityRow,
};
pub use routes::router;
pub use store::{OpportunityStore, SearchViewer, search_query};

use atelier_database::{Database, Migration};
use atelier_domain::registry::InitializedSlice;

const SCHEMA: &str = "
    DEFINE TABLE IF NOT EXISTS opportunity SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS provider ON opportunity TYPE record<provider>;
    DEFINE FIELD IF NOT EXISTS title ON opportunity TYPE string;
    DEFINE FIELD IF NOT EXISTS description ON opportunity TYPE string;
    DEFINE FIELD IF NOT EXISTS kind ON opportunity TYPE string;
    DEFINE FIELD IF NOT EXISTS visibility ON opportunity TYPE string;
    DEFINE FIELD IF NOT EXISTS banned ON opportunity TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS application_deadline ON opportunity TYPE string;
    DEFINE FIELD IF NOT EXISTS response_deadline ON opportunity TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS legal_statuses ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS min_age ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS max_age ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS genders ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS industries ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS country_residence ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS country_citizenship ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS location_description ON opportunity TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS themes ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS theme_description ON opportunity TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS min_grant_amount ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS max_grant_amount ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS min_residency_weeks ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS max_residency_weeks ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS residency_offerings ON opportunity TYPE array<string> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS residency_offering_description ON opportunity TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS min_award_amount ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS max_award_amount ON opportunity TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS award_special_access ON opportunity TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS attachments ON opportunity FLEXIBLE TYPE array<object> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS search_text ON opportunity TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS created_at ON opportunity TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON opportunity TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS opportunity_provider ON opportunity FIELDS provider;
    DEFINE INDEX IF NOT EXISTS opportunity_search ON opportunity FIELDS search_text SEARCH ANALYZER fuzzy_text BM25;
";

/// Migrations contributed by the opportunities slice. Depends on the
/// artists slice for the `fuzzy_text` analyzer.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("opportunities", "0001", SCHEMA)]
}

/// Opportunities feature state.
#[atelier_derive::feature_slice]
pub struct Opportunities {
    store: OpportunityStore,
}

impl Opportunities {
    #[must_use]
    pub fn store(&self) -> &OpportunityStore {
        &self.store
    }
}

/// Initialize the opportunities feature.
pub fn init(database: &Database) -> InitializedSlice {
    let inner = OpportunitiesInner { store: OpportunityStore::new(database.clone()) };
    tracing::info!("Opportunities slice initialized");
    InitializedSlice::new(Opportunities::new(inner))
}
