use atelier_domain::status::{OpportunityKind, Visibility};
use atelier_domain::vocab::{ArtTheme, Country, Gender, Industry, LegalStatus, ResidencyOffering};
use atelier_media::AttachmentRef;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Persisted opportunity listing. Eligibility arrays are open-ended:
/// empty means "no restriction".
#[derive(Debug, Clone, SurrealValue)]
pub struct OpportunityRow {
    pub id: String,
    pub provider: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub visibility: String,
    pub banned: bool,
    /// ISO date; applications close at the end of this day.
    pub application_deadline: String,
    pub response_deadline: Option<String>,
    pub legal_statuses: Vec<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub genders: Vec<String>,
    pub industries: Vec<String>,
    pub country_residence: Vec<String>,
    pub country_citizenship: Vec<String>,
    pub location_description: String,
    pub themes: Vec<String>,
    pub theme_description: String,
    pub min_grant_amount: Option<i64>,
    pub max_grant_amount: Option<i64>,
    pub min_residency_weeks: Option<i64>,
    pub max_residency_weeks: Option<i64>,
    pub residency_offerings: Vec<String>,
    pub residency_offering_description: String,
    pub min_award_amount: Option<i64>,
    pub max_award_amount: Option<i64>,
    pub award_special_access: String,
    pub attachments: Vec<AttachmentRef>,
}

impl OpportunityRow {
    #[must_use]
    pub fn visibility_value(&self) -> Visibility {
        self.visibility.parse().unwrap_or(Visibility::Nobody)
    }

    /// Whether invites can still be issued against this listing.
    #[must_use]
    pub fn open_for_invites(&self, today: &str) -> bool {
        !self.banned
            && self.visibility_value() != Visibility::Nobody
            && self.application_deadline.as_str() >= today
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OpportunityPayload {
    pub title: String,
    pub description: String,
    pub kind: OpportunityKind,
    pub visibility: Visibility,
    /// ISO date.
    pub application_deadline: String,
    pub response_deadline: Option<String>,
    #[serde(default)]
    pub legal_statuses: Vec<LegalStatus>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    #[serde(default)]
    pub genders: Vec<Gender>,
    #[serde(default)]
    pub industries: Vec<Industry>,
    #[serde(default)]
    pub country_residence: Vec<Country>,
    #[serde(default)]
    pub country_citizenship: Vec<Country>,
    #[serde(default)]
    pub location_description: String,
    #[serde(default)]
    pub themes: Vec<ArtTheme>,
    #[serde(default)]
    pub theme_description: String,
    pub min_grant_amount: Option<i64>,
    pub max_grant_amount: Option<i64>,
    pub min_residency_weeks: Option<i64>,
    pub max_residency_weeks: Option<i64>,
    #[serde(default)]
    pub residency_offerings: Vec<ResidencyOffering>,
    #[serde(default)]
    pub residency_offering_description: String,
    pub min_award_amount: Option<i64>,
    pub max_award_amount: Option<i64>,
    #[serde(default)]
    pub award_special_access: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

/// Artist-facing relation to a listing in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum InviteRelation {
    All,
    Invites,
    InProgress,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct OpportunityFilter {
    /// Free text over title and description. Ignored under 3 characters.
    pub keyword: Option<String>,
    pub kind: Option<OpportunityKind>,
    pub grant_from: Option<i64>,
    pub grant_to: Option<i64>,
    pub residency_weeks: Option<i64>,
    pub residency_offering: Option<ResidencyOffering>,
    pub award_from: Option<i64>,
    pub award_to: Option<i64>,
    pub legal_status: Option<LegalStatus>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub industry: Option<Industry>,
    pub country_residence: Option<Country>,
    pub country_citizenship: Option<Country>,
    pub theme: Option<ArtTheme>,
    /// ISO date lower bound on the application deadline.
    pub deadline_from: Option<String>,
    /// ISO date upper bound on the application deadline.
    pub deadline_to: Option<String>,
    pub invite: Option<InviteRelation>,
    pub page: Option<u64>,
}

/// Search hit: the listing with its provider's organization name and,
/// for artists, the caller's invite status.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityHit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub visibility: String,
    pub application_deadline: String,
    pub response_deadline: Option<String>,
    pub organization_name: String,
    pub min_grant_amount: Option<i64>,
    pub max_grant_amount: Option<i64>,
    pub min_residency_weeks: Option<i64>,
    pub max_residency_weeks: Option<i64>,
    pub residency_offerings: Vec<String>,
    pub min_award_amount: Option<i64>,
    pub max_award_amount: Option<i64>,
    pub legal_statuses: Vec<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub genders: Vec<String>,
    pub industries: Vec<String>,
    pub country_residence: Vec<String>,
    pub country_citizenship: Vec<String>,
    pub themes: Vec<String>,
    pub location_description: String,
    pub attachments: Vec<AttachmentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySearchResponse {
    pub pages_total: u64,
    pub opportunities: Vec<OpportunityHit>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub visibility: String,
    pub banned: bool,
    pub application_deadline: String,
    pub response_deadline: Option<String>,
    pub legal_statuses: Vec<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub genders: Vec<String>,
    pub industries: Vec<String>,
    pub country_residence: Vec<String>,
    pub country_citizenship: Vec<String>,
    pub location_description: String,
    pub themes: Vec<String>,
    pub theme_description: String,
    pub min_grant_amount: Option<i64>,
    pub max_grant_amount: Option<i64>,
    pub min_residency_weeks: Option<i64>,
    pub max_residency_weeks: Option<i64>,
    pub residency_offerings: Vec<String>,
    pub residency_offering_description: String,
    pub min_award_amount: Option<i64>,
    pub max_award_amount: Option<i64>,
    pub award_special_access: String,
    pub attachments: Vec<AttachmentRef>,
}

impl From<OpportunityRow> for OpportunityResponse {
    fn from(row: OpportunityRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            kind: row.kind,
            visibility: row.visibility,
            banned: row.banned,
            application_deadline: row.application_deadline,
            response_deadline: row.response_deadline,
            legal_statuses: row.legal_statuses,
            min_age: row.min_age,
            max_age: row.max_age,
            genders: row.genders,
            industries: row.industries,
            country_residence: row.country_residence,
            country_citizenship: row.country_citizenship,
            location_description: row.location_description,
            themes: row.themes,
            theme_description: row.theme_description,
            min_grant_amount: row.min_grant_amount,
            max_grant_amount: row.max_grant_amount,
            min_residency_weeks: row.min_residency_weeks,
            max_residency_weeks: row.max_residency_weeks,
            residency_offerings: row.residency_offerings,
            residency_offering_description: row.residency_offering_description,
            min_award_amount: row.min_award_amount,
            max_award_amount: row.max_award_amount,
            award_special_access: row.award_special_access,
            attachments: row.attachments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityListResponse {
    pub opportunities: Vec<OpportunityResponse>,
}
