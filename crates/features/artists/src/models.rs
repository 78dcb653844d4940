use atelier_domain::status::{AdminMark, ModerationStatus};
use atelier_domain::vocab::{ArtistTitle, ArtTheme, Country, Industry, Language};
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Persisted artist profile. Enumerated fields are stored as their
/// snake_case strings; `birth_day` is an ISO date.
#[derive(Debug, Clone, SurrealValue)]
pub struct ArtistRow {
    pub id: String,
    pub user: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_day: String,
    pub country_residence: String,
    pub country_citizenship: String,
    pub languages: Vec<String>,
    pub industries: Vec<String>,
    pub title: String,
    pub themes: Vec<String>,
    pub bio: Option<String>,
    pub statement: String,
    pub links: Vec<String>,
    pub active: bool,
    pub moderation: String,
    pub moderation_comment: String,
    pub moderator: Option<String>,
    pub admin_mark: String,
}

impl ArtistRow {
    #[must_use]
    pub fn moderation_status(&self) -> ModerationStatus {
        self.moderation.parse().unwrap_or(ModerationStatus::Draft)
    }
}

// --- payload sections (mirroring the registration/profile forms) ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountSection {
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonalSection {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub country_residence: Country,
    pub country_citizenship: Country,
    /// ISO date, e.g. `1991-04-23`.
    pub birth_day: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfessionalSection {
    pub languages: Vec<Language>,
    pub industries: Vec<Industry>,
    pub title: ArtistTitle,
    pub themes: Vec<ArtTheme>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileSection {
    pub artist_name: Option<String>,
    pub statement: String,
    pub bio: Option<String>,
    pub links: Vec<String>,
}

/// Registration payload: all form sections at once. The wizard navigation
/// is a client concern; the server validates the complete document.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArtistRegistration {
    pub account: AccountSection,
    pub personal: PersonalSection,
    pub professional: ProfessionalSection,
    pub profile: ProfileSection,
}

/// Profile update payload: registration minus the account section.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArtistProfileUpdate {
    pub personal: PersonalSection,
    pub professional: ProfessionalSection,
    pub profile: ProfileSection,
}

// --- search ---

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct ArtistSearchFilter {
    /// Free text over names, bio, and statement. Ignored under 3 characters.
    pub artist: Option<String>,
    /// Free text over project title/description/tags. Implies a project join.
    pub project: Option<String>,
    pub language: Option<Vec<Language>>,
    pub theme: Option<Vec<ArtTheme>>,
    pub industry: Option<Vec<Industry>>,
    pub age_from: Option<u32>,
    pub age_to: Option<u32>,
    pub country_residence: Option<Vec<Country>>,
    pub country_citizenship: Option<Vec<Country>>,
    pub reach_from: Option<i64>,
    pub reach_to: Option<i64>,
    pub budget: Option<i64>,
    /// When true, rows carry the matching project instead of one row per artist.
    pub include_project: bool,
    pub page: Option<u64>,
}

impl ArtistSearchFilter {
    /// Any project-scoped parameter forces the project join.
    #[must_use]
    pub fn joins_projects(&self) -> bool {
        self.include_project
            || self.project.as_ref().is_some_and(|p| p.len() >= 3)
            || self.reach_from.is_some()
            || self.reach_to.is_some()
            || self.budget.is_some()
    }
}

/// Search row: artist card plus optional provider-only contact details
/// and the matched project in `include-project` mode.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistHit {
    pub id: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub statement: String,
    pub themes: Vec<String>,
    pub languages: Vec<String>,
    pub industries: Vec<String>,
    pub title: String,
    pub country_residence: String,
    pub country_citizenship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_mark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_reach: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_budget: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSearchResponse {
    pub pages_total: u64,
    pub artists: Vec<ArtistHit>,
}

// --- public profile ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfileResponse {
    pub id: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub statement: String,
    pub languages: Vec<String>,
    pub industries: Vec<String>,
    pub themes: Vec<String>,
    pub title: String,
    pub links: Vec<String>,
    pub profile_complete: u8,
    pub project_count: i64,
    pub open_application_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_mark: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationStateResponse {
    pub moderation: String,
    pub moderation_comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    pub artist_id: String,
    pub landing_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminMarkRequest {
    pub mark: AdminMark,
}

/// Share of the 14 profile fields that carry a value, in percent.
#[must_use]
pub fn profile_completeness(artist: &ArtistRow) -> u8 {
    let filled = [
        artist.first_name.as_ref().is_some_and(|v| !v.is_empty()),
        artist.last_name.as_ref().is_some_and(|v| !v.is_empty()),
        artist.phone.as_ref().is_some_and(|v| !v.is_empty()),
        !artist.country_residence.is_empty() && artist.country_residence != "none",
        !artist.country_citizenship.is_empty() && artist.country_citizenship != "none",
        !artist.birth_day.is_empty(),
        artist.artist_name.as_ref().is_some_and(|v| !v.is_empty()),
        !artist.themes.is_empty(),
        !artist.languages.is_empty(),
        !artist.industries.is_empty(),
        !artist.title.is_empty(),
        artist.bio.as_ref().is_some_and(|v| !v.is_empty()),
        !artist.statement.is_empty(),
        !artist.links.is_empty(),
    ];

    let total = u32::try_from(filled.len()).unwrap_or(1);
    let count = u32::try_from(filled.iter().filter(|f| **f).count()).unwrap_or_default();
    u8::try_from(count * 100 / total).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_artist() -> ArtistRow {
        ArtistRow {
            id: "a1".into(),
            user: "u1".into(),
            artist_name: None,
            first_name: None,
            last_name: None,
            phone: None,
            birth_day: String::new(),
            country_residence: "none".into(),
            country_citizenship: "none".into(),
            languages: vec![],
            industries: vec![],
            title: String::new(),
            themes: vec![],
            bio: None,
            statement: String::new(),
            links: vec![],
            active: true,
            moderation: "draft".into(),
            moderation_comment: String::new(),
            moderator: None,
            admin_mark: "none".into(),
        }
    }

    #[test]
    fn empty_profile_is_zero_percent() {
        assert_eq!(profile_completeness(&bare_artist()), 0);
    }

    #[test]
    fn full_profile_is_hundred_percent() {
        let mut artist = bare_artist();
        artist.first_name = Some("Ada".into());
        artist.last_name = Some("Lovelace".into());
        artist.phone = Some("+44 1".into());
        artist.country_residence = "united_kingdom".into();
        artist.country_citizenship = "united_kingdom".into();
        artist.birth_day = "1815-12-10".into();
        artist.artist_name = Some("ada".into());
        artist.themes = vec!["technology".into()];
        artist.languages = vec!["english".into()];
        artist.industries = vec!["digital_and_new_media".into()];
        artist.title = "established".into();
        artist.bio = Some("bio".into());
        artist.statement = "statement".into();
        artist.links = vec!["https://example.org".into()];

        assert_eq!(profile_completeness(&artist), 100);
    }

    #[test]
    fn partial_profile_rounds_down() {
        let mut artist = bare_artist();
        artist.statement = "statement".into();
        artist.title = "emerging".into();
        artist.languages = vec!["english".into()];
        // 3 of 14 fields -> 21%
        assert_eq!(profile_completeness(&artist), 21);
    }

    #[test]
    fn project_parameters_force_the_join() {
        let mut filter = ArtistSearchFilter::default();
        assert!(!filter.joins_projects());

        filter.budget = Some(1000);
        assert!(filter.joins_projects());

        let mut filter = ArtistSearchFilter::default();
        filter.project = Some("ab".into()); // below the 3-char threshold
        assert!(!filter.joins_projects());
        filter.project = Some("mural".into());
        assert!(filter.joins_projects());
    }
}
