use crate::error::{ArtistError, ArtistErrorExt};
use crate::models::{
    ArtistHit, ArtistProfileUpdate, ArtistRow, ArtistSearchFilter, PersonalSection,
    ProfessionalSection, ProfileSection,
};
use atelier_database::{Database, QueryBuilder};
use atelier_domain::status::ModerationStatus;
use atelier_kernel::safe_nanoid;
use chrono::{Datelike, NaiveDate, Utc};
use surrealdb::types::SurrealValue;

pub(crate) const ARTISTS_PER_PAGE: u64 = 9;

const ARTIST_FIELDS: &str = "record::id(id) AS id, record::id(user) AS user, artist_name, \
     first_name, last_name, phone, birth_day, country_residence, country_citizenship, \
     languages, industries, title, themes, bio, statement, links, active, moderation, \
     moderation_comment, moderator, admin_mark";

/// Who is looking at the search results; widens the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Public,
    Provider,
    Admin,
}

/// Artist profile persistence and search.
#[derive(Debug, Clone)]
pub struct ArtistStore {
    db: Database,
}

/// An artist invitation pending registration, with the per-opportunity
/// messages to convert into real invites.
#[derive(Debug, Clone, SurrealValue)]
pub struct ArtistInviteRow {
    pub id: String,
    pub email: String,
    pub oauth_external_id: Option<String>,
    pub created_by_artist: bool,
}

#[derive(Debug, Clone, SurrealValue)]
pub struct PendingOpportunityInvite {
    pub opportunity: String,
    pub message: String,
}

impl ArtistStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the artist profile for a freshly registered user, in Draft
    /// moderation state.
    pub async fn create(
        &self,
        user_id: &str,
        personal: &PersonalSection,
        professional: &ProfessionalSection,
        profile: &ProfileSection,
    ) -> Result<String, ArtistError> {
        let id = safe_nanoid!();

        self.db
            .query(format!(
                "CREATE type::thing('artist', $id) SET user = type::thing('user', $user), \
                 artist_name = $artist_name, first_name = $first_name, last_name = $last_name, \
                 phone = $phone, birth_day = $birth_day, country_residence = $residence, \
                 country_citizenship = $citizenship, languages = $languages, \
                 industries = $industries, title = $title, themes = $themes, bio = $bio, \
                 statement = $statement, links = $links, active = true, \
                 moderation = '{draft}', moderation_comment = '', moderator = NONE, \
                 admin_mark = 'none', search_text = $search_text;",
                draft = ModerationStatus::Draft,
            ))
            .bind(("id", id.clone()))
            .bind(("user", user_id.to_owned()))
            .bind(("artist_name", profile.artist_name.clone()))
            .bind(("first_name", personal.first_name.clone()))
            .bind(("last_name", personal.last_name.clone()))
            .bind(("phone", personal.phone.clone()))
            .bind(("birth_day", personal.birth_day.clone()))
            .bind(("residence", personal.country_residence.to_string()))
            .bind(("citizenship", personal.country_citizenship.to_string()))
            .bind(("languages", to_strings(&professional.languages)))
            .bind(("industries", to_strings(&professional.industries)))
            .bind(("title", professional.title.to_string()))
            .bind(("themes", to_strings(&professional.themes)))
            .bind(("bio", profile.bio.clone()))
            .bind(("statement", profile.statement.clone()))
            .bind(("links", profile.links.clone()))
            .bind(("search_text", search_text(personal, profile)))
            .await
            .context("Creating artist")?;

        Ok(id)
    }

    /// Applies a profile update and drops the record back to Draft, so
    /// changed profiles pass moderation again.
    pub async fn update_profile(
        &self,
        artist_id: &str,
        update: &ArtistProfileUpdate,
    ) -> Result<(), ArtistError> {
        self.db
            .query(format!(
                "UPDATE type::thing('artist', $id) SET \
                 artist_name = $artist_name, first_name = $first_name, last_name = $last_name, \
                 phone = $phone, birth_day = $birth_day, country_residence = $residence, \
                 country_citizenship = $citizenship, languages = $languages, \
                 industries = $industries, title = $title, themes = $themes, bio = $bio, \
                 statement = $statement, links = $links, moderation = '{draft}', \
                 search_text = $search_text, updated_at = time::now();",
                draft = ModerationStatus::Draft,
            ))
            .bind(("id", artist_id.to_owned()))
            .bind(("artist_name", update.profile.artist_name.clone()))
            .bind(("first_name", update.personal.first_name.clone()))
            .bind(("last_name", update.personal.last_name.clone()))
            .bind(("phone", update.personal.phone.clone()))
            .bind(("birth_day", update.personal.birth_day.clone()))
            .bind(("residence", update.personal.country_residence.to_string()))
            .bind(("citizenship", update.personal.country_citizenship.to_string()))
            .bind(("languages", to_strings(&update.professional.languages)))
            .bind(("industries", to_strings(&update.professional.industries)))
            .bind(("title", update.professional.title.to_string()))
            .bind(("themes", to_strings(&update.professional.themes)))
            .bind(("bio", update.profile.bio.clone()))
            .bind(("statement", update.profile.statement.clone()))
            .bind(("links", update.profile.links.clone()))
            .bind(("search_text", search_text(&update.personal, &update.profile)))
            .await
            .context("Updating artist profile")?;

        Ok(())
    }

    pub async fn find_by_id(&self, artist_id: &str) -> Result<Option<ArtistRow>, ArtistError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {ARTIST_FIELDS} FROM artist \
                 WHERE id = type::thing('artist', $id) LIMIT 1;"
            ))
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Loading artist")?
            .take::<Vec<ArtistRow>>(0)
            .context("Parsing artist")?;
        Ok(rows.into_iter().next())
    }

    /// Hands the profile to the moderation queue.
    ///
    /// # Errors
    /// [`ArtistError::Conflict`] when the profile is not in a submittable
    /// state.
    pub async fn submit_for_moderation(&self, artist_id: &str) -> Result<(), ArtistError> {
        let artist = self.find_by_id(artist_id).await?.ok_or(ArtistError::NotFound {
            message: "artist not found".into(),
            context: None,
        })?;

        if !artist.moderation_status().can_submit() {
            return Err(ArtistError::Conflict {
                message: "profile is already under or past moderation".into(),
                context: None,
            });
        }

        self.db
            .query(format!(
                "UPDATE type::thing('artist', $id) SET moderation = '{queued}', \
                 updated_at = time::now();",
                queued = ModerationStatus::OnModeration,
            ))
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Submitting artist for moderation")?;

        Ok(())
    }

    /// Runs the composed search and its count in one round trip each.
    pub async fn search(
        &self,
        filter: &ArtistSearchFilter,
        viewer: Viewer,
    ) -> Result<(u64, Vec<ArtistHit>), ArtistError> {
        let query = search_query(filter, viewer);

        let total = self.db.run_count(&query).await?;
        let hits = self
            .db
            .run(&query)
            .await?
            .take::<Vec<ArtistHit>>(0)
            .context("Parsing artist search hits")?;

        Ok((total.div_ceil(ARTISTS_PER_PAGE), hits))
    }

    /// Approved, visible project count for a profile page.
    pub async fn project_count(&self, artist_id: &str) -> Result<i64, ArtistError> {
        self.count(
            "SELECT count() AS total FROM project WHERE artist = type::thing('artist', $id) \
             AND hidden = false AND banned = false AND moderation = 'approved' GROUP ALL;",
            artist_id,
        )
        .await
    }

    /// Open applications against live opportunities.
    pub async fn open_application_count(&self, artist_id: &str) -> Result<i64, ArtistError> {
        self.count(
            "SELECT count() AS total FROM application \
             WHERE artist = type::thing('artist', $id) \
             AND status IN ['sent', 'shortlisted', 'viewlater'] \
             AND opportunity.banned = false \
             AND opportunity.application_deadline >= time::format(time::now(), '%Y-%m-%d') \
             GROUP ALL;",
            artist_id,
        )
        .await
    }

    // --- registration invitations (rows owned by the invites slice) ---

    pub async fn find_artist_invite(
        &self,
        invite_id: &str,
    ) -> Result<Option<ArtistInviteRow>, ArtistError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, oauth_external_id, created_by_artist \
                 FROM artist_invite WHERE id = type::thing('artist_invite', $id) LIMIT 1;",
            )
            .bind(("id", invite_id.to_owned()))
            .await
            .context("Loading artist invite")?
            .take::<Vec<ArtistInviteRow>>(0)
            .context("Parsing artist invite")?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_artist_invite_by_oauth(
        &self,
        external_id: &str,
    ) -> Result<Option<ArtistInviteRow>, ArtistError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, oauth_external_id, created_by_artist \
                 FROM artist_invite WHERE oauth_external_id = $oauth LIMIT 1;",
            )
            .bind(("oauth", external_id.to_owned()))
            .await
            .context("Loading artist invite by OAuth id")?
            .take::<Vec<ArtistInviteRow>>(0)
            .context("Parsing artist invite")?;
        Ok(rows.into_iter().next())
    }

    /// Opportunity invites queued for an unregistered artist.
    pub async fn pending_opportunity_invites(
        &self,
        invite_id: &str,
    ) -> Result<Vec<PendingOpportunityInvite>, ArtistError> {
        self.db
            .query(
                "SELECT record::id(opportunity) AS opportunity, message FROM unregistered_invite \
                 WHERE artist_invite = type::thing('artist_invite', $id);",
            )
            .bind(("id", invite_id.to_owned()))
            .await
            .context("Loading pending opportunity invites")?
            .take::<Vec<PendingOpportunityInvite>>(0)
            .context("Parsing pending opportunity invites")
    }

    /// Converts queued unregistered invites into real pending invites for
    /// the new artist and retires the registration invitation.
    pub async fn consume_artist_invite(
        &self,
        invite_id: &str,
        artist_id: &str,
        pending: &[PendingOpportunityInvite],
    ) -> Result<(), ArtistError> {
        for invite in pending {
            self.db
                .query(
                    "CREATE type::thing('invite', $id) SET \
                     artist = type::thing('artist', $artist), \
                     opportunity = type::thing('opportunity', $opportunity), \
                     message = $message, status = 'pending';",
                )
                .bind(("id", safe_nanoid!()))
                .bind(("artist", artist_id.to_owned()))
                .bind(("opportunity", invite.opportunity.clone()))
                .bind(("message", invite.message.clone()))
                .await
                .context("Converting pending invite")?;
        }

        self.db
            .query(
                "DELETE unregistered_invite WHERE artist_invite = type::thing('artist_invite', $id);
                 DELETE type::thing('artist_invite', $id);",
            )
            .bind(("id", invite_id.to_owned()))
            .await
            .context("Retiring artist invite")?;

        Ok(())
    }

    async fn count(&self, statement: &str, artist_id: &str) -> Result<i64, ArtistError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(statement)
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Counting rows")?
            .take::<Option<CountRow>>(0)
            .context("Parsing count")?;
        Ok(row.map_or(0, |r| r.total))
    }
}

fn to_strings<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn search_text(personal: &PersonalSection, profile: &ProfileSection) -> String {
    [
        profile.artist_name.as_deref().unwrap_or_default(),
        personal.first_name.as_deref().unwrap_or_default(),
        personal.last_name.as_deref().unwrap_or_default(),
        profile.bio.as_deref().unwrap_or_default(),
        &profile.statement,
    ]
    .join(" ")
    .trim()
    .to_owned()
}

/// ISO date of someone turning `years` today; used for age range filters.
fn birthday_cutoff(years: u32) -> String {
    let today = Utc::now().date_naive();
    let year = today.year() - i32::try_from(years).unwrap_or_default();
    NaiveDate::from_ymd_opt(year, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), 28))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// Assembles the dynamic search statement. Every optional filter adds its
/// own conjunct; relevance projections only appear alongside the filters
/// that need them.
pub fn search_query(filter: &ArtistSearchFilter, viewer: Viewer) -> QueryBuilder {
    let with_projects = filter.joins_projects();
    let artist_text = filter.artist.as_deref().filter(|t| t.len() >= 3);
    let project_text = filter.project.as_deref().filter(|t| t.len() >= 3);

    let mut query = if with_projects && filter.include_project {
        project_rooted_query(viewer)
    } else {
        artist_rooted_query(viewer)
    };

    // Base visibility rules.
    if with_projects && filter.include_project {
        query = query
            .filter("moderation = 'approved'")
            .filter("hidden = false")
            .filter("banned = false")
            .filter("artist.moderation = 'approved'")
            .filter("artist.user.locked = false");
    } else {
        query = query.filter("user.locked = false").filter("moderation = 'approved'");
    }

    let prefix = if with_projects && filter.include_project { "artist." } else { "" };

    if let Some(text) = artist_text {
        if with_projects && filter.include_project {
            // No search index across the link; fall back to a containment check.
            query = query
                .filter("string::contains(string::lowercase(artist.search_text), $artist_lower)")
                .bind("artist_lower", text.to_lowercase());
        } else {
            query = query
                .field("search::score(0) AS relevance")
                .field(
                    "(string::contains(string::lowercase(search_text), $artist_lower)) AS exact_hit",
                )
                .filter("search_text @0@ $artist_text")
                .bind("artist_text", text)
                .bind("artist_lower", text.to_lowercase())
                .order("exact_hit DESC")
                .order("relevance DESC");
        }
    }

    if let Some(text) = project_text {
        if filter.include_project {
            query = query
                .field("search::score(0) AS project_relevance")
                .filter("search_text @0@ $project_text")
                .bind("project_text", text)
                .order("project_relevance DESC");
        } else {
            query = query
                .filter(
                    "id IN (SELECT VALUE artist FROM project WHERE hidden = false \
                     AND banned = false AND moderation = 'approved' \
                     AND string::contains(string::lowercase(search_text), $project_lower))",
                )
                .bind("project_lower", text.to_lowercase());
        }
    }

    if let Some(languages) = filter.language.as_ref().filter(|v| !v.is_empty()) {
        query = query
            .filter(format!("{prefix}languages CONTAINSALL $languages"))
            .bind("languages", to_strings(languages));
    }
    if let Some(themes) = filter.theme.as_ref().filter(|v| !v.is_empty()) {
        query = query
            .filter(format!("{prefix}themes CONTAINSALL $themes"))
            .bind("themes", to_strings(themes));
    }
    if let Some(industries) = filter.industry.as_ref().filter(|v| !v.is_empty()) {
        query = query
            .filter(format!("{prefix}industries CONTAINSALL $industries"))
            .bind("industries", to_strings(industries));
    }
    if let Some(residence) = filter.country_residence.as_ref().filter(|v| !v.is_empty()) {
        query = query
            .filter(format!("{prefix}country_residence INSIDE $residence"))
            .bind("residence", to_strings(residence));
    }
    if let Some(citizenship) = filter.country_citizenship.as_ref().filter(|v| !v.is_empty()) {
        query = query
            .filter(format!("{prefix}country_citizenship INSIDE $citizenship"))
            .bind("citizenship", to_strings(citizenship));
    }

    if let Some(age_from) = filter.age_from {
        query = query
            .filter(format!("{prefix}birth_day <= $born_before"))
            .bind("born_before", birthday_cutoff(age_from));
    }
    if let Some(age_to) = filter.age_to {
        query = query
            .filter(format!("{prefix}birth_day >= $born_after"))
            .bind("born_after", birthday_cutoff(age_to + 1));
    }

    // Project range filters; in artist-rooted mode they ride along in the
    // membership subquery.
    if with_projects && !filter.include_project {
        let mut project_conditions = vec![
            "hidden = false".to_owned(),
            "banned = false".to_owned(),
            "moderation = 'approved'".to_owned(),
        ];
        if filter.reach_from.is_some() {
            project_conditions.push("reach >= $reach_from".to_owned());
        }
        if filter.reach_to.is_some() {
            project_conditions.push("reach <= $reach_to".to_owned());
        }
        if filter.budget.is_some() {
            project_conditions.push("budget <= $budget".to_owned());
        }
        query = query.filter(format!(
            "id IN (SELECT VALUE artist FROM project WHERE {})",
            project_conditions.join(" AND ")
        ));
    } else if filter.include_project {
        if filter.reach_from.is_some() {
            query = query.filter("reach >= $reach_from");
        }
        if filter.reach_to.is_some() {
            query = query.filter("reach <= $reach_to");
        }
        if filter.budget.is_some() {
            query = query.filter("budget <= $budget");
        }
    }
    if let Some(reach_from) = filter.reach_from {
        query = query.bind("reach_from", reach_from);
    }
    if let Some(reach_to) = filter.reach_to {
        query = query.bind("reach_to", reach_to);
    }
    if let Some(budget) = filter.budget {
        query = query.bind("budget", budget);
    }

    query.order("id DESC").page(filter.page.unwrap_or(1).max(1), ARTISTS_PER_PAGE)
}

fn artist_rooted_query(viewer: Viewer) -> QueryBuilder {
    let mut query = QueryBuilder::select("artist")
        .field("record::id(id) AS id")
        .field("artist_name")
        .field("first_name")
        .field("last_name")
        .field("bio")
        .field("statement")
        .field("themes")
        .field("languages")
        .field("industries")
        .field("title")
        .field("country_residence")
        .field("country_citizenship");

    if matches!(viewer, Viewer::Provider | Viewer::Admin) {
        query = query
            .field("user.email AS email")
            .field("phone")
            .field("links")
            .field("birth_day");
    }
    if viewer == Viewer::Admin {
        query = query.field("admin_mark");
    }
    query
}

fn project_rooted_query(viewer: Viewer) -> QueryBuilder {
    let mut query = QueryBuilder::select("project")
        .field("record::id(artist) AS id")
        .field("artist.artist_name AS artist_name")
        .field("artist.first_name AS first_name")
        .field("artist.last_name AS last_name")
        .field("artist.bio AS bio")
        .field("artist.statement AS statement")
        .field("artist.themes AS themes")
        .field("artist.languages AS languages")
        .field("artist.industries AS industries")
        .field("artist.title AS title")
        .field("artist.country_residence AS country_residence")
        .field("artist.country_citizenship AS country_citizenship")
        .field("title AS project_title")
        .field("description AS project_description")
        .field("reach AS project_reach")
        .field("budget AS project_budget");

    if matches!(viewer, Viewer::Provider | Viewer::Admin) {
        query = query
            .field("artist.user.email AS email")
            .field("artist.phone AS phone")
            .field("artist.links AS links")
            .field("artist.birth_day AS birth_day");
    }
    if viewer == Viewer::Admin {
        query = query.field("artist.admin_mark AS admin_mark");
    }
    query
}
