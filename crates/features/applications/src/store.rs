use crate::error::{ApplicationError, ApplicationErrorExt};
use crate::models::{
    ApplicationPayload, ApplicationRow, MyApplicationHit, MyApplicationsFilter,
    ProviderApplicationHit, ProviderApplicationsFilter,
};
use atelier_database::{Database, QueryBuilder};
use atelier_domain::status::{ApplicationStatus, InviteStatus};
use atelier_kernel::safe_nanoid;
use surrealdb::types::SurrealValue;

pub(crate) const PROVIDER_APPLICATIONS_PER_PAGE: u64 = 12;

const APPLICATION_FIELDS: &str = "record::id(id) AS id, record::id(artist) AS artist, \
     record::id(opportunity) AS opportunity, \
     IF project = NONE THEN NONE ELSE record::id(project) END AS project, \
     message, attachments, status";

/// Application persistence and the invite-status synchronization around
/// the lifecycle operations.
#[derive(Debug, Clone)]
pub struct ApplicationStore {
    db: Database,
}

impl ApplicationStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        artist_id: &str,
        opportunity_id: &str,
        payload: &ApplicationPayload,
    ) -> Result<String, ApplicationError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE type::thing('application', $id) SET \
                 artist = type::thing('artist', $artist), \
                 opportunity = type::thing('opportunity', $opportunity), \
                 project = IF $project = NONE THEN NONE ELSE type::thing('project', $project) END, \
                 message = $message, attachments = $attachments, status = 'new';",
            )
            .bind(("id", id.clone()))
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("project", payload.project_id.clone()))
            .bind(("message", payload.message.clone()))
            .bind(("attachments", payload.attachments.clone()))
            .await
            .context("Creating application")?;
        Ok(id)
    }

    pub async fn find_owned(
        &self,
        application_id: &str,
        artist_id: &str,
    ) -> Result<ApplicationRow, ApplicationError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {APPLICATION_FIELDS} FROM application \
                 WHERE id = type::thing('application', $id) \
                 AND artist = type::thing('artist', $artist) LIMIT 1;"
            ))
            .bind(("id", application_id.to_owned()))
            .bind(("artist", artist_id.to_owned()))
            .await
            .context("Loading application")?
            .take::<Vec<ApplicationRow>>(0)
            .context("Parsing application")?;

        rows.into_iter().next().ok_or(ApplicationError::NotFound {
            message: "application not found".into(),
            context: None,
        })
    }

    /// Loads an application belonging to one of the provider's listings.
    pub async fn find_for_provider(
        &self,
        application_id: &str,
        provider_id: &str,
    ) -> Result<ApplicationRow, ApplicationError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {APPLICATION_FIELDS} FROM application \
                 WHERE id = type::thing('application', $id) \
                 AND opportunity.provider = type::thing('provider', $provider) LIMIT 1;"
            ))
            .bind(("id", application_id.to_owned()))
            .bind(("provider", provider_id.to_owned()))
            .await
            .context("Loading application for provider")?
            .take::<Vec<ApplicationRow>>(0)
            .context("Parsing application")?;

        rows.into_iter().next().ok_or(ApplicationError::NotFound {
            message: "application not found".into(),
            context: None,
        })
    }

    pub async fn update_content(
        &self,
        application_id: &str,
        payload: &ApplicationPayload,
    ) -> Result<(), ApplicationError> {
        self.db
            .query(
                "UPDATE type::thing('application', $id) SET message = $message, \
                 attachments = $attachments, \
                 project = IF $project = NONE THEN NONE ELSE type::thing('project', $project) END, \
                 updated_at = time::now();",
            )
            .bind(("id", application_id.to_owned()))
            .bind(("message", payload.message.clone()))
            .bind(("attachments", payload.attachments.clone()))
            .bind(("project", payload.project_id.clone()))
            .await
            .context("Updating application")?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), ApplicationError> {
        self.db
            .query(
                "UPDATE type::thing('application', $id) SET status = $status, \
                 updated_at = time::now();",
            )
            .bind(("id", application_id.to_owned()))
            .bind(("status", status.to_string()))
            .await
            .context("Updating application status")?;
        Ok(())
    }

    pub async fn delete(&self, application_id: &str) -> Result<(), ApplicationError> {
        self.db
            .query("DELETE type::thing('application', $id);")
            .bind(("id", application_id.to_owned()))
            .await
            .context("Deleting application")?;
        Ok(())
    }

    /// A live (non-rejected) application already exists for the same
    /// artist, listing, and project combination.
    pub async fn duplicate_exists(
        &self,
        artist_id: &str,
        opportunity_id: &str,
        project_id: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<bool, ApplicationError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM application \
                 WHERE artist = type::thing('artist', $artist) \
                 AND opportunity = type::thing('opportunity', $opportunity) \
                 AND (IF $project = NONE THEN project = NONE ELSE project = type::thing('project', $project) END) \
                 AND status != 'rejected' \
                 AND (IF $exclude = NONE THEN true ELSE id != type::thing('application', $exclude) END) \
                 GROUP ALL;",
            )
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("project", project_id.map(str::to_owned)))
            .bind(("exclude", exclude_id.map(str::to_owned)))
            .await
            .context("Checking for duplicate application")?
            .take::<Option<CountRow>>(0)
            .context("Parsing duplicate count")?;

        Ok(row.is_some_and(|r| r.total > 0))
    }

    /// Whether the artist still has an open application on the listing,
    /// other than the one being withdrawn.
    pub async fn open_application_remains(
        &self,
        artist_id: &str,
        opportunity_id: &str,
        exclude_id: &str,
    ) -> Result<bool, ApplicationError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM application \
                 WHERE artist = type::thing('artist', $artist) \
                 AND opportunity = type::thing('opportunity', $opportunity) \
                 AND id != type::thing('application', $exclude) \
                 AND status IN ['sent', 'shortlisted', 'viewlater'] GROUP ALL;",
            )
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("exclude", exclude_id.to_owned()))
            .await
            .context("Counting open applications")?
            .take::<Option<CountRow>>(0)
            .context("Parsing open application count")?;

        Ok(row.is_some_and(|r| r.total > 0))
    }

    /// Moves the artist's invites on the listing between statuses; used
    /// to mark them accepted on send and pending again on withdrawal.
    pub async fn sync_invites(
        &self,
        artist_id: &str,
        opportunity_id: &str,
        from: Option<InviteStatus>,
        to: InviteStatus,
    ) -> Result<(), ApplicationError> {
        let condition = from.map_or(String::new(), |f| format!(" AND status = '{f}'"));
        self.db
            .query(format!(
                "UPDATE invite SET status = $to WHERE artist = type::thing('artist', $artist) \
                 AND opportunity = type::thing('opportunity', $opportunity){condition};"
            ))
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("to", to.to_string()))
            .await
            .context("Synchronizing invites")?;
        Ok(())
    }

    /// Artist-side listing with opportunity context.
    pub async fn my_applications(
        &self,
        artist_id: &str,
        filter: &MyApplicationsFilter,
    ) -> Result<Vec<MyApplicationHit>, ApplicationError> {
        let mut query = QueryBuilder::select("application")
            .field("record::id(id) AS id")
            .field("status")
            .field("message")
            .field("attachments")
            .field("IF project = NONE THEN NONE ELSE record::id(project) END AS project")
            .field("record::id(opportunity) AS opportunity")
            .field("opportunity.title AS opportunity_title")
            .field("opportunity.kind AS opportunity_kind")
            .field("opportunity.application_deadline AS application_deadline")
            .field("opportunity.provider.organization_name AS organization_name")
            .filter("artist = type::thing('artist', $artist)")
            .bind("artist", artist_id)
            .filter("opportunity.banned = false")
            .filter("opportunity.provider.user.locked = false");

        if let Some(opportunity) = &filter.opportunity {
            query = query
                .filter("opportunity = type::thing('opportunity', $opportunity)")
                .bind("opportunity", opportunity.clone());
        }
        query = match filter.status {
            Some(status) => query.filter("status = $status").bind("status", status.to_string()),
            None => query.filter("status != 'rejected'"),
        };

        let query = query.order("id DESC");

        self.db
            .run(&query)
            .await?
            .take::<Vec<MyApplicationHit>>(0)
            .context("Parsing my applications")
    }

    /// Provider-side filtered search.
    pub async fn provider_applications(
        &self,
        provider_id: &str,
        filter: &ProviderApplicationsFilter,
        blocked: &[String],
    ) -> Result<(u64, Vec<ProviderApplicationHit>), ApplicationError> {
        let query = provider_search_query(provider_id, filter, blocked);

        let total = self.db.run_count(&query).await?;
        let hits = self
            .db
            .run(&query)
            .await?
            .take::<Vec<ProviderApplicationHit>>(0)
            .context("Parsing provider applications")?;

        Ok((total.div_ceil(PROVIDER_APPLICATIONS_PER_PAGE), hits))
    }

    /// The artist's attachable projects with no live application on the
    /// given listing.
    pub async fn projects_without_applications(
        &self,
        artist_id: &str,
        opportunity_id: &str,
    ) -> Result<Vec<AttachableProject>, ApplicationError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, title FROM project \
                 WHERE artist = type::thing('artist', $artist) \
                 AND hidden = false AND banned = false AND moderation = 'approved' \
                 AND id NOT IN (SELECT VALUE project FROM application \
                     WHERE artist = type::thing('artist', $artist) \
                     AND opportunity = type::thing('opportunity', $opportunity) \
                     AND project != NONE AND status != 'rejected');",
            )
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .await
            .context("Listing attachable projects")?
            .take::<Vec<AttachableProject>>(0)
            .context("Parsing attachable projects")
    }

    /// A project usable on an application: the artist's own, approved,
    /// visible.
    pub async fn project_attachable(
        &self,
        artist_id: &str,
        project_id: &str,
    ) -> Result<bool, ApplicationError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM project \
                 WHERE id = type::thing('project', $project) \
                 AND artist = type::thing('artist', $artist) \
                 AND banned = false AND moderation = 'approved' GROUP ALL;",
            )
            .bind(("artist", artist_id.to_owned()))
            .bind(("project", project_id.to_owned()))
            .await
            .context("Checking project attachability")?
            .take::<Option<CountRow>>(0)
            .context("Parsing project attachability")?;

        Ok(row.is_some_and(|r| r.total > 0))
    }
}

impl ApplicationStore {
    /// Contact address of the provider behind a listing.
    pub async fn provider_email(
        &self,
        opportunity_id: &str,
    ) -> Result<Option<String>, ApplicationError> {
        #[derive(Debug, SurrealValue)]
        struct EmailRow {
            email: Option<String>,
        }

        let row = self
            .db
            .query(
                "SELECT provider.user.email AS email \
                 FROM ONLY type::thing('opportunity', $id);",
            )
            .bind(("id", opportunity_id.to_owned()))
            .await
            .context("Loading provider email")?
            .take::<Option<EmailRow>>(0)
            .context("Parsing provider email")?;

        Ok(row.and_then(|r| r.email))
    }

    /// Sending requires a moderation-approved artist profile.
    pub async fn artist_approved(&self, artist_id: &str) -> Result<bool, ApplicationError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM artist \
                 WHERE id = type::thing('artist', $id) AND moderation = 'approved' GROUP ALL;",
            )
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Checking artist approval")?
            .take::<Option<CountRow>>(0)
            .context("Parsing artist approval")?;

        Ok(row.is_some_and(|r| r.total > 0))
    }
}

#[derive(Debug, Clone, serde::Serialize, SurrealValue, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachableProject {
    pub id: String,
    pub title: String,
}

/// Assembles the provider-side application search. Draft and
/// artist-archived applications never surface; shortlisted rows sort
/// first.
pub fn provider_search_query(
    provider_id: &str,
    filter: &ProviderApplicationsFilter,
    blocked: &[String],
) -> QueryBuilder {
    let mut query = QueryBuilder::select("application")
        .field("record::id(id) AS id")
        .field("status")
        .field("message")
        .field("attachments")
        .field("record::id(artist) AS artist")
        .field("record::id(opportunity) AS opportunity")
        .field("artist.first_name AS applicant_first_name")
        .field("artist.last_name AS applicant_last_name")
        .field("artist.phone AS applicant_phone")
        .field("artist.country_residence AS applicant_country_residence")
        .field("artist.links AS applicant_links")
        .field("artist.user.email AS applicant_email")
        .field("project.title AS project_title")
        .field("project.description AS project_description")
        .field("project.reach AS project_reach")
        .field("(status = 'shortlisted') AS shortlisted_first")
        .filter("opportunity.provider = type::thing('provider', $provider)")
        .bind("provider", provider_id)
        .filter("artist.moderation = 'approved'")
        .filter("artist.user.locked = false")
        .order("shortlisted_first DESC");

    if let Some(opportunities) = filter.opportunity.as_ref().filter(|v| !v.is_empty()) {
        query = query
            .filter("record::id(opportunity) IN $opportunities")
            .bind("opportunities", opportunities.clone());
    }

    query = match filter.status.as_ref().filter(|v| !v.is_empty()) {
        Some(statuses) => query
            .filter("status IN $statuses")
            .bind(
                "statuses",
                statuses.iter().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .filter("status NOT IN ['new', 'archived_by_artist']"),
        None => query.filter("status NOT IN ['new', 'archived', 'rejected', 'archived_by_artist']"),
    };

    if let Some(applicant) = filter.applicant.as_deref().filter(|t| t.len() >= 3) {
        query = query
            .filter("string::contains(string::lowercase(artist.search_text), $applicant)")
            .bind("applicant", applicant.to_lowercase());
    }
    if let Some(message) = filter.message.as_deref().filter(|t| t.len() >= 3) {
        query = query
            .filter("string::contains(string::lowercase(message), $message_text)")
            .bind("message_text", message.to_lowercase());
    }

    // Project constraints: when filtering by project text the project is
    // mandatory; otherwise project-less applications stay visible.
    if let Some(project) = filter.project.as_deref().filter(|t| t.len() >= 3) {
        query = query
            .filter(
                "(project != NONE AND project.banned = false AND project.moderation = 'approved' \
                 AND string::contains(string::lowercase(project.search_text), $project_text))",
            )
            .bind("project_text", project.to_lowercase());
    } else {
        query = query.filter(
            "(project = NONE OR (project.banned = false AND project.moderation = 'approved'))",
        );
    }

    if !filter.show_blocked && !blocked.is_empty() {
        query = query
            .filter("record::id(artist) NOT IN $blocked")
            .bind("blocked", blocked.to_vec());
    }

    query
        .order("id DESC")
        .page(filter.page.unwrap_or(1).max(1), PROVIDER_APPLICATIONS_PER_PAGE)
}
