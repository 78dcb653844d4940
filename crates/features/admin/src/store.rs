use crate::error::{AdminError, AdminErrorExt};
use crate::models::{Breakdown, UserInviteSummary, UserSummary, UsersFilter};
use atelier_database::{Database, QueryBuilder};
use atelier_kernel::safe_nanoid;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use fxhash::FxHashMap;
use surrealdb::types::SurrealValue;

pub(crate) const USERS_PER_PAGE: u64 = 12;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: i64,
}

/// Administration persistence: user listings, invitation rows, and the
/// dashboard aggregates.
#[derive(Debug, Clone)]
pub struct AdminStore {
    db: Database,
}

impl AdminStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_user_invite(
        &self,
        email: &str,
        organization_name: &str,
        subject: Option<&str>,
        message: Option<&str>,
        roles: &[String],
    ) -> Result<String, AdminError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE type::thing('user_invite', $id) SET email = $email, \
                 organization_name = $organization, subject = $subject, message = $message, \
                 roles = $roles;",
            )
            .bind(("id", id.clone()))
            .bind(("email", email.to_owned()))
            .bind(("organization", organization_name.to_owned()))
            .bind(("subject", subject.map(str::to_owned)))
            .bind(("message", message.map(str::to_owned)))
            .bind(("roles", roles.to_vec()))
            .await
            .context("Creating user invite")?;
        Ok(id)
    }

    pub async fn list_user_invites(&self) -> Result<Vec<UserInviteSummary>, AdminError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, email, organization_name, roles, \
                 time::unix(created_at) AS created_at FROM user_invite ORDER BY created_at DESC;",
            )
            .await
            .context("Listing user invites")?
            .take::<Vec<UserInviteSummary>>(0)
            .context("Parsing user invites")
    }

    /// Paged, filtered account listing.
    pub async fn list_users(
        &self,
        filter: &UsersFilter,
    ) -> Result<(u64, Vec<UserSummary>), AdminError> {
        let query = users_query(filter);

        let total = self.db.run_count(&query).await?;
        let users = self
            .db
            .run(&query)
            .await?
            .take::<Vec<UserSummary>>(0)
            .context("Parsing users")?;

        Ok((total.div_ceil(USERS_PER_PAGE), users))
    }

    /// Locks or unlocks the user owning an artist profile.
    pub async fn artist_user_id(&self, artist_id: &str) -> Result<Option<String>, AdminError> {
        #[derive(Debug, SurrealValue)]
        struct UserRef {
            user: String,
        }

        let row = self
            .db
            .query("SELECT record::id(user) AS user FROM ONLY type::thing('artist', $id);")
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Loading artist owner")?
            .take::<Option<UserRef>>(0)
            .context("Parsing artist owner")?;
        Ok(row.map(|r| r.user))
    }

    pub async fn set_admin_mark(&self, artist_id: &str, mark: &str) -> Result<(), AdminError> {
        self.db
            .query("UPDATE type::thing('artist', $id) SET admin_mark = $mark;")
            .bind(("id", artist_id.to_owned()))
            .bind(("mark", mark.to_owned()))
            .await
            .context("Setting admin mark")?;
        Ok(())
    }

    // --- dashboards ---

    pub async fn artist_count(&self) -> Result<i64, AdminError> {
        self.count("SELECT count() AS total FROM artist WHERE user.locked = false GROUP ALL;")
            .await
    }

    pub async fn visible_project_count(&self) -> Result<i64, AdminError> {
        self.count(
            "SELECT count() AS total FROM project WHERE banned = false AND hidden = false \
             AND moderation = 'approved' AND artist.moderation = 'approved' \
             AND artist.user.locked = false GROUP ALL;",
        )
        .await
    }

    pub async fn open_application_count(&self) -> Result<i64, AdminError> {
        self.count(
            "SELECT count() AS total FROM application \
             WHERE status IN ['sent', 'shortlisted', 'viewlater'] \
             AND opportunity.banned = false AND opportunity.provider.user.locked = false \
             AND artist.moderation = 'approved' AND artist.user.locked = false \
             AND (project = NONE OR (project.moderation = 'approved' AND project.banned = false)) \
             GROUP ALL;",
        )
        .await
    }

    pub async fn submitted_application_count(&self) -> Result<i64, AdminError> {
        self.count(
            "SELECT count() AS total FROM application WHERE status != 'new' GROUP ALL;",
        )
        .await
    }

    /// Industry breakdown. Industries are arrays, so the fold happens
    /// here instead of in the query.
    pub async fn artists_by_industry(&self) -> Result<Vec<Breakdown>, AdminError> {
        #[derive(Debug, SurrealValue)]
        struct IndustriesRow {
            industries: Vec<String>,
        }

        let rows = self
            .db
            .query(
                "SELECT industries FROM artist WHERE user.locked = false \
                 AND moderation = 'approved';",
            )
            .await
            .context("Loading industries")?
            .take::<Vec<IndustriesRow>>(0)
            .context("Parsing industries")?;

        let mut counts: FxHashMap<String, i64> = FxHashMap::default();
        for row in rows {
            for industry in row.industries {
                *counts.entry(industry).or_default() += 1;
            }
        }

        let mut breakdown: Vec<Breakdown> =
            counts.into_iter().map(|(key, value)| Breakdown { key, value }).collect();
        breakdown.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(breakdown)
    }

    pub async fn artists_by_country(&self) -> Result<Vec<Breakdown>, AdminError> {
        self.db
            .query(
                "SELECT country_residence AS key, count() AS value FROM artist \
                 WHERE user.locked = false AND moderation = 'approved' \
                 AND country_residence != 'none' \
                 GROUP BY country_residence ORDER BY key;",
            )
            .await
            .context("Loading country breakdown")?
            .take::<Vec<Breakdown>>(0)
            .context("Parsing country breakdown")
    }

    pub async fn artists_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AdminError> {
        let row = self
            .db
            .query(
                "SELECT count() AS total FROM artist \
                 WHERE created_at >= $start AND created_at < $end GROUP ALL;",
            )
            .bind(("start", surrealdb::types::Datetime::from(start)))
            .bind(("end", surrealdb::types::Datetime::from(end)))
            .await
            .context("Counting signups")?
            .take::<Option<CountRow>>(0)
            .context("Parsing signup count")?;
        Ok(row.map_or(0, |r| r.total))
    }

    pub async fn provider_count(&self) -> Result<i64, AdminError> {
        self.count("SELECT count() AS total FROM provider WHERE user.locked = false GROUP ALL;")
            .await
    }

    pub async fn live_opportunity_count(&self) -> Result<i64, AdminError> {
        let row = self
            .db
            .query(
                "SELECT count() AS total FROM opportunity WHERE banned = false \
                 AND visibility IN ['all', 'invited'] AND provider.user.locked = false \
                 AND application_deadline >= $today GROUP ALL;",
            )
            .bind(("today", Utc::now().format("%Y-%m-%d").to_string()))
            .await
            .context("Counting live opportunities")?
            .take::<Option<CountRow>>(0)
            .context("Parsing live opportunity count")?;
        Ok(row.map_or(0, |r| r.total))
    }

    pub async fn opportunities_by_kind(&self) -> Result<Vec<Breakdown>, AdminError> {
        self.db
            .query(
                "SELECT kind AS key, count() AS value FROM opportunity WHERE banned = false \
                 AND visibility IN ['all', 'invited'] AND provider.user.locked = false \
                 AND application_deadline >= $today GROUP BY kind ORDER BY key;",
            )
            .bind(("today", Utc::now().format("%Y-%m-%d").to_string()))
            .await
            .context("Loading kind breakdown")?
            .take::<Vec<Breakdown>>(0)
            .context("Parsing kind breakdown")
    }

    pub async fn outstanding_provider_invites(&self) -> Result<i64, AdminError> {
        self.count(
            "SELECT count() AS total FROM user_invite WHERE roles CONTAINS 'provider' GROUP ALL;",
        )
        .await
    }

    async fn count(&self, statement: &str) -> Result<i64, AdminError> {
        let row = self
            .db
            .query(statement)
            .await
            .context("Counting rows")?
            .take::<Option<CountRow>>(0)
            .context("Parsing count")?;
        Ok(row.map_or(0, |r| r.total))
    }
}

/// Month boundaries for the signup trend cards.
#[must_use]
pub fn month_bounds(now: DateTime<Utc>, months_back: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let mut year = now.year();
    let mut month = i64::from(now.month()) - i64::from(months_back);
    while month < 1 {
        month += 12;
        year -= 1;
    }

    let month = u32::try_from(month).unwrap_or(1);
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single().unwrap_or(now);

    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single().unwrap_or(now);

    (start, end)
}

fn users_query(filter: &UsersFilter) -> QueryBuilder {
    let mut query = QueryBuilder::select("user")
        .field("record::id(id) AS id")
        .field("username")
        .field("email")
        .field("roles")
        .field("locked");

    if let Some(username) = filter.username.as_deref().filter(|v| !v.is_empty()) {
        query = query.filter("username = $username").bind("username", username);
    }
    if let Some(email) = filter.email.as_deref().filter(|v| !v.is_empty()) {
        query = query.filter("email = $email").bind("email", email);
    }
    if let Some(role) = filter.role.as_deref().filter(|v| !v.is_empty()) {
        query = query.filter("roles CONTAINS $role").bind("role", role);
    }
    if let Some(locked) = filter.locked {
        query = query.filter("locked = $locked").bind("locked", locked);
    }

    query.order("id DESC").page(filter.page.unwrap_or(1).max(1), USERS_PER_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_query_composes_filters() {
        let filter = UsersFilter {
            role: Some("provider".into()),
            locked: Some(false),
            ..Default::default()
        };
        let query = users_query(&filter);
        let sql = query.build();

        assert!(sql.contains("roles CONTAINS $role"));
        assert!(sql.contains("locked = $locked"));
        assert!(!sql.contains("$username"));
        assert!(sql.contains("LIMIT 12"));
    }

    #[test]
    fn month_bounds_cover_the_calendar_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap();

        let (start, end) = month_bounds(now, 0);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());

        let (start, end) = month_bounds(now, 1);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_bounds_wrap_the_year() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let (start, end) = month_bounds(now, 1);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }
}
