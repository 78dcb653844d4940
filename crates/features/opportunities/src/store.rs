use crate::error::{OpportunityError, OpportunityErrorExt};
use crate::models::{InviteRelation, OpportunityFilter, OpportunityHit, OpportunityPayload, OpportunityRow};
use atelier_database::{Database, QueryBuilder};
use atelier_kernel::safe_nanoid;
use chrono::Utc;

pub(crate) const OPPORTUNITIES_PER_PAGE: u64 = 6;

const OPPORTUNITY_FIELDS: &str = "record::id(id) AS id, record::id(provider) AS provider, \
     title, description, kind, visibility, banned, application_deadline, response_deadline, \
     legal_statuses, min_age, max_age, genders, industries, country_residence, \
     country_citizenship, location_description, themes, theme_description, min_grant_amount, \
     max_grant_amount, min_residency_weeks, max_residency_weeks, residency_offerings, \
     residency_offering_description, min_award_amount, max_award_amount, award_special_access, \
     attachments";

/// Who is searching; drives visibility rules and the invite projection.
#[derive(Debug, Clone, Default)]
pub struct SearchViewer {
    pub artist_id: Option<String>,
    pub is_admin: bool,
}

/// Opportunity persistence and search.
#[derive(Debug, Clone)]
pub struct OpportunityStore {
    db: Database,
}

impl OpportunityStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        provider_id: &str,
        payload: &OpportunityPayload,
    ) -> Result<String, OpportunityError> {
        let id = safe_nanoid!();
        self.write(&id, Some(provider_id), payload, "CREATE").await?;
        Ok(id)
    }

    pub async fn update(
        &self,
        opportunity_id: &str,
        payload: &OpportunityPayload,
    ) -> Result<(), OpportunityError> {
        self.write(opportunity_id, None, payload, "UPDATE").await
    }

    async fn write(
        &self,
        id: &str,
        provider_id: Option<&str>,
        payload: &OpportunityPayload,
        verb: &str,
    ) -> Result<(), OpportunityError> {
        let provider_clause = if provider_id.is_some() {
            "provider = type::thing('provider', $provider), banned = false,"
        } else {
            ""
        };

        let mut query = self
            .db
            .query(format!(
                "{verb} type::thing('opportunity', $id) SET {provider_clause} \
                 title = $title, description = $description, kind = $kind, \
                 visibility = $visibility, application_deadline = $deadline, \
                 response_deadline = $response_deadline, legal_statuses = $legal_statuses, \
                 min_age = $min_age, max_age = $max_age, genders = $genders, \
                 industries = $industries, country_residence = $country_residence, \
                 country_citizenship = $country_citizenship, \
                 location_description = $location_description, themes = $themes, \
                 theme_description = $theme_description, min_grant_amount = $min_grant, \
                 max_grant_amount = $max_grant, min_residency_weeks = $min_weeks, \
                 max_residency_weeks = $max_weeks, residency_offerings = $offerings, \
                 residency_offering_description = $offering_description, \
                 min_award_amount = $min_award, max_award_amount = $max_award, \
                 award_special_access = $special_access, attachments = $attachments, \
                 search_text = $search_text, updated_at = time::now();"
            ))
            .bind(("id", id.to_owned()))
            .bind(("title", payload.title.trim().to_owned()))
            .bind(("description", payload.description.trim().to_owned()))
            .bind(("kind", payload.kind.to_string()))
            .bind(("visibility", payload.visibility.to_string()))
            .bind(("deadline", payload.application_deadline.clone()))
            .bind(("response_deadline", payload.response_deadline.clone()))
            .bind(("legal_statuses", to_strings(&payload.legal_statuses)))
            .bind(("min_age", payload.min_age))
            .bind(("max_age", payload.max_age))
            .bind(("genders", to_strings(&payload.genders)))
            .bind(("industries", to_strings(&payload.industries)))
            .bind(("country_residence", to_strings(&payload.country_residence)))
            .bind(("country_citizenship", to_strings(&payload.country_citizenship)))
            .bind(("location_description", payload.location_description.clone()))
            .bind(("themes", to_strings(&payload.themes)))
            .bind(("theme_description", payload.theme_description.clone()))
            .bind(("min_grant", payload.min_grant_amount))
            .bind(("max_grant", payload.max_grant_amount))
            .bind(("min_weeks", payload.min_residency_weeks))
            .bind(("max_weeks", payload.max_residency_weeks))
            .bind(("offerings", to_strings(&payload.residency_offerings)))
            .bind(("offering_description", payload.residency_offering_description.clone()))
            .bind(("min_award", payload.min_award_amount))
            .bind(("max_award", payload.max_award_amount))
            .bind(("special_access", payload.award_special_access.clone()))
            .bind(("attachments", payload.attachments.clone()))
            .bind((
                "search_text",
                format!("{} {}", payload.title.trim(), payload.description.trim()),
            ));

        if let Some(provider) = provider_id {
            query = query.bind(("provider", provider.to_owned()));
        }

        query.await.context("Writing opportunity")?;
        Ok(())
    }

    pub async fn delete(&self, opportunity_id: &str) -> Result<(), OpportunityError> {
        self.db
            .query("DELETE type::thing('opportunity', $id);")
            .bind(("id", opportunity_id.to_owned()))
            .await
            .context("Deleting opportunity")?;
        Ok(())
    }

    /// Loads a listing and verifies provider ownership.
    pub async fn find_owned(
        &self,
        opportunity_id: &str,
        provider_id: &str,
    ) -> Result<OpportunityRow, OpportunityError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {OPPORTUNITY_FIELDS} FROM opportunity \
                 WHERE id = type::thing('opportunity', $id) \
                 AND provider = type::thing('provider', $provider) LIMIT 1;"
            ))
            .bind(("id", opportunity_id.to_owned()))
            .bind(("provider", provider_id.to_owned()))
            .await
            .context("Loading opportunity")?
            .take::<Vec<OpportunityRow>>(0)
            .context("Parsing opportunity")?;

        rows.into_iter().next().ok_or(OpportunityError::NotFound {
            message: "opportunity not found".into(),
            context: None,
        })
    }

    pub async fn list_mine(
        &self,
        provider_id: &str,
    ) -> Result<Vec<OpportunityRow>, OpportunityError> {
        self.db
            .query(format!(
                "SELECT {OPPORTUNITY_FIELDS} FROM opportunity \
                 WHERE provider = type::thing('provider', $provider) ORDER BY created_at DESC;"
            ))
            .bind(("provider", provider_id.to_owned()))
            .await
            .context("Listing opportunities")?
            .take::<Vec<OpportunityRow>>(0)
            .context("Parsing opportunities")
    }

    /// Artist-visible fetch honoring visibility and invites; locked
    /// providers hide their listings.
    pub async fn find_available(
        &self,
        opportunity_id: &str,
        artist_id: Option<&str>,
    ) -> Result<Option<OpportunityRow>, OpportunityError> {
        let visibility = artist_id.map_or_else(
            || "visibility = 'all'".to_owned(),
            |_| {
                "(visibility = 'all' OR (visibility = 'invited' AND \
                 id IN (SELECT VALUE opportunity FROM invite \
                 WHERE artist = type::thing('artist', $artist))))"
                    .to_owned()
            },
        );

        let mut query = self
            .db
            .query(format!(
                "SELECT {OPPORTUNITY_FIELDS} FROM opportunity \
                 WHERE id = type::thing('opportunity', $id) \
                 AND provider.user.locked = false AND {visibility} LIMIT 1;"
            ))
            .bind(("id", opportunity_id.to_owned()));
        if let Some(artist) = artist_id {
            query = query.bind(("artist", artist.to_owned()));
        }

        let rows = query
            .await
            .context("Loading available opportunity")?
            .take::<Vec<OpportunityRow>>(0)
            .context("Parsing available opportunity")?;
        Ok(rows.into_iter().next())
    }

    /// Runs the composed search and its count.
    pub async fn search(
        &self,
        filter: &OpportunityFilter,
        viewer: &SearchViewer,
    ) -> Result<(u64, Vec<OpportunityHit>), OpportunityError> {
        let query = search_query(filter, viewer);

        let total = self.db.run_count(&query).await?;
        let hits = self
            .db
            .run(&query)
            .await?
            .take::<Vec<OpportunityHit>>(0)
            .context("Parsing opportunity search hits")?;

        Ok((total.div_ceil(OPPORTUNITIES_PER_PAGE), hits))
    }
}

fn to_strings<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Assembles the dynamic listing search. Eligibility filters treat empty
/// arrays and absent bounds as "no restriction", and restricted rows rank
/// above unrestricted ones when the matching filter is active.
pub fn search_query(filter: &OpportunityFilter, viewer: &SearchViewer) -> QueryBuilder {
    let keyword = filter.keyword.as_deref().filter(|k| k.len() >= 3);

    let mut query = QueryBuilder::select("opportunity")
        .field("record::id(id) AS id")
        .field("title")
        .field("description")
        .field("kind")
        .field("visibility")
        .field("application_deadline")
        .field("response_deadline")
        .field("provider.organization_name AS organization_name")
        .field("min_grant_amount")
        .field("max_grant_amount")
        .field("min_residency_weeks")
        .field("max_residency_weeks")
        .field("residency_offerings")
        .field("min_award_amount")
        .field("max_award_amount")
        .field("legal_statuses")
        .field("min_age")
        .field("max_age")
        .field("genders")
        .field("industries")
        .field("country_residence")
        .field("country_citizenship")
        .field("themes")
        .field("location_description")
        .field("attachments");

    // Visibility: `all` for everyone, `invited` for admins and invited
    // artists, `nobody` only through direct provider access.
    query = if viewer.is_admin {
        query.filter("visibility IN ['all', 'invited']")
    } else if viewer.artist_id.is_some() {
        query
            .field(
                "(SELECT VALUE status FROM invite WHERE artist = type::thing('artist', $viewer) \
                 AND opportunity = $parent.id LIMIT 1)[0] AS invite_status",
            )
            .filter(
                "(visibility = 'all' OR (visibility = 'invited' AND \
                 id IN (SELECT VALUE opportunity FROM invite \
                 WHERE artist = type::thing('artist', $viewer))))",
            )
            .bind("viewer", viewer.artist_id.clone().unwrap_or_default())
    } else {
        query.filter("visibility = 'all'")
    };

    query = query
        .filter("provider.user.locked = false")
        .filter("banned = false")
        .filter("application_deadline >= $today")
        .bind("today", Utc::now().format("%Y-%m-%d").to_string());

    if let Some(keyword) = keyword {
        query = query
            .field("search::score(0) AS relevance")
            .field("(string::contains(string::lowercase(search_text), $keyword_lower)) AS exact_hit")
            .filter("search_text @0@ $keyword")
            .bind("keyword", keyword)
            .bind("keyword_lower", keyword.to_lowercase())
            .order("exact_hit DESC")
            .order("relevance DESC");
    }

    if let Some(kind) = filter.kind {
        query = query.filter("kind = $kind").bind("kind", kind.to_string());

        match kind {
            atelier_domain::status::OpportunityKind::Grant => {
                if let Some(grant_from) = filter.grant_from {
                    query = query
                        .filter("(max_grant_amount = NONE OR max_grant_amount >= $grant_from)")
                        .bind("grant_from", grant_from);
                }
                if let Some(grant_to) = filter.grant_to {
                    query = query
                        .filter("(min_grant_amount = NONE OR min_grant_amount <= $grant_to)")
                        .bind("grant_to", grant_to);
                }
                if filter.grant_from.is_some() || filter.grant_to.is_some() {
                    query = query
                        .field(
                            "(min_grant_amount != NONE OR max_grant_amount != NONE) AS amount_rank",
                        )
                        .order("amount_rank DESC");
                }
            },
            atelier_domain::status::OpportunityKind::Residency => {
                if let Some(weeks) = filter.residency_weeks {
                    query = query
                        .filter(
                            "(min_residency_weeks != NONE AND max_residency_weeks != NONE \
                             AND min_residency_weeks <= $weeks AND max_residency_weeks >= $weeks)",
                        )
                        .bind("weeks", weeks);
                }
                if let Some(offering) = filter.residency_offering {
                    query = query
                        .filter("$offering INSIDE residency_offerings")
                        .bind("offering", offering.to_string());
                }
            },
            atelier_domain::status::OpportunityKind::Award => {
                if let Some(award_from) = filter.award_from {
                    query = query
                        .filter("(max_award_amount = NONE OR max_award_amount >= $award_from)")
                        .bind("award_from", award_from);
                }
                if let Some(award_to) = filter.award_to {
                    query = query
                        .filter("(min_award_amount = NONE OR min_award_amount <= $award_to)")
                        .bind("award_to", award_to);
                }
                if filter.award_from.is_some() || filter.award_to.is_some() {
                    query = query
                        .field(
                            "(min_award_amount != NONE OR max_award_amount != NONE) AS amount_rank",
                        )
                        .order("amount_rank DESC");
                }
            },
            atelier_domain::status::OpportunityKind::Other => {},
        }
    }

    if let Some(legal_status) = filter.legal_status {
        query = query
            .field("(legal_statuses != []) AS legal_rank")
            .filter("(legal_statuses = [] OR $legal_status INSIDE legal_statuses)")
            .bind("legal_status", legal_status.to_string())
            .order("legal_rank DESC");
    }
    if let Some(age) = filter.age {
        query = query
            .field("(min_age != NONE OR max_age != NONE) AS age_rank")
            .filter("(min_age = NONE OR min_age <= $age)")
            .filter("(max_age = NONE OR max_age >= $age)")
            .bind("age", age)
            .order("age_rank DESC");
    }
    if let Some(gender) = filter.gender {
        query = query
            .field("(genders != []) AS gender_rank")
            .filter("(genders = [] OR $gender INSIDE genders)")
            .bind("gender", gender.to_string())
            .order("gender_rank DESC");
    }
    if let Some(industry) = filter.industry {
        query = query
            .field("(industries != []) AS industry_rank")
            .filter("(industries = [] OR $industry INSIDE industries)")
            .bind("industry", industry.to_string())
            .order("industry_rank DESC");
    }
    if let Some(country) = filter.country_residence {
        query = query
            .field("(country_residence != []) AS residence_rank")
            .filter("(country_residence = [] OR $residence INSIDE country_residence)")
            .bind("residence", country.to_string())
            .order("residence_rank DESC");
    }
    if let Some(country) = filter.country_citizenship {
        query = query
            .field("(country_citizenship != []) AS citizenship_rank")
            .filter("(country_citizenship = [] OR $citizenship INSIDE country_citizenship)")
            .bind("citizenship", country.to_string())
            .order("citizenship_rank DESC");
    }
    if let Some(theme) = filter.theme {
        query = query
            .field("(themes != []) AS theme_rank")
            .filter("(themes = [] OR $theme INSIDE themes)")
            .bind("theme", theme.to_string())
            .order("theme_rank DESC");
    }

    if let Some(deadline_from) = &filter.deadline_from {
        query = query
            .filter("application_deadline >= $deadline_from")
            .bind("deadline_from", deadline_from.clone());
    }
    if let Some(deadline_to) = &filter.deadline_to {
        query = query
            .filter("application_deadline <= $deadline_to")
            .bind("deadline_to", deadline_to.clone());
    }

    if viewer.artist_id.is_some() {
        match filter.invite {
            Some(InviteRelation::Invites) => {
                query = query.filter(
                    "id IN (SELECT VALUE opportunity FROM invite \
                     WHERE artist = type::thing('artist', $viewer) \
                     AND status IN ['pending', 'accepted'])",
                );
            },
            Some(InviteRelation::InProgress) => {
                query = query.filter(
                    "id IN (SELECT VALUE opportunity FROM invite \
                     WHERE artist = type::thing('artist', $viewer) AND status = 'accepted')",
                );
            },
            Some(InviteRelation::All) | None => {},
        }
    }

    query.order("id DESC").page(filter.page.unwrap_or(1).max(1), OPPORTUNITIES_PER_PAGE)
}
