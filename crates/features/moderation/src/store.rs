use crate::error::{ModerationError, ModerationErrorExt};
use crate::models::{
    ArtistDossier, ProjectDossier, QueueOrder, QueuedArtist, QueuedProject,
};
use atelier_database::{Database, QueryBuilder};
use atelier_domain::status::ModerationStatus;

pub(crate) const QUEUE_PER_PAGE: u64 = 6;

/// Review queue and decision persistence.
#[derive(Debug, Clone)]
pub struct ModerationStore {
    db: Database,
}

impl ModerationStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn queued_artists(
        &self,
        order: QueueOrder,
        page: u64,
    ) -> Result<(u64, Vec<QueuedArtist>), ModerationError> {
        let query = queue_query(
            "artist",
            &["artist_name", "first_name", "last_name", "statement"],
            order,
            page,
        );

        let total = self.db.run_count(&query).await?;
        let rows = self
            .db
            .run(&query)
            .await?
            .take::<Vec<QueuedArtist>>(0)
            .context("Parsing queued artists")?;

        Ok((total.div_ceil(QUEUE_PER_PAGE), rows))
    }

    pub async fn queued_projects(
        &self,
        order: QueueOrder,
        page: u64,
    ) -> Result<(u64, Vec<QueuedProject>), ModerationError> {
        let query = queue_query("project", &["title", "description"], order, page);

        let total = self.db.run_count(&query).await?;
        let rows = self
            .db
            .run(&query)
            .await?
            .take::<Vec<QueuedProject>>(0)
            .context("Parsing queued projects")?;

        Ok((total.div_ceil(QUEUE_PER_PAGE), rows))
    }

    pub async fn artist_dossier(
        &self,
        artist_id: &str,
    ) -> Result<Option<ArtistDossier>, ModerationError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, artist_name, first_name, last_name, phone, \
                 birth_day, country_residence, country_citizenship, languages, industries, \
                 title, themes, bio, statement, links, moderation, moderation_comment \
                 FROM artist WHERE id = type::thing('artist', $id) LIMIT 1;",
            )
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Loading artist dossier")?
            .take::<Vec<ArtistDossier>>(0)
            .context("Parsing artist dossier")?;
        Ok(rows.into_iter().next())
    }

    pub async fn project_dossier(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectDossier>, ModerationError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, title, description, tags, link, budget, reach, \
                 banned, attachments, poster_image, moderation, moderation_comment \
                 FROM project WHERE id = type::thing('project', $id) LIMIT 1;",
            )
            .bind(("id", project_id.to_owned()))
            .await
            .context("Loading project dossier")?
            .take::<Vec<ProjectDossier>>(0)
            .context("Parsing project dossier")?;
        Ok(rows.into_iter().next())
    }

    /// Applies a moderation decision, recording the deciding moderator.
    pub async fn decide(
        &self,
        table: &str,
        record_id: &str,
        status: ModerationStatus,
        comment: &str,
        moderator_user_id: &str,
    ) -> Result<(), ModerationError> {
        self.db
            .query(format!(
                "UPDATE type::thing('{table}', $id) SET moderation = $status, \
                 moderation_comment = $comment, moderator = $moderator, \
                 updated_at = time::now();"
            ))
            .bind(("id", record_id.to_owned()))
            .bind(("status", status.to_string()))
            .bind(("comment", comment.to_owned()))
            .bind(("moderator", moderator_user_id.to_owned()))
            .await
            .context("Recording moderation decision")?;
        Ok(())
    }
}

fn queue_query(table: &str, fields: &[&str], order: QueueOrder, page: u64) -> QueryBuilder {
    let mut query = QueryBuilder::select(table).field("record::id(id) AS id");
    for field in fields {
        query = query.field(*field);
    }

    let direction = match order {
        QueueOrder::Asc => "ASC",
        QueueOrder::Desc => "DESC",
    };

    query
        .field("time::unix(updated_at) AS updated_at")
        .filter("moderation = $queued")
        .bind("queued", ModerationStatus::OnModeration.to_string())
        .order(format!("updated_at {direction}"))
        .page(page.max(1), QUEUE_PER_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_query_orders_and_pages() {
        let query = queue_query("artist", &["statement"], QueueOrder::Asc, 2);
        let sql = query.build();

        assert!(sql.contains("FROM artist"));
        assert!(sql.contains("moderation = $queued"));
        assert!(sql.contains("ORDER BY updated_at ASC"));
        assert!(sql.contains("LIMIT 6 START 6"));
    }

    #[test]
    fn queue_query_defaults_to_newest_first() {
        let query = queue_query("project", &["title"], QueueOrder::Desc, 1);
        assert!(query.build().contains("ORDER BY updated_at DESC"));
    }
}
