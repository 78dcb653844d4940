use crate::error::{ProjectError, ProjectErrorExt};
use crate::models::{ProjectPayload, ProjectRow};
use atelier_database::Database;
use atelier_domain::status::ModerationStatus;
use atelier_kernel::safe_nanoid;
use atelier_media::AttachmentRef;
use surrealdb::types::SurrealValue;

const PROJECT_FIELDS: &str = "record::id(id) AS id, record::id(artist) AS artist, title, \
     description, tags, link, budget, reach, exclusive_support, hidden, banned, attachments, \
     poster_image, moderation, moderation_comment";

/// Project persistence.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    db: Database,
}

impl ProjectStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        artist_id: &str,
        payload: &ProjectPayload,
    ) -> Result<String, ProjectError> {
        let id = safe_nanoid!();
        self.db
            .query(format!(
                "CREATE type::thing('project', $id) SET artist = type::thing('artist', $artist), \
                 title = $title, description = $description, tags = $tags, link = $link, \
                 budget = $budget, reach = $reach, exclusive_support = $exclusive, \
                 hidden = $hidden, banned = false, attachments = $attachments, \
                 poster_image = $poster, moderation = '{draft}', moderation_comment = '', \
                 moderator = NONE, search_text = $search_text;",
                draft = ModerationStatus::Draft,
            ))
            .bind(("id", id.clone()))
            .bind(("artist", artist_id.to_owned()))
            .bind(("title", payload.title.trim().to_owned()))
            .bind(("description", payload.description.trim().to_owned()))
            .bind(("tags", payload.tags.clone()))
            .bind(("link", payload.link.clone()))
            .bind(("budget", payload.budget))
            .bind(("reach", payload.reach))
            .bind(("exclusive", payload.exclusive_support))
            .bind(("hidden", payload.hidden))
            .bind(("attachments", payload.attachments.clone()))
            .bind(("poster", payload.poster_image.clone()))
            .bind(("search_text", search_text(payload)))
            .await
            .context("Creating project")?;
        Ok(id)
    }

    /// Applies an update and resets moderation to Draft.
    pub async fn update(
        &self,
        project_id: &str,
        payload: &ProjectPayload,
    ) -> Result<(), ProjectError> {
        self.db
            .query(format!(
                "UPDATE type::thing('project', $id) SET \
                 title = $title, description = $description, tags = $tags, link = $link, \
                 budget = $budget, reach = $reach, exclusive_support = $exclusive, \
                 hidden = $hidden, attachments = $attachments, poster_image = $poster, \
                 moderation = '{draft}', moderation_comment = '', \
                 search_text = $search_text, updated_at = time::now();",
                draft = ModerationStatus::Draft,
            ))
            .bind(("id", project_id.to_owned()))
            .bind(("title", payload.title.trim().to_owned()))
            .bind(("description", payload.description.trim().to_owned()))
            .bind(("tags", payload.tags.clone()))
            .bind(("link", payload.link.clone()))
            .bind(("budget", payload.budget))
            .bind(("reach", payload.reach))
            .bind(("exclusive", payload.exclusive_support))
            .bind(("hidden", payload.hidden))
            .bind(("attachments", payload.attachments.clone()))
            .bind(("poster", payload.poster_image.clone()))
            .bind(("search_text", search_text(payload)))
            .await
            .context("Updating project")?;
        Ok(())
    }

    pub async fn delete(&self, project_id: &str) -> Result<(), ProjectError> {
        self.db
            .query("DELETE type::thing('project', $id);")
            .bind(("id", project_id.to_owned()))
            .await
            .context("Deleting project")?;
        Ok(())
    }

    /// Loads a project and verifies ownership.
    pub async fn find_owned(
        &self,
        project_id: &str,
        artist_id: &str,
    ) -> Result<ProjectRow, ProjectError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {PROJECT_FIELDS} FROM project \
                 WHERE id = type::thing('project', $id) \
                 AND artist = type::thing('artist', $artist) LIMIT 1;"
            ))
            .bind(("id", project_id.to_owned()))
            .bind(("artist", artist_id.to_owned()))
            .await
            .context("Loading project")?
            .take::<Vec<ProjectRow>>(0)
            .context("Parsing project")?;

        rows.into_iter().next().ok_or(ProjectError::NotFound {
            message: "project not found".into(),
            context: None,
        })
    }

    pub async fn list_mine(&self, artist_id: &str) -> Result<Vec<ProjectRow>, ProjectError> {
        self.db
            .query(format!(
                "SELECT {PROJECT_FIELDS} FROM project \
                 WHERE artist = type::thing('artist', $artist) ORDER BY created_at DESC;"
            ))
            .bind(("artist", artist_id.to_owned()))
            .await
            .context("Listing projects")?
            .take::<Vec<ProjectRow>>(0)
            .context("Parsing projects")
    }

    /// Whether any non-rejected application references the project.
    pub async fn has_applications(&self, project_id: &str) -> Result<bool, ProjectError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM application \
                 WHERE project = type::thing('project', $id) AND status != 'rejected' GROUP ALL;",
            )
            .bind(("id", project_id.to_owned()))
            .await
            .context("Counting applications")?
            .take::<Option<CountRow>>(0)
            .context("Parsing application count")?;

        Ok(row.is_some_and(|r| r.total > 0))
    }

    /// Hands the project to the moderation queue.
    pub async fn submit_for_moderation(
        &self,
        project_id: &str,
        artist_id: &str,
    ) -> Result<(), ProjectError> {
        let project = self.find_owned(project_id, artist_id).await?;
        if !project.moderation_status().can_submit() {
            return Err(ProjectError::Conflict {
                message: "project is already under or past moderation".into(),
                context: None,
            });
        }

        self.db
            .query(format!(
                "UPDATE type::thing('project', $id) SET moderation = '{queued}', \
                 updated_at = time::now();",
                queued = ModerationStatus::OnModeration,
            ))
            .bind(("id", project_id.to_owned()))
            .await
            .context("Submitting project for moderation")?;
        Ok(())
    }
}

fn search_text(payload: &ProjectPayload) -> String {
    let mut text = format!("{} {}", payload.title.trim(), payload.description.trim());
    for tag in &payload.tags {
        text.push(' ');
        text.push_str(tag);
    }
    text
}

/// Attachment IDs a replacement payload leaves orphaned, poster image
/// included.
#[must_use]
pub fn orphaned_attachments(before: &ProjectRow, after: &ProjectPayload) -> Vec<String> {
    let mut removed = AttachmentRef::removed_ids(&before.attachments, &after.attachments);

    if let Some(old_poster) = &before.poster_image {
        let kept = after.poster_image.as_ref().is_some_and(|new| new.id == old_poster.id);
        if !kept {
            removed.push(old_poster.id.clone());
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aref(id: &str) -> AttachmentRef {
        AttachmentRef {
            id: id.into(),
            file_name: format!("{id}.png"),
            content_type: "image/png".into(),
            label: None,
        }
    }

    fn row(attachments: Vec<AttachmentRef>, poster: Option<AttachmentRef>) -> ProjectRow {
        ProjectRow {
            id: "p1".into(),
            artist: "a1".into(),
            title: "t".into(),
            description: "d".into(),
            tags: vec![],
            link: None,
            budget: 0,
            reach: 0,
            exclusive_support: false,
            hidden: false,
            banned: false,
            attachments,
            poster_image: poster,
            moderation: "draft".into(),
            moderation_comment: String::new(),
        }
    }

    fn payload(attachments: Vec<AttachmentRef>, poster: Option<AttachmentRef>) -> ProjectPayload {
        ProjectPayload {
            title: "t".into(),
            description: "d".into(),
            tags: vec![],
            link: None,
            budget: 0,
            reach: 0,
            exclusive_support: false,
            hidden: false,
            attachments,
            poster_image: poster,
        }
    }

    #[test]
    fn replaced_poster_is_orphaned() {
        let before = row(vec![aref("x")], Some(aref("old")));
        let after = payload(vec![aref("x")], Some(aref("new")));
        assert_eq!(orphaned_attachments(&before, &after), vec!["old"]);
    }

    #[test]
    fn kept_poster_survives() {
        let before = row(vec![], Some(aref("keep")));
        let after = payload(vec![], Some(aref("keep")));
        assert!(orphaned_attachments(&before, &after).is_empty());
    }

    #[test]
    fn dropped_attachments_and_poster_accumulate() {
        let before = row(vec![aref("a"), aref("b")], Some(aref("p")));
        let after = payload(vec![aref("b")], None);
        assert_eq!(orphaned_attachments(&before, &after), vec!["a", "p"]);
    }
}
