use crate::error::{MediaError, MediaErrorExt};
use crate::models::AttachmentRow;
use atelier_database::Database;
use atelier_kernel::safe_nanoid;
use atelier_storage::Storage;
use tracing::warn;

const ATTACHMENT_FIELDS: &str = "record::id(id) AS id, owner, file_name, content_type, length";

/// Attachment persistence: metadata rows plus namespaced payload files.
#[derive(Debug, Clone)]
pub struct MediaStore {
    db: Database,
    storage: Storage,
}

impl MediaStore {
    #[must_use]
    pub const fn new(db: Database, storage: Storage) -> Self {
        Self { db, storage }
    }

    /// Stores the payload under the owner's namespace and records its
    /// metadata.
    pub async fn save(
        &self,
        owner: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<AttachmentRow, MediaError> {
        let id = safe_nanoid!();

        self.storage.namespace(owner)?.write(&id, bytes).await?;

        let row = AttachmentRow {
            id: id.clone(),
            owner: owner.to_owned(),
            file_name: file_name.to_owned(),
            content_type: content_type.to_owned(),
            length: i64::try_from(bytes.len()).unwrap_or(i64::MAX),
        };

        self.db
            .query(
                "CREATE type::thing('attachment', $id) SET owner = $owner, \
                 file_name = $file_name, content_type = $content_type, length = $length;",
            )
            .bind(("id", id))
            .bind(("owner", row.owner.clone()))
            .bind(("file_name", row.file_name.clone()))
            .bind(("content_type", row.content_type.clone()))
            .bind(("length", row.length))
            .await
            .context("Recording attachment")?;

        Ok(row)
    }

    /// Loads metadata and payload for a stored attachment.
    pub async fn load(&self, id: &str) -> Result<(AttachmentRow, Vec<u8>), MediaError> {
        let row = self.find(id).await?.ok_or(MediaError::NotFound {
            message: "attachment not found".into(),
            context: None,
        })?;

        let bytes = self.storage.namespace(&row.owner)?.read(&row.id).await?;
        Ok((row, bytes))
    }

    pub async fn find(&self, id: &str) -> Result<Option<AttachmentRow>, MediaError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {ATTACHMENT_FIELDS} FROM attachment \
                 WHERE id = type::thing('attachment', $id) LIMIT 1;"
            ))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading attachment")?
            .take::<Vec<AttachmentRow>>(0)
            .context("Parsing attachment")?;
        Ok(rows.into_iter().next())
    }

    /// Deletes attachments that belong to `owner`; foreign IDs are
    /// skipped. Returns the number of files actually removed.
    pub async fn delete_owned(&self, owner: &str, ids: &[String]) -> Result<usize, MediaError> {
        let mut removed = 0;

        for id in ids {
            let Some(row) = self.find(id).await? else { continue };
            if row.owner != owner {
                warn!(attachment = %id, owner = %owner, "Skipping foreign attachment on delete");
                continue;
            }

            match self.storage.namespace(&row.owner)?.delete(&row.id).await {
                Ok(()) => {},
                // Metadata without payload is still worth cleaning up.
                Err(atelier_storage::StorageError::FileNotFound { .. }) => {
                    warn!(attachment = %id, "Attachment payload already missing");
                },
                Err(e) => return Err(e.into()),
            }

            self.db
                .query("DELETE type::thing('attachment', $id);")
                .bind(("id", id.clone()))
                .await
                .context("Deleting attachment record")?;

            removed += 1;
        }

        Ok(removed)
    }
}
