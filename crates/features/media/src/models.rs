use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Persisted attachment metadata; bytes live in the storage engine under
/// the owner's namespace.
#[derive(Debug, Clone, SurrealValue)]
pub struct AttachmentRow {
    pub id: String,
    pub owner: String,
    pub file_name: String,
    pub content_type: String,
    pub length: i64,
}

/// Embedded reference carried inside opportunity/application/project/news
/// records. The optional label is the caller-defined attachment kind
/// ("portfolio", "budget", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

pub const MAX_ATTACHMENT_LABEL_LENGTH: usize = 40;

impl AttachmentRef {
    /// IDs present in `before` but absent from `after`; the files an
    /// update has to delete.
    #[must_use]
    pub fn removed_ids(before: &[Self], after: &[Self]) -> Vec<String> {
        before
            .iter()
            .filter(|old| !after.iter().any(|new| new.id == old.id))
            .map(|old| old.id.clone())
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub length: i64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    /// Set to `attachment` to force a download disposition.
    pub mode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aref(id: &str) -> AttachmentRef {
        AttachmentRef {
            id: id.to_owned(),
            file_name: format!("{id}.pdf"),
            content_type: "application/pdf".to_owned(),
            label: None,
        }
    }

    #[test]
    fn removed_ids_diffs_by_id() {
        let before = vec![aref("a"), aref("b"), aref("c")];
        let after = vec![aref("b")];
        assert_eq!(AttachmentRef::removed_ids(&before, &after), vec!["a", "c"]);
    }

    #[test]
    fn identical_sets_remove_nothing() {
        let set = vec![aref("a")];
        assert!(AttachmentRef::removed_ids(&set, &set).is_empty());
        assert!(AttachmentRef::removed_ids(&[], &set).is_empty());
    }
}
