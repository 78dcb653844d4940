//! Status vocabularies and the legality rules around them.
//!
//! These enums are stored as their snake_case string form; the transition
//! rules are pure functions so the slices that enforce them stay testable
//! without a database.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Moderation lifecycle shared by artist profiles and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Draft,
    OnModeration,
    Approved,
    Declined,
}

impl ModerationStatus {
    /// Whether a profile owner may submit this record for review.
    #[must_use]
    pub fn can_submit(self) -> bool {
        matches!(self, Self::Draft | Self::Declined)
    }

    /// Whether a moderator decision is a valid outcome for a queued record.
    #[must_use]
    pub fn is_decision(self) -> bool {
        matches!(self, Self::Approved | Self::Declined)
    }
}

/// Lifecycle of an artist's application against an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    Sent,
    Shortlisted,
    Viewlater,
    Rejected,
    Archived,
    ArchivedByArtist,
}

impl ApplicationStatus {
    /// Submitted and still in play from the provider's point of view.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Sent | Self::Shortlisted | Self::Viewlater)
    }

    /// Visible in the provider's application listing.
    #[must_use]
    pub fn provider_visible(self) -> bool {
        !matches!(self, Self::New | Self::ArchivedByArtist)
    }

    /// States an artist may archive from.
    #[must_use]
    pub fn artist_can_archive(self) -> bool {
        matches!(self, Self::New | Self::Sent | Self::Shortlisted | Self::Viewlater)
    }

    /// Provider-driven status change legality. Rejection goes through its
    /// own operation, and `new`/`archived_by_artist` never leave the
    /// artist's hands.
    #[must_use]
    pub fn provider_can_set(self, target: Self) -> bool {
        let from_ok = !matches!(self, Self::New | Self::Rejected | Self::ArchivedByArtist);
        let to_ok = matches!(
            target,
            Self::Sent | Self::Shortlisted | Self::Viewlater | Self::Archived
        );
        from_ok && to_ok
    }
}

/// Status of a provider-initiated opportunity invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Kind of the posted opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    Grant,
    Residency,
    Award,
    Other,
}

/// Who can discover an opportunity in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    All,
    Invited,
    Nobody,
}

/// Administrator annotation on artist profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdminMark {
    None,
    Starred,
    Flagged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn application_open_states() {
        assert!(ApplicationStatus::Sent.is_open());
        assert!(ApplicationStatus::Shortlisted.is_open());
        assert!(ApplicationStatus::Viewlater.is_open());
        assert!(!ApplicationStatus::New.is_open());
        assert!(!ApplicationStatus::Rejected.is_open());
        assert!(!ApplicationStatus::ArchivedByArtist.is_open());
    }

    #[test]
    fn provider_transitions() {
        use ApplicationStatus as S;

        assert!(S::Sent.provider_can_set(S::Shortlisted));
        assert!(S::Shortlisted.provider_can_set(S::Archived));
        assert!(S::Archived.provider_can_set(S::Sent));

        // The artist's drafts and withdrawals are off limits.
        assert!(!S::New.provider_can_set(S::Shortlisted));
        assert!(!S::ArchivedByArtist.provider_can_set(S::Sent));
        assert!(!S::Rejected.provider_can_set(S::Sent));

        // Rejection is not an assignable target.
        assert!(!S::Sent.provider_can_set(S::Rejected));
        assert!(!S::Sent.provider_can_set(S::New));
    }

    #[test]
    fn moderation_submission() {
        assert!(ModerationStatus::Draft.can_submit());
        assert!(ModerationStatus::Declined.can_submit());
        assert!(!ModerationStatus::OnModeration.can_submit());
        assert!(!ModerationStatus::Approved.can_submit());
    }

    #[test]
    fn string_round_trip() {
        assert_eq!(ApplicationStatus::ArchivedByArtist.to_string(), "archived_by_artist");
        assert_eq!(
            ApplicationStatus::from_str("archived_by_artist").unwrap(),
            ApplicationStatus::ArchivedByArtist
        );
        assert_eq!(ModerationStatus::OnModeration.to_string(), "on_moderation");
        assert_eq!(Visibility::from_str("invited").unwrap(), Visibility::Invited);
    }
}
