use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

pub const MAX_INVITE_MESSAGE_LENGTH: usize = 255;
pub const MAX_INVITE_SUBJECT_LENGTH: usize = 255;

/// Persisted opportunity invite for a registered artist.
#[derive(Debug, Clone, SurrealValue)]
pub struct InviteRow {
    pub id: String,
    pub artist: String,
    pub opportunity: String,
    pub message: String,
    pub status: String,
}

/// Registration invitation for a (possibly unregistered) artist email.
#[derive(Debug, Clone, SurrealValue)]
pub struct ArtistInviteRow {
    pub id: String,
    pub email: String,
    pub oauth_external_id: Option<String>,
    pub created_by_artist: bool,
    pub sent_at: Option<i64>,
}

/// Per-opportunity message queued for an unregistered artist.
#[derive(Debug, Clone, SurrealValue)]
pub struct UnregisteredInviteRow {
    pub id: String,
    pub artist_invite: String,
    pub email: String,
    pub opportunity: String,
    pub message: String,
}

// --- payloads ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArtistInviteEntry {
    pub artist_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Batch of invites for one opportunity, addressed to registered artists.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchArtistInvites {
    #[serde(default)]
    pub message: String,
    pub invites: Vec<ArtistInviteEntry>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OpportunityInviteEntry {
    pub opportunity_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Batch of invites for one artist across several own opportunities.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchOpportunityInvites {
    #[serde(default)]
    pub message: String,
    pub invites: Vec<OpportunityInviteEntry>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnregisteredInviteEntry {
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// Batch of registration invites for unregistered artists, tied to one
/// opportunity. Entry-level subject/message fall back to the batch ones.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchUnregisteredInvites {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    pub invites: Vec<UnregisteredInviteEntry>,
}

/// Public self-service registration invitation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelfInviteRequest {
    pub email: String,
}

// --- responses ---

/// Artist-side invite with listing context.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyInviteHit {
    pub id: String,
    pub message: String,
    pub status: String,
    pub opportunity: String,
    pub opportunity_title: String,
    pub opportunity_kind: String,
    pub application_deadline: String,
    pub organization_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyInvitesResponse {
    pub invites: Vec<MyInviteHit>,
}

/// Provider-side invite with applicant context.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInviteHit {
    pub id: String,
    pub message: String,
    pub status: String,
    pub artist: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnregisteredInviteHit {
    pub id: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInvitesResponse {
    pub invites: Vec<ProviderInviteHit>,
    pub unregistered: Vec<UnregisteredInviteHit>,
    pub application_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub notified: usize,
}
