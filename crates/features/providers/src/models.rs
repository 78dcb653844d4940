use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Persisted provider organization profile.
#[derive(Debug, Clone, SurrealValue)]
pub struct ProviderRow {
    pub id: String,
    pub user: String,
    pub organization_name: String,
    pub representative_name: String,
    pub website: Option<String>,
    pub information: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderProfilePayload {
    pub organization_name: String,
    pub representative_name: String,
    pub website: Option<String>,
    pub information: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderAccountSection {
    pub username: String,
    pub password: String,
}

/// Registration payload redeemed against an administrator invitation
/// carrying the provider role.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderRegistration {
    pub account: ProviderAccountSection,
    pub professional: ProviderProfilePayload,
}

/// Public request to become a provider; forwarded to the administrators
/// by email, nothing is persisted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderApplicationRequest {
    pub email: String,
    pub phone: Option<String>,
    pub representative_name: Option<String>,
    pub organization_name: Option<String>,
    pub information: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileResponse {
    pub id: String,
    pub organization_name: String,
    pub representative_name: String,
    pub website: Option<String>,
    pub information: String,
    pub phone: String,
}

impl From<ProviderRow> for ProviderProfileResponse {
    fn from(row: ProviderRow) -> Self {
        Self {
            id: row.id,
            organization_name: row.organization_name,
            representative_name: row.representative_name,
            website: row.website,
            information: row.information,
            phone: row.phone,
        }
    }
}

/// Card shown in the blocked-artists listing.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockedArtistCard {
    pub id: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockedArtistsResponse {
    pub artists: Vec<BlockedArtistCard>,
}
