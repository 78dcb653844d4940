use crate::error::{ProviderError, ProviderErrorExt};
use crate::models::{BlockedArtistCard, ProviderProfilePayload, ProviderRow};
use atelier_database::Database;
use atelier_kernel::safe_nanoid;
use surrealdb::types::SurrealValue;

const PROVIDER_FIELDS: &str = "record::id(id) AS id, record::id(user) AS user, \
     organization_name, representative_name, website, information, phone";

/// Provider profile persistence, including the blocked-artists set.
#[derive(Debug, Clone)]
pub struct ProviderStore {
    db: Database,
}

impl ProviderStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: &str,
        payload: &ProviderProfilePayload,
    ) -> Result<String, ProviderError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE type::thing('provider', $id) SET user = type::thing('user', $user), \
                 organization_name = $organization, representative_name = $representative, \
                 website = $website, information = $information, phone = $phone, \
                 blocked_artists = [];",
            )
            .bind(("id", id.clone()))
            .bind(("user", user_id.to_owned()))
            .bind(("organization", payload.organization_name.clone()))
            .bind(("representative", payload.representative_name.clone()))
            .bind(("website", payload.website.clone()))
            .bind(("information", payload.information.clone()))
            .bind(("phone", payload.phone.clone()))
            .await
            .context("Creating provider")?;
        Ok(id)
    }

    pub async fn update(
        &self,
        provider_id: &str,
        payload: &ProviderProfilePayload,
    ) -> Result<(), ProviderError> {
        self.db
            .query(
                "UPDATE type::thing('provider', $id) SET \
                 organization_name = $organization, representative_name = $representative, \
                 website = $website, information = $information, phone = $phone, \
                 updated_at = time::now();",
            )
            .bind(("id", provider_id.to_owned()))
            .bind(("organization", payload.organization_name.clone()))
            .bind(("representative", payload.representative_name.clone()))
            .bind(("website", payload.website.clone()))
            .bind(("information", payload.information.clone()))
            .bind(("phone", payload.phone.clone()))
            .await
            .context("Updating provider")?;
        Ok(())
    }

    pub async fn find_by_id(&self, provider_id: &str) -> Result<Option<ProviderRow>, ProviderError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {PROVIDER_FIELDS} FROM provider \
                 WHERE id = type::thing('provider', $id) LIMIT 1;"
            ))
            .bind(("id", provider_id.to_owned()))
            .await
            .context("Loading provider")?
            .take::<Vec<ProviderRow>>(0)
            .context("Parsing provider")?;
        Ok(rows.into_iter().next())
    }

    /// Adds an artist to the provider's block list (idempotent).
    pub async fn block_artist(
        &self,
        provider_id: &str,
        artist_id: &str,
    ) -> Result<(), ProviderError> {
        self.db
            .query(
                "UPDATE type::thing('provider', $id) SET blocked_artists = \
                 array::union(blocked_artists, [type::thing('artist', $artist)]);",
            )
            .bind(("id", provider_id.to_owned()))
            .bind(("artist", artist_id.to_owned()))
            .await
            .context("Blocking artist")?;
        Ok(())
    }

    pub async fn unblock_artist(
        &self,
        provider_id: &str,
        artist_id: &str,
    ) -> Result<(), ProviderError> {
        self.db
            .query(
                "UPDATE type::thing('provider', $id) SET blocked_artists -= \
                 type::thing('artist', $artist);",
            )
            .bind(("id", provider_id.to_owned()))
            .bind(("artist", artist_id.to_owned()))
            .await
            .context("Unblocking artist")?;
        Ok(())
    }

    /// Blocked artist ids, for search exclusion and listing.
    pub async fn blocked_artist_ids(&self, provider_id: &str) -> Result<Vec<String>, ProviderError> {
        #[derive(Debug, SurrealValue)]
        struct IdsRow {
            ids: Vec<String>,
        }

        let row = self
            .db
            .query(
                "SELECT blocked_artists.map(|$a| record::id($a)) AS ids \
                 FROM ONLY type::thing('provider', $id);",
            )
            .bind(("id", provider_id.to_owned()))
            .await
            .context("Loading blocked artist ids")?
            .take::<Option<IdsRow>>(0)
            .context("Parsing blocked artist ids")?;

        Ok(row.map(|r| r.ids).unwrap_or_default())
    }

    /// Blocked artist cards with contact email.
    pub async fn blocked_artists(
        &self,
        provider_id: &str,
    ) -> Result<Vec<BlockedArtistCard>, ProviderError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, artist_name, first_name, last_name, \
                 user.email AS email FROM artist \
                 WHERE id INSIDE (SELECT VALUE blocked_artists FROM ONLY type::thing('provider', $id));",
            )
            .bind(("id", provider_id.to_owned()))
            .await
            .context("Loading blocked artists")?
            .take::<Vec<BlockedArtistCard>>(0)
            .context("Parsing blocked artists")
    }
}
