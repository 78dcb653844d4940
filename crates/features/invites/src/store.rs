use crate::error::{InviteError, InviteErrorExt};
use crate::models::{
    ArtistInviteRow, InviteRow, MyInviteHit, ProviderInviteHit, UnregisteredInviteHit,
};
use atelier_database::Database;
use atelier_domain::status::InviteStatus;
use atelier_kernel::safe_nanoid;
use chrono::Utc;
use surrealdb::types::SurrealValue;

const INVITE_FIELDS: &str = "record::id(id) AS id, record::id(artist) AS artist, \
     record::id(opportunity) AS opportunity, message, status";

/// Invitation persistence: registered invites, registration invitations,
/// queued unregistered invites, and notification history.
#[derive(Debug, Clone)]
pub struct InviteStore {
    db: Database,
}

/// Candidate row for the deadline sweep.
#[derive(Debug, Clone, SurrealValue)]
pub struct SweepCandidate {
    pub id: String,
    pub email: Option<String>,
    pub title: String,
    pub application_deadline: String,
    /// Unix seconds of previous notices, unordered.
    pub notice_times: Vec<i64>,
}

impl InviteStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_invite(
        &self,
        artist_id: &str,
        opportunity_id: &str,
        message: &str,
    ) -> Result<String, InviteError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE type::thing('invite', $id) SET \
                 artist = type::thing('artist', $artist), \
                 opportunity = type::thing('opportunity', $opportunity), \
                 message = $message, status = 'pending';",
            )
            .bind(("id", id.clone()))
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("message", message.to_owned()))
            .await
            .context("Creating invite")?;
        Ok(id)
    }

    /// Artist-side listing: live opportunities from unlocked providers.
    pub async fn list_mine(&self, artist_id: &str) -> Result<Vec<MyInviteHit>, InviteError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, message, status, \
                 record::id(opportunity) AS opportunity, \
                 opportunity.title AS opportunity_title, \
                 opportunity.kind AS opportunity_kind, \
                 opportunity.application_deadline AS application_deadline, \
                 opportunity.provider.organization_name AS organization_name \
                 FROM invite WHERE artist = type::thing('artist', $artist) \
                 AND opportunity.banned = false \
                 AND opportunity.application_deadline >= $today \
                 AND opportunity.provider.user.locked = false \
                 ORDER BY id DESC;",
            )
            .bind(("artist", artist_id.to_owned()))
            .bind(("today", Utc::now().format("%Y-%m-%d").to_string()))
            .await
            .context("Listing artist invites")?
            .take::<Vec<MyInviteHit>>(0)
            .context("Parsing artist invites")
    }

    /// Moves the artist's invites on one listing between statuses.
    /// Returns the number of rows changed.
    pub async fn set_status_for_artist(
        &self,
        artist_id: &str,
        opportunity_id: &str,
        from: InviteStatus,
        to: InviteStatus,
    ) -> Result<usize, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct IdRow {
            id: String,
        }

        let rows = self
            .db
            .query(
                "UPDATE invite SET status = $to \
                 WHERE artist = type::thing('artist', $artist) \
                 AND opportunity = type::thing('opportunity', $opportunity) \
                 AND status = $from RETURN record::id(id) AS id;",
            )
            .bind(("artist", artist_id.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("from", from.to_string()))
            .bind(("to", to.to_string()))
            .await
            .context("Updating invite status")?
            .take::<Vec<IdRow>>(0)
            .context("Parsing updated invites")?;
        Ok(rows.len())
    }

    /// Loads an invite belonging to one of the provider's listings.
    pub async fn find_for_provider(
        &self,
        invite_id: &str,
        provider_id: &str,
    ) -> Result<Option<InviteRow>, InviteError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {INVITE_FIELDS} FROM invite \
                 WHERE id = type::thing('invite', $id) \
                 AND opportunity.provider = type::thing('provider', $provider) LIMIT 1;"
            ))
            .bind(("id", invite_id.to_owned()))
            .bind(("provider", provider_id.to_owned()))
            .await
            .context("Loading invite")?
            .take::<Vec<InviteRow>>(0)
            .context("Parsing invite")?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete_invite(&self, invite_id: &str) -> Result<(), InviteError> {
        self.db
            .query("DELETE type::thing('invite', $id);")
            .bind(("id", invite_id.to_owned()))
            .await
            .context("Deleting invite")?;
        Ok(())
    }

    /// Provider view of a listing's registered invites.
    pub async fn provider_invites(
        &self,
        opportunity_id: &str,
    ) -> Result<Vec<ProviderInviteHit>, InviteError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, message, status, \
                 record::id(artist) AS artist, artist.artist_name AS artist_name, \
                 artist.first_name AS first_name, artist.last_name AS last_name \
                 FROM invite WHERE opportunity = type::thing('opportunity', $opportunity) \
                 AND artist.user.locked = false AND artist.moderation = 'approved' \
                 ORDER BY created_at DESC;",
            )
            .bind(("opportunity", opportunity_id.to_owned()))
            .await
            .context("Listing provider invites")?
            .take::<Vec<ProviderInviteHit>>(0)
            .context("Parsing provider invites")
    }

    pub async fn unregistered_for_opportunity(
        &self,
        opportunity_id: &str,
    ) -> Result<Vec<UnregisteredInviteHit>, InviteError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, email, message FROM unregistered_invite \
                 WHERE opportunity = type::thing('opportunity', $opportunity) \
                 ORDER BY created_at DESC;",
            )
            .bind(("opportunity", opportunity_id.to_owned()))
            .await
            .context("Listing unregistered invites")?
            .take::<Vec<UnregisteredInviteHit>>(0)
            .context("Parsing unregistered invites")
    }

    pub async fn application_count(&self, opportunity_id: &str) -> Result<i64, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM application \
                 WHERE opportunity = type::thing('opportunity', $opportunity) GROUP ALL;",
            )
            .bind(("opportunity", opportunity_id.to_owned()))
            .await
            .context("Counting applications")?
            .take::<Option<CountRow>>(0)
            .context("Parsing application count")?;
        Ok(row.map_or(0, |r| r.total))
    }

    /// Emails (of the requested set) that already belong to artists.
    pub async fn emails_of_registered_artists(
        &self,
        emails: &[String],
    ) -> Result<Vec<String>, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct EmailRow {
            email: Option<String>,
        }

        let rows = self
            .db
            .query("SELECT user.email AS email FROM artist WHERE user.email IN $emails;")
            .bind(("emails", emails.to_vec()))
            .await
            .context("Checking registered emails")?
            .take::<Vec<EmailRow>>(0)
            .context("Parsing registered emails")?;

        Ok(rows.into_iter().filter_map(|r| r.email).collect())
    }

    /// Emails already queued for this opportunity.
    pub async fn emails_already_invited(
        &self,
        opportunity_id: &str,
        emails: &[String],
    ) -> Result<Vec<String>, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct EmailRow {
            email: String,
        }

        let rows = self
            .db
            .query(
                "SELECT email FROM unregistered_invite \
                 WHERE opportunity = type::thing('opportunity', $opportunity) \
                 AND email IN $emails;",
            )
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("emails", emails.to_vec()))
            .await
            .context("Checking queued emails")?
            .take::<Vec<EmailRow>>(0)
            .context("Parsing queued emails")?;

        Ok(rows.into_iter().map(|r| r.email).collect())
    }

    pub async fn find_artist_invite_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ArtistInviteRow>, InviteError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, oauth_external_id, created_by_artist, \
                 IF sent_at = NONE THEN NONE ELSE time::unix(sent_at) END AS sent_at \
                 FROM artist_invite WHERE email = $email LIMIT 1;",
            )
            .bind(("email", email.to_owned()))
            .await
            .context("Loading artist invite")?
            .take::<Vec<ArtistInviteRow>>(0)
            .context("Parsing artist invite")?;
        Ok(rows.into_iter().next())
    }

    /// Ensures a registration invitation exists for the email and queues
    /// the per-opportunity message. Returns the artist invite id.
    pub async fn queue_unregistered(
        &self,
        email: &str,
        opportunity_id: &str,
        message: &str,
    ) -> Result<String, InviteError> {
        let artist_invite = match self.find_artist_invite_by_email(email).await? {
            Some(existing) => existing.id,
            None => {
                let id = safe_nanoid!();
                self.db
                    .query(
                        "CREATE type::thing('artist_invite', $id) SET email = $email, \
                         oauth_external_id = NONE, created_by_artist = false, sent_at = time::now();",
                    )
                    .bind(("id", id.clone()))
                    .bind(("email", email.to_owned()))
                    .await
                    .context("Creating artist invite")?;
                id
            },
        };

        self.db
            .query(
                "CREATE type::thing('unregistered_invite', $id) SET \
                 artist_invite = type::thing('artist_invite', $invite), email = $email, \
                 opportunity = type::thing('opportunity', $opportunity), message = $message;",
            )
            .bind(("id", safe_nanoid!()))
            .bind(("invite", artist_invite.clone()))
            .bind(("email", email.to_owned()))
            .bind(("opportunity", opportunity_id.to_owned()))
            .bind(("message", message.to_owned()))
            .await
            .context("Queueing unregistered invite")?;

        Ok(artist_invite)
    }

    /// An unregistered invite on one of the provider's listings, plus how
    /// many sibling invites its registration invitation still carries and
    /// whether the invitation was self-created.
    pub async fn find_unregistered_for_provider(
        &self,
        id: &str,
        provider_id: &str,
    ) -> Result<Option<(UnregisteredDetail, i64)>, InviteError> {
        let rows = self
            .db
            .query(
                "SELECT record::id(id) AS id, email, \
                 record::id(artist_invite) AS artist_invite, \
                 artist_invite.created_by_artist AS created_by_artist \
                 FROM unregistered_invite WHERE id = type::thing('unregistered_invite', $id) \
                 AND opportunity.provider = type::thing('provider', $provider) LIMIT 1;",
            )
            .bind(("id", id.to_owned()))
            .bind(("provider", provider_id.to_owned()))
            .await
            .context("Loading unregistered invite")?
            .take::<Vec<UnregisteredDetail>>(0)
            .context("Parsing unregistered invite")?;

        let Some(detail) = rows.into_iter().next() else {
            return Ok(None);
        };

        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }
        let siblings = self
            .db
            .query(
                "SELECT count() AS total FROM unregistered_invite \
                 WHERE artist_invite = type::thing('artist_invite', $invite) GROUP ALL;",
            )
            .bind(("invite", detail.artist_invite.clone()))
            .await
            .context("Counting sibling invites")?
            .take::<Option<CountRow>>(0)
            .context("Parsing sibling count")?
            .map_or(0, |r| r.total);

        Ok(Some((detail, siblings)))
    }

    pub async fn delete_unregistered(&self, id: &str) -> Result<(), InviteError> {
        self.db
            .query("DELETE type::thing('unregistered_invite', $id);")
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting unregistered invite")?;
        Ok(())
    }

    pub async fn delete_artist_invite(&self, id: &str) -> Result<(), InviteError> {
        self.db
            .query(
                "DELETE unregistered_invite WHERE artist_invite = type::thing('artist_invite', $id);
                 DELETE type::thing('artist_invite', $id);",
            )
            .bind(("id", id.to_owned()))
            .await
            .context("Deleting artist invite")?;
        Ok(())
    }

    /// Self-service registration invitation with resend throttling.
    ///
    /// # Errors
    /// [`InviteError::Conflict`] for registered emails and running
    /// cooldowns.
    pub async fn self_invite(
        &self,
        email: &str,
        cooldown_seconds: i64,
    ) -> Result<String, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let registered = self
            .db
            .query("SELECT count() AS total FROM user WHERE email = $email GROUP ALL;")
            .bind(("email", email.to_owned()))
            .await
            .context("Checking for existing account")?
            .take::<Option<CountRow>>(0)
            .context("Parsing account check")?
            .is_some_and(|r| r.total > 0);
        if registered {
            return Err(InviteError::Conflict {
                message: "email: an account with this address already exists".into(),
                context: None,
            });
        }

        let invite_id = match self.find_artist_invite_by_email(email).await? {
            Some(existing) => {
                if let Some(sent_at) = existing.sent_at {
                    let elapsed = Utc::now().timestamp() - sent_at;
                    if elapsed < cooldown_seconds {
                        let remaining = cooldown_seconds - elapsed;
                        return Err(InviteError::Conflict {
                            message: format!("invitation already sent, retry in {remaining}s")
                                .into(),
                            context: None,
                        });
                    }
                }
                existing.id
            },
            None => {
                let id = safe_nanoid!();
                self.db
                    .query(
                        "CREATE type::thing('artist_invite', $id) SET email = $email, \
                         oauth_external_id = NONE, created_by_artist = true, sent_at = NONE;",
                    )
                    .bind(("id", id.clone()))
                    .bind(("email", email.to_owned()))
                    .await
                    .context("Creating self invite")?;
                id
            },
        };

        Ok(invite_id)
    }

    pub async fn mark_invite_sent(&self, invite_id: &str) -> Result<(), InviteError> {
        self.db
            .query("UPDATE type::thing('artist_invite', $id) SET sent_at = time::now();")
            .bind(("id", invite_id.to_owned()))
            .await
            .context("Marking invite sent")?;
        Ok(())
    }

    pub async fn artist_email(&self, artist_id: &str) -> Result<Option<String>, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct EmailRow {
            email: Option<String>,
        }

        let row = self
            .db
            .query("SELECT user.email AS email FROM ONLY type::thing('artist', $id);")
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Loading artist email")?
            .take::<Option<EmailRow>>(0)
            .context("Parsing artist email")?;
        Ok(row.and_then(|r| r.email))
    }

    pub async fn artist_approved(&self, artist_id: &str) -> Result<bool, InviteError> {
        #[derive(Debug, SurrealValue)]
        struct CountRow {
            total: i64,
        }

        let row = self
            .db
            .query(
                "SELECT count() AS total FROM artist \
                 WHERE id = type::thing('artist', $id) AND moderation = 'approved' \
                 AND user.locked = false GROUP ALL;",
            )
            .bind(("id", artist_id.to_owned()))
            .await
            .context("Checking artist approval")?
            .take::<Option<CountRow>>(0)
            .context("Parsing artist approval")?;
        Ok(row.is_some_and(|r| r.total > 0))
    }

    // --- deadline sweep ---

    /// Pending invites on live, visible listings held by active,
    /// approved artists, with their notification history.
    pub async fn sweep_candidates(&self) -> Result<Vec<SweepCandidate>, InviteError> {
        self.db
            .query(
                "SELECT record::id(id) AS id, artist.user.email AS email, \
                 opportunity.title AS title, \
                 opportunity.application_deadline AS application_deadline, \
                 (SELECT VALUE time::unix(created_at) FROM invite_notice \
                  WHERE invite = $parent.id) AS notice_times \
                 FROM invite WHERE status = 'pending' \
                 AND opportunity.banned = false \
                 AND opportunity.visibility != 'nobody' \
                 AND opportunity.application_deadline >= $today \
                 AND artist.active = true AND artist.moderation = 'approved';",
            )
            .bind(("today", Utc::now().format("%Y-%m-%d").to_string()))
            .await
            .context("Loading sweep candidates")?
            .take::<Vec<SweepCandidate>>(0)
            .context("Parsing sweep candidates")
    }

    pub async fn record_notice(&self, invite_id: &str) -> Result<(), InviteError> {
        self.db
            .query(
                "CREATE type::thing('invite_notice', $id) SET \
                 invite = type::thing('invite', $invite);",
            )
            .bind(("id", safe_nanoid!()))
            .bind(("invite", invite_id.to_owned()))
            .await
            .context("Recording notice")?;
        Ok(())
    }
}

#[derive(Debug, Clone, SurrealValue)]
pub struct UnregisteredDetail {
    pub id: String,
    pub email: String,
    pub artist_invite: String,
    pub created_by_artist: bool,
}
