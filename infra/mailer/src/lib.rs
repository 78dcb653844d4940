//! # Mailer
//!
//! Outbound SMTP delivery behind a fluent builder. Slices never talk to
//! SMTP directly; they publish `OutboundEmail` events and a single worker
//! drains the queue through this transport.
//!
//! ## Example
//!
//! ```rust,no_run
//! use atelier_mailer::Mailer;
//!
//! # async fn run() -> Result<(), atelier_mailer::MailerError> {
//! let mailer = Mailer::builder()
//!     .host("smtp.example.org")
//!     .port(465)
//!     .credentials("postmaster", "secret")
//!     .sender("Atelier <no-reply@example.org>")
//!     .tls(true)
//!     .build()?;
//!
//! mailer.send("artist@example.org", "Hello", "Plain text body").await?;
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::{MailerError, MailerErrorExt};

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

/// A thread-safe handle to the SMTP transport. Cheap to clone.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer").field("sender", &self.sender).finish_non_exhaustive()
    }
}

impl Mailer {
    /// Creates a new [`MailerBuilder`].
    pub fn builder() -> MailerBuilder {
        MailerBuilder::default()
    }

    /// Sends a plain-text message.
    ///
    /// # Errors
    /// * [`MailerError::Address`] when the recipient address is malformed.
    /// * [`MailerError::Transport`] when the SMTP server rejects the message.
    #[instrument(skip(self, body), fields(to = %to.as_ref(), subject = %subject.as_ref()))]
    pub async fn send(
        &self,
        to: impl AsRef<str>,
        subject: impl AsRef<str>,
        body: impl Into<String>,
    ) -> Result<(), MailerError> {
        let recipient: Mailbox =
            to.as_ref().parse::<Mailbox>().context(format!("Parsing recipient {}", to.as_ref()))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject.as_ref())
            .body(body.into())
            .context("Assembling message")?;

        self.transport.send(message).await.context("Submitting to SMTP relay")?;

        info!("Message submitted");
        Ok(())
    }

    /// Probes the SMTP relay, mirroring the connection check the server
    /// performs at startup.
    ///
    /// # Errors
    /// Returns [`MailerError::Transport`] when the relay is unreachable.
    pub async fn verify(&self) -> Result<(), MailerError> {
        let ok = self.transport.test_connection().await.context("Probing SMTP relay")?;
        if !ok {
            return Err(MailerError::Internal {
                message: "SMTP relay refused the connection probe".into(),
                context: None,
            });
        }
        Ok(())
    }
}

/// A fluent builder for configuring the SMTP transport.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct MailerBuilder {
    host: Option<String>,
    port: Option<u16>,
    credentials: Option<(String, String)>,
    sender: Option<String>,
    tls: bool,
}

impl MailerBuilder {
    /// Sets the SMTP relay host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Overrides the relay port.
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the SMTP credentials. Skipped entirely when the username is empty.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the sender mailbox, e.g. `Atelier <no-reply@example.org>`.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Enables implicit TLS. Without it the transport speaks plain SMTP,
    /// which is only suitable for local relays.
    pub const fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// Consumes the builder and assembles the transport.
    ///
    /// # Errors
    /// * [`MailerError::Internal`] when host or sender are missing.
    /// * [`MailerError::Address`] when the sender mailbox is malformed.
    /// * [`MailerError::Transport`] when TLS parameters are rejected.
    pub fn build(self) -> Result<Mailer, MailerError> {
        let host = self.host.ok_or(MailerError::Internal {
            message: "SMTP host is required".into(),
            context: None,
        })?;
        let sender: Mailbox = self
            .sender
            .ok_or(MailerError::Internal {
                message: "Sender mailbox is required".into(),
                context: None,
            })?
            .parse::<Mailbox>()
            .context("Parsing sender mailbox")?;

        let mut builder = if self.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
                .context("Configuring TLS relay")?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
        };

        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some((username, password)) = self.credentials.filter(|(u, _)| !u.is_empty()) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Mailer { transport: builder.build(), sender })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_host_and_sender() {
        let err = Mailer::builder().sender("a <a@b.c>").build().unwrap_err();
        assert!(matches!(err, MailerError::Internal { .. }));

        let err = Mailer::builder().host("localhost").build().unwrap_err();
        assert!(matches!(err, MailerError::Internal { .. }));
    }

    #[test]
    fn malformed_sender_is_an_address_error() {
        let err = Mailer::builder().host("localhost").sender("not a mailbox").build().unwrap_err();
        assert!(matches!(err, MailerError::Address { .. }));
    }

    #[test]
    fn plain_transport_builds_without_credentials() {
        let mailer = Mailer::builder()
            .host("localhost")
            .port(2525)
            .sender("Atelier <no-reply@atelier.local>")
            .build();
        assert!(mailer.is_ok());
    }
}
