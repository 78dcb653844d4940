use std::borrow::Cow;

/// A specialized [`MailerError`] enum of this crate.
#[atelier_derive::app_error]
pub enum MailerError {
    /// Malformed sender or recipient address.
    #[error("Address error{}: {source}", fmt_context(context))]
    Address { source: lettre::address::AddressError, context: Option<Cow<'static, str>> },

    /// SMTP transport failures.
    #[error("SMTP transport error{}: {source}", fmt_context(context))]
    Transport {
        source: lettre::transport::smtp::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Message assembly failures.
    #[error("Message build error{}: {source}", fmt_context(context))]
    Build { source: lettre::error::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal mailer error{}: {message}", fmt_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
