//! Outbound email message, published on the event bus and drained by the
//! mail worker.

/// A fully rendered notification ready for SMTP submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    #[must_use]
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self { to: to.into(), subject: subject.into(), body: body.into() }
    }
}
