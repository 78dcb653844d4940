//! Background worker draining the outbound email queue.
//!
//! Slices publish [`OutboundEmail`] events; this single consumer owns the
//! SMTP transport. Delivery failures are logged and dropped, never
//! retried into a request path.

use anyhow::{Context, Result};
use atelier::domain::email::OutboundEmail;
use atelier_event_bus::EventBus;
use atelier_mailer::Mailer;
use tracing::{info, warn};

/// Queue depth before publishers start seeing back-pressure errors.
const MAIL_QUEUE_CAPACITY: usize = 256;

pub(crate) fn spawn_mail_worker(events: &EventBus, mailer: Mailer) -> Result<()> {
    let mut inbox = events
        .subscribe_queue::<OutboundEmail>(MAIL_QUEUE_CAPACITY)
        .context("Mail queue already claimed")?;

    tokio::spawn(async move {
        info!("Mail worker started");
        while let Some(email) = inbox.recv().await {
            if let Err(e) = mailer.send(&email.to, &email.subject, email.body.clone()).await {
                warn!(to = %email.to, error = %e, "Outbound email failed");
            }
        }
        info!("Mail worker stopped: queue closed");
    });

    Ok(())
}
