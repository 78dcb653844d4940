use std::borrow::Cow;

/// A specialized [`EventBusError`] enum of this crate.
#[atelier_derive::app_error]
pub enum EventBusError {
    /// A channel of a different kind was already registered for the event type.
    #[error("Channel kind mismatch{}: {message}", fmt_context(context))]
    KindMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The stored sender could not be downcast to the requested event type.
    #[error("Channel type mismatch{}: {message}", fmt_context(context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Queue channels hand out their receiver exactly once.
    #[error("Receiver already taken{}: {message}", fmt_context(context))]
    ReceiverTaken { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Zero-capacity channels are not allowed.
    #[error("Invalid channel capacity{}: {message}", fmt_context(context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal event bus error{}: {message}", fmt_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
