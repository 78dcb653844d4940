//! Convenience re-exports for slice and app crates.

pub use crate::config::load_config;
pub use crate::safe_nanoid;
pub use crate::security::RecordGuard;
pub use crate::server::{ApiState, ApiStateBuilder, ApiStateError};
pub use atelier_domain as domain;
