pub mod record;

pub use record::{RecordGuard, RecordGuardError};
