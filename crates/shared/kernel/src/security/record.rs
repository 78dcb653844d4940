use std::borrow::Cow;

#[atelier_derive::app_error]
pub enum RecordGuardError {
    #[error("Record validation error{}: {message}", fmt_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Utilities for safe record handling and ID validation.
#[derive(Debug)]
pub struct RecordGuard;

impl RecordGuard {
    /// Validates a client-supplied record ID against a specific table and
    /// returns the bare key.
    ///
    /// Prevents "ID spoofing" where a caller provides an ID from a
    /// different table (e.g., providing a `system:config` ID to a `user`
    /// endpoint). Bare keys pass through unchanged; prefixed IDs must
    /// match the expected table.
    ///
    /// # Errors
    /// Returns an error if the ID's table prefix does not match
    /// `expected_table` or the key part is empty.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, RecordGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id_ref = id.as_ref();
        let table_ref = expected_table.as_ref();

        let key = match id_ref.split_once(':') {
            Some((table, key)) => {
                if table != table_ref {
                    return Err(RecordGuardError::Validation {
                        message: format!("Expected '{table_ref}', got '{table}'").into(),
                        context: Some("ID table mismatch".into()),
                    });
                }
                key
            },
            None => id_ref,
        };

        if key.is_empty() {
            return Err(RecordGuardError::Validation {
                message: id_ref.to_owned().into(),
                context: Some("Empty record key".into()),
            });
        }

        Ok(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_verification() {
        // Correct table prefix is stripped
        assert_eq!(RecordGuard::verify("user:123", "user").unwrap(), "123");

        // Bare keys pass through
        assert_eq!(RecordGuard::verify("123", "user").unwrap(), "123");

        // Malicious mismatch
        assert!(RecordGuard::verify("system:config", "user").is_err());

        // Empty key
        assert!(RecordGuard::verify("user:", "user").is_err());
    }
}
