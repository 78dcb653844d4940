//! Field rules for account payloads.

use crate::error::IdentityError;

pub const MIN_PASSWORD_LENGTH: usize = 12;
pub const MAX_PASSWORD_LENGTH: usize = 30;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MAX_EMAIL_LENGTH: usize = 255;

pub fn username(value: &str) -> Result<(), IdentityError> {
    let len = value.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(IdentityError::Validation {
            message: format!(
                "username: must be {MIN_USERNAME_LENGTH} to {MAX_USERNAME_LENGTH} characters"
            )
            .into(),
            context: None,
        });
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), IdentityError> {
    let len = value.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(IdentityError::Validation {
            message: format!(
                "password: must be {MIN_PASSWORD_LENGTH} to {MAX_PASSWORD_LENGTH} characters"
            )
            .into(),
            context: None,
        });
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), IdentityError> {
    if value.is_empty() || value.len() > MAX_EMAIL_LENGTH {
        return Err(IdentityError::Validation {
            message: format!("email: must be 1 to {MAX_EMAIL_LENGTH} characters").into(),
            context: None,
        });
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err(IdentityError::Validation {
            message: "email: invalid address".into(),
            context: None,
        });
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || value.contains(' ') {
        return Err(IdentityError::Validation {
            message: "email: invalid address".into(),
            context: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(username("abc").is_ok());
        assert!(username("ab").is_err());
        assert!(username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn password_bounds() {
        assert!(password("twelve chars").is_ok());
        assert!(password("short").is_err());
        assert!(password(&"x".repeat(31)).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("a@b.org").is_ok());
        assert!(email("not-an-email").is_err());
        assert!(email("a@b").is_err());
        assert!(email("a b@c.org").is_err());
        assert!(email("").is_err());
    }
}
