//! Field rules for provider payloads.

use crate::error::ProviderError;
use crate::models::{ProviderApplicationRequest, ProviderProfilePayload};

pub const MAX_ORGANIZATION_NAME_LENGTH: usize = 255;
pub const MAX_REPRESENTATIVE_NAME_LENGTH: usize = 255;
pub const MAX_WEBSITE_LENGTH: usize = 255;
pub const MAX_PHONE_LENGTH: usize = 32;
pub const MAX_INFORMATION_LENGTH: usize = 1000;

fn required(field: &'static str, value: &str) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        return Err(ProviderError::Validation {
            message: format!("{field}: required").into(),
            context: None,
        });
    }
    Ok(())
}

fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ProviderError> {
    if value.chars().count() > max {
        return Err(ProviderError::Validation {
            message: format!("{field}: must be at most {max} characters").into(),
            context: None,
        });
    }
    Ok(())
}

pub fn profile(payload: &ProviderProfilePayload) -> Result<(), ProviderError> {
    required("organizationName", &payload.organization_name)?;
    max_len("organizationName", &payload.organization_name, MAX_ORGANIZATION_NAME_LENGTH)?;
    required("representativeName", &payload.representative_name)?;
    max_len("representativeName", &payload.representative_name, MAX_REPRESENTATIVE_NAME_LENGTH)?;
    if let Some(website) = &payload.website {
        max_len("website", website, MAX_WEBSITE_LENGTH)?;
    }
    required("information", &payload.information)?;
    max_len("information", &payload.information, MAX_INFORMATION_LENGTH)?;
    required("phone", &payload.phone)?;
    max_len("phone", &payload.phone, MAX_PHONE_LENGTH)?;
    Ok(())
}

pub fn application(payload: &ProviderApplicationRequest) -> Result<(), ProviderError> {
    atelier_identity::validate_email(&payload.email)
        .map_err(|e| ProviderError::Validation { message: e.to_string().into(), context: None })?;
    if let Some(phone) = &payload.phone {
        max_len("phone", phone, MAX_PHONE_LENGTH)?;
    }
    if let Some(name) = &payload.representative_name {
        max_len("representativeName", name, MAX_REPRESENTATIVE_NAME_LENGTH)?;
    }
    if let Some(name) = &payload.organization_name {
        max_len("organizationName", name, MAX_ORGANIZATION_NAME_LENGTH)?;
    }
    required("information", &payload.information)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ProviderProfilePayload {
        ProviderProfilePayload {
            organization_name: "Creative Arts Foundation".into(),
            representative_name: "J. Doe".into(),
            website: Some("https://caf.example.org".into()),
            information: "Grants for emerging artists".into(),
            phone: "+1 555 123".into(),
        }
    }

    #[test]
    fn complete_profile_passes() {
        assert!(profile(&payload()).is_ok());
    }

    #[test]
    fn blank_required_fields_fail() {
        let mut p = payload();
        p.organization_name = "  ".into();
        assert!(profile(&p).is_err());

        let mut p = payload();
        p.information = String::new();
        assert!(profile(&p).is_err());
    }

    #[test]
    fn overlong_fields_fail() {
        let mut p = payload();
        p.phone = "9".repeat(33);
        assert!(profile(&p).is_err());
    }

    #[test]
    fn application_requires_valid_email() {
        let request = ProviderApplicationRequest {
            email: "nope".into(),
            phone: None,
            representative_name: None,
            organization_name: None,
            information: "We fund murals".into(),
        };
        assert!(application(&request).is_err());
    }
}
