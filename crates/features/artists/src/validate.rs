//! Field rules for artist profile payloads.

use crate::error::ArtistError;
use crate::models::{PersonalSection, ProfessionalSection, ProfileSection};
use chrono::{Datelike, NaiveDate};

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_PHONE_LENGTH: usize = 30;
pub const MAX_BIO_LENGTH: usize = 2000;
pub const MAX_STATEMENT_LENGTH: usize = 2000;
pub const MAX_LINK_LENGTH: usize = 100;
pub const MIN_BIRTH_YEAR: i32 = 1900;

fn too_long(field: &'static str, max: usize) -> ArtistError {
    ArtistError::Validation {
        message: format!("{field}: must be at most {max} characters").into(),
        context: None,
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ArtistError> {
    if value.chars().count() > max {
        return Err(too_long(field, max));
    }
    Ok(())
}

fn check_phone(value: &str) -> Result<(), ArtistError> {
    check_len("phone", value, MAX_PHONE_LENGTH)?;
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    if !valid {
        return Err(ArtistError::Validation {
            message: "phone: invalid phone number".into(),
            context: None,
        });
    }
    Ok(())
}

pub fn personal(section: &PersonalSection) -> Result<(), ArtistError> {
    if let Some(first_name) = &section.first_name {
        check_len("firstName", first_name, MAX_NAME_LENGTH)?;
    }
    if let Some(last_name) = &section.last_name {
        check_len("lastName", last_name, MAX_NAME_LENGTH)?;
    }
    if let Some(phone) = &section.phone {
        check_phone(phone)?;
    }

    let birth_day = NaiveDate::parse_from_str(&section.birth_day, "%Y-%m-%d").map_err(|_| {
        ArtistError::Validation {
            message: "birthDay: expected an ISO date".into(),
            context: None,
        }
    })?;
    if birth_day.year_ce().1 < u32::try_from(MIN_BIRTH_YEAR).unwrap_or_default()
        || birth_day > chrono::Utc::now().date_naive()
    {
        return Err(ArtistError::Validation {
            message: "birthDay: out of range".into(),
            context: None,
        });
    }

    Ok(())
}

pub fn professional(section: &ProfessionalSection) -> Result<(), ArtistError> {
    if section.languages.is_empty() {
        return Err(ArtistError::Validation {
            message: "languages: at least one is required".into(),
            context: None,
        });
    }
    if section.industries.is_empty() {
        return Err(ArtistError::Validation {
            message: "industries: at least one is required".into(),
            context: None,
        });
    }
    Ok(())
}

pub fn profile(section: &ProfileSection) -> Result<(), ArtistError> {
    if let Some(artist_name) = &section.artist_name {
        check_len("artistName", artist_name, MAX_NAME_LENGTH)?;
    }
    if section.statement.is_empty() {
        return Err(ArtistError::Validation {
            message: "statement: required".into(),
            context: None,
        });
    }
    check_len("statement", &section.statement, MAX_STATEMENT_LENGTH)?;
    if let Some(bio) = &section.bio {
        check_len("bio", bio, MAX_BIO_LENGTH)?;
    }
    for link in &section.links {
        check_len("links", link, MAX_LINK_LENGTH)?;
        if !link.starts_with("http://") && !link.starts_with("https://") {
            return Err(ArtistError::Validation {
                message: "links: must be absolute URLs".into(),
                context: None,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::vocab::{ArtTheme, ArtistTitle, Country, Industry, Language};

    fn personal_section() -> PersonalSection {
        PersonalSection {
            first_name: Some("Maja".into()),
            last_name: None,
            phone: Some("+48 600 100 200".into()),
            country_residence: Country::Poland,
            country_citizenship: Country::Poland,
            birth_day: "1990-06-01".into(),
        }
    }

    #[test]
    fn personal_accepts_reasonable_values() {
        assert!(personal(&personal_section()).is_ok());
    }

    #[test]
    fn personal_rejects_bad_dates_and_phones() {
        let mut section = personal_section();
        section.birth_day = "junk".into();
        assert!(personal(&section).is_err());

        let mut section = personal_section();
        section.birth_day = "1850-01-01".into();
        assert!(personal(&section).is_err());

        let mut section = personal_section();
        section.phone = Some("call me".into());
        assert!(personal(&section).is_err());
    }

    #[test]
    fn professional_requires_languages_and_industries() {
        let section = ProfessionalSection {
            languages: vec![],
            industries: vec![Industry::Music],
            title: ArtistTitle::Emerging,
            themes: vec![ArtTheme::Memory],
        };
        assert!(professional(&section).is_err());

        let section = ProfessionalSection {
            languages: vec![Language::English],
            industries: vec![Industry::Music],
            title: ArtistTitle::Emerging,
            themes: vec![],
        };
        assert!(professional(&section).is_ok());
    }

    #[test]
    fn profile_checks_statement_and_links() {
        let mut section = ProfileSection {
            artist_name: None,
            statement: "I make things".into(),
            bio: None,
            links: vec!["https://example.org/portfolio".into()],
        };
        assert!(profile(&section).is_ok());

        section.links = vec!["ftp://example.org".into()];
        assert!(profile(&section).is_err());

        section.links = vec![];
        section.statement = String::new();
        assert!(profile(&section).is_err());
    }
}
