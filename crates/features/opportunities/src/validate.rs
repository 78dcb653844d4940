//! Field rules and kind-specific cross checks for opportunity payloads.

use crate::error::OpportunityError;
use crate::models::OpportunityPayload;
use atelier_domain::status::OpportunityKind;
use chrono::NaiveDate;

pub const MAX_TITLE_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_THEME_DESCRIPTION_LENGTH: usize = 300;

fn fail(message: String) -> OpportunityError {
    OpportunityError::Validation { message: message.into(), context: None }
}

fn iso_date(field: &'static str, value: &str) -> Result<(), OpportunityError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| fail(format!("{field}: expected an ISO date")))
}

fn range_ok(min: Option<i64>, max: Option<i64>) -> bool {
    match (min, max) {
        (Some(min), Some(max)) => min <= max,
        _ => true,
    }
}

fn positive(field: &'static str, value: Option<i64>) -> Result<(), OpportunityError> {
    if value.is_some_and(|v| v < 1) {
        return Err(fail(format!("{field}: must be positive")));
    }
    Ok(())
}

pub fn payload(opportunity: &OpportunityPayload) -> Result<(), OpportunityError> {
    if opportunity.title.trim().is_empty() {
        return Err(fail("title: required".into()));
    }
    if opportunity.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(fail(format!("title: must be at most {MAX_TITLE_LENGTH} characters")));
    }
    if opportunity.description.trim().is_empty() {
        return Err(fail("description: required".into()));
    }
    if opportunity.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(fail(format!(
            "description: must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    if opportunity.theme_description.chars().count() > MAX_THEME_DESCRIPTION_LENGTH {
        return Err(fail(format!(
            "themeDescription: must be at most {MAX_THEME_DESCRIPTION_LENGTH} characters"
        )));
    }

    iso_date("applicationDeadline", &opportunity.application_deadline)?;
    if let Some(response_deadline) = &opportunity.response_deadline {
        iso_date("responseDeadline", response_deadline)?;
    }

    positive("minAge", opportunity.min_age)?;
    positive("maxAge", opportunity.max_age)?;
    if !range_ok(opportunity.min_age, opportunity.max_age) {
        return Err(fail("minAge: must not exceed maxAge".into()));
    }

    match opportunity.kind {
        OpportunityKind::Grant => {
            positive("minGrantAmount", opportunity.min_grant_amount)?;
            positive("maxGrantAmount", opportunity.max_grant_amount)?;
            if !range_ok(opportunity.min_grant_amount, opportunity.max_grant_amount) {
                return Err(fail("minGrantAmount: must not exceed maxGrantAmount".into()));
            }
        },
        OpportunityKind::Residency => {
            let (Some(min), Some(max)) =
                (opportunity.min_residency_weeks, opportunity.max_residency_weeks)
            else {
                return Err(fail("residency: both week bounds are required".into()));
            };
            if min < 1 || max < 1 || min > max {
                return Err(fail("residency: invalid week range".into()));
            }
        },
        OpportunityKind::Award => {
            positive("minAwardAmount", opportunity.min_award_amount)?;
            positive("maxAwardAmount", opportunity.max_award_amount)?;
            if !range_ok(opportunity.min_award_amount, opportunity.max_award_amount) {
                return Err(fail("minAwardAmount: must not exceed maxAwardAmount".into()));
            }
        },
        OpportunityKind::Other => {},
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::status::Visibility;

    fn grant() -> OpportunityPayload {
        OpportunityPayload {
            title: "Digital Art Innovation Fund".into(),
            description: "Funding for artists exploring technology and art".into(),
            kind: OpportunityKind::Grant,
            visibility: Visibility::All,
            application_deadline: "2026-12-31".into(),
            response_deadline: None,
            legal_statuses: vec![],
            min_age: None,
            max_age: None,
            genders: vec![],
            industries: vec![],
            country_residence: vec![],
            country_citizenship: vec![],
            location_description: String::new(),
            themes: vec![],
            theme_description: String::new(),
            min_grant_amount: Some(1000),
            max_grant_amount: Some(7500),
            min_residency_weeks: None,
            max_residency_weeks: None,
            residency_offerings: vec![],
            residency_offering_description: String::new(),
            min_award_amount: None,
            max_award_amount: None,
            award_special_access: String::new(),
            attachments: vec![],
        }
    }

    #[test]
    fn valid_grant_passes() {
        assert!(payload(&grant()).is_ok());
    }

    #[test]
    fn inverted_grant_range_fails() {
        let mut p = grant();
        p.min_grant_amount = Some(9000);
        assert!(payload(&p).is_err());
    }

    #[test]
    fn open_ended_grant_range_passes() {
        let mut p = grant();
        p.min_grant_amount = None;
        p.max_grant_amount = None;
        assert!(payload(&p).is_ok());
    }

    #[test]
    fn residency_requires_both_bounds() {
        let mut p = grant();
        p.kind = OpportunityKind::Residency;
        assert!(payload(&p).is_err());

        p.min_residency_weeks = Some(2);
        p.max_residency_weeks = Some(12);
        assert!(payload(&p).is_ok());

        p.min_residency_weeks = Some(20);
        assert!(payload(&p).is_err());
    }

    #[test]
    fn age_range_is_cross_checked() {
        let mut p = grant();
        p.min_age = Some(30);
        p.max_age = Some(20);
        assert!(payload(&p).is_err());

        p.max_age = Some(40);
        assert!(payload(&p).is_ok());
    }

    #[test]
    fn malformed_deadline_fails() {
        let mut p = grant();
        p.application_deadline = "soon".into();
        assert!(payload(&p).is_err());
    }
}
