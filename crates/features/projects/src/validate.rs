//! Field rules for project payloads.

use crate::error::ProjectError;
use crate::models::ProjectPayload;
use atelier_media::MAX_ATTACHMENT_LABEL_LENGTH;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_TAG_LENGTH: usize = 30;
pub const MAX_LINK_LENGTH: usize = 100;

fn fail(message: String) -> ProjectError {
    ProjectError::Validation { message: message.into(), context: None }
}

pub fn payload(project: &ProjectPayload) -> Result<(), ProjectError> {
    if project.title.trim().is_empty() {
        return Err(fail("title: required".into()));
    }
    if project.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(fail(format!("title: must be at most {MAX_TITLE_LENGTH} characters")));
    }
    if project.description.trim().is_empty() {
        return Err(fail("description: required".into()));
    }
    if project.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(fail(format!(
            "description: must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    for tag in &project.tags {
        if tag.is_empty() || tag.chars().count() > MAX_TAG_LENGTH {
            return Err(fail(format!("tags: each must be 1 to {MAX_TAG_LENGTH} characters")));
        }
    }
    if let Some(link) = &project.link {
        if link.chars().count() > MAX_LINK_LENGTH
            || !(link.starts_with("http://") || link.starts_with("https://"))
        {
            return Err(fail("link: must be an absolute URL".into()));
        }
    }
    if project.budget < 0 {
        return Err(fail("budget: must not be negative".into()));
    }
    if project.reach < 0 {
        return Err(fail("reach: must not be negative".into()));
    }
    for attachment in &project.attachments {
        if let Some(label) = &attachment.label {
            if label.chars().count() > MAX_ATTACHMENT_LABEL_LENGTH {
                return Err(fail(format!(
                    "attachments: label must be at most {MAX_ATTACHMENT_LABEL_LENGTH} characters"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectPayload {
        ProjectPayload {
            title: "Light installation".into(),
            description: "Interactive light play for public squares".into(),
            tags: vec!["light".into(), "urban".into()],
            link: Some("https://example.org/light".into()),
            budget: 12_000,
            reach: 5000,
            exclusive_support: false,
            hidden: false,
            attachments: vec![],
            poster_image: None,
        }
    }

    #[test]
    fn valid_project_passes() {
        assert!(payload(&project()).is_ok());
    }

    #[test]
    fn title_and_description_are_required() {
        let mut p = project();
        p.title = "  ".into();
        assert!(payload(&p).is_err());

        let mut p = project();
        p.description = String::new();
        assert!(payload(&p).is_err());
    }

    #[test]
    fn negative_amounts_fail() {
        let mut p = project();
        p.budget = -1;
        assert!(payload(&p).is_err());
    }

    #[test]
    fn relative_links_fail() {
        let mut p = project();
        p.link = Some("example.org".into());
        assert!(payload(&p).is_err());
    }
}
