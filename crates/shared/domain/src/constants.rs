//! Shared naming constants: OpenAPI tags and role names.

pub const SYSTEM_TAG: &str = "System";
pub const IDENTITY_TAG: &str = "Identity";
pub const ARTISTS_TAG: &str = "Artists";
pub const PROVIDERS_TAG: &str = "Providers";
pub const PROJECTS_TAG: &str = "Projects";
pub const OPPORTUNITIES_TAG: &str = "Opportunities";
pub const APPLICATIONS_TAG: &str = "Applications";
pub const INVITES_TAG: &str = "Invites";
pub const MODERATION_TAG: &str = "Moderation";
pub const ADMIN_TAG: &str = "Admin";
pub const CONTENT_TAG: &str = "Content";
pub const MEDIA_TAG: &str = "Media";

pub const ARTIST: &str = "artist";
pub const PROVIDER: &str = "provider";
pub const MODERATOR: &str = "moderator";
pub const ADMINISTRATOR: &str = "administrator";
pub const CONTENT_MANAGER: &str = "content_manager";
