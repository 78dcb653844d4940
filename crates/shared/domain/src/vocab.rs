//! Marketplace vocabulary: the enumerated profile and eligibility fields.
//!
//! Stored as snake_case strings. Empty filter sets mean "no restriction"
//! everywhere these are used.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LegalStatus {
    Individual,
    SoleProprietor,
    NonProfit,
    Company,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArtistTitle {
    Emerging,
    Established,
    MidCareer,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    VisualArtsAndCrafts,
    PerformingArts,
    Music,
    Film,
    Literature,
    Design,
    Photography,
    DigitalAndNewMedia,
    Architecture,
    CulturalHeritage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArtTheme {
    Identity,
    Environment,
    SocialJustice,
    Technology,
    Tradition,
    Urbanism,
    Memory,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Dutch,
    Polish,
    Ukrainian,
    Russian,
    Arabic,
    Mandarin,
    Japanese,
    Korean,
    Hindi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResidencyOffering {
    Accommodation,
    Studio,
    Stipend,
    Materials,
    Travel,
    Mentorship,
    Exhibition,
}

/// Countries the marketplace operates in. `None` stands for "not stated"
/// and is excluded from dashboard breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Country {
    None,
    Austria,
    Belgium,
    Bulgaria,
    Canada,
    Croatia,
    Czechia,
    Denmark,
    Estonia,
    Finland,
    France,
    Germany,
    Greece,
    Hungary,
    Iceland,
    Ireland,
    Italy,
    Japan,
    Latvia,
    Lithuania,
    Luxembourg,
    Malta,
    Mexico,
    Netherlands,
    Norway,
    Poland,
    Portugal,
    Romania,
    Serbia,
    Slovakia,
    Slovenia,
    SouthKorea,
    Spain,
    Sweden,
    Switzerland,
    Ukraine,
    UnitedKingdom,
    UnitedStates,
}
