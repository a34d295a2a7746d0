//! The idea form and the generate/refine request body.

use serde::{Deserialize, Serialize};

use crate::error::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Instagram,
    Tiktok,
    InstagramTiktok,
    Facebook,
    Youtube,
    Whatsapp,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::InstagramTiktok => "instagram_tiktok",
            Platform::Facebook => "facebook",
            Platform::Youtube => "youtube",
            Platform::Whatsapp => "whatsapp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
    }

    pub fn all() -> Vec<Platform> {
        vec![
            Platform::Instagram,
            Platform::Tiktok,
            Platform::InstagramTiktok,
            Platform::Facebook,
            Platform::Youtube,
            Platform::Whatsapp,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Tiktok => "TikTok",
            Platform::InstagramTiktok => "Instagram and TikTok",
            Platform::Facebook => "Facebook",
            Platform::Youtube => "YouTube Shorts",
            Platform::Whatsapp => "WhatsApp Status",
        }
    }
}

/// Language style the backend writes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Simple,
    Pidgin,
    Standard,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Simple => "simple",
            Language::Pidgin => "pidgin",
            Language::Standard => "standard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|l| l.as_str() == s.trim().to_lowercase())
    }

    pub fn all() -> Vec<Language> {
        vec![Language::Simple, Language::Pidgin, Language::Standard]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Simple => "Simple English",
            Language::Pidgin => "Nigerian Pidgin",
            Language::Standard => "Standard English",
        }
    }
}

/// Suggested values for the free-text preference fields.
pub const MOODS: &[&str] = &["neutral", "funny", "emotional", "inspiring", "educational"];
pub const GOALS: &[&str] = &["engage", "sales", "awareness", "trust"];
pub const PEOPLE: &[&str] = &["solo", "team", "customers", "nobody"];

/// What the user filled in about their business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaForm {
    pub business_type: String,
    pub platform: Platform,
    pub mood: String,
    pub goal: String,
    pub people: String,
    pub language: Language,
}

impl Default for IdeaForm {
    fn default() -> Self {
        Self {
            business_type: String::new(),
            platform: Platform::default(),
            mood: MOODS[0].to_string(),
            goal: GOALS[0].to_string(),
            people: PEOPLE[0].to_string(),
            language: Language::default(),
        }
    }
}

/// Follow-up instruction together with the idea it applies to.
///
/// Only [`crate::refinement::RefinementContext`] builds one, which keeps the
/// two fields from ever appearing apart on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Refinement {
    #[serde(rename = "refinement")]
    pub instruction: String,
    pub previous_idea: String,
}

/// Body of a generate or refine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub business_type: String,
    pub platform: Platform,
    pub mood: String,
    pub goal: String,
    pub people: String,
    pub language: Language,
    #[serde(flatten)]
    refinement: Option<Refinement>,
}

impl GenerationRequest {
    /// A fresh generation from the form. The business type is required.
    pub fn generate(form: &IdeaForm) -> Result<Self, FormError> {
        if form.business_type.trim().is_empty() {
            return Err(FormError::MissingBusinessType);
        }
        Ok(Self::from_form(form))
    }

    /// Request body from the form as it stands, without validation.
    pub(crate) fn from_form(form: &IdeaForm) -> Self {
        Self {
            business_type: form.business_type.trim().to_string(),
            platform: form.platform,
            mood: form.mood.trim().to_string(),
            goal: form.goal.trim().to_string(),
            people: form.people.trim().to_string(),
            language: form.language,
            refinement: None,
        }
    }

    pub(crate) fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = Some(refinement);
        self
    }

    pub fn refinement(&self) -> Option<&Refinement> {
        self.refinement.as_ref()
    }

    pub fn is_refinement(&self) -> bool {
        self.refinement.is_some()
    }
}
