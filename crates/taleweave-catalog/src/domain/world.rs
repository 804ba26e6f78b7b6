//! Worlds: the settings series take place in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use uuid::Uuid;

/// Longest accepted world name.
pub const MAX_WORLD_NAME_LEN: usize = 120;

/// A story world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// World identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Scenes a story in this world opens with by default.
    pub default_scenes: Vec<String>,
    /// Overall tone, e.g. `"noir"`.
    pub tone: Option<String>,
    /// Sensory details the characters may draw on.
    pub ambient_details: serde_json::Value,
    /// Arbitrary authoring metadata.
    pub metadata: serde_json::Value,
    /// Inactive worlds are hidden from non-admin listings.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a world.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewWorld {
    /// Display name.
    pub name: String,
    /// Slug; derived from the name when omitted.
    pub slug: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Default opening scenes.
    #[serde(default)]
    pub default_scenes: Vec<String>,
    /// Overall tone.
    pub tone: Option<String>,
    /// Sensory details.
    pub ambient_details: Option<serde_json::Value>,
    /// Authoring metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Partial update of a world. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New default scenes.
    pub default_scenes: Option<Vec<String>>,
    /// New tone.
    pub tone: Option<String>,
    /// New ambient details.
    pub ambient_details: Option<serde_json::Value>,
    /// New metadata.
    pub metadata: Option<serde_json::Value>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_WORLD_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "world name must be 1..={MAX_WORLD_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn tidy_scenes(scenes: Vec<String>) -> Vec<String> {
    scenes
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

impl World {
    /// Builds a validated world from creation input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad name or slug.
    pub fn create(input: NewWorld, id: Uuid, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_name(&input.name)?;
        let slug = super::slug::resolve_slug(input.slug.as_deref(), &input.name)?;
        Ok(Self {
            id,
            name: input.name.trim().to_owned(),
            slug,
            description: input.description,
            default_scenes: tidy_scenes(input.default_scenes),
            tone: input.tone,
            ambient_details: input
                .ambient_details
                .unwrap_or_else(|| serde_json::json!({})),
            metadata: input.metadata.unwrap_or_else(|| serde_json::json!({})),
            is_active: true,
            created_at: now,
        })
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad name.
    pub fn apply_update(&mut self, update: WorldUpdate) -> Result<(), DomainError> {
        if let Some(name) = update.name {
            validate_name(&name)?;
            self.name = name.trim().to_owned();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(scenes) = update.default_scenes {
            self.default_scenes = tidy_scenes(scenes);
        }
        if let Some(tone) = update.tone {
            self.tone = Some(tone);
        }
        if let Some(details) = update.ambient_details {
            self.ambient_details = details;
        }
        if let Some(metadata) = update.metadata {
            self.metadata = metadata;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }
}
